// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builtin worker implementations.
//!
//! | Name | Role | Capabilities | Parameters |
//! |------|------|--------------|------------|
//! | `add`, `multiply`, `subtract` | STANDARD | none | `operand` (number) |
//! | `constant` | STANDARD | none | `value` (any) |
//! | `running_total` | STANDARD | state, events | none |
//! | `history_recorder` | EVENT_DRIVEN | events, history | none |

mod arithmetic;
mod constant;
mod history_recorder;
mod running_total;

pub use arithmetic::{Arithmetic, ArithmeticOp};
pub use constant::Constant;
pub use history_recorder::HistoryRecorder;
pub use running_total::RunningTotal;

use crate::workers::WorkerRegistry;

pub(crate) fn register_all(registry: &mut WorkerRegistry) {
    registry
        .register_standard("add", |ctx| {
            Ok(Box::new(Arithmetic::from_params(ArithmeticOp::Add, ctx)?))
        })
        .register_standard("multiply", |ctx| {
            Ok(Box::new(Arithmetic::from_params(ArithmeticOp::Multiply, ctx)?))
        })
        .register_standard("subtract", |ctx| {
            Ok(Box::new(Arithmetic::from_params(ArithmeticOp::Subtract, ctx)?))
        })
        .register_standard("constant", |ctx| {
            Ok(Box::new(Constant::new(ctx.param("value")?.clone())))
        })
        .register_standard("running_total", |ctx| Ok(Box::new(RunningTotal::from_context(ctx))))
        .register_event_driven("history_recorder", |ctx| {
            Ok(Box::new(HistoryRecorder::from_context(ctx)))
        });
}
