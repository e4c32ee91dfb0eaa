// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::{Number, Value};

use crate::errors::WorkerError;
use crate::traits::{StandardWorker, Worker};
use crate::workers::BuildContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Multiply,
    Subtract,
}

/// Applies one arithmetic operation with a fixed operand to a numeric input.
///
/// Integer inputs with an integer operand stay integers; anything else is
/// computed in floating point.
pub struct Arithmetic {
    op: ArithmeticOp,
    operand: Number,
}

impl Arithmetic {
    pub fn new(op: ArithmeticOp, operand: Number) -> Self {
        Self { op, operand }
    }

    pub fn from_params(op: ArithmeticOp, ctx: &BuildContext<'_>) -> Result<Self, WorkerError> {
        match ctx.param("operand")? {
            Value::Number(operand) => Ok(Self::new(op, operand.clone())),
            other => Err(WorkerError::InvalidInput(format!(
                "parameter 'operand' must be a number, got {}",
                other
            ))),
        }
    }

    fn apply_int(&self, a: i64, b: i64) -> Option<i64> {
        match self.op {
            ArithmeticOp::Add => a.checked_add(b),
            ArithmeticOp::Multiply => a.checked_mul(b),
            ArithmeticOp::Subtract => a.checked_sub(b),
        }
    }

    fn apply_float(&self, a: f64, b: f64) -> f64 {
        match self.op {
            ArithmeticOp::Add => a + b,
            ArithmeticOp::Multiply => a * b,
            ArithmeticOp::Subtract => a - b,
        }
    }
}

impl Worker for Arithmetic {
    fn name(&self) -> &'static str {
        match self.op {
            ArithmeticOp::Add => "add",
            ArithmeticOp::Multiply => "multiply",
            ArithmeticOp::Subtract => "subtract",
        }
    }
}

#[async_trait]
impl StandardWorker for Arithmetic {
    async fn process(&self, input: Value) -> Result<Value, WorkerError> {
        let input = match input {
            Value::Number(n) => n,
            other => {
                return Err(WorkerError::InvalidInput(format!(
                    "{} expects a number, got {}",
                    self.name(),
                    other
                )))
            }
        };

        if let (Some(a), Some(b)) = (input.as_i64(), self.operand.as_i64()) {
            if let Some(result) = self.apply_int(a, b) {
                return Ok(Value::from(result));
            }
        }

        let (Some(a), Some(b)) = (input.as_f64(), self.operand.as_f64()) else {
            return Err(WorkerError::InvalidInput(format!("{} is not representable", input)));
        };
        Number::from_f64(self.apply_float(a, b))
            .map(Value::Number)
            .ok_or_else(|| WorkerError::Failed(format!("{} produced a non-finite result", self.name())))
    }
}
