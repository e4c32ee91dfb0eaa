// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod factory;
pub mod operator;

pub use factory::{Assembly, OperatorFactory};
pub use operator::Operator;
