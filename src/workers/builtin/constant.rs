// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde_json::Value;

use crate::errors::WorkerError;
use crate::traits::{StandardWorker, Worker};

/// Ignores its input and returns a fixed value.
pub struct Constant {
    value: Value,
}

impl Constant {
    pub fn new(value: Value) -> Self {
        Self { value }
    }
}

impl Worker for Constant {
    fn name(&self) -> &'static str {
        "constant"
    }
}

#[async_trait]
impl StandardWorker for Constant {
    async fn process(&self, _input: Value) -> Result<Value, WorkerError> {
        Ok(self.value.clone())
    }
}
