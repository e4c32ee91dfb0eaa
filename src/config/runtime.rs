// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{DEFAULT_ADAPTER_CONCURRENCY, DEFAULT_POOL_CAP};
use crate::config::RuntimeOptions;

impl RuntimeOptions {
    /// Upper bound on concurrently running workers in a PARALLEL operator.
    ///
    /// Falls back to the host's available parallelism, then to
    /// [`DEFAULT_POOL_CAP`]. Never less than 1.
    ///
    /// ```
    /// use the_foreman::config::RuntimeOptions;
    ///
    /// let options = RuntimeOptions { max_parallelism: Some(0), adapter_concurrency: None };
    /// assert_eq!(options.pool_cap(), 1);
    /// ```
    pub fn pool_cap(&self) -> usize {
        self.max_parallelism
            .unwrap_or_else(|| {
                std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(DEFAULT_POOL_CAP)
            })
            .max(1)
    }

    /// Number of adapter invocations allowed in flight at once. Never less than 1.
    pub fn adapter_concurrency(&self) -> usize {
        self.adapter_concurrency
            .unwrap_or(DEFAULT_ADAPTER_CONCURRENCY)
            .max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let options = RuntimeOptions {
            max_parallelism: Some(3),
            adapter_concurrency: Some(2),
        };
        assert_eq!(options.pool_cap(), 3);
        assert_eq!(options.adapter_concurrency(), 2);
    }

    #[test]
    fn defaults_are_positive() {
        let options = RuntimeOptions::default();
        assert!(options.pool_cap() >= 1);
        assert_eq!(options.adapter_concurrency(), DEFAULT_ADAPTER_CONCURRENCY);
    }
}
