// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Fallback upper bound on concurrently running PARALLEL workers when the
/// host parallelism cannot be determined
pub const DEFAULT_POOL_CAP: usize = 4;
/// Default number of adapter invocations allowed in flight at once
pub const DEFAULT_ADAPTER_CONCURRENCY: usize = 8;
/// Event definition category for events injected by an external driver
pub const EXTERNAL_CATEGORY: &str = "external";
/// Event definition category used when none is declared
pub const INTERNAL_CATEGORY: &str = "internal";
/// Method name wiring rules use to run an operator's pipeline
pub const RUN_PIPELINE_METHOD: &str = "run_pipeline";
