// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use anyhow::{bail, Context};
use serde_json::Value;
use std::env;
use the_foreman::config::load_config;
use the_foreman::events::{CausalId, CausalKind};
use the_foreman::workers::WorkerRegistry;
use the_foreman::bootstrap;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <config.yaml> <first-event> [payload-json]", args[0]);
        eprintln!("Example: {} configs/demo.yaml market_tick 5", args[0]);
        std::process::exit(1);
    }

    init_tracing();

    let config_file = &args[1];
    let first_event = &args[2];
    let payload: Value = match args.get(3) {
        Some(raw) => serde_json::from_str(raw)
            .with_context(|| format!("payload '{}' is not valid JSON", raw))?,
        None => Value::Null,
    };

    let config = load_config(config_file)?;
    let registry = WorkerRegistry::with_builtins();
    let mut system = match bootstrap(&config, &registry) {
        Ok(system) => system,
        Err(e) => bail!("{}", e),
    };

    for warning in &system.validation_report().warnings {
        println!("⚠️  {}", warning);
    }

    system.start();
    let origin = CausalId::new(CausalKind::WorkItem);
    let delivered = system
        .inject(first_event, payload, vec![origin])
        .with_context(|| format!("could not inject '{}'", first_event))?;
    println!(
        "🚀 Unit '{}' running; '{}' ({}) reached {} subscriber(s). Ctrl-C to stop.",
        system.unit_id(),
        first_event,
        origin,
        delivered
    );

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for Ctrl-C")?;

    system.stop().await;
    println!("🛑 Unit '{}' stopped", system.unit_id());
    Ok(())
}
