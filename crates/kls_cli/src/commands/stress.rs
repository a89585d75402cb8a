//! Stress command implementation.

use kls_core::{Config, Store};
use kls_testkit::{
    stress_concurrent_appends, stress_concurrent_churn, stress_concurrent_searches,
    stress_mixed_operations, stress_sequential_inserts, stress_sequential_searches,
    verify_appends, StressConfig, StressTestResult,
};
use serde::Serialize;
use std::sync::Arc;

/// One stress test outcome.
#[derive(Debug, Serialize)]
pub struct StressReport {
    /// Test name.
    pub name: &'static str,
    /// Total operations performed.
    pub total_ops: usize,
    /// Successful operations.
    pub successful_ops: usize,
    /// Failed operations.
    pub failed_ops: usize,
    /// Wall time in milliseconds.
    pub duration_ms: f64,
    /// Operations per second.
    pub ops_per_second: f64,
}

impl StressReport {
    fn new(name: &'static str, result: &StressTestResult) -> Self {
        Self {
            name,
            total_ops: result.total_ops,
            successful_ops: result.successful_ops,
            failed_ops: result.failed_ops,
            duration_ms: result.duration.as_secs_f64() * 1000.0,
            ops_per_second: result.ops_per_second,
        }
    }
}

const SHARED_KEY: &[u8] = b"shared";

/// Runs the stress command. Each test gets a fresh store.
pub fn run(
    config: Config,
    stress: &StressConfig,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    if stress.value_size >= config.max_entry_size {
        return Err(format!(
            "value size {} must be below the entry size {}",
            stress.value_size, config.max_entry_size
        )
        .into());
    }
    if stress.threads == 0 {
        return Err("at least one thread is required".into());
    }

    let fresh = || Store::new(config.clone());
    let mut results = Vec::new();

    results.push((
        "Sequential inserts",
        stress_sequential_inserts(&fresh()?, stress),
    ));
    results.push((
        "Sequential searches",
        stress_sequential_searches(&fresh()?, stress),
    ));
    results.push(("Mixed operations", stress_mixed_operations(&fresh()?, stress)));

    let store = Arc::new(fresh()?);
    let appends = stress_concurrent_appends(Arc::clone(&store), SHARED_KEY, stress);
    let per_thread = stress.operations / stress.threads;
    let verified = verify_appends(&store, SHARED_KEY, stress.threads, per_thread);
    results.push(("Concurrent appends (one key)", appends));

    results.push((
        "Concurrent searches",
        stress_concurrent_searches(Arc::new(fresh()?), stress),
    ));
    results.push((
        "Concurrent create/delete",
        stress_concurrent_churn(Arc::new(fresh()?), stress),
    ));

    match format {
        "json" => {
            let reports: Vec<StressReport> = results
                .iter()
                .map(|(name, result)| StressReport::new(*name, result))
                .collect();
            println!("{}", serde_json::to_string_pretty(&reports)?);
        }
        _ => {
            for (name, result) in &results {
                result.print_summary(name);
            }
        }
    }

    match verified {
        Ok(count) => {
            tracing::info!(values = count, "concurrent appends verified");
            Ok(())
        }
        Err(message) => Err(format!("concurrent append check failed: {message}").into()),
    }
}
