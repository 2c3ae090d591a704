//! LEO propagation and conjunction screening CLI.
//!
//! Reads a TLE text file (three lines per object: name, line1, line2),
//! propagates every object over the configured horizon, runs both proximity
//! screens, and prints a JSON report to stdout.

use std::process::ExitCode;

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use leo_propagation::proximity::{
    check_close_approaches, pairwise_collision_check, DEFAULT_THRESHOLD_KM,
};
use leo_propagation::tle::parse_tle_text;
use leo_propagation::trajectory::propagate_batch_parallel;

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize tracing with JSON output for production
    let json_logs = std::env::var("JSON_LOGS")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .with(fmt::layer())
            .init();
    }

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: leo_propagation <tle-file>");
        return ExitCode::FAILURE;
    };

    let propagate_seconds: f64 = env_or("PROPAGATE_SECONDS", 300.0);
    let samples: usize = env_or("SAMPLES", 60);
    let threshold_km: f64 = env_or("THRESHOLD_KM", DEFAULT_THRESHOLD_KM);

    info!("Starting LEO propagation v{}", env!("CARGO_PKG_VERSION"));

    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            error!("failed to read {}: {}", path, e);
            return ExitCode::FAILURE;
        }
    };

    let tles = match parse_tle_text(&text) {
        Ok(tles) => tles,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    if tles.is_empty() {
        error!("no TLEs found in {}", path);
        return ExitCode::FAILURE;
    }

    info!(
        objects = tles.len(),
        propagate_seconds, samples, threshold_km, "propagating batch"
    );

    let outcome = propagate_batch_parallel(tles, propagate_seconds, samples).await;

    let final_states: Vec<_> = outcome
        .trajectories
        .iter()
        .filter_map(|t| t.final_state())
        .collect();
    let alerts = pairwise_collision_check(&final_states, threshold_km);
    let encounters = check_close_approaches(&outcome.trajectories, threshold_km);

    info!(
        trajectories = outcome.trajectories.len(),
        failures = outcome.failures.len(),
        alerts = alerts.len(),
        encounters = encounters.len(),
        "screening complete"
    );

    let failures: Vec<_> = outcome
        .failures
        .iter()
        .map(|f| serde_json::json!({"name": f.name, "error": f.error.to_string()}))
        .collect();

    let report = serde_json::json!({
        "status": "ok",
        "results": outcome.trajectories,
        "alerts": alerts,
        "encounters": encounters,
        "failures": failures,
    });

    match serde_json::to_string_pretty(&report) {
        Ok(out) => {
            println!("{}", out);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("failed to encode report: {}", e);
            ExitCode::FAILURE
        }
    }
}
