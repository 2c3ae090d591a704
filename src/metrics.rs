//! Prometheus metrics for the propagation engine.

use std::time::Duration;

use lazy_static::lazy_static;
use prometheus::{
    register_counter, register_counter_vec, register_histogram, Counter, CounterVec, Histogram,
};

lazy_static! {
    /// Counter for per-object propagations by outcome
    pub static ref PROPAGATIONS: CounterVec = register_counter_vec!(
        "leo_propagations_total",
        "Total number of per-object propagations",
        &["status"]
    ).unwrap();

    /// Histogram for single-object propagation latency
    pub static ref PROPAGATION_LATENCY: Histogram = register_histogram!(
        "leo_propagation_seconds",
        "Time spent propagating a single object",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]
    ).unwrap();

    /// Counter for trajectory samples generated
    pub static ref TRAJECTORY_POINTS: Counter = register_counter!(
        "leo_trajectory_points_total",
        "Total number of trajectory samples generated"
    ).unwrap();

    /// Counter for Kepler solver runs that hit the iteration cap
    pub static ref KEPLER_NONCONVERGENCE: Counter = register_counter!(
        "leo_kepler_nonconvergence_total",
        "Kepler solver runs that exhausted the iteration cap"
    ).unwrap();

    /// Counter for proximity events by algorithm
    pub static ref PROXIMITY_EVENTS: CounterVec = register_counter_vec!(
        "leo_proximity_events_total",
        "Proximity events emitted",
        &["algorithm"]
    ).unwrap();
}

pub fn record_propagation(duration: Duration, success: bool) {
    let status = if success { "success" } else { "error" };

    PROPAGATIONS.with_label_values(&[status]).inc();
    PROPAGATION_LATENCY.observe(duration.as_secs_f64());
}

pub fn record_trajectory_points(points: usize) {
    TRAJECTORY_POINTS.inc_by(points as f64);
}

pub fn record_kepler_nonconvergence() {
    KEPLER_NONCONVERGENCE.inc();
}

pub fn record_proximity_events(algorithm: &str, count: usize) {
    PROXIMITY_EVENTS
        .with_label_values(&[algorithm])
        .inc_by(count as f64);
}
