//! Trajectory sampling and batch orchestration.
//!
//! One trajectory per object: parse elements, convert to the epoch state,
//! integrate to each sample offset, convert to geodetic. Objects are
//! independent until proximity screening, so the batch entry points isolate
//! per-object failures and the async variant fans out one task per object.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::elements::coe_to_rv;
use crate::error::PropagationError;
use crate::metrics;
use crate::propagator::propagate_state;
use crate::time::eci_to_geodetic;
use crate::tle::{parse_elements, TwoLineElementSet};

/// One propagated sample along a trajectory.
///
/// Field names are part of the interchange contract and must not change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampledState {
    pub timestamp: DateTime<Utc>,
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
    pub r_km: [f64; 3],
    pub v_km_s: [f64; 3],
}

/// A sampled trajectory for one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trajectory {
    pub id: String,
    pub name: String,
    pub samples: Vec<SampledState>,
}

impl Trajectory {
    /// The last sample reduced to the record the endpoint collision check
    /// consumes. `None` only when the trajectory is empty.
    pub fn final_state(&self) -> Option<FinalState> {
        self.samples.last().map(|s| FinalState {
            id: self.id.clone(),
            name: self.name.clone(),
            r_km: s.r_km,
            v_km_s: s.v_km_s,
        })
    }
}

/// Final propagated state of one object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinalState {
    pub id: String,
    pub name: String,
    pub r_km: [f64; 3],
    pub v_km_s: [f64; 3],
}

/// A per-object propagation failure inside a batch.
#[derive(Debug, Clone)]
pub struct ObjectFailure {
    pub name: String,
    pub error: PropagationError,
}

/// Result of a batch propagation: successful trajectories plus isolated
/// per-object failures.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub trajectories: Vec<Trajectory>,
    pub failures: Vec<ObjectFailure>,
}

/// Propagate one object into an evenly sampled trajectory.
///
/// `sample_count` timestamps are spaced evenly from the epoch to
/// `propagation_seconds` after it, endpoints included; a single sample sits
/// at the epoch itself. Request validation happens here, before any orbital
/// math.
pub fn propagate_from_tle(
    tle: &TwoLineElementSet,
    propagation_seconds: f64,
    sample_count: usize,
) -> Result<Trajectory, PropagationError> {
    if sample_count == 0 {
        return Err(PropagationError::InvalidRequest(
            "sample count must be at least 1".to_string(),
        ));
    }
    if !(propagation_seconds > 0.0) {
        return Err(PropagationError::InvalidRequest(format!(
            "propagation horizon must be positive, got {}",
            propagation_seconds
        )));
    }

    let started = Instant::now();
    let elements = match parse_elements(tle) {
        Ok(elements) => elements,
        Err(err) => {
            metrics::record_propagation(started.elapsed(), false);
            return Err(err);
        }
    };
    let epoch = elements.epoch.datetime;
    let (state0, _nu) = coe_to_rv(&elements);

    debug!(
        name = %tle.name,
        a_km = elements.a,
        e = elements.e,
        %epoch,
        "propagating object"
    );

    let mut samples = Vec::with_capacity(sample_count);
    for k in 0..sample_count {
        let dt = if sample_count > 1 {
            propagation_seconds * k as f64 / (sample_count - 1) as f64
        } else {
            0.0
        };
        let timestamp = epoch + Duration::nanoseconds((dt * 1e9).round() as i64);
        let state = propagate_state(&state0, dt);
        let geo = eci_to_geodetic(&state.r, timestamp);

        samples.push(SampledState {
            timestamp,
            lat: geo.lat_deg,
            lon: geo.lon_deg,
            alt_m: geo.alt_m,
            r_km: [state.r.x, state.r.y, state.r.z],
            v_km_s: [state.v.x, state.v.y, state.v.z],
        });
    }

    metrics::record_propagation(started.elapsed(), true);
    metrics::record_trajectory_points(samples.len());
    info!(name = %tle.name, samples = samples.len(), "propagation complete");

    Ok(Trajectory {
        id: trajectory_id(tle),
        name: tle.name.clone(),
        samples,
    })
}

/// Deterministic per-request trajectory id: the sanitized name plus a short
/// digest of both TLE lines. Uniqueness within one request is all that is
/// required.
fn trajectory_id(tle: &TwoLineElementSet) -> String {
    let mut hasher = DefaultHasher::new();
    format!("{}{}", tle.line1, tle.line2).hash(&mut hasher);
    let digest = hasher.finish().to_string();
    let short = &digest[..digest.len().min(8)];
    format!("{}_{}", tle.name.replace(' ', "_"), short)
}

/// Propagate a batch of objects sequentially.
///
/// A failure on one object is recorded and does not abort the rest of the
/// batch.
pub fn propagate_batch(
    tles: &[TwoLineElementSet],
    propagation_seconds: f64,
    sample_count: usize,
) -> BatchOutcome {
    let mut outcome = BatchOutcome::default();

    for tle in tles {
        match propagate_from_tle(tle, propagation_seconds, sample_count) {
            Ok(trajectory) => outcome.trajectories.push(trajectory),
            Err(error) => {
                warn!(name = %tle.name, %error, "propagation failed for object");
                outcome.failures.push(ObjectFailure {
                    name: tle.name.clone(),
                    error,
                });
            }
        }
    }

    outcome
}

/// Propagate a batch with one blocking task per object.
///
/// Objects are independent until proximity screening, so the fan-out needs
/// no coordination; the join here is the only synchronization point. Result
/// order follows input order.
pub async fn propagate_batch_parallel(
    tles: Vec<TwoLineElementSet>,
    propagation_seconds: f64,
    sample_count: usize,
) -> BatchOutcome {
    let mut handles = Vec::with_capacity(tles.len());
    for tle in tles {
        handles.push(tokio::task::spawn_blocking(move || {
            let result = propagate_from_tle(&tle, propagation_seconds, sample_count);
            (tle, result)
        }));
    }

    let mut outcome = BatchOutcome::default();
    for handle in handles {
        match handle.await {
            Ok((_, Ok(trajectory))) => outcome.trajectories.push(trajectory),
            Ok((tle, Err(error))) => {
                warn!(name = %tle.name, %error, "propagation failed for object");
                outcome.failures.push(ObjectFailure {
                    name: tle.name,
                    error,
                });
            }
            Err(join_error) => {
                warn!(error = %join_error, "propagation task failed to complete");
            }
        }
    }

    outcome
}
