//! Conjunction screening.
//!
//! Two deliberately separate algorithms: an endpoint collision check over
//! final states only, and a time-aligned close-approach scan over full
//! trajectories. Their thresholds differ (strict vs inclusive) and the
//! close-approach scan reports only the first qualifying sample per pair, so
//! they must not be merged into one code path.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::metrics;
use crate::trajectory::{FinalState, SampledState, Trajectory};

/// Default screening threshold (km)
pub const DEFAULT_THRESHOLD_KM: f64 = 50.0;

/// An endpoint collision alert between two objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollisionAlert {
    pub sat1: String,
    pub sat2: String,
    pub distance_km: f64,
}

/// Position record carried inside a close-approach event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncounterPosition {
    pub r_km: [f64; 3],
    pub lat: f64,
    pub lon: f64,
    pub alt_m: f64,
}

/// A time-aligned close approach between two objects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseApproachEvent {
    pub sat1: String,
    pub sat2: String,
    pub min_distance_km: f64,
    pub timestamp: DateTime<Utc>,
    pub sample_index: usize,
    pub pos1: EncounterPosition,
    pub pos2: EncounterPosition,
}

/// Endpoint collision screen over final states only.
///
/// Tests every unordered pair once and alerts when the separation is
/// strictly below the threshold. O(n²) in object count.
pub fn pairwise_collision_check(
    states: &[FinalState],
    threshold_km: f64,
) -> Vec<CollisionAlert> {
    let mut alerts = Vec::new();

    for i in 0..states.len() {
        for j in (i + 1)..states.len() {
            let r1 = Vector3::from(states[i].r_km);
            let r2 = Vector3::from(states[j].r_km);
            let distance = (r1 - r2).norm();

            if distance < threshold_km {
                alerts.push(CollisionAlert {
                    sat1: states[i].name.clone(),
                    sat2: states[j].name.clone(),
                    distance_km: distance,
                });
            }
        }
    }

    info!(
        objects = states.len(),
        alerts = alerts.len(),
        threshold_km,
        "endpoint collision check complete"
    );
    metrics::record_proximity_events("endpoint", alerts.len());

    alerts
}

/// Time-aligned close-approach scan over full trajectories.
///
/// Walks sample indices from 0 to the shortest trajectory length and tests
/// every pair at the same index. A pair is reported once, at its first
/// sample at or under the threshold; later samples for a flagged pair are
/// skipped even when they are closer. The threshold comparison is
/// inclusive.
pub fn check_close_approaches(
    trajectories: &[Trajectory],
    threshold_km: f64,
) -> Vec<CloseApproachEvent> {
    let mut encounters = Vec::new();
    if trajectories.len() < 2 {
        return encounters;
    }

    let n_samples = trajectories
        .iter()
        .map(|t| t.samples.len())
        .min()
        .unwrap_or(0);
    let mut flagged: HashSet<(usize, usize)> = HashSet::new();

    for idx in 0..n_samples {
        for i in 0..trajectories.len() {
            for j in (i + 1)..trajectories.len() {
                if flagged.contains(&(i, j)) {
                    continue;
                }

                let s1 = &trajectories[i].samples[idx];
                let s2 = &trajectories[j].samples[idx];
                let distance = (Vector3::from(s1.r_km) - Vector3::from(s2.r_km)).norm();

                if distance <= threshold_km {
                    flagged.insert((i, j));
                    encounters.push(CloseApproachEvent {
                        sat1: trajectories[i].name.clone(),
                        sat2: trajectories[j].name.clone(),
                        min_distance_km: distance,
                        timestamp: s1.timestamp,
                        sample_index: idx,
                        pos1: encounter_position(s1),
                        pos2: encounter_position(s2),
                    });
                }
            }
        }
    }

    info!(
        objects = trajectories.len(),
        samples = n_samples,
        encounters = encounters.len(),
        threshold_km,
        "close-approach check complete"
    );
    metrics::record_proximity_events("close_approach", encounters.len());

    encounters
}

fn encounter_position(sample: &SampledState) -> EncounterPosition {
    EncounterPosition {
        r_km: sample.r_km,
        lat: sample.lat,
        lon: sample.lon,
        alt_m: sample.alt_m,
    }
}
