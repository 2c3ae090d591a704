//! End-to-end pipeline tests: TLE text in, trajectories and proximity
//! events out.

use leo_propagation::proximity::{check_close_approaches, pairwise_collision_check};
use leo_propagation::tle::parse_tle_text;
use leo_propagation::trajectory::{propagate_batch, propagate_batch_parallel};
use leo_propagation::PropagationError;

const ISS_LINE1: &str = "1 25544U 98067A   24001.50000000  .00016717  00000-0  10270-3 0  9025";
const ISS_LINE2: &str = "2 25544  51.6400 208.9163 0006703 130.5360 325.0288 15.50377579999999";

// Same orbit as the ISS but phased half a revolution ahead in mean anomaly
const PHASED_LINE2: &str =
    "2 25544  51.6400 208.9163 0006703 130.5360 145.0288 15.50377579999999";

fn tle_text() -> String {
    format!(
        "ALPHA\n{}\n{}\nBRAVO\n{}\n{}\n",
        ISS_LINE1, ISS_LINE2, ISS_LINE1, ISS_LINE2
    )
}

#[test]
fn test_full_pipeline_flags_coincident_objects() {
    // two objects on the identical orbit coincide at every sample
    let tles = parse_tle_text(&tle_text()).unwrap();
    let outcome = propagate_batch(&tles, 600.0, 20);

    assert_eq!(outcome.trajectories.len(), 2);
    assert!(outcome.failures.is_empty());

    let final_states: Vec<_> = outcome
        .trajectories
        .iter()
        .filter_map(|t| t.final_state())
        .collect();

    let alerts = pairwise_collision_check(&final_states, 50.0);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].sat1, "ALPHA");
    assert_eq!(alerts[0].sat2, "BRAVO");
    assert!(alerts[0].distance_km < 1e-6);

    let encounters = check_close_approaches(&outcome.trajectories, 50.0);
    assert_eq!(encounters.len(), 1, "one event per pair, first match only");
    assert_eq!(encounters[0].sample_index, 0);
}

#[test]
fn test_phased_objects_produce_no_events() {
    let text = format!(
        "ALPHA\n{}\n{}\nBRAVO\n{}\n{}\n",
        ISS_LINE1, ISS_LINE2, ISS_LINE1, PHASED_LINE2
    );
    let tles = parse_tle_text(&text).unwrap();
    let outcome = propagate_batch(&tles, 600.0, 20);

    assert_eq!(outcome.trajectories.len(), 2);

    // half an orbit apart: thousands of km of separation throughout
    let encounters = check_close_approaches(&outcome.trajectories, 50.0);
    assert!(encounters.is_empty());

    let final_states: Vec<_> = outcome
        .trajectories
        .iter()
        .filter_map(|t| t.final_state())
        .collect();
    assert!(pairwise_collision_check(&final_states, 50.0).is_empty());
}

#[test]
fn test_malformed_object_does_not_poison_batch() {
    let text = format!(
        "GOOD\n{}\n{}\nBAD\n{}\nnot a tle line\n",
        ISS_LINE1, ISS_LINE2, ISS_LINE1
    );
    let tles = parse_tle_text(&text).unwrap();
    let outcome = propagate_batch(&tles, 300.0, 10);

    assert_eq!(outcome.trajectories.len(), 1);
    assert_eq!(outcome.trajectories[0].name, "GOOD");
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].name, "BAD");
    assert!(matches!(
        outcome.failures[0].error,
        PropagationError::TleFormat(_)
    ));

    // screening proceeds over the surviving trajectory alone
    let encounters = check_close_approaches(&outcome.trajectories, 50.0);
    assert!(encounters.is_empty());
}

#[tokio::test]
async fn test_parallel_pipeline_end_to_end() {
    let tles = parse_tle_text(&tle_text()).unwrap();
    let outcome = propagate_batch_parallel(tles, 600.0, 20).await;

    assert_eq!(outcome.trajectories.len(), 2);
    let encounters = check_close_approaches(&outcome.trajectories, 50.0);
    assert_eq!(encounters.len(), 1);
}

#[test]
fn test_wire_field_names_are_stable() {
    let tles = parse_tle_text(&tle_text()).unwrap();
    let outcome = propagate_batch(&tles, 300.0, 5);

    let sample = serde_json::to_value(&outcome.trajectories[0].samples[0]).unwrap();
    for key in ["timestamp", "lat", "lon", "alt_m", "r_km", "v_km_s"] {
        assert!(sample.get(key).is_some(), "missing sample field {}", key);
    }

    let trajectory = serde_json::to_value(&outcome.trajectories[0]).unwrap();
    for key in ["id", "name", "samples"] {
        assert!(trajectory.get(key).is_some(), "missing trajectory field {}", key);
    }

    let encounters = check_close_approaches(&outcome.trajectories, 50.0);
    let event = serde_json::to_value(&encounters[0]).unwrap();
    for key in [
        "sat1",
        "sat2",
        "min_distance_km",
        "timestamp",
        "sample_index",
        "pos1",
        "pos2",
    ] {
        assert!(event.get(key).is_some(), "missing event field {}", key);
    }
    for key in ["r_km", "lat", "lon", "alt_m"] {
        assert!(event["pos1"].get(key).is_some(), "missing pos field {}", key);
    }

    let final_states: Vec<_> = outcome
        .trajectories
        .iter()
        .filter_map(|t| t.final_state())
        .collect();
    let alerts = pairwise_collision_check(&final_states, 50.0);
    let alert = serde_json::to_value(&alerts[0]).unwrap();
    for key in ["sat1", "sat2", "distance_km"] {
        assert!(alert.get(key).is_some(), "missing alert field {}", key);
    }
}
