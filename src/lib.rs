//! LEO orbit propagation and conjunction screening engine.
//!
//! Parses classical orbital elements from Two-Line Element (TLE) sets,
//! converts them to Cartesian state vectors, integrates forward under a
//! J2-perturbed gravity model with fixed-step RK4, samples geodetic
//! trajectories, and screens object pairs for collisions and close
//! approaches.
//!
//! All core operations are pure functions over immutable inputs; the only
//! cross-object synchronization point is the join before proximity
//! screening.

pub mod constants;
pub mod elements;
pub mod error;
pub mod kepler;
pub mod metrics;
pub mod propagator;
pub mod proximity;
pub mod time;
pub mod tle;
pub mod trajectory;

pub use error::PropagationError;
pub use proximity::{
    check_close_approaches, pairwise_collision_check, CloseApproachEvent, CollisionAlert,
    DEFAULT_THRESHOLD_KM,
};
pub use tle::{parse_tle_text, TwoLineElementSet};
pub use trajectory::{
    propagate_batch, propagate_batch_parallel, propagate_from_tle, BatchOutcome, FinalState,
    SampledState, Trajectory,
};
