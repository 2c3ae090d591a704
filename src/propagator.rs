//! Numerical propagation: J2-perturbed acceleration field and fixed-step
//! classical Runge-Kutta 4.

use nalgebra::Vector3;

use crate::constants::{J2, MU_EARTH, R_EARTH, STEP_TARGET_SECONDS};
use crate::elements::StateVector;

/// Unperturbed two-body gravitational acceleration (km/s²).
pub fn acceleration_two_body(r: &Vector3<f64>) -> Vector3<f64> {
    let r_norm = r.norm();
    -r * (MU_EARTH / r_norm.powi(3))
}

/// Two-body acceleration plus the J2 oblateness correction (km/s²).
///
/// Pure function of position; evaluated once per RK4 stage.
pub fn acceleration_j2(r: &Vector3<f64>) -> Vector3<f64> {
    let r_norm = r.norm();
    let a_gravity = -r * (MU_EARTH / r_norm.powi(3));

    let z2 = r.z * r.z;
    let r2 = r_norm * r_norm;
    let factor = 1.5 * J2 * MU_EARTH * (R_EARTH * R_EARTH) / r_norm.powi(5);
    let a_j2 = Vector3::new(
        r.x * (5.0 * z2 / r2 - 1.0),
        r.y * (5.0 * z2 / r2 - 1.0),
        r.z * (5.0 * z2 / r2 - 3.0),
    ) * factor;

    a_gravity + a_j2
}

/// Classical fixed-step RK4 over a caller-supplied acceleration field.
///
/// Advances `(r, v)` by total time `dt` in `steps` substeps of `dt / steps`.
/// The field is a function of position only.
pub fn propagate_rk4<F>(state: &StateVector, dt: f64, steps: usize, field: F) -> StateVector
where
    F: Fn(&Vector3<f64>) -> Vector3<f64>,
{
    let mut r = state.r;
    let mut v = state.v;
    let h = dt / steps as f64;

    for _ in 0..steps {
        let k1v = field(&r);
        let k1r = v;
        let k2v = field(&(r + k1r * (0.5 * h)));
        let k2r = v + k1v * (0.5 * h);
        let k3v = field(&(r + k2r * (0.5 * h)));
        let k3r = v + k2v * (0.5 * h);
        let k4v = field(&(r + k3r * h));
        let k4r = v + k3v * h;

        r += (k1r + k2r * 2.0 + k3r * 2.0 + k4r) * (h / 6.0);
        v += (k1v + k2v * 2.0 + k3v * 2.0 + k4v) * (h / 6.0);
    }

    StateVector { r, v }
}

/// Advance a state by `dt_seconds` under the J2-perturbed field.
///
/// Elapsed time is subdivided into roughly one substep per 10 seconds of
/// elapsed time. A zero elapsed time returns the initial state untouched
/// rather than running zero-length RK4 stages. Negative elapsed times
/// integrate backwards. There is no adaptive error control; accuracy
/// degrades when `dt` grows large relative to the orbital period.
pub fn propagate_state(state: &StateVector, dt_seconds: f64) -> StateVector {
    if dt_seconds == 0.0 {
        return *state;
    }

    let steps = (dt_seconds.abs().max(1.0) / STEP_TARGET_SECONDS)
        .floor()
        .max(1.0) as usize;
    propagate_rk4(state, dt_seconds, steps, acceleration_j2)
}
