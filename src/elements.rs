//! Classical orbital elements and conversion to Cartesian state.

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::MU_EARTH;
use crate::kepler::solve_kepler;
use crate::tle::TleEpoch;

/// Eccentricity above which orbit elements are reported as degenerate
const ECCENTRICITY_WARN: f64 = 0.99;

/// Classical (Keplerian) orbital elements.
///
/// Angles in radians, semi-major axis in km. The epoch carries its own
/// provenance tag, see [`TleEpoch`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ClassicalElements {
    /// Semi-major axis (km)
    pub a: f64,
    /// Eccentricity
    pub e: f64,
    /// Inclination (rad)
    pub i: f64,
    /// Right ascension of ascending node (rad)
    pub raan: f64,
    /// Argument of perigee (rad)
    pub argp: f64,
    /// Mean anomaly at epoch (rad)
    pub m: f64,
    /// Element epoch
    pub epoch: TleEpoch,
}

/// Cartesian state vector in the ECI frame.
#[derive(Debug, Clone, Copy)]
pub struct StateVector {
    /// Position (km)
    pub r: Vector3<f64>,
    /// Velocity (km/s)
    pub v: Vector3<f64>,
}

/// Convert classical elements to an ECI state vector.
///
/// Solves Kepler's equation for the eccentric anomaly, builds the perifocal
/// position and velocity, and rotates through `R3(raan) * R1(i) * R3(argp)`
/// into the inertial frame. Returns the state and the true anomaly.
///
/// Degenerate element sets (near-parabolic eccentricity, non-positive
/// semi-major axis) are logged and passed through unguarded; the caller gets
/// whatever the arithmetic produces.
pub fn coe_to_rv(coe: &ClassicalElements) -> (StateVector, f64) {
    if coe.e >= ECCENTRICITY_WARN || coe.a <= 0.0 {
        warn!(
            a_km = coe.a,
            e = coe.e,
            "degenerate orbit elements, results may be unreliable"
        );
    }

    let sol = solve_kepler(coe.m, coe.e);
    let e_anom = sol.eccentric_anomaly;

    let nu = 2.0
        * ((1.0 + coe.e).sqrt() * (e_anom / 2.0).sin())
            .atan2((1.0 - coe.e).sqrt() * (e_anom / 2.0).cos());

    let b_over_a = (1.0 - coe.e * coe.e).sqrt();
    let r_pf = Vector3::new(
        coe.a * (e_anom.cos() - coe.e),
        coe.a * b_over_a * e_anom.sin(),
        0.0,
    );
    let r_norm = r_pf.norm();
    let v_pf = Vector3::new(-e_anom.sin(), b_over_a * e_anom.cos(), 0.0)
        * ((MU_EARTH * coe.a).sqrt() / r_norm);

    let (sin_o, cos_o) = coe.raan.sin_cos();
    let (sin_i, cos_i) = coe.i.sin_cos();
    let (sin_w, cos_w) = coe.argp.sin_cos();

    let r3_raan = Matrix3::new(
        cos_o, -sin_o, 0.0, //
        sin_o, cos_o, 0.0, //
        0.0, 0.0, 1.0,
    );
    let r1_inc = Matrix3::new(
        1.0, 0.0, 0.0, //
        0.0, cos_i, -sin_i, //
        0.0, sin_i, cos_i,
    );
    let r3_argp = Matrix3::new(
        cos_w, -sin_w, 0.0, //
        sin_w, cos_w, 0.0, //
        0.0, 0.0, 1.0,
    );
    let q = r3_raan * r1_inc * r3_argp;

    (
        StateVector {
            r: q * r_pf,
            v: q * v_pf,
        },
        nu,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tle::{EpochSource, TleEpoch};
    use chrono::{TimeZone, Utc};

    const TAU: f64 = std::f64::consts::TAU;

    fn elements(a: f64, e: f64, i: f64, raan: f64, argp: f64, m: f64) -> ClassicalElements {
        ClassicalElements {
            a,
            e,
            i,
            raan,
            argp,
            m,
            epoch: TleEpoch {
                datetime: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
                source: EpochSource::Parsed,
            },
        }
    }

    /// Recover (a, e, i, raan, argp) from a state vector. Test-only inverse
    /// of `coe_to_rv` for non-degenerate, non-equatorial orbits.
    fn rv_to_coe(state: &StateVector) -> (f64, f64, f64, f64, f64) {
        let r_vec = state.r;
        let v_vec = state.v;
        let r = r_vec.norm();
        let v2 = v_vec.norm_squared();

        let h = r_vec.cross(&v_vec);
        let n_vec = Vector3::new(-h.y, h.x, 0.0);
        let e_vec = (r_vec * (v2 - MU_EARTH / r) - v_vec * r_vec.dot(&v_vec)) / MU_EARTH;

        let a = 1.0 / (2.0 / r - v2 / MU_EARTH);
        let e = e_vec.norm();
        let i = (h.z / h.norm()).acos();
        let raan = n_vec.y.atan2(n_vec.x).rem_euclid(TAU);

        let mut argp = (n_vec.dot(&e_vec) / (n_vec.norm() * e)).clamp(-1.0, 1.0).acos();
        if e_vec.z < 0.0 {
            argp = TAU - argp;
        }

        (a, e, i, raan, argp)
    }

    #[test]
    fn test_circular_orbit_radius_equals_sma() {
        let coe = elements(7000.0, 0.0, 0.9, 1.2, 2.3, 0.4);
        let (state, _) = coe_to_rv(&coe);

        assert!((state.r.norm() - 7000.0).abs() < 1e-6);
        // circular speed sqrt(mu/a)
        let v_circ = (MU_EARTH / 7000.0).sqrt();
        assert!((state.v.norm() - v_circ).abs() < 1e-6);
    }

    #[test]
    fn test_true_anomaly_zero_at_perigee() {
        let coe = elements(8000.0, 0.2, 0.5, 0.0, 0.0, 0.0);
        let (state, nu) = coe_to_rv(&coe);

        assert!(nu.abs() < 1e-9);
        // perigee radius a(1 - e)
        assert!((state.r.norm() - 8000.0 * 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_rv_roundtrip_recovers_elements() {
        let coe = elements(7200.0, 0.1, 0.9, 1.2, 2.3, 0.4);
        let (state, _) = coe_to_rv(&coe);
        let (a, e, i, raan, argp) = rv_to_coe(&state);

        assert!((a - coe.a).abs() < 1e-6, "a {} vs {}", a, coe.a);
        assert!((e - coe.e).abs() < 1e-9, "e {} vs {}", e, coe.e);
        assert!((i - coe.i).abs() < 1e-9, "i {} vs {}", i, coe.i);
        assert!((raan - coe.raan).abs() < 1e-9, "raan {} vs {}", raan, coe.raan);
        assert!((argp - coe.argp).abs() < 1e-8, "argp {} vs {}", argp, coe.argp);
    }

    #[test]
    fn test_rv_roundtrip_high_eccentricity() {
        let coe = elements(12000.0, 0.85, 1.5, 0.3, 4.0, 2.0);
        let (state, _) = coe_to_rv(&coe);
        let (a, e, i, raan, argp) = rv_to_coe(&state);

        assert!((a - coe.a).abs() < 1e-5);
        assert!((e - coe.e).abs() < 1e-8);
        assert!((i - coe.i).abs() < 1e-9);
        assert!((raan - coe.raan).abs() < 1e-9);
        assert!((argp - coe.argp).abs() < 1e-7);
    }

    #[test]
    fn test_degenerate_eccentricity_does_not_panic() {
        let coe = elements(7000.0, 0.999, 0.9, 1.2, 2.3, 0.4);
        let (state, _) = coe_to_rv(&coe);
        assert!(state.r.norm().is_finite());
    }
}
