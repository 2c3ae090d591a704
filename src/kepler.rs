//! Newton iteration for Kepler's equation.

use tracing::warn;

use crate::metrics;

/// Convergence tolerance on the eccentric anomaly update (rad)
pub const KEPLER_TOLERANCE: f64 = 1e-10;

/// Iteration cap for the Newton loop
pub const KEPLER_MAX_ITERATIONS: u32 = 1000;

/// Outcome of a Kepler solve.
///
/// The solver never fails: when the iteration cap is exhausted, the last
/// iterate is returned with `converged` cleared so callers can decide how to
/// treat the result.
#[derive(Debug, Clone, Copy)]
pub struct KeplerSolution {
    pub eccentric_anomaly: f64,
    pub converged: bool,
    pub iterations: u32,
}

/// Solve `E - e*sin(E) = M` for the eccentric anomaly `E`.
///
/// Initial guess is `M` itself for `e < 0.8` and `pi` for high-eccentricity
/// orbits, the standard bootstrap that keeps Newton steps inside the basin of
/// convergence.
pub fn solve_kepler(mean_anomaly: f64, eccentricity: f64) -> KeplerSolution {
    let mut e_anom = if eccentricity < 0.8 {
        mean_anomaly
    } else {
        std::f64::consts::PI
    };

    for iteration in 1..=KEPLER_MAX_ITERATIONS {
        let f = e_anom - eccentricity * e_anom.sin() - mean_anomaly;
        let fp = 1.0 - eccentricity * e_anom.cos();
        let de = -f / fp;
        e_anom += de;

        if de.abs() < KEPLER_TOLERANCE {
            return KeplerSolution {
                eccentric_anomaly: e_anom,
                converged: true,
                iterations: iteration,
            };
        }
    }

    warn!(
        mean_anomaly,
        eccentricity, "Kepler iteration cap reached without convergence"
    );
    metrics::record_kepler_nonconvergence();

    KeplerSolution {
        eccentric_anomaly: e_anom,
        converged: false,
        iterations: KEPLER_MAX_ITERATIONS,
    }
}
