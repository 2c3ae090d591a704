//! Time systems: Julian date, Greenwich sidereal time, and the
//! inertial-to-geodetic conversion.

use chrono::{DateTime, Datelike, Timelike, Utc};
use nalgebra::{Matrix3, Vector3};

use crate::constants::{DAYS_PER_JULIAN_CENTURY, JD_J2000, R_EARTH};

/// Geodetic coordinates relative to a spherical Earth
#[derive(Debug, Clone, Copy)]
pub struct GeodeticCoords {
    pub lat_deg: f64,
    pub lon_deg: f64,
    pub alt_m: f64,
}

/// Julian Date for a UTC instant, fractional days included.
///
/// Standard Gregorian-calendar formula; months January and February are
/// counted as months 13 and 14 of the previous year.
pub fn julian_date(instant: DateTime<Utc>) -> f64 {
    let mut year = f64::from(instant.year());
    let mut month = f64::from(instant.month());
    let day = f64::from(instant.day());
    let hour = f64::from(instant.hour())
        + f64::from(instant.minute()) / 60.0
        + f64::from(instant.second()) / 3600.0
        + f64::from(instant.timestamp_subsec_micros()) / 3.6e9;

    if month <= 2.0 {
        year -= 1.0;
        month += 12.0;
    }

    let a = (year / 100.0).trunc();
    let b = 2.0 - a + (a / 4.0).trunc();

    (365.25 * (year + 4716.0)).trunc() + (30.6001 * (month + 1.0)).trunc() + day + b - 1524.5
        + hour / 24.0
}

/// Greenwich sidereal time in radians for a UTC instant.
///
/// IAU 1982 style polynomial in Julian centuries since J2000, normalized to
/// [0, 360) degrees before conversion.
pub fn greenwich_sidereal_time(instant: DateTime<Utc>) -> f64 {
    let jd = julian_date(instant);
    let t = (jd - JD_J2000) / DAYS_PER_JULIAN_CENTURY;
    let gst_deg = 280.46061837 + 360.98564736629 * (jd - JD_J2000) + 0.000387933 * t * t
        - t * t * t / 38710000.0;
    gst_deg.rem_euclid(360.0).to_radians()
}

/// Convert an ECI position to geodetic latitude, longitude and altitude.
///
/// Rotates into the Earth-fixed frame with a single Z-axis rotation by
/// sidereal time, then applies a spherical-Earth conversion: latitude from
/// `asin(z/|r|)`, altitude as `|r| - R_EARTH`. The spherical approximation
/// trades sub-degree latitude accuracy for simplicity; it is the known
/// accuracy limit of this engine, not a bug.
pub fn eci_to_geodetic(r_eci: &Vector3<f64>, instant: DateTime<Utc>) -> GeodeticCoords {
    let gst = greenwich_sidereal_time(instant);
    let (sin_g, cos_g) = gst.sin_cos();
    let rz = Matrix3::new(
        cos_g, sin_g, 0.0, //
        -sin_g, cos_g, 0.0, //
        0.0, 0.0, 1.0,
    );
    let r_ecef = rz * r_eci;
    let r_norm = r_ecef.norm();

    let lat = (r_ecef.z / r_norm).asin();
    let lon = r_ecef.y.atan2(r_ecef.x);

    GeodeticCoords {
        lat_deg: lat.to_degrees(),
        lon_deg: lon.to_degrees(),
        alt_m: (r_norm - R_EARTH) * 1000.0,
    }
}
