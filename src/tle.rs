//! Two-Line Element parsing: fixed-column element extraction and epoch
//! recovery.
//!
//! Only the columns this engine needs are read. Lines shorter than the
//! rightmost column read, or with non-numeric content in a read column,
//! produce a format error for that object alone.

use std::f64::consts::PI;
use std::ops::Range;

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::constants::{MU_EARTH, SECONDS_PER_DAY};
use crate::elements::ClassicalElements;
use crate::error::PropagationError;

/// A raw Two-Line Element set with its object name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwoLineElementSet {
    pub name: String,
    pub line1: String,
    pub line2: String,
}

/// Where a TLE epoch came from.
///
/// Epoch parsing never fails a request: a garbled epoch field falls back to
/// the current UTC instant, and the tag keeps that substitution observable
/// instead of silently masking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpochSource {
    Parsed,
    FallbackNow,
}

/// A TLE epoch together with its provenance.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TleEpoch {
    pub datetime: DateTime<Utc>,
    pub source: EpochSource,
}

fn field<'a>(
    line: &'a str,
    range: Range<usize>,
    what: &'static str,
) -> Result<&'a str, PropagationError> {
    line.get(range)
        .ok_or_else(|| PropagationError::TleFormat(format!("line too short for {}", what)))
}

fn parse_f64(line: &str, range: Range<usize>, what: &'static str) -> Result<f64, PropagationError> {
    let raw = field(line, range, what)?.trim();
    raw.parse::<f64>()
        .map_err(|_| PropagationError::TleFormat(format!("non-numeric {}: '{}'", what, raw)))
}

/// Extract classical orbital elements from a TLE.
///
/// Line 2 columns (0-based, end exclusive): inclination [8,16), RAAN
/// [17,25), eccentricity digits [26,33) with an implied leading "0.",
/// argument of perigee [34,42), mean anomaly [43,51), mean motion [52,63).
/// Angles convert to radians, mean motion to rad/s, and the semi-major axis
/// follows from Kepler's third law.
pub fn parse_elements(tle: &TwoLineElementSet) -> Result<ClassicalElements, PropagationError> {
    let line2 = &tle.line2;

    let i = parse_f64(line2, 8..16, "inclination")?.to_radians();
    let raan = parse_f64(line2, 17..25, "RAAN")?.to_radians();

    let ecc_digits = field(line2, 26..33, "eccentricity")?.trim();
    let e = format!("0.{}", ecc_digits).parse::<f64>().map_err(|_| {
        PropagationError::TleFormat(format!("non-numeric eccentricity: '{}'", ecc_digits))
    })?;

    let argp = parse_f64(line2, 34..42, "argument of perigee")?.to_radians();
    let m = parse_f64(line2, 43..51, "mean anomaly")?.to_radians();

    let n_rev_day = parse_f64(line2, 52..63, "mean motion")?;
    let n = n_rev_day * 2.0 * PI / SECONDS_PER_DAY;
    let a = (MU_EARTH / (n * n)).cbrt();

    Ok(ClassicalElements {
        a,
        e,
        i,
        raan,
        argp,
        m,
        epoch: parse_epoch(&tle.line1),
    })
}

/// Parse the epoch from line 1 columns [18,32): two-digit year plus
/// fractional day-of-year. Pivot year 57: `yy >= 57` means the 1900s.
///
/// Any parse failure falls back to the current UTC instant, tagged as
/// [`EpochSource::FallbackNow`].
pub fn parse_epoch(line1: &str) -> TleEpoch {
    match try_parse_epoch(line1) {
        Some(datetime) => TleEpoch {
            datetime,
            source: EpochSource::Parsed,
        },
        None => {
            warn!("TLE epoch field unparseable, substituting current UTC time");
            TleEpoch {
                datetime: Utc::now(),
                source: EpochSource::FallbackNow,
            }
        }
    }
}

fn try_parse_epoch(line1: &str) -> Option<DateTime<Utc>> {
    let raw = line1.get(18..32)?.trim();
    let yy: i32 = raw.get(0..2)?.parse().ok()?;
    let year = if yy >= 57 { 1900 + yy } else { 2000 + yy };

    let doy: f64 = raw.get(2..)?.parse().ok()?;
    if !doy.is_finite() {
        return None;
    }
    let day = doy.trunc() as i64;
    let frac_day = doy - doy.trunc();

    let jan1 = Utc.with_ymd_and_hms(year, 1, 1, 0, 0, 0).single()?;
    Some(
        jan1 + Duration::days(day - 1)
            + Duration::nanoseconds((frac_day * SECONDS_PER_DAY * 1e9).round() as i64),
    )
}

/// Parse multi-TLE text: three non-empty lines per object in the order
/// name, line1, line2. Blank lines are ignored.
pub fn parse_tle_text(text: &str) -> Result<Vec<TwoLineElementSet>, PropagationError> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    if lines.len() % 3 != 0 {
        return Err(PropagationError::TleFormat(
            "TLE text must contain 3 lines per object: name, line1, line2".to_string(),
        ));
    }

    Ok(lines
        .chunks(3)
        .map(|chunk| TwoLineElementSet {
            name: chunk[0].to_string(),
            line1: chunk[1].to_string(),
            line2: chunk[2].to_string(),
        })
        .collect())
}
