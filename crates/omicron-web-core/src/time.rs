//! Time normalization.
//!
//! Converts a [`TimeSpec`] into a [`Target`]: either a canonical
//! [`ResolvedTime`] bucket or a pointer into the latest index.
//!
//! # GPS timestamps
//!
//! Raw timestamps count seconds since the GPS epoch (1980-01-06T00:00:00 UTC).
//! The mapping to UTC is a fixed offset:
//!
//! ```text
//! unix = floor(gps) + gps_epoch_offset - leap_seconds
//! ```
//!
//! With the default `leap_seconds = 0` the mapping is leap-second-naive.
//! Sub-hour precision is discarded once the UTC hour is taken.
//!
//! # Example
//!
//! ```rust
//! use omicron_web_core::time::{timestamp_to_bucket, TimeConfig};
//!
//! let t = timestamp_to_bucket("1000000000", &TimeConfig::default()).unwrap();
//! assert_eq!(t.to_string(), "2011-09-14 01h");
//! ```

use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use serde::Deserialize;

use crate::clock::Clock;
use crate::error::ResolveError;
use crate::models::{ResolvedTime, TimeSpec};
use crate::preset::{resolve_preset, Target};

/// Seconds between the Unix epoch and the GPS epoch.
pub const GPS_EPOCH_OFFSET: i64 = 315_964_800;

/// Smallest raw timestamp accepted as meaningful.
pub const MIN_GPS_TIMESTAMP: f64 = 700_000_000.0;

/// Parameters of the GPS → UTC mapping.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeConfig {
    #[serde(default = "default_epoch_offset")]
    pub gps_epoch_offset: i64,
    #[serde(default)]
    pub leap_seconds: i64,
    #[serde(default = "default_min_timestamp")]
    pub min_timestamp: f64,
}

fn default_epoch_offset() -> i64 {
    GPS_EPOCH_OFFSET
}
fn default_min_timestamp() -> f64 {
    MIN_GPS_TIMESTAMP
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            gps_epoch_offset: GPS_EPOCH_OFFSET,
            leap_seconds: 0,
            min_timestamp: MIN_GPS_TIMESTAMP,
        }
    }
}

/// Normalize any time specification. Presets are answered through
/// [`resolve_preset`] using `clock`.
pub fn normalize(
    spec: &TimeSpec,
    config: &TimeConfig,
    clock: &dyn Clock,
) -> Result<Target, ResolveError> {
    match spec {
        TimeSpec::Explicit {
            year,
            month,
            day,
            hour,
            hour_is_wildcard,
        } => Ok(Target::Bucket(if *hour_is_wildcard {
            ResolvedTime::full_day(*year, *month, *day)
        } else {
            ResolvedTime::hour(*year, *month, *day, *hour)
        })),
        TimeSpec::RawTimestamp { seconds } => timestamp_to_bucket(seconds, config).map(Target::Bucket),
        TimeSpec::Preset { kind } => Ok(resolve_preset(*kind, clock)),
    }
}

/// Validate a raw GPS timestamp and map it to its UTC hour bucket.
///
/// The character filter runs before any numeric check: `"7e8"` is rejected
/// even though it would parse as a number above the threshold.
pub fn timestamp_to_bucket(raw: &str, config: &TimeConfig) -> Result<ResolvedTime, ResolveError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(ResolveError::InvalidTimestamp(
            "please specify a GPS value".to_string(),
        ));
    }
    if !raw.chars().all(|c| c.is_ascii_digit() || c == '.') {
        return Err(ResolveError::InvalidTimestamp(raw.to_string()));
    }
    let value: f64 = raw
        .parse()
        .map_err(|_| ResolveError::InvalidTimestamp(raw.to_string()))?;
    if value < config.min_timestamp {
        return Err(ResolveError::InvalidTimestamp(raw.to_string()));
    }

    let unix = (value.floor() as i64)
        .checked_add(config.gps_epoch_offset - config.leap_seconds)
        .ok_or_else(|| ResolveError::InvalidTimestamp(raw.to_string()))?;
    let utc = DateTime::from_timestamp(unix, 0)
        .ok_or_else(|| ResolveError::InvalidTimestamp(raw.to_string()))?;

    Ok(ResolvedTime::hour(
        utc.year(),
        utc.month(),
        utc.day(),
        utc.hour(),
    ))
}

/// GPS second at which `time`'s bucket starts. Inverse of
/// [`timestamp_to_bucket`] at hour granularity; full-day buckets map to
/// midnight. Returns `None` for dates that do not exist on the calendar.
pub fn bucket_start_gps(time: &ResolvedTime, config: &TimeConfig) -> Option<i64> {
    let date = NaiveDate::from_ymd_opt(time.year(), time.month(), time.day())?;
    let start = date.and_hms_opt(time.hour_of_day().unwrap_or(0), 0, 0)?;
    Some(start.and_utc().timestamp() - config.gps_epoch_offset + config.leap_seconds)
}
