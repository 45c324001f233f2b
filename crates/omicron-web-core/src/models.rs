//! Core data models used throughout the resolver.
//!
//! These types describe what a caller asks for ([`TimeSpec`]), the canonical
//! time bucket it maps to ([`ResolvedTime`]), and the key used to address a
//! single stored report ([`ArtifactKey`]).

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ResolveError;

/// Time specification as requested by a caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeSpec {
    /// An explicit calendar date; `hour` is ignored when `hour_is_wildcard`.
    Explicit {
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        hour_is_wildcard: bool,
    },
    /// A raw GPS timestamp, kept as text until it passes validation.
    RawTimestamp { seconds: String },
    /// A named shortcut.
    Preset { kind: PresetKind },
}

/// Named time shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetKind {
    LatestDay,
    LatestHour,
    ThisHour,
    Today,
}

impl PresetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LatestDay => "latestday",
            Self::LatestHour => "latesthour",
            Self::ThisHour => "thishour",
            Self::Today => "today",
        }
    }
}

impl std::str::FromStr for PresetKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latestday" => Ok(Self::LatestDay),
            "latesthour" => Ok(Self::LatestHour),
            "thishour" => Ok(Self::ThisHour),
            "today" => Ok(Self::Today),
            other => Err(format!(
                "unknown preset '{}'; expected latestday, latesthour, thishour or today",
                other
            )),
        }
    }
}

/// Width of a time bucket. Full-day and hour buckets live in disjoint
/// storage partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    FullDay,
    Hour,
}

/// Canonical time bucket used to address stored reports.
///
/// `hour` is `Some` iff `granularity` is [`Granularity::Hour`]; the
/// constructors are the only way to build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolvedTime {
    year: i32,
    month: u32,
    day: u32,
    hour: Option<u32>,
    granularity: Granularity,
}

impl ResolvedTime {
    pub fn full_day(year: i32, month: u32, day: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: None,
            granularity: Granularity::FullDay,
        }
    }

    pub fn hour(year: i32, month: u32, day: u32, hour: u32) -> Self {
        Self {
            year,
            month,
            day,
            hour: Some(hour),
            granularity: Granularity::Hour,
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn hour_of_day(&self) -> Option<u32> {
        self.hour
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Directory segments of this bucket: `YYYY/MM/DD` or `YYYY/MM/DD/HH`.
    pub fn segments(&self) -> Vec<String> {
        let mut segs = vec![
            format!("{:04}", self.year),
            format!("{:02}", self.month),
            format!("{:02}", self.day),
        ];
        if let Some(h) = self.hour {
            segs.push(format!("{:02}", h));
        }
        segs
    }
}

impl fmt::Display for ResolvedTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)?;
        if let Some(h) = self.hour {
            write!(f, " {:02}h", h)?;
        }
        Ok(())
    }
}

/// A validated channel name: non-empty, no path separators, not `.`/`..`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelName(String);

impl ChannelName {
    pub fn new(name: impl Into<String>) -> Result<Self, ResolveError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ResolveError::MissingRequiredField("channel".to_string()));
        }
        if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            return Err(ResolveError::InvalidChannel(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Address of one stored report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactKey {
    pub time: ResolvedTime,
    pub channel: ChannelName,
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.channel, self.time)
    }
}

/// Which "latest" directory to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LatestWindow {
    Day,
    Hour,
}

impl LatestWindow {
    /// Top-level directory holding this window's reports.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Day => "latestday",
            Self::Hour => "latesthour",
        }
    }

    /// Phrase used in "not available" messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::Day => "the last day",
            Self::Hour => "the last hour",
        }
    }
}

impl std::str::FromStr for LatestWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" | "latestday" => Ok(Self::Day),
            "hour" | "latesthour" => Ok(Self::Hour),
            other => Err(format!("unknown window '{}'; expected day or hour", other)),
        }
    }
}

/// Opaque locator of a stored report, relative to the report root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ArtifactRef(String);

impl ArtifactRef {
    pub fn from_segments(segments: &[String]) -> Self {
        Self(segments.join("/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_are_zero_padded() {
        let t = ResolvedTime::hour(2024, 3, 5, 7);
        assert_eq!(t.segments(), vec!["2024", "03", "05", "07"]);
        let d = ResolvedTime::full_day(2024, 3, 5);
        assert_eq!(d.segments(), vec!["2024", "03", "05"]);
    }

    #[test]
    fn test_hour_present_iff_hour_granularity() {
        let d = ResolvedTime::full_day(2024, 1, 2);
        assert_eq!(d.granularity(), Granularity::FullDay);
        assert!(d.hour_of_day().is_none());
        let h = ResolvedTime::hour(2024, 1, 2, 3);
        assert_eq!(h.granularity(), Granularity::Hour);
        assert_eq!(h.hour_of_day(), Some(3));
    }

    #[test]
    fn test_display() {
        assert_eq!(ResolvedTime::full_day(2024, 3, 15).to_string(), "2024-03-15");
        assert_eq!(ResolvedTime::hour(2024, 3, 15, 4).to_string(), "2024-03-15 04h");
    }

    #[test]
    fn test_channel_name_validation() {
        assert!(ChannelName::new("h_4096Hz").is_ok());
        assert!(matches!(
            ChannelName::new(""),
            Err(ResolveError::MissingRequiredField(_))
        ));
        assert!(matches!(
            ChannelName::new("../etc"),
            Err(ResolveError::InvalidChannel(_))
        ));
        assert!(matches!(
            ChannelName::new(".."),
            Err(ResolveError::InvalidChannel(_))
        ));
        assert!(matches!(
            ChannelName::new("a\\b"),
            Err(ResolveError::InvalidChannel(_))
        ));
    }

    #[test]
    fn test_preset_kind_parse() {
        assert_eq!("today".parse::<PresetKind>(), Ok(PresetKind::Today));
        assert_eq!("latesthour".parse::<PresetKind>(), Ok(PresetKind::LatestHour));
        assert!("yesterday".parse::<PresetKind>().is_err());
    }
}
