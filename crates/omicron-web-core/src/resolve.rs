//! Resolution façade.
//!
//! [`Resolver::resolve`] is the single entry point used by the CLI and the
//! HTTP server. It turns a loosely typed [`Request`] into a typed
//! [`TimeSpec`], normalizes it, and queries the [`ArtifactIndex`].
//!
//! # Algorithm
//!
//! 1. `list_all_channels` set → global channel-directory listing; every other
//!    field is ignored.
//! 2. Build a [`TimeSpec`] from `mode` and normalize it.
//! 3. Channel given → redirect to its report or fail with `NotFound`.
//! 4. No channel → list the bucket's channels or fail with `NoDataForPeriod`.
//!
//! The latest presets always need a channel. Their all-channels listing is
//! [`Resolver::list_latest`].

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::clock::Clock;
use crate::error::{ErrorKind, ResolveError};
use crate::index::ArtifactIndex;
use crate::models::{ArtifactKey, ArtifactRef, ChannelName, LatestWindow, PresetKind, TimeSpec};
use crate::preset::Target;
use crate::time::{normalize, TimeConfig};

/// How the request expresses time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Date,
    #[serde(alias = "gps")]
    RawTimestamp,
    #[serde(alias = "predef")]
    Preset,
}

/// Inbound request, as received from a query string or JSON body.
///
/// Every field is optional; [`Request::time_spec`] enforces which ones the
/// chosen `mode` needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Request {
    #[serde(default, alias = "timemode")]
    pub mode: Option<Mode>,
    #[serde(default, alias = "timestampValue", alias = "gpsvalue")]
    pub timestamp_value: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub month: Option<String>,
    #[serde(default)]
    pub day: Option<String>,
    /// Hour of day, or `"all"` for the full day.
    #[serde(default)]
    pub hour: Option<String>,
    #[serde(default, alias = "presetKind", alias = "predefvalue")]
    pub preset_kind: Option<PresetKind>,
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, alias = "listAllChannels")]
    pub list_all_channels: bool,
}

/// Token selecting full-day granularity in the `hour` field.
pub const ALL_HOURS: &str = "all";

impl Request {
    pub fn date(year: &str, month: &str, day: &str, hour: &str) -> Self {
        Self {
            mode: Some(Mode::Date),
            year: Some(year.to_string()),
            month: Some(month.to_string()),
            day: Some(day.to_string()),
            hour: Some(hour.to_string()),
            ..Self::default()
        }
    }

    pub fn timestamp(value: &str) -> Self {
        Self {
            mode: Some(Mode::RawTimestamp),
            timestamp_value: Some(value.to_string()),
            ..Self::default()
        }
    }

    pub fn preset(kind: PresetKind) -> Self {
        Self {
            mode: Some(Mode::Preset),
            preset_kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn all_channels() -> Self {
        Self {
            list_all_channels: true,
            ..Self::default()
        }
    }

    pub fn with_channel(mut self, channel: &str) -> Self {
        self.channel = Some(channel.to_string());
        self
    }

    /// The typed time specification this request describes.
    pub fn time_spec(&self) -> Result<TimeSpec, ResolveError> {
        let mode = self
            .mode
            .ok_or_else(|| ResolveError::MissingRequiredField("mode".to_string()))?;
        match mode {
            Mode::Date => {
                let year = numeric_field("year", self.year.as_deref())?;
                let month = numeric_field("month", self.month.as_deref())?;
                let day = numeric_field("day", self.day.as_deref())?;
                let hour_text = self
                    .hour
                    .as_deref()
                    .map(str::trim)
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| ResolveError::MissingRequiredField("hour".to_string()))?;
                let (hour, hour_is_wildcard) = if hour_text == ALL_HOURS {
                    (0, true)
                } else {
                    (numeric_field("hour", Some(hour_text))?, false)
                };
                Ok(TimeSpec::Explicit {
                    year: year as i32,
                    month,
                    day,
                    hour,
                    hour_is_wildcard,
                })
            }
            Mode::RawTimestamp => {
                let seconds = self.timestamp_value.clone().unwrap_or_default();
                Ok(TimeSpec::RawTimestamp { seconds })
            }
            Mode::Preset => {
                let kind = self
                    .preset_kind
                    .ok_or_else(|| ResolveError::MissingRequiredField("preset_kind".to_string()))?;
                Ok(TimeSpec::Preset { kind })
            }
        }
    }

    /// The requested channel, if any. Blank values count as absent.
    pub fn channel_name(&self) -> Result<Option<ChannelName>, ResolveError> {
        match self.channel.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => ChannelName::new(name).map(Some),
        }
    }
}

fn numeric_field(name: &str, value: Option<&str>) -> Result<u32, ResolveError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ResolveError::MissingRequiredField(name.to_string()))?;
    if value.len() > 4 || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(ResolveError::MissingRequiredField(format!(
            "{} (expected digits, got '{}')",
            name, value
        )));
    }
    value
        .parse()
        .map_err(|_| ResolveError::MissingRequiredField(name.to_string()))
}

/// Result of one resolution.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    Redirect { locator: ArtifactRef },
    Listing { channels: Vec<String> },
    Failure { kind: ErrorKind, message: String },
}

impl From<ResolveError> for Outcome {
    fn from(e: ResolveError) -> Self {
        Outcome::Failure {
            kind: e.kind(),
            message: e.to_string(),
        }
    }
}

/// Resolves requests against one report hierarchy.
///
/// Holds no mutable state; share it behind an `Arc` across requests.
pub struct Resolver {
    index: ArtifactIndex,
    time: TimeConfig,
    clock: Arc<dyn Clock>,
}

impl Resolver {
    pub fn new(index: ArtifactIndex, time: TimeConfig, clock: Arc<dyn Clock>) -> Self {
        Self { index, time, clock }
    }

    pub async fn resolve(&self, request: &Request) -> Outcome {
        match self.try_resolve(request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(kind = ?e.kind(), message = %e, "request did not resolve");
                e.into()
            }
        }
    }

    /// Every channel present in the latest index for `window`.
    pub async fn list_latest(&self, window: LatestWindow) -> Outcome {
        let channels = self.index.list_latest(window).await;
        if channels.is_empty() {
            return ResolveError::NoDataForPeriod(window.describe().to_string()).into();
        }
        listing(channels)
    }

    async fn try_resolve(&self, request: &Request) -> Result<Outcome, ResolveError> {
        if request.list_all_channels {
            let channels = self.index.list_all_channel_directories().await;
            return Ok(Outcome::Listing { channels });
        }

        let spec = request.time_spec()?;
        let channel = request.channel_name()?;
        let target = normalize(&spec, &self.time, self.clock.as_ref())?;
        debug!(?target, channel = ?channel, "normalized request");

        match (target, channel) {
            (Target::Latest(window), Some(channel)) => {
                match self.index.resolve_latest(window, &channel).await {
                    Some(locator) => Ok(Outcome::Redirect { locator }),
                    None => Err(ResolveError::NotFound(format!(
                        "Channel {} is not available for {}",
                        channel,
                        window.describe()
                    ))),
                }
            }
            (Target::Latest(_), None) => {
                Err(ResolveError::MissingRequiredField("channel".to_string()))
            }
            (Target::Bucket(time), Some(channel)) => {
                let key = ArtifactKey { time, channel };
                match self.index.resolve_artifact(&key).await {
                    Some(locator) => Ok(Outcome::Redirect { locator }),
                    None => Err(ResolveError::NotFound(key.to_string())),
                }
            }
            (Target::Bucket(time), None) => {
                let channels = self.index.list_channels(&time).await;
                if channels.is_empty() {
                    return Err(ResolveError::NoDataForPeriod(time.to_string()));
                }
                Ok(listing(channels))
            }
        }
    }
}

fn listing(channels: Vec<ChannelName>) -> Outcome {
    Outcome::Listing {
        channels: channels.into_iter().map(ChannelName::into_string).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::index::DEFAULT_CHANNEL_MARKER;
    use crate::store::memory::InMemoryStore;

    fn resolver(reports: InMemoryStore, channels: InMemoryStore) -> Resolver {
        let index = ArtifactIndex::new(
            Arc::new(reports),
            Arc::new(channels),
            DEFAULT_CHANNEL_MARKER,
        );
        Resolver::new(
            index,
            TimeConfig::default(),
            Arc::new(FixedClock::from_ymd_hms(2024, 1, 2, 3, 4, 5)),
        )
    }

    fn failure(kind: ErrorKind, message: &str) -> Outcome {
        Outcome::Failure {
            kind,
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_date_full_day_redirect() {
        let r = resolver(
            InMemoryStore::with_files(["2024/03/15/h_4096Hz.html"]),
            InMemoryStore::new(),
        );
        let req = Request::date("2024", "03", "15", "all").with_channel("h_4096Hz");
        let Outcome::Redirect { locator } = r.resolve(&req).await else {
            panic!("expected redirect");
        };
        assert_eq!(locator.as_str(), "2024/03/15/h_4096Hz.html");
    }

    #[tokio::test]
    async fn test_date_full_day_not_found_message() {
        let r = resolver(InMemoryStore::new(), InMemoryStore::new());
        let req = Request::date("2024", "03", "15", "all").with_channel("h_4096Hz");
        assert_eq!(
            r.resolve(&req).await,
            failure(ErrorKind::NotFound, "h_4096Hz: 2024-03-15")
        );
    }

    #[tokio::test]
    async fn test_date_hour_uses_hour_partition() {
        let r = resolver(
            InMemoryStore::with_files(["2024/03/15/h_4096Hz.html"]),
            InMemoryStore::new(),
        );
        let req = Request::date("2024", "3", "15", "7").with_channel("h_4096Hz");
        assert_eq!(
            r.resolve(&req).await,
            failure(ErrorKind::NotFound, "h_4096Hz: 2024-03-15 07h")
        );
    }

    #[tokio::test]
    async fn test_latest_hour_missing() {
        let r = resolver(InMemoryStore::new(), InMemoryStore::new());
        let req = Request::preset(PresetKind::LatestHour).with_channel("X");
        assert_eq!(
            r.resolve(&req).await,
            failure(
                ErrorKind::NotFound,
                "Channel X is not available for the last hour"
            )
        );
    }

    #[tokio::test]
    async fn test_latest_day_redirect() {
        let r = resolver(
            InMemoryStore::with_files(["latestday/X.html"]),
            InMemoryStore::new(),
        );
        let req = Request::preset(PresetKind::LatestDay).with_channel("X");
        let Outcome::Redirect { locator } = r.resolve(&req).await else {
            panic!("expected redirect");
        };
        assert_eq!(locator.as_str(), "latestday/X.html");
    }

    #[tokio::test]
    async fn test_latest_without_channel_requires_channel() {
        let r = resolver(
            InMemoryStore::with_files(["latestday/X.html"]),
            InMemoryStore::new(),
        );
        let outcome = r.resolve(&Request::preset(PresetKind::LatestDay)).await;
        assert!(matches!(
            outcome,
            Outcome::Failure {
                kind: ErrorKind::MissingRequiredField,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_list_latest() {
        let r = resolver(
            InMemoryStore::with_files(["latestday/b.html", "latestday/a.html"]),
            InMemoryStore::new(),
        );
        assert_eq!(
            r.list_latest(LatestWindow::Day).await,
            Outcome::Listing {
                channels: vec!["a".into(), "b".into()]
            }
        );
        assert!(matches!(
            r.list_latest(LatestWindow::Hour).await,
            Outcome::Failure {
                kind: ErrorKind::NoDataForPeriod,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_today_listing_uses_clock() {
        let r = resolver(
            InMemoryStore::with_files([
                "2024/01/02/b_chan.html",
                "2024/01/02/a_chan.html",
                "2024/01/02/03/c_chan.html",
            ]),
            InMemoryStore::new(),
        );
        assert_eq!(
            r.resolve(&Request::preset(PresetKind::Today)).await,
            Outcome::Listing {
                channels: vec!["a_chan".into(), "b_chan".into()]
            }
        );
        assert_eq!(
            r.resolve(&Request::preset(PresetKind::ThisHour)).await,
            Outcome::Listing {
                channels: vec!["c_chan".into()]
            }
        );
    }

    #[tokio::test]
    async fn test_empty_bucket_is_no_data() {
        let r = resolver(InMemoryStore::new(), InMemoryStore::new());
        assert_eq!(
            r.resolve(&Request::date("2024", "03", "15", "all")).await,
            failure(
                ErrorKind::NoDataForPeriod,
                "no channel report available for 2024-03-15"
            )
        );
    }

    #[tokio::test]
    async fn test_invalid_timestamp_fails_before_lookup() {
        let r = resolver(InMemoryStore::new(), InMemoryStore::new());
        for raw in ["", "12345", "8e8", "800000000x"] {
            let outcome = r.resolve(&Request::timestamp(raw).with_channel("X")).await;
            assert!(
                matches!(
                    outcome,
                    Outcome::Failure {
                        kind: ErrorKind::InvalidTimestamp,
                        ..
                    }
                ),
                "{:?} -> {:?}",
                raw,
                outcome
            );
        }
    }

    #[tokio::test]
    async fn test_timestamp_redirect() {
        let r = resolver(
            InMemoryStore::with_files(["2011/09/14/01/h_4096Hz.html"]),
            InMemoryStore::new(),
        );
        let req = Request::timestamp("1000000000").with_channel("h_4096Hz");
        let Outcome::Redirect { locator } = r.resolve(&req).await else {
            panic!("expected redirect");
        };
        assert_eq!(locator.as_str(), "2011/09/14/01/h_4096Hz.html");
    }

    #[tokio::test]
    async fn test_all_channels_short_circuits() {
        let channels = InMemoryStore::new();
        channels.add_dir("b_chan");
        channels.add_dir("a_chan");
        channels.add_dir("nomarker");
        let r = resolver(InMemoryStore::new(), channels);

        let mut req = Request::timestamp("garbage").with_channel("../x");
        req.list_all_channels = true;
        let expected = Outcome::Listing {
            channels: vec!["a_chan".into(), "b_chan".into()],
        };
        assert_eq!(r.resolve(&req).await, expected);
        assert_eq!(r.resolve(&Request::all_channels()).await, expected);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let r = resolver(InMemoryStore::new(), InMemoryStore::new());
        let cases = [
            Request::default(),
            Request {
                mode: Some(Mode::Date),
                year: Some("2024".into()),
                month: Some("03".into()),
                ..Request::default()
            },
            Request {
                mode: Some(Mode::Preset),
                ..Request::default()
            },
            Request::date("2024", "March", "15", "all"),
        ];
        for req in cases {
            let outcome = r.resolve(&req).await;
            assert!(
                matches!(
                    outcome,
                    Outcome::Failure {
                        kind: ErrorKind::MissingRequiredField,
                        ..
                    }
                ),
                "{:?} -> {:?}",
                req,
                outcome
            );
        }
    }

    #[tokio::test]
    async fn test_path_traversal_channel_rejected() {
        let r = resolver(
            InMemoryStore::with_files(["2024/03/15/x.html"]),
            InMemoryStore::new(),
        );
        let req = Request::date("2024", "03", "15", "all").with_channel("../15/x");
        assert!(matches!(
            r.resolve(&req).await,
            Outcome::Failure {
                kind: ErrorKind::InvalidChannel,
                ..
            }
        ));
    }

    #[test]
    fn test_request_accepts_legacy_field_names() {
        let req: Request = serde_json::from_str(
            r#"{"timemode":"gps","gpsvalue":"1000000000","channel":"h_4096Hz"}"#,
        )
        .unwrap();
        assert_eq!(req.mode, Some(Mode::RawTimestamp));
        assert_eq!(
            req.time_spec().unwrap(),
            TimeSpec::RawTimestamp {
                seconds: "1000000000".into()
            }
        );

        let req: Request =
            serde_json::from_str(r#"{"mode":"preset","presetKind":"thishour"}"#).unwrap();
        assert_eq!(
            req.time_spec().unwrap(),
            TimeSpec::Preset {
                kind: PresetKind::ThisHour
            }
        );
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_value(Outcome::Failure {
            kind: ErrorKind::NotFound,
            message: "m".into(),
        })
        .unwrap();
        assert_eq!(json["outcome"], "failure");
        assert_eq!(json["kind"], "not_found");
    }
}
