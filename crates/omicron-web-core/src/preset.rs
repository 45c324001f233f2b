//! Preset resolution.
//!
//! | Preset | Outcome |
//! |--------|---------|
//! | `latestday` | [`Target::Latest`] (`latestday/`) |
//! | `latesthour` | [`Target::Latest`] (`latesthour/`) |
//! | `thishour` | current UTC hour bucket |
//! | `today` | current UTC day bucket |

use chrono::{Datelike, Timelike};

use crate::clock::Clock;
use crate::models::{LatestWindow, PresetKind, ResolvedTime};

/// Where a time specification points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// A dated bucket in the report hierarchy.
    Bucket(ResolvedTime),
    /// The latest index; no date computation is involved.
    Latest(LatestWindow),
}

pub fn resolve_preset(kind: PresetKind, clock: &dyn Clock) -> Target {
    match kind {
        PresetKind::LatestDay => Target::Latest(LatestWindow::Day),
        PresetKind::LatestHour => Target::Latest(LatestWindow::Hour),
        PresetKind::ThisHour => {
            let now = clock.now();
            Target::Bucket(ResolvedTime::hour(
                now.year(),
                now.month(),
                now.day(),
                now.hour(),
            ))
        }
        PresetKind::Today => {
            let now = clock.now();
            Target::Bucket(ResolvedTime::full_day(now.year(), now.month(), now.day()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::models::Granularity;

    #[test]
    fn test_today_is_full_day() {
        let clock = FixedClock::from_ymd_hms(2024, 1, 2, 3, 4, 5);
        let target = resolve_preset(PresetKind::Today, &clock);
        let Target::Bucket(t) = target else {
            panic!("expected bucket, got {:?}", target);
        };
        assert_eq!(t, ResolvedTime::full_day(2024, 1, 2));
        assert_eq!(t.granularity(), Granularity::FullDay);
        assert_eq!(t.hour_of_day(), None);
    }

    #[test]
    fn test_this_hour_truncates() {
        let clock = FixedClock::from_ymd_hms(2024, 1, 2, 3, 59, 59);
        assert_eq!(
            resolve_preset(PresetKind::ThisHour, &clock),
            Target::Bucket(ResolvedTime::hour(2024, 1, 2, 3))
        );
    }

    #[test]
    fn test_latest_presets_skip_the_clock() {
        let clock = FixedClock::from_ymd_hms(2024, 1, 2, 3, 4, 5);
        assert_eq!(
            resolve_preset(PresetKind::LatestDay, &clock),
            Target::Latest(LatestWindow::Day)
        );
        assert_eq!(
            resolve_preset(PresetKind::LatestHour, &clock),
            Target::Latest(LatestWindow::Hour)
        );
    }
}
