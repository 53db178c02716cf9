//! Time-axis labels and grid colouring.
//!
//! Timestamps are wall-clock times in the forecast's zone, so the "local
//! hour" of a tick is simply its naive hour. The zone is only needed when a
//! tick is compared against the current instant.

use chrono::{DateTime, Datelike, NaiveDateTime, TimeZone, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::dataset::Rgba;

const LABEL_HOUR: u32 = 12;
const HIGHLIGHT_WINDOW_MS: i64 = 30 * 60 * 1000;

/// One label per calendar day, placed at local noon; weekends upper-cased.
///
/// Output has the same length as the input; every other slot is empty.
pub fn format_labels(timestamps: &[NaiveDateTime]) -> Vec<String> {
    timestamps
        .iter()
        .map(|ts| {
            if ts.hour() != LABEL_HOUR {
                return String::new();
            }
            let label = day_label(ts);
            if is_weekend(ts.weekday()) {
                label.to_uppercase()
            } else {
                label
            }
        })
        .collect()
}

/// Short weekday and day of month, e.g. `Mon 20`.
pub fn day_label(ts: &NaiveDateTime) -> String {
    ts.format("%a %-d").to_string()
}

/// Tooltip heading, e.g. `Mon 20, 02:00 pm`.
pub fn tooltip_title(ts: &NaiveDateTime) -> String {
    ts.format("%a %-d, %I:%M %P").to_string()
}

fn is_weekend(day: Weekday) -> bool {
    matches!(day, Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridColor {
    /// Tick within half an hour of now
    Highlight,
    /// Midnight
    DayBoundary,
    /// Noon
    Noon,
    Transparent,
}

impl GridColor {
    pub fn rgba(self) -> Rgba {
        match self {
            Self::Highlight => Rgba::rgb(0xff, 0xff, 0x00),
            Self::DayBoundary => Rgba::rgb(0x66, 0x66, 0x66),
            Self::Noon => Rgba::rgb(0x33, 0x33, 0x33),
            Self::Transparent => Rgba::TRANSPARENT,
        }
    }

    pub fn is_visible(self) -> bool {
        self != Self::Transparent
    }
}

/// Grid colour for the tick at `ts`, evaluated against `now`.
///
/// The current-time highlight wins over the midnight and noon colours.
pub fn grid_color(ts: &NaiveDateTime, tz: &Tz, now: DateTime<Utc>) -> GridColor {
    // Wall-clock times skipped by a DST jump have no instant to compare.
    if let Some(instant) = tz.from_local_datetime(ts).earliest() {
        let diff_ms = (instant.with_timezone(&Utc) - now).num_milliseconds().abs();
        if diff_ms < HIGHLIGHT_WINDOW_MS {
            return GridColor::Highlight;
        }
    }

    match ts.hour() {
        0 => GridColor::DayBoundary,
        12 => GridColor::Noon,
        _ => GridColor::Transparent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn hourly(start: NaiveDateTime, n: usize) -> Vec<NaiveDateTime> {
        (0..n).map(|h| start + Duration::hours(h as i64)).collect()
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_labels_same_length_as_input() {
        let ts = hourly(at(2026, 10, 19, 0, 0), 50);
        assert_eq!(format_labels(&ts).len(), 50);
        assert!(format_labels(&[]).is_empty());
    }

    #[test]
    fn test_one_label_per_day_at_noon() {
        let ts = hourly(at(2026, 10, 18, 0, 0), 24 * 16);
        let labels = format_labels(&ts);

        let non_empty: Vec<_> = labels
            .iter()
            .enumerate()
            .filter(|(_, l)| !l.is_empty())
            .collect();
        assert_eq!(non_empty.len(), 16);
        for (i, _) in non_empty {
            assert_eq!(ts[i].hour(), 12);
        }
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(label.is_empty(), ts[i].hour() != 12);
        }
    }

    #[test]
    fn test_weekday_label_format() {
        // 2026-10-19 is a Monday.
        let labels = format_labels(&[at(2026, 10, 19, 12, 0)]);
        assert_eq!(labels, vec!["Mon 19".to_string()]);
    }

    #[test]
    fn test_weekend_labels_are_upper_cased() {
        let sat = at(2026, 10, 24, 12, 0);
        let sun = at(2026, 10, 25, 12, 0);
        let labels = format_labels(&[sat, sun]);
        assert_eq!(labels[0], "SAT 24");
        assert_eq!(labels[1], "SUN 25");
        assert_eq!(labels[0], day_label(&sat).to_uppercase());
    }

    #[test]
    fn test_tooltip_title() {
        assert_eq!(tooltip_title(&at(2026, 10, 19, 14, 0)), "Mon 19, 02:00 pm");
        assert_eq!(tooltip_title(&at(2026, 10, 24, 0, 0)), "Sat 24, 12:00 am");
    }

    #[test]
    fn test_grid_color_by_hour() {
        let tz: Tz = chrono_tz::Australia::Sydney;
        let far_away = Utc::now() + Duration::days(3650);
        assert_eq!(
            grid_color(&at(2026, 10, 19, 0, 0), &tz, far_away),
            GridColor::DayBoundary
        );
        assert_eq!(
            grid_color(&at(2026, 10, 19, 12, 0), &tz, far_away),
            GridColor::Noon
        );
        assert_eq!(
            grid_color(&at(2026, 10, 19, 7, 0), &tz, far_away),
            GridColor::Transparent
        );
    }

    #[test]
    fn test_highlight_takes_priority() {
        let tz: Tz = chrono_tz::Australia::Sydney;
        let midnight = at(2026, 10, 20, 0, 0);
        let noon = at(2026, 10, 20, 12, 0);
        let now_at = |ts: &NaiveDateTime| {
            tz.from_local_datetime(ts)
                .earliest()
                .unwrap()
                .with_timezone(&Utc)
        };

        assert_eq!(
            grid_color(&midnight, &tz, now_at(&midnight) + Duration::minutes(10)),
            GridColor::Highlight
        );
        assert_eq!(
            grid_color(&noon, &tz, now_at(&noon) - Duration::minutes(29)),
            GridColor::Highlight
        );
        assert_eq!(
            grid_color(&noon, &tz, now_at(&noon) + Duration::minutes(30)),
            GridColor::Noon
        );
    }

    #[test]
    fn test_highlight_respects_zone() {
        // 15:00 in Sydney during daylight time is 04:00 UTC.
        let tz: Tz = chrono_tz::Australia::Sydney;
        let ts = at(2026, 10, 19, 15, 0);
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 4, 5, 0).unwrap();
        assert_eq!(grid_color(&ts, &tz, now), GridColor::Highlight);

        let now = Utc.with_ymd_and_hms(2026, 10, 19, 15, 0, 0).unwrap();
        assert_eq!(grid_color(&ts, &tz, now), GridColor::Transparent);
    }
}
