// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Turns raw WHOOP samples into the display-ready dashboard view.
//!
//! Everything here is pure; inputs are assumed well-formed.

use crate::models::{DashboardView, HrvPoint, RecoverySample, RecoveryStatus, SleepSample};
use chrono::{DateTime, Utc};

/// Number of points in the HRV trend.
pub const TREND_DAYS: usize = 7;

const MILLIS_PER_HOUR: u64 = 60 * 60 * 1000;
const MILLIS_PER_MINUTE: u64 = 60 * 1000;

/// Build the view at the current time.
pub fn build(
    recovery: &RecoverySample,
    hrv_history: &[RecoverySample],
    sleep: &SleepSample,
) -> DashboardView {
    build_at(recovery, hrv_history, sleep, Utc::now())
}

/// Build the view as of `now`.
pub fn build_at(
    recovery: &RecoverySample,
    hrv_history: &[RecoverySample],
    sleep: &SleepSample,
    now: DateTime<Utc>,
) -> DashboardView {
    DashboardView {
        recovery_score: recovery.score,
        recovery_status: RecoveryStatus::from_score(recovery.score),
        resting_heart_rate: recovery.resting_heart_rate,
        hrv_current: recovery.hrv_milli,
        hrv_trend: hrv_trend(hrv_history),
        sleep_hours_label: format_duration(sleep.total_sleep_milli),
        sleep_needed_label: format_duration(sleep.sleep_needed_milli),
        sleep_deficit_hours: sleep_deficit(sleep.total_sleep_milli, sleep.sleep_needed_milli),
        sleep_actual_milli: sleep.total_sleep_milli,
        sleep_needed_milli: sleep.sleep_needed_milli,
        last_updated: now,
    }
}

/// Last seven samples, in the order given, as dated HRV points.
pub fn hrv_trend(history: &[RecoverySample]) -> Vec<HrvPoint> {
    let skip = history.len().saturating_sub(TREND_DAYS);
    history[skip..]
        .iter()
        .map(|sample| HrvPoint {
            date: sample.timestamp.date_naive(),
            value: sample.hrv_milli,
        })
        .collect()
}

/// `"<hours>h <minutes>m"`, both truncated.
pub fn format_duration(milli: u64) -> String {
    let hours = milli / MILLIS_PER_HOUR;
    let minutes = (milli % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    format!("{}h {}m", hours, minutes)
}

/// Actual minus needed sleep in hours, rounded to one decimal.
pub fn sleep_deficit(actual_milli: u64, needed_milli: u64) -> f64 {
    let hours = (actual_milli as f64 - needed_milli as f64) / MILLIS_PER_HOUR as f64;
    let rounded = (hours * 10.0).round() / 10.0;
    // Tiny deficits round to -0.0, which would print as "-0".
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(day: u32, hrv: f64) -> RecoverySample {
        RecoverySample {
            score: 50.0,
            resting_heart_rate: 55.0,
            hrv_milli: hrv,
            timestamp: Utc.with_ymd_and_hms(2026, 10, day, 23, 30, 0).unwrap(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0h 0m");
        assert_eq!(format_duration(27_000_000), "7h 30m");
        // Truncates rather than rounds: 7h 59m 59s.
        assert_eq!(format_duration(28_799_000), "7h 59m");
        assert_eq!(format_duration(36_000_000), "10h 0m");
    }

    #[test]
    fn test_sleep_deficit() {
        assert_eq!(sleep_deficit(25_200_000, 28_800_000), -1.0);
        assert_eq!(sleep_deficit(28_800_000, 25_200_000), 1.0);
        assert_eq!(sleep_deficit(27_000_000, 28_800_000), -0.5);
        // 20 minutes short rounds to -0.3
        assert_eq!(sleep_deficit(27_600_000, 28_800_000), -0.3);
        assert_eq!(sleep_deficit(0, 0), 0.0);
        assert!(sleep_deficit(28_700_000, 28_800_000).is_sign_positive());
    }

    #[test]
    fn test_hrv_trend_keeps_last_seven_in_order() {
        let history: Vec<_> = (1..=9).map(|d| sample(d, d as f64 * 10.0)).collect();
        let trend = hrv_trend(&history);

        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].value, 30.0);
        assert_eq!(trend[6].value, 90.0);
        assert_eq!(trend[0].date.to_string(), "2026-10-03");
        assert_eq!(trend[6].date.to_string(), "2026-10-09");
    }

    #[test]
    fn test_hrv_trend_short_history_is_not_padded() {
        let history = vec![sample(1, 40.0), sample(2, 42.0)];
        assert_eq!(hrv_trend(&history).len(), 2);
        assert!(hrv_trend(&[]).is_empty());
    }

    #[test]
    fn test_hrv_trend_dates_are_utc() {
        // 23:30 at UTC-7 is the next day in UTC.
        let local = chrono::FixedOffset::west_opt(7 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, 5, 23, 30, 0)
            .unwrap();
        let history = vec![RecoverySample {
            timestamp: local.with_timezone(&Utc),
            ..sample(1, 40.0)
        }];
        assert_eq!(hrv_trend(&history)[0].date.to_string(), "2026-10-06");
    }

    #[test]
    fn test_build_at() {
        let now = Utc::now();
        let recovery = RecoverySample {
            score: 72.0,
            resting_heart_rate: 52.0,
            hrv_milli: 61.4,
            timestamp: now - Duration::hours(3),
        };
        let sleep = SleepSample {
            total_sleep_milli: 25_200_000,
            sleep_needed_milli: 28_800_000,
            stages: None,
        };

        let view = build_at(&recovery, &[recovery.clone()], &sleep, now);

        assert_eq!(view.recovery_score, 72.0);
        assert_eq!(view.recovery_status.label(), "Well Recovered");
        assert_eq!(view.recovery_status.color_tag(), "green");
        assert_eq!(view.resting_heart_rate, 52.0);
        assert_eq!(view.hrv_current, 61.4);
        assert_eq!(view.hrv_trend.len(), 1);
        assert_eq!(view.sleep_hours_label, "7h 0m");
        assert_eq!(view.sleep_needed_label, "8h 0m");
        assert_eq!(view.sleep_deficit_hours, -1.0);
        assert_eq!(view.last_updated, now);
    }
}
