// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Transient dashboard records: upstream samples and the display view.

use chrono::{DateTime, NaiveDate, Utc};

use super::whoop::Cycle;

/// Recovery reading for one cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct RecoverySample {
    /// Recovery score, 0-100
    pub score: f64,
    /// Resting heart rate (bpm)
    pub resting_heart_rate: f64,
    /// HRV rmssd (milliseconds)
    pub hrv_milli: f64,
    /// When WHOOP created the recovery record
    pub timestamp: DateTime<Utc>,
}

/// Time spent in each sleep stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageBreakdown {
    pub light_milli: u64,
    pub slow_wave_milli: u64,
    pub rem_milli: u64,
    pub awake_milli: u64,
}

impl StageBreakdown {
    pub fn asleep_milli(&self) -> u64 {
        self.light_milli + self.slow_wave_milli + self.rem_milli
    }
}

/// Most recent sleep, reduced to what the dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SleepSample {
    pub total_sleep_milli: u64,
    pub sleep_needed_milli: u64,
    pub stages: Option<StageBreakdown>,
}

/// Everything one dashboard render needs from WHOOP.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub cycle: Cycle,
    pub recovery: RecoverySample,
    /// Recent recoveries, oldest first
    pub hrv_history: Vec<RecoverySample>,
    pub sleep: SleepSample,
}

/// Recovery band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStatus {
    Well,
    Moderate,
    Under,
}

impl RecoveryStatus {
    /// Band for a score; each band includes its lower bound.
    pub fn from_score(score: f64) -> Self {
        if score >= 67.0 {
            Self::Well
        } else if score >= 34.0 {
            Self::Moderate
        } else {
            Self::Under
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Well => "Well Recovered",
            Self::Moderate => "Moderately Recovered",
            Self::Under => "Under Recovered",
        }
    }

    pub fn color_tag(self) -> &'static str {
        match self {
            Self::Well => "green",
            Self::Moderate => "yellow",
            Self::Under => "red",
        }
    }
}

/// One point of the HRV trend chart.
#[derive(Debug, Clone, PartialEq)]
pub struct HrvPoint {
    pub date: NaiveDate,
    pub value: f64,
}

/// Display-ready dashboard record.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardView {
    pub recovery_score: f64,
    pub recovery_status: RecoveryStatus,
    pub resting_heart_rate: f64,
    pub hrv_current: f64,
    /// At most seven points, chronological
    pub hrv_trend: Vec<HrvPoint>,
    pub sleep_hours_label: String,
    pub sleep_needed_label: String,
    /// Negative is a deficit, positive a surplus
    pub sleep_deficit_hours: f64,
    pub sleep_actual_milli: u64,
    pub sleep_needed_milli: u64,
    pub last_updated: DateTime<Utc>,
}
