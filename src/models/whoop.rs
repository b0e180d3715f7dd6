// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP API (v2) response shapes.
//!
//! Only the fields the dashboard reads are modeled; serde ignores the rest.

use super::dashboard::{RecoverySample, SleepSample, StageBreakdown};
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// OAuth token endpoint response (both grant types).
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of the access token in seconds.
    pub expires_in: i64,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Paginated collection envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct Collection<T> {
    pub records: Vec<T>,
    #[serde(default)]
    pub next_token: Option<String>,
}

/// One physiological cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct Cycle {
    pub id: i64,
    pub created_at: DateTime<Utc>,
    pub start: DateTime<Utc>,
    /// Absent while the cycle is still in progress.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
    /// Recovery scored for this cycle, when WHOOP embeds it.
    #[serde(default)]
    pub recovery: Option<Recovery>,
}

impl Cycle {
    /// The embedded recovery as a sample, if it has been scored.
    pub fn recovery_sample(&self) -> Option<RecoverySample> {
        self.recovery.as_ref().and_then(Recovery::sample)
    }
}

/// Recovery record for a cycle.
#[derive(Debug, Clone, Deserialize)]
pub struct Recovery {
    pub cycle_id: i64,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub score_state: Option<String>,
    #[serde(default)]
    pub score: Option<RecoveryScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecoveryScore {
    pub recovery_score: f64,
    pub resting_heart_rate: f64,
    pub hrv_rmssd_milli: f64,
    #[serde(default)]
    pub user_calibrating: bool,
    #[serde(default)]
    pub spo2_percentage: Option<f64>,
    #[serde(default)]
    pub skin_temp_celsius: Option<f64>,
}

impl Recovery {
    pub fn sample(&self) -> Option<RecoverySample> {
        self.score.as_ref().map(|score| RecoverySample {
            score: score.recovery_score,
            resting_heart_rate: score.resting_heart_rate,
            hrv_milli: score.hrv_rmssd_milli,
            timestamp: self.created_at,
        })
    }
}

/// Sleep activity record.
#[derive(Debug, Clone, Deserialize)]
pub struct SleepRecord {
    pub id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    #[serde(default)]
    pub nap: bool,
    #[serde(default)]
    pub score: Option<SleepScore>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SleepScore {
    pub stage_summary: StageSummary,
    pub sleep_needed: SleepNeeded,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StageSummary {
    pub total_in_bed_time_milli: u64,
    pub total_awake_time_milli: u64,
    pub total_light_sleep_time_milli: u64,
    pub total_slow_wave_sleep_time_milli: u64,
    pub total_rem_sleep_time_milli: u64,
}

/// Components of the sleep target. The nap component is negative.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SleepNeeded {
    pub baseline_milli: i64,
    pub need_from_sleep_debt_milli: i64,
    pub need_from_recent_strain_milli: i64,
    pub need_from_recent_nap_milli: i64,
}

impl SleepNeeded {
    pub fn total_milli(&self) -> u64 {
        let total = self.baseline_milli
            + self.need_from_sleep_debt_milli
            + self.need_from_recent_strain_milli
            + self.need_from_recent_nap_milli;
        total.max(0) as u64
    }
}

impl SleepRecord {
    /// Flatten a scored sleep into a sample.
    pub fn sample(&self) -> Option<SleepSample> {
        let score = self.score.as_ref()?;
        let stages = &score.stage_summary;
        let breakdown = StageBreakdown {
            light_milli: stages.total_light_sleep_time_milli,
            slow_wave_milli: stages.total_slow_wave_sleep_time_milli,
            rem_milli: stages.total_rem_sleep_time_milli,
            awake_milli: stages.total_awake_time_milli,
        };

        Some(SleepSample {
            total_sleep_milli: breakdown.asleep_milli(),
            sleep_needed_milli: score.sleep_needed.total_milli(),
            stages: Some(breakdown),
        })
    }
}
