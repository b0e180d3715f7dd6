// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod dashboard;
pub mod token;
pub mod whoop;

pub use dashboard::{
    DashboardData, DashboardView, HrvPoint, RecoverySample, RecoveryStatus, SleepSample,
    StageBreakdown,
};
pub use token::{TokenRecord, TokenState, UserRecord};
pub use whoop::{Cycle, Recovery, SleepRecord, TokenResponse};
