// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of FluxION.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Delivery windows and market time units.
//!
//! Daily loads are aligned to a local cutoff in `Europe/Berlin` (22:00 by
//! default), while everything stored is expressed in UTC.

use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Europe::Berlin;
use serde::{Deserialize, Serialize};

use entsoe_types::Resolution;

use crate::error::{EntsoeError, Result};

/// Local hour at which a daily window closes
pub const DEFAULT_CUTOFF_HOUR: u32 = 22;

/// Half-open interval `[start, end)` in UTC
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    #[must_use]
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// 24 hours starting at `start`
    #[must_use]
    pub fn day_from(start: DateTime<Utc>) -> Self {
        Self::new(start, start + Duration::days(1))
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `(periodStart, periodEnd)` query values
    #[must_use]
    pub fn api_bounds(&self) -> (String, String) {
        (format_api_timestamp(self.start), format_api_timestamp(self.end))
    }

    /// Label stored in the `delivery_period` column
    #[must_use]
    pub fn delivery_period(&self) -> String {
        format!(
            "{} - {} (UTC)",
            self.start.format("%d.%m.%Y %H:%M"),
            self.end.format("%d.%m.%Y %H:%M")
        )
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start, end) = self.api_bounds();
        write!(f, "{start} - {end}")
    }
}

/// `YYYYMMDDHHMM` in Berlin local time
#[must_use]
pub fn format_api_timestamp(instant: DateTime<Utc>) -> String {
    instant.with_timezone(&Berlin).format("%Y%m%d%H%M").to_string()
}

/// The cutoff instant on a given local date
pub fn cutoff_on(date: NaiveDate, hour: u32) -> Result<DateTime<Utc>> {
    date.and_hms_opt(hour, 0, 0)
        .and_then(|local| Berlin.from_local_datetime(&local).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or(EntsoeError::InvalidCutoff { date, hour })
}

/// Most recent cutoff that is not in the future relative to `now`
pub fn last_completed_cutoff(now: DateTime<Utc>, hour: u32) -> Result<DateTime<Utc>> {
    let today = now.with_timezone(&Berlin).date_naive();
    let todays_cutoff = cutoff_on(today, hour)?;
    if now >= todays_cutoff {
        return Ok(todays_cutoff);
    }

    let yesterday = today
        .pred_opt()
        .ok_or(EntsoeError::InvalidCutoff { date: today, hour })?;
    cutoff_on(yesterday, hour)
}

/// Most recent completed 24-hour window ending at the cutoff
pub fn daily_window(now: DateTime<Utc>, hour: u32) -> Result<TimeWindow> {
    let end = last_completed_cutoff(now, hour)?;
    Ok(TimeWindow::new(end - Duration::hours(24), end))
}

/// Delivery interval of the 1-based `position` inside a period
pub fn point_interval(
    period_start: DateTime<Utc>,
    resolution: Resolution,
    position: u32,
) -> Result<TimeWindow> {
    let index = position
        .checked_sub(1)
        .ok_or(EntsoeError::PositionOutOfRange(position))?;
    let step = resolution.duration();
    let offset = Duration::try_minutes(resolution.minutes() * i64::from(index))
        .ok_or(EntsoeError::PositionOutOfRange(position))?;

    let start = period_start
        .checked_add_signed(offset)
        .ok_or(EntsoeError::PositionOutOfRange(position))?;
    let end = start
        .checked_add_signed(step)
        .ok_or(EntsoeError::PositionOutOfRange(position))?;

    Ok(TimeWindow::new(start, end))
}

/// Consecutive UTC days from `start` whose window has fully elapsed by
/// `historical_end`.
#[must_use]
pub fn backfill_windows(start: DateTime<Utc>, historical_end: DateTime<Utc>) -> Vec<TimeWindow> {
    let mut windows = Vec::new();
    let mut current = start;

    while current < historical_end {
        let window = TimeWindow::day_from(current);
        if window.end > historical_end {
            break;
        }
        windows.push(window);
        current = window.end;
    }

    windows
}
