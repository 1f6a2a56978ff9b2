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

//! Backfill marker file.
//!
//! The file's existence alone means the historical backfill finished; its
//! JSON content is informational.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use entsoe_client::TimeWindow;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    /// When the historical backfill completed
    pub backfill_completed_at: Option<DateTime<Utc>>,

    /// Exclusive end of the backfilled range
    pub historical_end: Option<DateTime<Utc>>,

    /// Most recent daily window loaded after the backfill
    pub last_daily_window: Option<TimeWindow>,
}

#[must_use]
pub fn backfill_done(path: &Path) -> bool {
    path.exists()
}

/// Read the marker; missing or unreadable content yields the default state
pub fn load_state(path: &Path) -> RunState {
    let Ok(content) = std::fs::read_to_string(path) else {
        return RunState::default();
    };

    match serde_json::from_str(&content) {
        Ok(state) => state,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Unrecognized state file content, ignoring");
            RunState::default()
        }
    }
}

pub fn save_state(path: &Path, state: &RunState) -> Result<()> {
    let temp_path = path.with_extension("tmp");
    let content = serde_json::to_string_pretty(state)?;

    // Atomic write
    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write state file: {}", temp_path.display()))?;
    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to replace state file: {}", path.display()))?;

    Ok(())
}
