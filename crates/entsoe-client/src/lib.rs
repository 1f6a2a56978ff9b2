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

//! ENTSO-E Transparency Platform access: delivery windows, the REST client
//! and parsers for balancing reserve and day-ahead price documents.

pub mod client;
pub mod error;
pub mod parser;
pub mod window;

pub use client::{DEFAULT_API_URL, EntsoeClient};
pub use error::{EntsoeError, Result};
pub use window::{
    DEFAULT_CUTOFF_HOUR, TimeWindow, backfill_windows, daily_window, last_completed_cutoff,
    point_interval,
};
