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

//! ENTSO-E ETL for German balancing reserves and DE-LU day-ahead prices.
//!
//! A run backfills history once (gated by a marker file), then loads the most
//! recent daily window for every German control area into SQLite.

pub mod config;
pub mod db;
pub mod notifications;
pub mod pipeline;
pub mod runner;
pub mod state;

pub use config::{DEFAULT_CONFIG_PATH, EtlConfig};
pub use notifications::{AlertSink, EmailNotifier, LogNotifier};
pub use pipeline::{EtlPipeline, MarketLoader};
pub use runner::{RunSummary, Runner};
pub use state::RunState;
