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

//! Error types for the ENTSO-E client crate

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EntsoeError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid XML document: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("missing element <{0}>")]
    MissingElement(&'static str),

    #[error("invalid number in <{element}>: {value:?}")]
    InvalidNumber { element: &'static str, value: String },

    #[error("invalid timestamp: {0:?}")]
    InvalidTimestamp(String),

    #[error("point position {0} is out of range")]
    PositionOutOfRange(u32),

    #[error("no {hour}:00 Europe/Berlin cutoff on {date}")]
    InvalidCutoff { date: NaiveDate, hour: u32 },
}

pub type Result<T> = std::result::Result<T, EntsoeError>;
