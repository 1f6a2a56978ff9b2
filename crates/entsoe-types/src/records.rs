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

use serde::{Deserialize, Serialize};

use crate::codes::{Direction, PriceType, ReserveSource, ReserveType};

/// Product type reported for every balancing record
pub const TYPE_OF_PRODUCT: &str = "Standard";

/// Procurement horizon reported for every balancing record
pub const TIME_HORIZON: &str = "Daily";

/// One point of procured balancing reserve (row of `entsoe_load_data`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancingRecord {
    /// Delivery interval, e.g. `01.01.2024 01:00 - 01.01.2024 01:15 (UTC)`
    pub delivery_period: String,
    pub reserve_type: ReserveType,
    /// `None` when the TimeSeries carries no `mktPSRType`
    pub reserve_source: Option<ReserveSource>,
    /// `None` when the TimeSeries carries no `flowDirection`
    pub direction: Option<Direction>,
    /// Procured volume (MW)
    pub volume: Option<f64>,
    /// Procurement price (EUR/MW)
    pub price: Option<f64>,
    pub price_type: PriceType,
    pub type_of_product: String,
    pub time_horizon: String,
    /// Country label, e.g. `Germany-Amprion`
    pub country: String,
    /// EIC code of the control area
    pub control_area: String,
}

/// One day-ahead market price (row of `day_ahead_prices`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayAheadRecord {
    pub delivery_period: String,
    pub price_eur_mwh: f64,
    /// Raw resolution code of the period, e.g. `PT60M`
    pub resolution: String,
    /// EIC code of the bidding zone
    pub bidding_zone: String,
    pub country: String,
}
