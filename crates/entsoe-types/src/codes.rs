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

//! ENTSO-E code tables used by the balancing and day-ahead documents.

use std::fmt;

use chrono::Duration;
use serde::{Deserialize, Serialize};

// ============= Process types (balancing reserve products) =============

/// Balancing reserve product queried via `processType`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReserveType {
    /// Automatic frequency restoration reserve (A51)
    Afrr,
    /// Frequency containment reserve (A52)
    Fcr,
    /// Manual frequency restoration reserve (A47)
    Mfrr,
    /// Replacement reserve (A46)
    Rr,
}

impl ReserveType {
    /// All products in the order they are fetched
    pub const ALL: [ReserveType; 4] = [Self::Afrr, Self::Fcr, Self::Mfrr, Self::Rr];

    /// `processType` query value
    #[must_use]
    pub fn process_code(self) -> &'static str {
        match self {
            Self::Afrr => "A51",
            Self::Fcr => "A52",
            Self::Mfrr => "A47",
            Self::Rr => "A46",
        }
    }

    #[must_use]
    pub fn from_process_code(code: &str) -> Option<Self> {
        match code {
            "A51" => Some(Self::Afrr),
            "A52" => Some(Self::Fcr),
            "A47" => Some(Self::Mfrr),
            "A46" => Some(Self::Rr),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Afrr => "AFRR",
            Self::Fcr => "FCR",
            Self::Mfrr => "MFRR",
            Self::Rr => "RR",
        }
    }
}

impl fmt::Display for ReserveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============= TimeSeries attributes =============

/// `mktPSRType.psrType` of a balancing TimeSeries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReserveSource {
    Generation,
    Load,
    Mixed,
    /// Code without a mapping, stored verbatim
    Other(String),
}

impl ReserveSource {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "A04" => Self::Generation,
            "A05" => Self::Load,
            "A03" => Self::Mixed,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Generation => "Generation",
            Self::Load => "Load",
            Self::Mixed => "Mixed",
            Self::Other(code) => code,
        }
    }
}

/// `flowDirection.direction` of a balancing TimeSeries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Symmetric,
    /// Code without a mapping, stored verbatim
    Other(String),
}

impl Direction {
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "A01" => Self::Up,
            "A02" => Self::Down,
            "A03" => Self::Symmetric,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Up => "Up",
            Self::Down => "Down",
            Self::Symmetric => "Up and Down (Symmetric)",
            Self::Other(code) => code,
        }
    }
}

/// Pricing method reported for a reserve record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceType {
    Average,
    Marginal,
}

impl PriceType {
    /// One-directional products are settled on average prices; everything
    /// else (symmetric, unknown or missing direction) on marginal prices.
    #[must_use]
    pub fn for_direction(direction: Option<&Direction>) -> Self {
        match direction {
            Some(Direction::Up | Direction::Down) => Self::Average,
            Some(Direction::Symmetric | Direction::Other(_)) | None => Self::Marginal,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Average => "Average",
            Self::Marginal => "Marginal",
        }
    }
}

// ============= Resolution =============

/// Period resolution (market time unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Minutes15,
    Minutes30,
    Minutes60,
}

impl Resolution {
    /// Parse an ISO 8601 duration code as published by ENTSO-E.
    ///
    /// Anything other than `PT15M`/`PT30M` is treated as hourly.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "PT15M" => Self::Minutes15,
            "PT30M" => Self::Minutes30,
            _ => Self::Minutes60,
        }
    }

    #[must_use]
    pub fn minutes(self) -> i64 {
        match self {
            Self::Minutes15 => 15,
            Self::Minutes30 => 30,
            Self::Minutes60 => 60,
        }
    }

    #[must_use]
    pub fn duration(self) -> Duration {
        Duration::minutes(self.minutes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_code_mapping() {
        assert_eq!(ReserveType::from_process_code("A51"), Some(ReserveType::Afrr));
        assert_eq!(ReserveType::from_process_code("A52"), Some(ReserveType::Fcr));
        assert_eq!(ReserveType::from_process_code("A47"), Some(ReserveType::Mfrr));
        assert_eq!(ReserveType::from_process_code("A46"), Some(ReserveType::Rr));
        assert_eq!(ReserveType::from_process_code("A99"), None);

        for reserve in ReserveType::ALL {
            assert_eq!(
                ReserveType::from_process_code(reserve.process_code()),
                Some(reserve)
            );
        }
    }

    #[test]
    fn test_unmapped_codes_pass_through() {
        assert_eq!(ReserveSource::from_code("A04").as_str(), "Generation");
        assert_eq!(ReserveSource::from_code("B20").as_str(), "B20");
        assert_eq!(Direction::from_code("A03").as_str(), "Up and Down (Symmetric)");
        assert_eq!(Direction::from_code("Z07").as_str(), "Z07");
    }

    #[test]
    fn test_price_type_follows_direction() {
        assert_eq!(PriceType::for_direction(Some(&Direction::Up)), PriceType::Average);
        assert_eq!(PriceType::for_direction(Some(&Direction::Down)), PriceType::Average);
        assert_eq!(
            PriceType::for_direction(Some(&Direction::Symmetric)),
            PriceType::Marginal
        );
        assert_eq!(
            PriceType::for_direction(Some(&Direction::Other("A09".to_owned()))),
            PriceType::Marginal
        );
        assert_eq!(PriceType::for_direction(None), PriceType::Marginal);
    }

    #[test]
    fn test_resolution_codes() {
        assert_eq!(Resolution::from_code("PT15M").minutes(), 15);
        assert_eq!(Resolution::from_code("PT30M").minutes(), 30);
        assert_eq!(Resolution::from_code("PT60M").minutes(), 60);
        // Unknown codes fall back to hourly
        assert_eq!(Resolution::from_code("P1D"), Resolution::Minutes60);
    }
}
