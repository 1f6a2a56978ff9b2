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

//! German market areas (EIC codes)

/// Balancing responsibility zone of a TSO
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlArea {
    /// TSO name, e.g. "Amprion"
    pub tso: &'static str,
    /// EIC code used as `controlArea_Domain`
    pub eic: &'static str,
}

impl ControlArea {
    /// Country label stored with every record, e.g. "Germany-Amprion"
    #[must_use]
    pub fn country_label(&self) -> String {
        format!("Germany-{}", self.tso)
    }
}

/// Day-ahead settlement zone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BiddingZone {
    /// Label stored in the `country` column
    pub label: &'static str,
    /// EIC code used as `in_Domain`/`out_Domain`
    pub eic: &'static str,
}

pub const GERMAN_CONTROL_AREAS: [ControlArea; 4] = [
    ControlArea {
        tso: "TransnetBW",
        eic: "10YDE-ENBW-----N",
    },
    ControlArea {
        tso: "TenneT",
        eic: "10YDE-EON------1",
    },
    ControlArea {
        tso: "Amprion",
        eic: "10YDE-RWENET---I",
    },
    ControlArea {
        tso: "50Hertz",
        eic: "10YDE-VE-------2",
    },
];

/// DE-LU bidding zone
pub const DE_LU: BiddingZone = BiddingZone {
    label: "BZN|DE-LU",
    eic: "10Y1001A1001A82H",
};
