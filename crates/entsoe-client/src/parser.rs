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

//! XML document parsing for balancing (A81) and day-ahead (A44) documents.
//!
//! Documents are namespaced with a schema-version specific URN, so the
//! namespace is taken from the root element instead of being hardcoded.

use chrono::{DateTime, NaiveDateTime, Utc};
use roxmltree::{Document, Node};
use tracing::{debug, info};

use entsoe_types::{
    BalancingRecord, DayAheadRecord, Direction, PriceType, ReserveSource, ReserveType, Resolution,
    TIME_HORIZON, TYPE_OF_PRODUCT,
};

use crate::error::{EntsoeError, Result};
use crate::window::point_interval;

/// Root element of the "no data" / rejection answer
const ACKNOWLEDGEMENT_ROOT: &str = "Acknowledgement_MarketDocument";

/// Parse a balancing reserve document into records for one control area
pub fn parse_balancing_document(
    xml: &str,
    reserve_type: ReserveType,
    country: &str,
    control_area: &str,
) -> Result<Vec<BalancingRecord>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let ns = root.tag_name().namespace();

    if is_acknowledgement(root, ns) {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();

    for series in root.descendants().filter(|n| is_named(*n, ns, "TimeSeries")) {
        let reserve_source =
            child_text(series, ns, "mktPSRType.psrType").map(ReserveSource::from_code);
        let direction = child_text(series, ns, "flowDirection.direction").map(Direction::from_code);
        let price_type = PriceType::for_direction(direction.as_ref());

        for period in children(series, ns, "Period") {
            let header = PeriodHeader::read(period, ns)?;

            for point in children(period, ns, "Point") {
                let position = match child_text(point, ns, "position") {
                    Some(raw) => parse_position(raw)?,
                    None => 1,
                };
                let interval = point_interval(header.start, header.resolution, position)?;

                records.push(BalancingRecord {
                    delivery_period: interval.delivery_period(),
                    reserve_type,
                    reserve_source: reserve_source.clone(),
                    direction: direction.clone(),
                    volume: optional_number(point, ns, "quantity")?,
                    price: optional_number(point, ns, "procurement_Price.amount")?,
                    price_type,
                    type_of_product: TYPE_OF_PRODUCT.to_owned(),
                    time_horizon: TIME_HORIZON.to_owned(),
                    country: country.to_owned(),
                    control_area: control_area.to_owned(),
                });
            }
        }
    }

    debug!(
        reserve_type = %reserve_type,
        control_area = %control_area,
        records = records.len(),
        "Parsed balancing document"
    );

    Ok(records)
}

/// Parse a day-ahead price document for one bidding zone.
///
/// Points lacking either `position` or `price.amount` are skipped.
pub fn parse_day_ahead_document(
    xml: &str,
    bidding_zone: &str,
    country: &str,
) -> Result<Vec<DayAheadRecord>> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let ns = root.tag_name().namespace();

    if is_acknowledgement(root, ns) {
        return Ok(Vec::new());
    }

    let mut records = Vec::new();

    for series in root.descendants().filter(|n| is_named(*n, ns, "TimeSeries")) {
        for period in series.descendants().filter(|n| is_named(*n, ns, "Period")) {
            let header = PeriodHeader::read(period, ns)?;

            for point in children(period, ns, "Point") {
                let (Some(raw_position), Some(raw_price)) = (
                    child_text(point, ns, "position"),
                    child_text(point, ns, "price.amount"),
                ) else {
                    continue;
                };

                let position = parse_position(raw_position)?;
                let price_eur_mwh = parse_number("price.amount", raw_price)?;
                let interval = point_interval(header.start, header.resolution, position)?;

                records.push(DayAheadRecord {
                    delivery_period: interval.delivery_period(),
                    price_eur_mwh,
                    resolution: header.resolution_code.to_owned(),
                    bidding_zone: bidding_zone.to_owned(),
                    country: country.to_owned(),
                });
            }
        }
    }

    debug!(bidding_zone = %bidding_zone, records = records.len(), "Parsed day-ahead document");

    Ok(records)
}

/// Period start in the `YYYY-MM-DDTHH:MMZ` form used by the platform
pub fn parse_period_start(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%MZ")
        .map(|naive| naive.and_utc())
        .or_else(|_| DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc)))
        .map_err(|_| EntsoeError::InvalidTimestamp(raw.to_owned()))
}

struct PeriodHeader<'a> {
    start: DateTime<Utc>,
    resolution: Resolution,
    resolution_code: &'a str,
}

impl<'a> PeriodHeader<'a> {
    fn read(period: Node<'a, '_>, ns: Option<&str>) -> Result<Self> {
        let start = children(period, ns, "timeInterval")
            .next()
            .and_then(|interval| child_text(interval, ns, "start"))
            .ok_or(EntsoeError::MissingElement("timeInterval/start"))?;
        let resolution_code =
            child_text(period, ns, "resolution").ok_or(EntsoeError::MissingElement("resolution"))?;

        Ok(Self {
            start: parse_period_start(start)?,
            resolution: Resolution::from_code(resolution_code),
            resolution_code,
        })
    }
}

fn is_acknowledgement(root: Node<'_, '_>, ns: Option<&str>) -> bool {
    if root.tag_name().name() != ACKNOWLEDGEMENT_ROOT {
        return false;
    }

    let reason = root
        .descendants()
        .find(|n| is_named(*n, ns, "Reason"))
        .and_then(|reason| child_text(reason, ns, "text"))
        .unwrap_or("no reason given");
    info!(reason = %reason, "API answered with an acknowledgement document");

    true
}

fn is_named(node: Node<'_, '_>, ns: Option<&str>, name: &str) -> bool {
    node.is_element() && node.tag_name().name() == name && node.tag_name().namespace() == ns
}

fn children<'a, 'input>(
    node: Node<'a, 'input>,
    ns: Option<&str>,
    name: &str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(move |n| is_named(*n, ns, name))
}

fn child_text<'a>(node: Node<'a, '_>, ns: Option<&str>, name: &str) -> Option<&'a str> {
    children(node, ns, name)
        .next()
        .and_then(|child| child.text())
        .map(str::trim)
}

fn parse_position(raw: &str) -> Result<u32> {
    raw.parse().map_err(|_| EntsoeError::InvalidNumber {
        element: "position",
        value: raw.to_owned(),
    })
}

fn parse_number(element: &'static str, raw: &str) -> Result<f64> {
    raw.parse().map_err(|_| EntsoeError::InvalidNumber {
        element,
        value: raw.to_owned(),
    })
}

fn optional_number(node: Node<'_, '_>, ns: Option<&str>, name: &'static str) -> Result<Option<f64>> {
    child_text(node, ns, name)
        .map(|raw| parse_number(name, raw))
        .transpose()
}
