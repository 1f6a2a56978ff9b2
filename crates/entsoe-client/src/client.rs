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

//! ENTSO-E Transparency Platform REST client

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, error};

use entsoe_types::{BalancingRecord, DayAheadRecord, ReserveType};

use crate::error::{EntsoeError, Result};
use crate::parser::{parse_balancing_document, parse_day_ahead_document};
use crate::window::TimeWindow;

pub const DEFAULT_API_URL: &str = "https://web-api.tp.entsoe.eu/api";

/// Amount of error body kept in [`EntsoeError::Api`]
const MAX_ERROR_BODY_CHARS: usize = 500;

#[derive(Debug, Clone)]
pub struct EntsoeClient {
    client: Client,
    base_url: String,
    security_token: String,
}

impl EntsoeClient {
    /// Client with the HTTP library's default timeouts
    pub fn new(base_url: impl Into<String>, security_token: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, security_token, None)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        security_token: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.into(),
            security_token: security_token.into(),
        })
    }

    /// Procured balancing capacity (A81/B95) of one reserve product in a control area
    pub async fn fetch_balancing(
        &self,
        reserve_type: ReserveType,
        country: &str,
        control_area: &str,
        window: &TimeWindow,
    ) -> Result<Vec<BalancingRecord>> {
        let (period_start, period_end) = window.api_bounds();
        let xml = self
            .get_document(&[
                ("documentType", "A81"),
                ("businessType", "B95"),
                ("processType", reserve_type.process_code()),
                ("Type_MarketAgreement.Type", "A01"),
                ("controlArea_Domain", control_area),
                ("periodStart", &period_start),
                ("periodEnd", &period_end),
            ])
            .await?;

        parse_balancing_document(&xml, reserve_type, country, control_area)
    }

    /// Day-ahead prices (A44) of a bidding zone
    pub async fn fetch_day_ahead(
        &self,
        bidding_zone: &str,
        country: &str,
        window: &TimeWindow,
    ) -> Result<Vec<DayAheadRecord>> {
        let (period_start, period_end) = window.api_bounds();
        let xml = self
            .get_document(&[
                ("documentType", "A44"),
                ("in_Domain", bidding_zone),
                ("out_Domain", bidding_zone),
                ("periodStart", &period_start),
                ("periodEnd", &period_end),
                ("contract_MarketAgreement.type", "A01"),
            ])
            .await?;

        parse_day_ahead_document(&xml, bidding_zone, country)
    }

    async fn get_document(&self, params: &[(&str, &str)]) -> Result<String> {
        debug!(params = ?params, "Querying ENTSO-E API");

        // Errors carry the request URL, which includes the token
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("securityToken", self.security_token.as_str())])
            .query(params)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_owned());
            let body: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
            error!(status = %status, "ENTSO-E API returned an error");
            return Err(EntsoeError::Api {
                status: status.as_u16(),
                body,
            });
        }

        response
            .text()
            .await
            .map_err(|e| EntsoeError::Http(e.without_url()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use mockito::{Matcher, Server};

    fn window() -> TimeWindow {
        let start = DateTime::parse_from_rfc3339("2024-01-01T21:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        TimeWindow::day_from(start)
    }

    const AFRR_DOC: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Balancing_MarketDocument xmlns="urn:iec62325.351:tc57wg16:451-6:balancingdocument:4:4">
    <TimeSeries>
        <mktPSRType.psrType>A04</mktPSRType.psrType>
        <flowDirection.direction>A02</flowDirection.direction>
        <Period>
            <timeInterval><start>2024-01-01T21:00Z</start></timeInterval>
            <resolution>PT15M</resolution>
            <Point><position>1</position><quantity>300</quantity><procurement_Price.amount>4.5</procurement_Price.amount></Point>
        </Period>
    </TimeSeries>
</Balancing_MarketDocument>"#;

    #[tokio::test]
    async fn test_fetch_balancing_sends_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/api".to_owned()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("securityToken".into(), "test-token".into()),
                Matcher::UrlEncoded("documentType".into(), "A81".into()),
                Matcher::UrlEncoded("businessType".into(), "B95".into()),
                Matcher::UrlEncoded("processType".into(), "A51".into()),
                Matcher::UrlEncoded("Type_MarketAgreement.Type".into(), "A01".into()),
                Matcher::UrlEncoded("controlArea_Domain".into(), "10YDE-ENBW-----N".into()),
                Matcher::UrlEncoded("periodStart".into(), "202401012200".into()),
                Matcher::UrlEncoded("periodEnd".into(), "202401022200".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "text/xml")
            .with_body(AFRR_DOC)
            .create_async()
            .await;

        let client = EntsoeClient::new(format!("{}/api", server.url()), "test-token").unwrap();
        let records = client
            .fetch_balancing(
                ReserveType::Afrr,
                "Germany-TransnetBW",
                "10YDE-ENBW-----N",
                &window(),
            )
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].reserve_type, ReserveType::Afrr);
        assert_eq!(records[0].volume, Some(300.0));
        assert_eq!(records[0].country, "Germany-TransnetBW");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_day_ahead_sends_query_parameters() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/api".to_owned()))
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("documentType".into(), "A44".into()),
                Matcher::UrlEncoded("in_Domain".into(), "10Y1001A1001A82H".into()),
                Matcher::UrlEncoded("out_Domain".into(), "10Y1001A1001A82H".into()),
                Matcher::UrlEncoded("contract_MarketAgreement.type".into(), "A01".into()),
            ]))
            .with_status(200)
            .with_body(
                r"<Publication_MarketDocument>
                    <TimeSeries><Period>
                        <timeInterval><start>2024-01-01T21:00Z</start></timeInterval>
                        <resolution>PT60M</resolution>
                        <Point><position>1</position><price.amount>61.2</price.amount></Point>
                    </Period></TimeSeries>
                </Publication_MarketDocument>",
            )
            .create_async()
            .await;

        let client = EntsoeClient::new(format!("{}/api", server.url()), "test-token").unwrap();
        let records = client
            .fetch_day_ahead("10Y1001A1001A82H", "BZN|DE-LU", &window())
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].price_eur_mwh, 61.2);

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_api_error_status_is_reported() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", Matcher::Regex("^/api".to_owned()))
            .with_status(401)
            .with_body("Unauthorized")
            .create_async()
            .await;

        let client = EntsoeClient::new(format!("{}/api", server.url()), "bad-token").unwrap();
        let result = client
            .fetch_day_ahead("10Y1001A1001A82H", "BZN|DE-LU", &window())
            .await;

        match result {
            Err(EntsoeError::Api { status, body }) => {
                assert_eq!(status, 401);
                assert_eq!(body, "Unauthorized");
            }
            other => panic!("expected API error, got {other:?}"),
        }

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transport_error_hides_token() {
        // Nothing listens on port 9 (discard)
        let client = EntsoeClient::new("http://127.0.0.1:9/api", "secret-token").unwrap();
        let err = client
            .fetch_day_ahead("10Y1001A1001A82H", "BZN|DE-LU", &window())
            .await
            .unwrap_err();

        assert!(matches!(err, EntsoeError::Http(_)));
        assert!(!err.to_string().contains("secret-token"));
    }
}
