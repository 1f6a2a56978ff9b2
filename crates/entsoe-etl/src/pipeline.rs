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

//! Fetch-and-store calls for one area and one time window

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::{error, info, warn};

use entsoe_client::{EntsoeClient, TimeWindow};
use entsoe_types::{BalancingRecord, ReserveType};

use crate::db::{BALANCING_TABLE, DAY_AHEAD_TABLE, Store};
use crate::notifications::{AlertSink, DAY_AHEAD_FAILED_SUBJECT, ETL_FAILED_SUBJECT};

/// One load call per area and window; returns the number of stored rows
#[async_trait]
pub trait MarketLoader: Send + Sync {
    async fn load_balancing(
        &self,
        country: &str,
        control_area: &str,
        window: &TimeWindow,
    ) -> Result<usize>;

    async fn load_day_ahead(
        &self,
        country: &str,
        bidding_zone: &str,
        window: &TimeWindow,
    ) -> Result<usize>;

    /// Balancing rows already persisted
    fn stored_rows(&self) -> Result<u64> {
        Ok(0)
    }
}

#[derive(Debug)]
pub struct EtlPipeline {
    client: EntsoeClient,
    database_path: PathBuf,
    alerts: Arc<dyn AlertSink>,
}

impl EtlPipeline {
    pub fn new(
        client: EntsoeClient,
        database_path: impl Into<PathBuf>,
        alerts: Arc<dyn AlertSink>,
    ) -> Self {
        Self {
            client,
            database_path: database_path.into(),
            alerts,
        }
    }

    /// All reserve products for one control area; failed products are skipped
    async fn collect_balancing(
        &self,
        country: &str,
        control_area: &str,
        window: &TimeWindow,
    ) -> Vec<BalancingRecord> {
        let mut records = Vec::new();

        for reserve_type in ReserveType::ALL {
            match self
                .client
                .fetch_balancing(reserve_type, country, control_area, window)
                .await
            {
                Ok(mut batch) => {
                    info!(
                        country = %country,
                        reserve_type = %reserve_type,
                        records = batch.len(),
                        "Fetched balancing data"
                    );
                    records.append(&mut batch);
                }
                Err(e) => {
                    error!(
                        country = %country,
                        reserve_type = %reserve_type,
                        error = %e,
                        "Error fetching balancing data, skipping"
                    );
                }
            }
        }

        records
    }

    async fn try_load_balancing(
        &self,
        country: &str,
        control_area: &str,
        window: &TimeWindow,
    ) -> Result<usize> {
        let records = self.collect_balancing(country, control_area, window).await;
        if records.is_empty() {
            warn!(country = %country, window = %window, "No balancing data found");
            return Ok(0);
        }

        let mut store = Store::open(&self.database_path)?;
        store.ensure_table(&BALANCING_TABLE)?;
        let inserted = store.insert_balancing(&records)?;

        info!(
            country = %country,
            window = %window,
            rows = inserted,
            "Stored balancing data"
        );
        Ok(inserted)
    }

    async fn try_load_day_ahead(
        &self,
        country: &str,
        bidding_zone: &str,
        window: &TimeWindow,
    ) -> Result<usize> {
        let records = self
            .client
            .fetch_day_ahead(bidding_zone, country, window)
            .await?;
        if records.is_empty() {
            warn!(country = %country, window = %window, "No day-ahead prices found");
            return Ok(0);
        }

        let mut store = Store::open(&self.database_path)?;
        store.ensure_table(&DAY_AHEAD_TABLE)?;
        let inserted = store.insert_day_ahead(&records)?;

        info!(
            country = %country,
            window = %window,
            rows = inserted,
            "Stored day-ahead prices"
        );
        Ok(inserted)
    }

    async fn alert(&self, subject: &str, country: &str, window: &TimeWindow, e: &anyhow::Error) {
        let body = format!("{country} {window}\n{e:#}");
        if let Err(send_err) = self.alerts.send_alert(subject, &body).await {
            error!(error = %send_err, "Failed to send alert");
        }
    }
}

#[async_trait]
impl MarketLoader for EtlPipeline {
    async fn load_balancing(
        &self,
        country: &str,
        control_area: &str,
        window: &TimeWindow,
    ) -> Result<usize> {
        match self.try_load_balancing(country, control_area, window).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                error!(country = %country, window = %window, error = ?e, "Balancing ETL failed");
                self.alert(ETL_FAILED_SUBJECT, country, window, &e).await;
                Err(e)
            }
        }
    }

    async fn load_day_ahead(
        &self,
        country: &str,
        bidding_zone: &str,
        window: &TimeWindow,
    ) -> Result<usize> {
        match self.try_load_day_ahead(country, bidding_zone, window).await {
            Ok(rows) => Ok(rows),
            Err(e) => {
                error!(country = %country, window = %window, error = ?e, "Day-ahead ETL failed");
                self.alert(DAY_AHEAD_FAILED_SUBJECT, country, window, &e).await;
                Err(e)
            }
        }
    }

    fn stored_rows(&self) -> Result<u64> {
        if !self.database_path.exists() {
            return Ok(0);
        }
        Store::open(&self.database_path)?.row_count(BALANCING_TABLE.name)
    }
}
