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

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use entsoe_client::{TimeWindow, backfill_windows, daily_window, last_completed_cutoff};
use entsoe_types::{DE_LU, GERMAN_CONTROL_AREAS};

use crate::config::RunConfig;
use crate::pipeline::MarketLoader;
use crate::state::{RunState, backfill_done, load_state, save_state};

/// Rows stored by one invocation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub backfill_days: usize,
    pub backfill_rows: usize,
    pub daily_rows: usize,
}

/// One invocation: the one-time historical backfill, then the daily load
#[derive(Debug)]
pub struct Runner<L: MarketLoader> {
    loader: L,
    state_path: PathBuf,
    backfill_start: DateTime<Utc>,
    cutoff_hour: u32,
}

impl<L: MarketLoader> Runner<L> {
    pub fn new(loader: L, config: &RunConfig) -> Self {
        Self {
            loader,
            state_path: PathBuf::from(&config.state_file),
            backfill_start: config.backfill_start_utc(),
            cutoff_hour: config.cutoff_hour,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub async fn run(&self, now: DateTime<Utc>, skip_backfill: bool) -> Result<RunSummary> {
        let mut summary = RunSummary::default();

        if skip_backfill {
            info!("Historical backfill skipped");
        } else if backfill_done(&self.state_path) {
            info!(state_file = %self.state_path.display(), "Historical backfill already completed");
        } else {
            let (days, rows) = self.backfill(now).await?;
            summary.backfill_days = days;
            summary.backfill_rows = rows;
        }

        let window = daily_window(now, self.cutoff_hour)?;
        info!(window = %window, "Loading daily data");
        summary.daily_rows = self.load_window(&window).await?;

        if backfill_done(&self.state_path) {
            let mut state = load_state(&self.state_path);
            state.last_daily_window = Some(window);
            save_state(&self.state_path, &state)?;
        }

        info!(
            backfill_days = summary.backfill_days,
            backfill_rows = summary.backfill_rows,
            daily_rows = summary.daily_rows,
            "ETL run finished"
        );
        Ok(summary)
    }

    async fn backfill(&self, now: DateTime<Utc>) -> Result<(usize, usize)> {
        let historical_end = last_completed_cutoff(now, self.cutoff_hour)?;

        match self.loader.stored_rows() {
            // An interrupted backfill restarts from the beginning
            Ok(existing) if existing > 0 => {
                warn!(rows = existing, "Balancing rows already stored, backfill may duplicate them");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %e, "Could not count stored rows before backfill"),
        }

        let windows = backfill_windows(self.backfill_start, historical_end);
        info!(
            start = %self.backfill_start,
            end = %historical_end,
            days = windows.len(),
            "Starting historical backfill"
        );

        let mut rows = 0;
        for window in &windows {
            info!("Fetching historical data for {}", window.start.date_naive());
            rows += self.load_window(window).await?;
        }

        let state = RunState {
            backfill_completed_at: Some(now),
            historical_end: Some(historical_end),
            last_daily_window: None,
        };
        save_state(&self.state_path, &state)?;
        info!(days = windows.len(), rows, "Historical backfill completed");

        Ok((windows.len(), rows))
    }

    /// Every German control area, then the DE-LU day-ahead prices
    async fn load_window(&self, window: &TimeWindow) -> Result<usize> {
        let mut rows = 0;

        for area in &GERMAN_CONTROL_AREAS {
            rows += self
                .loader
                .load_balancing(&area.country_label(), area.eic, window)
                .await?;
        }
        rows += self
            .loader
            .load_day_ahead(DE_LU.label, DE_LU.eic, window)
            .await?;

        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeZone};
    use std::sync::Mutex;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Balancing(String, TimeWindow),
        DayAhead(String, TimeWindow),
    }

    #[derive(Debug, Default)]
    struct FakeLoader {
        calls: Mutex<Vec<Call>>,
        fail_on_call: Option<usize>,
        stored: u64,
        stored_rows_fails: bool,
    }

    impl FakeLoader {
        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: Call) -> Result<usize> {
            let mut calls = self.calls.lock().unwrap();
            calls.push(call);
            if self.fail_on_call == Some(calls.len()) {
                bail!("simulated failure");
            }
            Ok(1)
        }
    }

    #[async_trait]
    impl MarketLoader for FakeLoader {
        async fn load_balancing(
            &self,
            country: &str,
            _control_area: &str,
            window: &TimeWindow,
        ) -> Result<usize> {
            self.record(Call::Balancing(country.to_owned(), *window))
        }

        async fn load_day_ahead(
            &self,
            country: &str,
            _bidding_zone: &str,
            window: &TimeWindow,
        ) -> Result<usize> {
            self.record(Call::DayAhead(country.to_owned(), *window))
        }

        fn stored_rows(&self) -> Result<u64> {
            if self.stored_rows_fails {
                bail!("database unavailable");
            }
            Ok(self.stored)
        }
    }

    fn run_config(dir: &tempfile::TempDir) -> RunConfig {
        RunConfig {
            state_file: dir
                .path()
                .join(".last_historical_run")
                .to_string_lossy()
                .into_owned(),
            backfill_start: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            cutoff_hour: 22,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 3, 21, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_first_run_backfills_then_loads_daily() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let runner = Runner::new(FakeLoader::default(), &config);

        let summary = runner.run(now(), false).await.unwrap();

        // Two full historical days plus the daily window, five loads each
        assert_eq!(summary.backfill_days, 2);
        assert_eq!(summary.backfill_rows, 10);
        assert_eq!(summary.daily_rows, 5);

        let calls = runner.loader().calls();
        assert_eq!(calls.len(), 15);
        let first_day = TimeWindow::day_from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(
            calls[0],
            Call::Balancing("Germany-TransnetBW".to_owned(), first_day)
        );
        assert_eq!(calls[4], Call::DayAhead("BZN|DE-LU".to_owned(), first_day));

        let daily = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 3, 21, 0, 0).unwrap(),
        );
        assert_eq!(calls[14], Call::DayAhead("BZN|DE-LU".to_owned(), daily));

        let state = load_state(dir.path().join(".last_historical_run").as_path());
        assert_eq!(state.historical_end, Some(daily.end));
        assert_eq!(state.last_daily_window, Some(daily));
    }

    #[tokio::test]
    async fn test_second_run_only_loads_daily() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);

        let first = Runner::new(FakeLoader::default(), &config);
        first.run(now(), false).await.unwrap();

        let second = Runner::new(FakeLoader::default(), &config);
        let summary = second
            .run(now() + chrono::Duration::days(1), false)
            .await
            .unwrap();

        assert_eq!(summary.backfill_days, 0);
        assert_eq!(second.loader().calls().len(), 5);
    }

    #[tokio::test]
    async fn test_backfill_failure_halts_run_without_marker() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let loader = FakeLoader {
            fail_on_call: Some(7),
            ..FakeLoader::default()
        };
        let runner = Runner::new(loader, &config);

        assert!(runner.run(now(), false).await.is_err());

        // Halted in the second day; the daily load never ran
        assert_eq!(runner.loader().calls().len(), 7);
        assert!(!backfill_done(dir.path().join(".last_historical_run").as_path()));
    }

    #[tokio::test]
    async fn test_skip_backfill_leaves_marker_absent() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let runner = Runner::new(FakeLoader::default(), &config);

        let summary = runner.run(now(), true).await.unwrap();

        assert_eq!(summary.backfill_days, 0);
        assert_eq!(summary.daily_rows, 5);
        assert!(!backfill_done(dir.path().join(".last_historical_run").as_path()));
    }

    #[tokio::test]
    async fn test_existing_rows_do_not_block_backfill() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let loader = FakeLoader {
            stored: 42,
            ..FakeLoader::default()
        };
        let runner = Runner::new(loader, &config);

        let summary = runner.run(now(), false).await.unwrap();
        assert_eq!(summary.backfill_days, 2);
    }

    #[tokio::test]
    async fn test_row_count_failure_does_not_block_backfill() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let loader = FakeLoader {
            stored_rows_fails: true,
            ..FakeLoader::default()
        };
        let runner = Runner::new(loader, &config);

        let summary = runner.run(now(), false).await.unwrap();
        assert_eq!(summary.backfill_days, 2);
        assert_eq!(runner.loader().calls().len(), 15);
    }

    #[tokio::test]
    async fn test_run_before_cutoff_uses_previous_day() {
        let dir = tempfile::tempdir().unwrap();
        let config = run_config(&dir);
        let runner = Runner::new(FakeLoader::default(), &config);

        // 20:00 UTC is 21:00 Berlin, before the cutoff
        let early = Utc.with_ymd_and_hms(2024, 1, 3, 20, 0, 0).unwrap();
        let summary = runner.run(early, false).await.unwrap();

        // Historical end 2024-01-02 21:00Z leaves one full day
        assert_eq!(summary.backfill_days, 1);
        let calls = runner.loader().calls();
        let expected = TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 21, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 2, 21, 0, 0).unwrap(),
        );
        assert_eq!(
            calls.last(),
            Some(&Call::DayAhead("BZN|DE-LU".to_owned(), expected))
        );
    }
}
