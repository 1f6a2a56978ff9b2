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

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use entsoe_client::EntsoeClient;
use entsoe_etl::notifications::ETL_FAILED_SUBJECT;
use entsoe_etl::{
    AlertSink, DEFAULT_CONFIG_PATH, EmailNotifier, EtlConfig, EtlPipeline, LogNotifier, Runner,
};

#[derive(Parser, Debug)]
#[command(name = "entsoe-etl")]
#[command(about = "Load German balancing reserve and day-ahead price data from ENTSO-E")]
struct Cli {
    /// TOML config file; environment variables override its values
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Run only the daily load, without the historical backfill
    #[arg(long)]
    skip_backfill: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match EtlConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = init_tracing(config.logging.file.as_deref()) {
        eprintln!("Error: {e:#}");
        return ExitCode::FAILURE;
    }

    for issue in config.validate_detailed().warnings {
        warn!("Config: {issue}");
    }

    let alerts: Arc<dyn AlertSink> = if config.email.is_configured() {
        match EmailNotifier::new(&config.email) {
            Ok(notifier) => Arc::new(notifier),
            Err(e) => {
                warn!(error = %e, "Email alerts unavailable, logging alerts instead");
                Arc::new(LogNotifier)
            }
        }
    } else {
        Arc::new(LogNotifier)
    };

    info!("Starting ENTSO-E ETL");

    match run(&config, alerts.clone(), cli.skip_backfill).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = ?e, "ETL run failed");
            if let Err(send_err) = alerts
                .send_alert(ETL_FAILED_SUBJECT, &format!("ETL run failed\n{e:#}"))
                .await
            {
                error!(error = %send_err, "Failed to send alert");
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(config: &EtlConfig, alerts: Arc<dyn AlertSink>, skip_backfill: bool) -> Result<()> {
    let client = EntsoeClient::with_timeout(
        &config.api.base_url,
        &config.api.security_token,
        config.api.timeout(),
    )
    .context("Failed to create ENTSO-E client")?;

    let pipeline = EtlPipeline::new(client, &config.database.path, alerts);
    let runner = Runner::new(pipeline, &config.run);
    runner.run(Utc::now(), skip_backfill).await?;

    Ok(())
}

fn init_tracing(log_file: Option<&str>) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("entsoe_etl=info,entsoe_client=info"));

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {path}"))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }

    Ok(())
}
