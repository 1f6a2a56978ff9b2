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

use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::{Connection, params};
use tracing::info;

use entsoe_types::{BalancingRecord, DayAheadRecord};

#[derive(Debug, Clone, Copy)]
pub struct ColumnDef {
    pub name: &'static str,
    pub sql_type: &'static str,
}

const fn column(name: &'static str, sql_type: &'static str) -> ColumnDef {
    ColumnDef { name, sql_type }
}

/// Table layout: created with `base_columns`, later columns are added in place
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    pub name: &'static str,
    pub base_columns: &'static [ColumnDef],
    pub added_columns: &'static [ColumnDef],
}

impl TableSchema {
    pub fn all_columns(&self) -> impl Iterator<Item = &ColumnDef> {
        self.base_columns.iter().chain(self.added_columns)
    }
}

pub const BALANCING_TABLE: TableSchema = TableSchema {
    name: "entsoe_load_data",
    base_columns: &[
        column("delivery_period", "TEXT"),
        column("reserve_type", "TEXT"),
        column("reserve_source", "TEXT"),
        column("direction", "TEXT"),
        column("volume", "REAL"),
        column("price", "REAL"),
        column("price_type", "TEXT"),
        column("type_of_product", "TEXT"),
        column("time_horizon", "TEXT"),
    ],
    added_columns: &[
        column("country", "TEXT"),
        column("control_area", "TEXT"),
        column("inserted_at", "TEXT"),
    ],
};

pub const DAY_AHEAD_TABLE: TableSchema = TableSchema {
    name: "day_ahead_prices",
    base_columns: &[
        column("delivery_period", "TEXT"),
        column("price_eur_mwh", "REAL"),
        column("resolution", "TEXT"),
        column("bidding_zone", "TEXT"),
        column("country", "TEXT"),
        column("inserted_at", "TEXT"),
    ],
    added_columns: &[],
};

// inserted_at is assigned by SQLite so every row carries the load time in UTC
const INSERT_BALANCING: &str = "INSERT INTO entsoe_load_data (
        delivery_period, reserve_type, reserve_source, direction, volume, price,
        price_type, type_of_product, time_horizon, country, control_area, inserted_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, CURRENT_TIMESTAMP)";

const INSERT_DAY_AHEAD: &str = "INSERT INTO day_ahead_prices (
        delivery_period, price_eur_mwh, resolution, bidding_zone, country, inserted_at
    ) VALUES (?1, ?2, ?3, ?4, ?5, CURRENT_TIMESTAMP)";

/// Connection to the ETL database, opened for a single fetch-and-store call
#[derive(Debug)]
pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create database directory: {}", parent.display())
            })?;
        }

        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;

        Ok(Self { conn })
    }

    /// Create the table if absent and add any schema column it lacks
    pub fn ensure_table(&self, schema: &TableSchema) -> Result<()> {
        let column_defs: Vec<String> = schema
            .base_columns
            .iter()
            .map(|c| format!("{} {}", c.name, c.sql_type))
            .collect();
        self.conn
            .execute_batch(&format!(
                "CREATE TABLE IF NOT EXISTS {} ({})",
                schema.name,
                column_defs.join(", ")
            ))
            .with_context(|| format!("Failed to create table {}", schema.name))?;

        let existing = self.table_columns(schema.name)?;
        for col in schema.all_columns() {
            if existing.iter().any(|name| name == col.name) {
                continue;
            }

            self.conn
                .execute_batch(&format!(
                    "ALTER TABLE {} ADD COLUMN {} {}",
                    schema.name, col.name, col.sql_type
                ))
                .with_context(|| format!("Failed to add column {}.{}", schema.name, col.name))?;
            info!(table = schema.name, column = col.name, "Added missing column");
        }

        Ok(())
    }

    /// Column names as reported by the SQLite catalog
    pub fn table_columns(&self, table: &str) -> Result<Vec<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM pragma_table_info(?1)")?;
        let columns = stmt
            .query_map(params![table], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(columns)
    }

    /// Rows stored in `table`; 0 when the table does not exist yet
    pub fn row_count(&self, table: &str) -> Result<u64> {
        let exists: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1)",
            params![table],
            |row| row.get(0),
        )?;
        if !exists {
            return Ok(0);
        }

        let count: u64 = self
            .conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })?;
        Ok(count)
    }

    /// Insert all records in one transaction
    pub fn insert_balancing(&mut self, records: &[BalancingRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_BALANCING)?;
            for record in records {
                stmt.execute(params![
                    record.delivery_period,
                    record.reserve_type.as_str(),
                    record.reserve_source.as_ref().map(|s| s.as_str()),
                    record.direction.as_ref().map(|d| d.as_str()),
                    record.volume,
                    record.price,
                    record.price_type.as_str(),
                    record.type_of_product,
                    record.time_horizon,
                    record.country,
                    record.control_area,
                ])
                .context("Failed to insert balancing record")?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }

    /// Insert all records in one transaction
    pub fn insert_day_ahead(&mut self, records: &[DayAheadRecord]) -> Result<usize> {
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_DAY_AHEAD)?;
            for record in records {
                stmt.execute(params![
                    record.delivery_period,
                    record.price_eur_mwh,
                    record.resolution,
                    record.bidding_zone,
                    record.country,
                ])
                .context("Failed to insert day-ahead record")?;
            }
        }
        tx.commit()?;

        Ok(records.len())
    }
}
