//! Postgres access for prices and trading positions.
//!
//! The tables are populated by external collectors and the strategy
//! engine; everything here is a read.

use chrono::{Duration, NaiveDate};
use sqlx::PgPool;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use tracing::warn;

use crate::config::DatabaseConfig;
use crate::error::{DashboardError, Result};
use crate::model::{PositionRecord, PositionType, PriceRecord};
use crate::positions::{Holdings, order_positions};

/// Daily trading positions written by the strategy engine.
pub const POSITIONS_TABLE: &str = "tradingstrategy.dailytrading";

/// Daily price observations written by the data collectors.
pub const PRICES_TABLE: &str = "datacollection.stock_data";

/// Builds the shared connection pool from injected configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool> {
    let options = PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .database(&config.database)
        .username(&config.user)
        .password(&config.password);
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;
    Ok(pool)
}

#[derive(Debug, sqlx::FromRow)]
struct PriceRow {
    date: NaiveDate,
    ticker: String,
    close: Option<f64>,
}

#[derive(Debug, sqlx::FromRow)]
struct PositionRow {
    date: NaiveDate,
    ticker: String,
    position_type: String,
}

/// Read-only store over the price and positions tables.
#[derive(Debug, Clone)]
pub struct MarketStore {
    pool: PgPool,
}

impl MarketStore {
    /// Wraps an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool, for wiring sentiment sources off the same
    /// connection set.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Maximum available trading date, `None` on an empty table.
    pub async fn latest_trading_date(&self) -> Result<Option<NaiveDate>> {
        let query = format!(r#"SELECT MAX("Date"::date) FROM {POSITIONS_TABLE}"#);
        let row: (Option<NaiveDate>,) = sqlx::query_as(&query).fetch_one(&self.pool).await?;
        Ok(row.0)
    }

    /// All positions for one trading date, ordered by (type, ticker).
    ///
    /// Rows whose position label is unrecognized are logged and skipped.
    pub async fn positions_on(&self, date: NaiveDate) -> Result<Vec<PositionRecord>> {
        let query = format!(
            r#"SELECT DISTINCT "Date"::date AS date, "Ticker" AS ticker,
                      "Position_Type" AS position_type
               FROM {POSITIONS_TABLE}
               WHERE "Date"::date = $1
               ORDER BY "Position_Type", "Ticker""#
        );
        let rows: Vec<PositionRow> = sqlx::query_as(&query)
            .bind(date)
            .fetch_all(&self.pool)
            .await?;

        let mut positions: Vec<PositionRecord> = rows
            .into_iter()
            .filter_map(|row| match PositionType::parse(&row.position_type) {
                Some(position_type) => Some(PositionRecord {
                    date: row.date,
                    ticker: row.ticker,
                    position_type,
                }),
                None => {
                    warn!(
                        ticker = %row.ticker,
                        label = %row.position_type,
                        "skipping position with unrecognized type"
                    );
                    None
                }
            })
            .collect();
        order_positions(&mut positions);
        Ok(positions)
    }

    /// The most recent trading date together with its ordered positions.
    pub async fn latest_holdings(&self) -> Result<Option<Holdings>> {
        let Some(trading_date) = self.latest_trading_date().await? else {
            return Ok(None);
        };
        let positions = self.positions_on(trading_date).await?;
        Ok(Some(Holdings {
            trading_date,
            positions,
        }))
    }

    /// Daily closes for one ticker over an inclusive range.
    ///
    /// Rows with a null or non-numeric close are skipped.
    pub async fn fetch_prices(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        if start > end {
            return Err(DashboardError::InvalidDateRange { start, end });
        }
        let query = format!(
            r#"SELECT "Date"::date AS date, "Ticker" AS ticker, "Close"::float8 AS close
               FROM {PRICES_TABLE}
               WHERE "Ticker" = $1 AND "Date"::date >= $2 AND "Date"::date <= $3
               ORDER BY "Date"::date"#
        );
        let rows: Vec<PriceRow> = sqlx::query_as(&query)
            .bind(ticker)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .filter_map(|row| {
                row.close.map(|close| PriceRecord {
                    date: row.date,
                    ticker: row.ticker,
                    close,
                })
            })
            .collect())
    }

    /// Daily closes over the trailing year ending at `today`.
    pub async fn fetch_prices_trailing_year(
        &self,
        ticker: &str,
        today: NaiveDate,
    ) -> Result<Vec<PriceRecord>> {
        self.fetch_prices(ticker, today - Duration::days(365), today)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn inverted_price_range_is_rejected() {
        let pool = PgPool::connect_lazy("postgres://postgres@localhost/quant").unwrap();
        let store = MarketStore::new(pool);
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let err = store.fetch_prices("AAPL", start, end).await.unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDateRange { .. }));
    }
}
