//! Error types for the dashboard data layer.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for dashboard operations.
pub type Result<T> = std::result::Result<T, DashboardError>;

/// Errors that can occur while assembling dashboard data.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Missing required column in input data
    #[error("missing required column: {0}")]
    MissingColumn(String),

    /// Invalid date range
    #[error("invalid date range: start {start} is after end {end}")]
    InvalidDateRange {
        /// Start date of the range
        start: chrono::NaiveDate,
        /// End date of the range
        end: chrono::NaiveDate,
    },

    /// Polars DataFrame error
    #[error("DataFrame error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Database error
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// A pre-rendered chart has not been produced yet
    #[error("chart not generated yet, run the backtest first: {}", path.display())]
    ArtifactMissing {
        /// Expected location of the chart document
        path: PathBuf,
    },

    /// A chart document exists but could not be read
    #[error("failed to read chart {}: {source}", path.display())]
    ArtifactUnreadable {
        /// Location of the chart document
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// The external backtest process failed
    #[error("backtest failed: {0}")]
    Backtest(String),
}
