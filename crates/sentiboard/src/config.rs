//! Process-wide configuration.
//!
//! Constructed once and passed by reference to every component, instead of
//! restating connection parameters at each call site. Values come from an
//! optional TOML file layered under `SENTIBOARD_`-prefixed environment
//! variables (`SENTIBOARD_DATABASE__HOST` and friends).

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Database connection parameters.
///
/// The recognized options are exactly host, port, database, user, and
/// password.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Server hostname.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database name.
    pub database: String,
    /// Role name.
    pub user: String,
    /// Role password.
    pub password: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_owned(),
            port: 5432,
            database: "quant".to_owned(),
            user: "postgres".to_owned(),
            password: String::new(),
        }
    }
}

/// Locations of the pre-rendered chart documents produced by the external
/// backtest process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// Backtest performance chart document.
    pub backtest_chart: PathBuf,
    /// Cumulative IC and rank-IC comparison chart document.
    pub ic_comparison: PathBuf,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            backtest_chart: PathBuf::from("backtest/backtest_results/backtest_chart.html"),
            ic_comparison: PathBuf::from("backtest/interactive_comparison_ic_and_rank_ic.html"),
        }
    }
}

/// External backtest trigger command.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Program to invoke.
    pub command: String,
    /// Arguments passed to the program.
    pub args: Vec<String>,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            command: "python3".to_owned(),
            args: vec!["backtest/vector_backtest.py".to_owned()],
        }
    }
}

/// Top-level dashboard configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Database connection parameters.
    pub database: DatabaseConfig,
    /// Chart artifact locations.
    pub artifacts: ArtifactConfig,
    /// Backtest trigger command.
    pub backtest: BacktestConfig,
    /// Days between a trading date and its sentiment reference date.
    ///
    /// The collectors publish with a fixed lag; 1 reproduces the T-1
    /// convention the strategy assumes.
    pub sentiment_lag_days: i64,
}

impl DashboardConfig {
    /// Loads configuration, layering the optional file under environment
    /// overrides. Missing keys fall back to defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix("SENTIBOARD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Ok(settings.try_deserialize()?)
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            artifacts: ArtifactConfig::default(),
            backtest: BacktestConfig::default(),
            sentiment_lag_days: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_use_one_day_lag() {
        let config = DashboardConfig::default();
        assert_eq!(config.sentiment_lag_days, 1);
        assert_eq!(config.database.port, 5432);
    }

    #[test]
    fn load_reads_toml_file_over_defaults() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        writeln!(
            file,
            r#"
sentiment_lag_days = 2

[database]
host = "db.internal"
port = 5555
database = "dashboard"
"#
        )
        .unwrap();

        let config = DashboardConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.database.host, "db.internal");
        assert_eq!(config.database.port, 5555);
        assert_eq!(config.database.database, "dashboard");
        assert_eq!(config.sentiment_lag_days, 2);
        // untouched sections keep their defaults
        assert_eq!(config.database.user, "postgres");
        assert_eq!(
            config.artifacts.backtest_chart,
            ArtifactConfig::default().backtest_chart
        );
    }

    #[test]
    fn load_without_file_yields_defaults() {
        let config = DashboardConfig::load(None).unwrap();
        assert_eq!(config.database.host, DatabaseConfig::default().host);
    }
}
