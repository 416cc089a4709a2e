#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/sentiboard/sentiboard/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod artifact;
pub mod backtest;
pub mod company;
pub mod config;
pub mod db;
pub mod error;
pub mod join;
pub mod model;
pub mod positions;
pub mod reconcile;
pub mod source;

// Re-export core types
pub use artifact::{ChartKind, load_chart};
pub use config::{ArtifactConfig, BacktestConfig, DashboardConfig, DatabaseConfig};
pub use db::MarketStore;
pub use error::{DashboardError, Result};
pub use join::join_with_returns;
pub use model::{
    FeatureSet, IntentSentiment, PositionRecord, PositionType, PriceRecord, SentimentRecord,
};
pub use positions::{Holdings, sentiment_reference_date};
pub use reconcile::Reconciler;
pub use source::{PgSentimentSource, SOURCE_TABLES, SentimentSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
