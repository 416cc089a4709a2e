//! Sentiment sources.
//!
//! Three independently populated tables hold sentiment observations with an
//! identical schema. They are treated as overlapping feeds behind one trait
//! so the reconciler can be exercised without a database.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::company;
use crate::error::Result;
use crate::model::{FeatureSet, RawSentimentRow};

/// The three sentiment tables, in reconciliation precedence order.
///
/// The order is static configuration: during deduplication the row from
/// the table listed later wins. It models the layered live/backfill
/// override the collectors implement, not actual data recency.
pub const SOURCE_TABLES: [&str; 3] = [
    "nlp.sentiment_aggregated_data",
    "nlp.sentiment_aggregated_live",
    "nlp.sentiment_aggregated_newdate",
];

/// A single feed of sentiment observations.
#[async_trait]
pub trait SentimentSource: Send + Sync + std::fmt::Debug {
    /// Identifier used in logs and diagnostics.
    fn name(&self) -> &str;

    /// Fetches rows for a company within an inclusive date range.
    ///
    /// Both surface forms of the company identifier must match. The
    /// returned rows are raw: dates uncoerced, intent labels unparsed.
    async fn fetch(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
        features: FeatureSet,
    ) -> Result<Vec<RawSentimentRow>>;
}

/// A sentiment table in the shared Postgres schema.
#[derive(Debug, Clone)]
pub struct PgSentimentSource {
    pool: PgPool,
    table: &'static str,
}

impl PgSentimentSource {
    /// Wraps one of the fixed sentiment tables.
    pub fn new(pool: PgPool, table: &'static str) -> Self {
        Self { pool, table }
    }

    /// All three production tables, wired in precedence order.
    pub fn default_set(pool: &PgPool) -> Vec<Arc<dyn SentimentSource>> {
        SOURCE_TABLES
            .iter()
            .map(|table| Arc::new(Self::new(pool.clone(), table)) as Arc<dyn SentimentSource>)
            .collect()
    }

    fn query(&self, features: FeatureSet) -> String {
        let columns = match features {
            FeatureSet::Full => {
                r#""Date"::text AS date, "company" AS company,
                   "Surprise"::float8 AS surprise, "Joy"::float8 AS joy,
                   "Anger"::float8 AS anger, "Fear"::float8 AS fear,
                   "Sadness"::float8 AS sadness, "Disgust"::float8 AS disgust,
                   "Positive"::float8 AS positive, "Negative"::float8 AS negative,
                   "Neutral"::float8 AS neutral, "Intent Sentiment" AS intent"#
            }
            FeatureSet::PolarityOnly => {
                r#""Date"::text AS date, "company" AS company,
                   "Positive"::float8 AS positive, "Negative"::float8 AS negative,
                   "Neutral"::float8 AS neutral"#
            }
        };
        format!(
            r#"SELECT {columns}
               FROM {table}
               WHERE ("company" = $1 OR "company" = $2)
                 AND "Date"::date >= $3 AND "Date"::date <= $4"#,
            table = self.table,
        )
    }
}

#[async_trait]
impl SentimentSource for PgSentimentSource {
    fn name(&self) -> &str {
        self.table
    }

    async fn fetch(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
        features: FeatureSet,
    ) -> Result<Vec<RawSentimentRow>> {
        let [plain, prefixed] = company::aliases(company);
        let rows = sqlx::query_as::<_, RawSentimentRow>(&self.query(features))
            .bind(plain)
            .bind(prefixed)
            .bind(start)
            .bind(end)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }
}
