//! Multi-source sentiment reconciliation.
//!
//! The three sentiment feeds overlap: the same (date, company) observation
//! can appear in more than one of them, and each feed may be unavailable on
//! its own. Reconciliation merges the feeds into one clean series per
//! company with a last-source-wins override keyed on the fixed source
//! order.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;
use std::sync::Arc;

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use sqlx::PgPool;
use tracing::{debug, warn};

use crate::company;
use crate::error::Result;
use crate::model::{self, FeatureSet, RawSentimentRow, SentimentRecord};
use crate::source::{PgSentimentSource, SentimentSource};

/// Merges the fixed, ordered set of sentiment sources into one series.
#[derive(Debug)]
pub struct Reconciler {
    sources: Vec<Arc<dyn SentimentSource>>,
}

impl Reconciler {
    /// Builds a reconciler over an ordered source list.
    ///
    /// The order is part of the contract: on duplicate (date, company)
    /// keys the row from the source later in this list wins.
    pub fn new(sources: Vec<Arc<dyn SentimentSource>>) -> Self {
        Self { sources }
    }

    /// The production reconciler over the three shared tables.
    pub fn from_pool(pool: &PgPool) -> Self {
        Self::new(PgSentimentSource::default_set(pool))
    }

    /// Fetches, merges, and normalizes sentiment for one company.
    ///
    /// Sources are queried sequentially in list order. A source that fails
    /// is logged and contributes zero rows; only the merge itself can
    /// error. An empty range or a total fetch failure yields an empty
    /// series. Inputs are not validated here; an inverted range simply
    /// matches nothing downstream.
    ///
    /// The output holds at most one record per (date, company), sorted
    /// ascending by date, with company identifiers in canonical form.
    pub async fn reconcile(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
        features: FeatureSet,
    ) -> Result<Vec<SentimentRecord>> {
        let mut working: Vec<RawSentimentRow> = Vec::new();
        for source in &self.sources {
            match source.fetch(company, start, end, features).await {
                Ok(rows) => {
                    debug!(source = source.name(), rows = rows.len(), "fetched sentiment rows");
                    working.extend(rows);
                }
                Err(err) => {
                    warn!(source = source.name(), error = %err, "sentiment source unavailable, skipping");
                }
            }
        }

        // Dedup on the raw date text first, before coercion. The stored
        // strings are what the feeds overwrite each other on.
        let deduped = dedup_keep_last(working, |row| {
            (row.date.clone(), company::canonical(&row.company).to_owned())
        });

        let candidates = deduped.len();
        let normalized: Vec<SentimentRecord> = deduped
            .into_iter()
            .filter_map(RawSentimentRow::normalize)
            .collect();
        if normalized.len() < candidates {
            debug!(
                dropped = candidates - normalized.len(),
                "dropped rows with unparseable dates"
            );
        }

        // A second pass on the parsed key collapses format variants of the
        // same day ("2024/01/02" vs "2024-01-02") that survive the raw
        // dedup. Later sources still win.
        let mut records =
            dedup_keep_last(normalized, |record| (record.date, record.company.clone()));
        records.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.company.cmp(&b.company)));
        Ok(records)
    }

    /// Reconciles and renders the series as a frame.
    pub async fn reconcile_frame(
        &self,
        company: &str,
        start: NaiveDate,
        end: NaiveDate,
        features: FeatureSet,
    ) -> Result<DataFrame> {
        let records = self.reconcile(company, start, end, features).await?;
        model::sentiment_frame(&records, features)
    }
}

/// Keeps one row per key, taking the value seen last in input order.
fn dedup_keep_last<T, K, F>(rows: Vec<T>, key_of: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut slots: HashMap<K, usize> = HashMap::new();
    let mut kept: Vec<Option<T>> = Vec::with_capacity(rows.len());
    for row in rows {
        match slots.entry(key_of(&row)) {
            Entry::Occupied(slot) => kept[*slot.get()] = Some(row),
            Entry::Vacant(slot) => {
                slot.insert(kept.len());
                kept.push(Some(row));
            }
        }
    }
    kept.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;
    use approx::assert_abs_diff_eq;
    use async_trait::async_trait;

    #[derive(Debug)]
    struct StaticSource {
        name: &'static str,
        rows: Vec<RawSentimentRow>,
        fail: bool,
    }

    impl StaticSource {
        fn ok(name: &'static str, rows: Vec<RawSentimentRow>) -> Arc<dyn SentimentSource> {
            Arc::new(Self { name, rows, fail: false })
        }

        fn down(name: &'static str) -> Arc<dyn SentimentSource> {
            Arc::new(Self { name, rows: Vec::new(), fail: true })
        }
    }

    #[async_trait]
    impl SentimentSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(
            &self,
            _company: &str,
            _start: NaiveDate,
            _end: NaiveDate,
            _features: FeatureSet,
        ) -> Result<Vec<RawSentimentRow>> {
            if self.fail {
                return Err(DashboardError::Database(sqlx::Error::PoolClosed));
            }
            Ok(self.rows.clone())
        }
    }

    fn row(date: &str, company: &str, positive: f64) -> RawSentimentRow {
        RawSentimentRow {
            date: date.to_owned(),
            company: company.to_owned(),
            positive: Some(positive),
            negative: Some(0.2),
            neutral: Some(0.1),
            ..RawSentimentRow::default()
        }
    }

    fn range() -> (NaiveDate, NaiveDate) {
        (
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        )
    }

    #[tokio::test]
    async fn later_source_wins_on_conflicts() {
        let reconciler = Reconciler::new(vec![
            StaticSource::ok("a", vec![row("2024-01-02", "AAPL", 0.7)]),
            StaticSource::ok("b", Vec::new()),
            StaticSource::ok("c", vec![row("2024-01-02", "AAPL", 0.4)]),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_abs_diff_eq!(records[0].positive.unwrap(), 0.4);
    }

    #[tokio::test]
    async fn disjoint_ranges_union_sorted() {
        let reconciler = Reconciler::new(vec![
            StaticSource::ok("a", vec![row("2024-03-05", "AAPL", 0.1)]),
            StaticSource::ok("b", vec![row("2024-01-02", "AAPL", 0.2)]),
            StaticSource::ok("c", vec![row("2024-02-10", "AAPL", 0.3)]),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        let dates: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
        assert_eq!(dates, ["2024-01-02", "2024-02-10", "2024-03-05"]);
    }

    #[tokio::test]
    async fn failed_source_is_skipped() {
        let reconciler = Reconciler::new(vec![
            StaticSource::down("a"),
            StaticSource::ok("b", vec![row("2024-01-02", "AAPL", 0.5)]),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_abs_diff_eq!(records[0].positive.unwrap(), 0.5);
    }

    #[tokio::test]
    async fn total_failure_yields_empty_not_error() {
        let reconciler = Reconciler::new(vec![
            StaticSource::down("a"),
            StaticSource::down("b"),
            StaticSource::down("c"),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn unparseable_dates_are_dropped() {
        let reconciler = Reconciler::new(vec![StaticSource::ok(
            "a",
            vec![row("soon", "AAPL", 0.9), row("2024-01-02", "AAPL", 0.5)],
        )]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
    }

    #[tokio::test]
    async fn format_variants_collapse_to_one_record() {
        // same day written in slash form by an earlier source and dash
        // form by a later one; the later source still wins
        let reconciler = Reconciler::new(vec![
            StaticSource::ok("a", vec![row("2024/01/02", "AAPL", 0.7)]),
            StaticSource::ok("b", vec![row("2024-01-02", "AAPL", 0.4)]),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_abs_diff_eq!(records[0].positive.unwrap(), 0.4);
    }

    #[tokio::test]
    async fn alias_forms_collapse_to_canonical_company() {
        let reconciler = Reconciler::new(vec![
            StaticSource::ok("a", vec![row("2024-01-02", "$AAPL", 0.7)]),
            StaticSource::ok("b", vec![row("2024-01-02", "AAPL", 0.4)]),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].company, "AAPL");
        assert_abs_diff_eq!(records[0].positive.unwrap(), 0.4);
    }

    #[tokio::test]
    async fn at_most_one_record_per_key() {
        let reconciler = Reconciler::new(vec![
            StaticSource::ok(
                "a",
                vec![
                    row("2024-01-02", "AAPL", 0.1),
                    row("2024-01-03", "AAPL", 0.2),
                    row("2024-01-02", "MSFT", 0.3),
                ],
            ),
            StaticSource::ok(
                "b",
                vec![row("2024-01-02", "AAPL", 0.4), row("2024-01-03", "$AAPL", 0.5)],
            ),
        ]);
        let (start, end) = range();
        let records = reconciler
            .reconcile("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();

        let mut keys: Vec<(NaiveDate, String)> = records
            .iter()
            .map(|r| (r.date, r.company.clone()))
            .collect();
        let total = keys.len();
        keys.dedup();
        assert_eq!(keys.len(), total, "duplicate (date, company) key in output");
    }

    #[tokio::test]
    async fn frame_rendering_matches_feature_set() {
        let reconciler = Reconciler::new(vec![StaticSource::ok(
            "a",
            vec![row("2024-01-02", "AAPL", 0.5)],
        )]);
        let (start, end) = range();
        let frame = reconciler
            .reconcile_frame("AAPL", start, end, FeatureSet::PolarityOnly)
            .await
            .unwrap();
        assert_eq!(frame.height(), 1);
        assert_eq!(frame.width(), 5);
    }
}
