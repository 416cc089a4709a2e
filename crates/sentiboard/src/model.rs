//! Record types shared by the reconciliation, join, and holdings routines.
//!
//! All entities here are read-only projections of externally populated
//! tables. Nothing in this crate creates, mutates, or deletes them.

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Display;
use polars::df;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::company;
use crate::error::Result;

/// Emotion feature columns, in table order.
pub const EMOTION_COLUMNS: [&str; 6] = ["surprise", "joy", "anger", "fear", "sadness", "disgust"];

/// Polarity feature columns, in table order. Scores form a
/// probability-like distribution.
pub const POLARITY_COLUMNS: [&str; 3] = ["positive", "negative", "neutral"];

/// Which feature columns a sentiment fetch selects.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureSet {
    /// Emotion and polarity scores plus the intent label.
    Full,
    /// Positive/negative/neutral only.
    PolarityOnly,
}

/// Categorical intent label attached to a sentiment observation.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentSentiment {
    /// Aggregated intent leans toward buying.
    Buy,
    /// Aggregated intent leans toward selling.
    Sell,
    /// No directional lean.
    Neutral,
}

impl IntentSentiment {
    /// Case-insensitive parse. Unrecognized labels are treated as absent
    /// rather than an error; sources are not trusted to be well-formed.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "buy" => Some(Self::Buy),
            "sell" => Some(Self::Sell),
            "neutral" => Some(Self::Neutral),
            _ => None,
        }
    }
}

/// Side of a daily holding.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionType {
    /// Long holding.
    Long,
    /// Short holding.
    Short,
}

impl PositionType {
    /// Case-insensitive parse of the stored label.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "long" => Some(Self::Long),
            "short" => Some(Self::Short),
            _ => None,
        }
    }
}

/// One sentiment observation as fetched, before date coercion.
///
/// The date is kept as the raw stored string until reconciliation step 4;
/// deduplication runs on this raw value first, matching the layered
/// live/backfill override the sources implement.
#[derive(Debug, Clone, Default, PartialEq, sqlx::FromRow)]
pub struct RawSentimentRow {
    /// Raw date text as stored by the source.
    pub date: String,
    /// Company identifier in either surface form.
    pub company: String,
    /// Surprise score.
    #[sqlx(default)]
    pub surprise: Option<f64>,
    /// Joy score.
    #[sqlx(default)]
    pub joy: Option<f64>,
    /// Anger score.
    #[sqlx(default)]
    pub anger: Option<f64>,
    /// Fear score.
    #[sqlx(default)]
    pub fear: Option<f64>,
    /// Sadness score.
    #[sqlx(default)]
    pub sadness: Option<f64>,
    /// Disgust score.
    #[sqlx(default)]
    pub disgust: Option<f64>,
    /// Positive polarity score.
    #[sqlx(default)]
    pub positive: Option<f64>,
    /// Negative polarity score.
    #[sqlx(default)]
    pub negative: Option<f64>,
    /// Neutral polarity score.
    #[sqlx(default)]
    pub neutral: Option<f64>,
    /// Raw intent label as stored.
    #[sqlx(default)]
    pub intent: Option<String>,
}

impl RawSentimentRow {
    /// Coerces the row to day precision and the canonical company form.
    ///
    /// Returns `None` when the date fails to parse; such rows are dropped
    /// by reconciliation.
    pub fn normalize(self) -> Option<SentimentRecord> {
        let date = parse_day(&self.date)?;
        Some(SentimentRecord {
            date,
            company: company::canonical(&self.company).to_owned(),
            surprise: self.surprise,
            joy: self.joy,
            anger: self.anger,
            fear: self.fear,
            sadness: self.sadness,
            disgust: self.disgust,
            positive: self.positive,
            negative: self.negative,
            neutral: self.neutral,
            intent: self.intent.as_deref().and_then(IntentSentiment::parse),
        })
    }
}

/// One reconciled sentiment observation for a company on a day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentimentRecord {
    /// Observation day.
    pub date: NaiveDate,
    /// Canonical company identifier.
    pub company: String,
    /// Surprise score.
    pub surprise: Option<f64>,
    /// Joy score.
    pub joy: Option<f64>,
    /// Anger score.
    pub anger: Option<f64>,
    /// Fear score.
    pub fear: Option<f64>,
    /// Sadness score.
    pub sadness: Option<f64>,
    /// Disgust score.
    pub disgust: Option<f64>,
    /// Positive polarity score.
    pub positive: Option<f64>,
    /// Negative polarity score.
    pub negative: Option<f64>,
    /// Neutral polarity score.
    pub neutral: Option<f64>,
    /// Parsed intent label, if present and recognized.
    pub intent: Option<IntentSentiment>,
}

impl SentimentRecord {
    /// Named scores in table order for the selected feature set.
    pub fn scores(&self, features: FeatureSet) -> Vec<(&'static str, Option<f64>)> {
        let polarity = [
            ("positive", self.positive),
            ("negative", self.negative),
            ("neutral", self.neutral),
        ];
        match features {
            FeatureSet::PolarityOnly => polarity.to_vec(),
            FeatureSet::Full => {
                let mut all = vec![
                    ("surprise", self.surprise),
                    ("joy", self.joy),
                    ("anger", self.anger),
                    ("fear", self.fear),
                    ("sadness", self.sadness),
                    ("disgust", self.disgust),
                ];
                all.extend(polarity);
                all
            }
        }
    }
}

/// One daily close observation for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceRecord {
    /// Trading day.
    pub date: NaiveDate,
    /// Ticker symbol.
    pub ticker: String,
    /// Closing price, positive.
    pub close: f64,
}

/// One daily holding as decided by the external strategy engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionRecord {
    /// Trading day.
    pub date: NaiveDate,
    /// Ticker symbol.
    pub ticker: String,
    /// Long or short.
    pub position_type: PositionType,
}

/// Renders reconciled records as a display-ready frame.
///
/// Dates are emitted as ISO-8601 strings, which sort and join correctly
/// and match how downstream consumers compare them.
pub fn sentiment_frame(records: &[SentimentRecord], features: FeatureSet) -> Result<DataFrame> {
    let date: Vec<String> = records.iter().map(|r| r.date.to_string()).collect();
    let company: Vec<&str> = records.iter().map(|r| r.company.as_str()).collect();
    let positive: Vec<Option<f64>> = records.iter().map(|r| r.positive).collect();
    let negative: Vec<Option<f64>> = records.iter().map(|r| r.negative).collect();
    let neutral: Vec<Option<f64>> = records.iter().map(|r| r.neutral).collect();

    let frame = match features {
        FeatureSet::PolarityOnly => df! {
            "date" => date,
            "company" => company,
            "positive" => positive,
            "negative" => negative,
            "neutral" => neutral,
        }?,
        FeatureSet::Full => df! {
            "date" => date,
            "company" => company,
            "surprise" => records.iter().map(|r| r.surprise).collect::<Vec<_>>(),
            "joy" => records.iter().map(|r| r.joy).collect::<Vec<_>>(),
            "anger" => records.iter().map(|r| r.anger).collect::<Vec<_>>(),
            "fear" => records.iter().map(|r| r.fear).collect::<Vec<_>>(),
            "sadness" => records.iter().map(|r| r.sadness).collect::<Vec<_>>(),
            "disgust" => records.iter().map(|r| r.disgust).collect::<Vec<_>>(),
            "positive" => positive,
            "negative" => negative,
            "neutral" => neutral,
            "intent_sentiment" => records
                .iter()
                .map(|r| r.intent.map(|i| i.to_string()))
                .collect::<Vec<_>>(),
        }?,
    };
    Ok(frame)
}

/// Renders price records as a frame for joining against sentiment.
pub fn price_frame(prices: &[PriceRecord]) -> Result<DataFrame> {
    let frame = df! {
        "date" => prices.iter().map(|p| p.date.to_string()).collect::<Vec<_>>(),
        "ticker" => prices.iter().map(|p| p.ticker.as_str()).collect::<Vec<_>>(),
        "close" => prices.iter().map(|p| p.close).collect::<Vec<_>>(),
    }?;
    Ok(frame)
}

/// Strict day-level coercion of a raw date string.
///
/// Accepts plain dates in dash or slash form and date-times whose time
/// component is discarded. Anything else is rejected.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y/%m/%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}
