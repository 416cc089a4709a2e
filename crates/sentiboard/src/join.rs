//! Date alignment of sentiment against daily prices.

use polars::prelude::*;

use crate::error::{DashboardError, Result};
use crate::model::POLARITY_COLUMNS;

/// Pairs polarity scores with same-day daily returns.
///
/// Sentiment and price rows are inner-joined on exact date; there is no
/// nearest-date fallback, so an observation without a same-day price row
/// drops out, and vice versa. Returns are computed over the joined, sorted
/// sequence as `close[i] / close[i-1] - 1`.
///
/// When sentiment has gaps, the return therefore spans the gap instead of
/// being a true day-over-day return from the full price history. That is
/// the established behavior of the strategy's reporting and is kept as is.
///
/// The output is long-form: one row per (date, polarity feature), columns
/// `date`, `sentiment`, `score`, `daily_return`, sorted by date then
/// feature. Rows with a null score or null return are dropped, which
/// removes the first row of every maximal joined block.
pub fn join_with_returns(sentiment: &DataFrame, prices: &DataFrame) -> Result<DataFrame> {
    for required in ["date"].into_iter().chain(POLARITY_COLUMNS) {
        if sentiment.column(required).is_err() {
            return Err(DashboardError::MissingColumn(required.to_owned()));
        }
    }
    for required in ["date", "close"] {
        if prices.column(required).is_err() {
            return Err(DashboardError::MissingColumn(required.to_owned()));
        }
    }

    let joined = sentiment
        .clone()
        .lazy()
        .join(
            prices.clone().lazy().select([col("date"), col("close")]),
            [col("date")],
            [col("date")],
            JoinArgs::new(JoinType::Inner),
        )
        .sort(["date"], Default::default())
        .with_column(
            (col("close") / col("close").shift(lit(1)) - lit(1.0)).alias("daily_return"),
        )
        .collect()?;

    // wide polarity columns to long form
    let parts: Vec<LazyFrame> = POLARITY_COLUMNS
        .iter()
        .map(|feature| {
            joined.clone().lazy().select([
                col("date"),
                lit(*feature).alias("sentiment"),
                col(*feature).alias("score"),
                col("daily_return"),
            ])
        })
        .collect();

    let long = concat(parts, UnionArgs::default())?
        .drop_nulls(Some(vec![col("score"), col("daily_return")]))
        .sort(["date", "sentiment"], Default::default())
        .collect()?;
    Ok(long)
}
