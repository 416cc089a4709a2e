//! Latest strategy holdings and the sentiment reference date.

use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::model::{PositionRecord, PositionType};

/// The strategy's holdings on its most recent trading date.
#[derive(Debug, Clone, Serialize)]
pub struct Holdings {
    /// Most recent trading date in the positions table.
    pub trading_date: NaiveDate,
    /// All positions for that date, ordered by (position type, ticker).
    pub positions: Vec<PositionRecord>,
}

impl Holdings {
    /// Long positions in ticker order.
    pub fn long(&self) -> impl Iterator<Item = &PositionRecord> {
        self.positions
            .iter()
            .filter(|p| p.position_type == PositionType::Long)
    }

    /// Short positions in ticker order.
    pub fn short(&self) -> impl Iterator<Item = &PositionRecord> {
        self.positions
            .iter()
            .filter(|p| p.position_type == PositionType::Short)
    }
}

/// Orders holdings rows by (position type, ticker).
pub(crate) fn order_positions(positions: &mut [PositionRecord]) {
    positions.sort_by(|a, b| {
        a.position_type
            .cmp(&b.position_type)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
}

/// The sentiment date paired with a trading date.
///
/// The collectors publish with a fixed lag behind trading, so the
/// reference date is an offset, not something inferred from the data.
pub fn sentiment_reference_date(trading_date: NaiveDate, lag_days: i64) -> NaiveDate {
    trading_date - Duration::days(lag_days)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn position(ticker: &str, position_type: PositionType) -> PositionRecord {
        PositionRecord {
            date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            ticker: ticker.to_owned(),
            position_type,
        }
    }

    #[test]
    fn reference_date_lags_trading_date() {
        let trading = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            sentiment_reference_date(trading, 1),
            NaiveDate::from_ymd_opt(2024, 3, 3).unwrap()
        );
        assert_eq!(
            sentiment_reference_date(trading, 3),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn positions_order_by_type_then_ticker() {
        let mut positions = vec![
            position("MSFT", PositionType::Short),
            position("TSLA", PositionType::Long),
            position("AAPL", PositionType::Short),
            position("AMZN", PositionType::Long),
        ];
        order_positions(&mut positions);
        let order: Vec<(&str, PositionType)> = positions
            .iter()
            .map(|p| (p.ticker.as_str(), p.position_type))
            .collect();
        assert_eq!(
            order,
            [
                ("AMZN", PositionType::Long),
                ("TSLA", PositionType::Long),
                ("AAPL", PositionType::Short),
                ("MSFT", PositionType::Short),
            ]
        );
    }

    #[test]
    fn holdings_split_by_side() {
        let holdings = Holdings {
            trading_date: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
            positions: vec![
                position("AMZN", PositionType::Long),
                position("AAPL", PositionType::Short),
            ],
        };
        assert_eq!(holdings.long().count(), 1);
        assert_eq!(holdings.short().next().unwrap().ticker, "AAPL");
    }
}
