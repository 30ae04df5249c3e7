use crate::metrics::risk::{annual_sharpe, annual_sortino, annual_volatility, Frequency};
use crate::metrics::timeseries::max_drawdown;
use chrono::NaiveDate;
use indexmap::IndexMap;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//annual target used by the second sharpe/sortino pair
pub const MIN_ANNUAL_RETURN: f64 = 0.02;

//annualised risk statistics of one log return series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub annual_return: f64,
    pub volatility: f64,
    pub sharpe: Option<f64>,
    pub sortino: Option<f64>,
    pub sharpe_2: Option<f64>,
    pub sortino_2: Option<f64>,
    pub mdd_pct: f64,
    pub mdd_date: Option<NaiveDate>,
    pub mdd_start: Option<NaiveDate>,
    pub mdd_end: Option<NaiveDate>,
    pub trades: Option<usize>,
}

impl RiskSummary {
    //dates and returns are parallel, ordered and gap free at freq
    pub fn from_log_returns(dates: &[NaiveDate], returns: &[f64], freq: Frequency) -> Self {
        let annual_return = if returns.is_empty() {
            0.0
        } else {
            (returns.mean() * freq.periods()).exp_m1()
        };

        let mdd = max_drawdown(dates, returns);

        RiskSummary {
            annual_return,
            volatility: annual_volatility(returns, freq),
            sharpe: annual_sharpe(returns, 0.0, freq),
            sortino: annual_sortino(returns, 0.0, freq),
            sharpe_2: annual_sharpe(returns, MIN_ANNUAL_RETURN, freq),
            sortino_2: annual_sortino(returns, MIN_ANNUAL_RETURN, freq),
            mdd_pct: mdd.map(|m| m.pct.exp_m1()).unwrap_or(0.0),
            mdd_date: mdd.map(|m| m.date),
            mdd_start: mdd.map(|m| m.start),
            mdd_end: mdd.map(|m| m.end),
            trades: None,
        }
    }

    pub fn with_trades(mut self, trades: usize) -> Self {
        self.trades = Some(trades);
        self
    }

    //labelled, formatted values in report order
    pub fn to_map(&self) -> IndexMap<String, String> {
        fn ratio(v: Option<f64>) -> String {
            v.map(|x| format!("{:.3}", x)).unwrap_or_else(|| "-".to_string())
        }
        fn date(v: Option<NaiveDate>) -> String {
            v.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        }

        let mut out = IndexMap::new();
        out.insert("Return".to_string(), format!("{:.2}%", self.annual_return * 100.0));
        out.insert("Volatility".to_string(), format!("{:.2}%", self.volatility * 100.0));
        out.insert("Sharpe".to_string(), ratio(self.sharpe));
        out.insert("Sortino".to_string(), ratio(self.sortino));
        out.insert("Sharpe 2%".to_string(), ratio(self.sharpe_2));
        out.insert("Sortino 2%".to_string(), ratio(self.sortino_2));
        out.insert("MDD %".to_string(), format!("{:.2}%", self.mdd_pct * 100.0));
        out.insert("MDD Date".to_string(), date(self.mdd_date));
        out.insert("MDD SDate".to_string(), date(self.mdd_start));
        out.insert("MDD EDate".to_string(), date(self.mdd_end));
        if let Some(trades) = self.trades {
            out.insert("Trades".to_string(), trades.to_string());
        }
        out
    }
}

//one column per entry, one row per key in first-seen order
pub fn stats_table(stats: &IndexMap<String, IndexMap<String, String>>) -> Table {
    let mut keys: Vec<&String> = Vec::new();
    for column in stats.values() {
        for key in column.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let mut table = Table::new();
    let mut header = vec![Cell::new("")];
    header.extend(stats.keys().map(|name| Cell::new(name)));
    table.add_row(Row::new(header));

    for key in keys {
        let mut row = vec![Cell::new(key)];
        row.extend(
            stats
                .values()
                .map(|column| Cell::new(column.get(key).map(String::as_str).unwrap_or(""))),
        );
        table.add_row(Row::new(row));
    }

    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_zero_returns() {
        let summary = RiskSummary::from_log_returns(&dates(20), &[0.0; 20], Frequency::BusinessDay);
        assert_eq!(summary.annual_return, 0.0);
        assert_eq!(summary.volatility, 0.0);
        assert_eq!(summary.mdd_pct, 0.0);
        assert!(summary.sharpe.is_none());
        assert!(summary.sortino.is_none());

        let map = summary.to_map();
        assert_eq!(map["Sharpe"], "-");
        assert_eq!(map["MDD Date"], "2024-01-01");
    }

    #[test]
    fn test_return_is_annualised_mean() {
        let r = [0.001, 0.002, -0.0005, 0.0015];
        let summary = RiskSummary::from_log_returns(&dates(4), &r, Frequency::BusinessDay);
        let mean = r.iter().sum::<f64>() / 4.0;
        assert!((summary.annual_return - (mean * 252.0).exp_m1()).abs() < 1e-12);
        assert!((summary.mdd_pct - (-0.0005f64).exp_m1()).abs() < 1e-12);
        assert!(summary.sharpe.unwrap() > summary.sharpe_2.unwrap());
    }

    #[test]
    fn test_trades_row_only_when_set() {
        let summary = RiskSummary::from_log_returns(&dates(2), &[0.01, -0.01], Frequency::Day);
        assert!(!summary.to_map().contains_key("Trades"));
        assert_eq!(summary.with_trades(7).to_map()["Trades"], "7");
    }

    #[test]
    fn test_stats_table_shape() {
        let mut stats = IndexMap::new();
        let mut a = IndexMap::new();
        a.insert("Return".to_string(), "1%".to_string());
        let mut b = IndexMap::new();
        b.insert("Return".to_string(), "2%".to_string());
        b.insert("Trades".to_string(), "3".to_string());
        stats.insert("a".to_string(), a);
        stats.insert("b".to_string(), b);

        let table = stats_table(&stats);
        assert_eq!(table.len(), 3);
    }
}
