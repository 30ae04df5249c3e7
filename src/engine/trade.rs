use crate::data::PriceField;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

//trade direction derived from the signal sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    //positive signals buy, anything else sells
    pub fn from_signal(signal: f64) -> Self {
        if signal > 0.0 {
            Side::Long
        } else {
            Side::Short
        }
    }
}

//one round trip for one strategy on one trading day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub strategy: String,
    pub trade_date: NaiveDate,

    pub signal_ts: DateTime<Utc>,
    pub signal_field: PriceField,
    pub signal: f64,

    pub entry_ts: DateTime<Utc>,
    pub entry_field: PriceField,
    pub entry_price: f64,
    pub entry_volume: f64,

    pub exit_ts: DateTime<Utc>,
    pub exit_field: PriceField,
    pub exit_price: f64,
    pub exit_volume: f64,

    //set when the stop policy fired before the planned exit
    pub stop_ts: Option<DateTime<Utc>>,
    pub stop_trigger: Option<f64>,

    pub log_ret: f64,
}

impl Trade {
    pub fn side(&self) -> Side {
        Side::from_signal(self.signal)
    }

    pub fn is_stopped(&self) -> bool {
        self.stop_ts.is_some()
    }

    //ln(exit / entry) scaled by the signal; unusable prices give 0
    pub fn log_return(&self) -> f64 {
        log_return(self.entry_price, self.exit_price, self.signal)
    }
}

pub fn log_return(entry_price: f64, exit_price: f64, signal: f64) -> f64 {
    if !(entry_price > 0.0 && exit_price > 0.0) || !signal.is_finite() {
        return 0.0;
    }
    (exit_price / entry_price).ln() * signal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_return_signed_by_signal() {
        let long = log_return(100.0, 110.0, 1.0);
        assert!((long - (1.1f64).ln()).abs() < 1e-12);

        let short = log_return(100.0, 110.0, -1.0);
        assert!((short + (1.1f64).ln()).abs() < 1e-12);
    }

    #[test]
    fn test_log_return_zero_price_is_neutral() {
        assert_eq!(log_return(0.0, 110.0, 1.0), 0.0);
        assert_eq!(log_return(100.0, 0.0, -1.0), 0.0);
        assert_eq!(log_return(100.0, f64::NAN, 1.0), 0.0);
    }

    #[test]
    fn test_side_from_signal() {
        assert_eq!(Side::from_signal(1.0), Side::Long);
        assert_eq!(Side::from_signal(-1.0), Side::Short);
    }
}
