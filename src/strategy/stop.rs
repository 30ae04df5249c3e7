use crate::data::Bar;
use crate::engine::trade::{Side, Trade};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

//where and at what price a stop fired
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StopHit {
    pub ts: DateTime<Utc>,
    pub trigger: f64,
}

//stop-loss policy evaluated over the bars between entry and planned exit
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StopPolicy {
    #[default]
    None,
    //fixed offset from the entry price
    Simple { pct: f64 },
    //offset from the best close seen since entry
    Trailing { pct: f64 },
}

impl StopPolicy {
    pub fn description(&self) -> String {
        match self {
            StopPolicy::None => "none".to_string(),
            StopPolicy::Simple { pct } => format!("simple inPrc {:.2}%", pct * 100.0),
            StopPolicy::Trailing { pct } => format!("trailing {:.2}%", pct * 100.0),
        }
    }

    //first bar in window that breaches the stop; window must be chronological
    pub fn calc_stop(&self, window: &[Bar], trade: &Trade) -> Option<StopHit> {
        match *self {
            StopPolicy::None => None,
            StopPolicy::Simple { pct } => simple_stop(window, trade.entry_price, trade.side(), pct),
            StopPolicy::Trailing { pct } => {
                trailing_stop(window, trade.entry_price, trade.side(), pct)
            }
        }
    }
}

fn simple_stop(window: &[Bar], reference: f64, side: Side, pct: f64) -> Option<StopHit> {
    match side {
        Side::Long => {
            let level = reference * (1.0 - pct);
            window.iter().find(|b| b.low < level).map(|b| StopHit {
                ts: b.timestamp,
                trigger: b.low,
            })
        }
        Side::Short => {
            let level = reference * (1.0 + pct);
            window.iter().find(|b| b.high > level).map(|b| StopHit {
                ts: b.timestamp,
                trigger: b.high,
            })
        }
    }
}

//path dependent, has to walk the bars in order
fn trailing_stop(window: &[Bar], entry: f64, side: Side, pct: f64) -> Option<StopHit> {
    let mut best = entry;

    for bar in window {
        match side {
            Side::Long => {
                if bar.low < best * (1.0 - pct) {
                    return Some(StopHit {
                        ts: bar.timestamp,
                        trigger: bar.low,
                    });
                }
                if bar.close > best {
                    best = bar.close;
                }
            }
            Side::Short => {
                if bar.high > best * (1.0 + pct) {
                    return Some(StopHit {
                        ts: bar.timestamp,
                        trigger: bar.high,
                    });
                }
                if bar.close < best {
                    best = bar.close;
                }
            }
        }
    }

    None
}
