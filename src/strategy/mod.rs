pub mod new_rules;
pub mod overnight;
pub mod rise_fall;
pub mod session_rules;
pub mod stop;
pub mod volume;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::data::calendar::{localize_offset, next_business_day};
use crate::data::{Bar, BarSeries, DailySeries, DataError, MarketData, PriceField};
use crate::engine::trade::Trade;
use chrono::{Duration, NaiveTime};
use indexmap::IndexMap;
use tracing::{debug, info};

pub use new_rules::{NewRule2, NewRule4, NewRule5, NewRule8};
pub use overnight::Overnight;
pub use rise_fall::RiseFall;
pub use session_rules::{NewRule3, NewRule6, NewRule7};
pub use stop::{StopHit, StopPolicy};
pub use volume::{NewRule1, RiseFallVolume};

//settings shared by every strategy kind
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub name: String,
    pub instrument: String,

    //field sampled for the directional test
    pub price_field: PriceField,

    pub stop: StopPolicy,

    //exit clock time, rolls to the next business day if not after entry
    pub unwind: NaiveTime,

    //same-day sample times, in order
    pub current: Vec<NaiveTime>,

    //previous-day sample times, compared before the current ones
    pub previous: Option<Vec<NaiveTime>>,

    //sample times for the high/low confirmation band
    pub hi_lo: Option<Vec<NaiveTime>>,
}

pub fn format_times(times: &[NaiveTime]) -> String {
    times
        .iter()
        .map(|t| t.format("%H:%M").to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl StrategyParams {
    //the last time any input is sampled; the signal is known at this point
    pub fn last_sample(&self) -> NaiveTime {
        let current = self.current.last().copied().unwrap_or(NaiveTime::MIN);
        match self.hi_lo.as_ref().and_then(|h| h.last()) {
            Some(hi_lo) => current.max(*hi_lo),
            None => current,
        }
    }

    pub fn samples_description(&self) -> String {
        let mut samples = match &self.previous {
            Some(previous) => {
                let mut parts: Vec<String> = previous
                    .iter()
                    .map(|t| format!("{}-p", t.format("%H:%M")))
                    .collect();
                parts.extend(self.current.iter().map(|t| t.format("%H:%M").to_string()));
                parts.join(", ")
            }
            None => format_times(&self.current),
        };

        if let Some(hi_lo) = &self.hi_lo {
            samples = format!("{} HiLo {}", samples, format_times(hi_lo));
        }

        samples
    }

    //instrument, samples, unwind time and stop
    pub fn description(&self) -> IndexMap<String, String> {
        let mut descr = IndexMap::new();
        descr.insert("Instr".to_string(), self.instrument.clone());
        descr.insert("Samples".to_string(), self.samples_description());
        descr.insert(
            "Unwind".to_string(),
            self.unwind.format("%H:%M").to_string(),
        );
        descr.insert("Stop".to_string(), self.stop.description());
        descr
    }
}

//strategy interface: each kind supplies its own daily signals,
//trade construction and stop handling are shared
pub trait Strategy: Send + Sync {
    fn params(&self) -> &StrategyParams;

    //signed signal per business day, 0 means no position
    fn signals(&self, bars: &BarSeries) -> DailySeries;

    //free-text description merged into the statistics tables
    fn description(&self) -> IndexMap<String, String> {
        self.params().description()
    }

    fn name(&self) -> &str {
        &self.params().name
    }

    fn trades(&self, data: &MarketData) -> Result<Vec<Trade>, DataError> {
        execute_trades(self, data)
    }
}

//turns nonzero signals into trades: enter on the open of the bar after the
//last sample, exit on the close at the unwind time, exit early on a stop
pub fn execute_trades<S: Strategy + ?Sized>(
    strategy: &S,
    data: &MarketData,
) -> Result<Vec<Trade>, DataError> {
    let params = strategy.params();
    let bars = data
        .get(&params.instrument)
        .ok_or_else(|| DataError::UnknownInstrument(params.instrument.clone()))?;

    let signals = strategy.signals(bars);

    let signal_offset = params.last_sample() - NaiveTime::MIN;
    let entry_offset = signal_offset + bars.interval;
    let exit_offset: Duration = params.unwind - NaiveTime::MIN;

    let mut trades = Vec::new();

    for (&date, &signal) in signals.iter() {
        if signal == 0.0 || !signal.is_finite() {
            continue;
        }

        let exit_date = if exit_offset > entry_offset {
            date
        } else {
            next_business_day(date)
        };

        let (Some(signal_ts), Some(entry_ts), Some(exit_ts)) = (
            localize_offset(bars.tz, date, signal_offset),
            localize_offset(bars.tz, date, entry_offset),
            localize_offset(bars.tz, exit_date, exit_offset),
        ) else {
            debug!("{}: no valid local time on {}, skipping", params.name, date);
            continue;
        };

        let (Some(entry_bar), Some(exit_bar)) = (bars.asof(entry_ts), bars.asof(exit_ts)) else {
            debug!("{}: no prices for trade on {}, skipping", params.name, date);
            continue;
        };

        let mut trade = Trade {
            strategy: params.name.clone(),
            trade_date: date,
            signal_ts,
            signal_field: params.price_field,
            signal,
            entry_ts,
            entry_field: PriceField::Open,
            entry_price: entry_bar.open,
            entry_volume: entry_bar.volume,
            exit_ts,
            exit_field: PriceField::Close,
            exit_price: exit_bar.close,
            exit_volume: exit_bar.volume,
            stop_ts: None,
            stop_trigger: None,
            log_ret: 0.0,
        };

        //stops are checked from the bar after entry through the planned exit bar
        if let (Some(entry_idx), Some(exit_idx)) = (
            bars.index_at_or_after(entry_ts),
            bars.index_at_or_before(exit_ts),
        ) {
            let window: &[Bar] = if entry_idx < exit_idx {
                &bars.bars()[entry_idx + 1..=exit_idx]
            } else {
                &[]
            };

            if let Some(hit) = params.stop.calc_stop(window, &trade) {
                if let Some(stop_bar) = window.iter().find(|b| b.timestamp == hit.ts) {
                    trade.exit_ts = hit.ts;
                    trade.exit_price = stop_bar.close;
                    trade.exit_volume = stop_bar.volume;
                    trade.stop_ts = Some(hit.ts);
                    trade.stop_trigger = Some(hit.trigger);
                }
            }
        }

        trade.log_ret = trade.log_return();
        trades.push(trade);
    }

    info!("strategy {} produced {} trades", params.name, trades.len());

    Ok(trades)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn params() -> StrategyParams {
        StrategyParams {
            name: "2".into(),
            instrument: "CME SP500 eMini".into(),
            price_field: PriceField::Close,
            stop: StopPolicy::Simple { pct: 0.008 },
            unwind: t(16, 0),
            current: vec![t(9, 30), t(9, 45)],
            previous: Some(vec![t(9, 45), t(15, 15), t(16, 0)]),
            hi_lo: None,
        }
    }

    #[test]
    fn test_last_sample_includes_hi_lo_band() {
        let mut p = params();
        assert_eq!(p.last_sample(), t(9, 45));
        p.hi_lo = Some(vec![t(9, 30), t(10, 0)]);
        assert_eq!(p.last_sample(), t(10, 0));
    }

    #[test]
    fn test_description() {
        let mut p = params();
        p.hi_lo = Some(vec![t(9, 30), t(9, 45)]);
        let descr = p.description();
        assert_eq!(descr["Instr"], "CME SP500 eMini");
        assert_eq!(
            descr["Samples"],
            "09:45-p, 15:15-p, 16:00-p, 09:30, 09:45 HiLo 09:30, 09:45"
        );
        assert_eq!(descr["Unwind"], "16:00");
        assert_eq!(descr["Stop"], "simple inPrc 0.80%");
    }
}
