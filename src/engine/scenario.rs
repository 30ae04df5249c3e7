use crate::data::calendar::business_days;
use crate::data::{DailySeries, DataError, MarketData};
use crate::engine::trade::{Side, Trade};
use crate::metrics::{stats_table, Frequency, RiskSummary};
use crate::strategy::Strategy;
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use indexmap::IndexMap;
use prettytable::Table;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::info;

pub type Scenario = Vec<Box<dyn Strategy>>;
pub type Scenarios = IndexMap<String, Scenario>;

//all trades of a set of strategies, ordered by trade date and then by the
//order the strategies were given in
pub fn run_scenario(
    data: &MarketData,
    strategies: &[Box<dyn Strategy>],
) -> Result<Vec<Trade>, DataError> {
    let per_strategy = strategies
        .par_iter()
        .map(|strategy| strategy.trades(data))
        .collect::<Result<Vec<_>, _>>()?;

    let mut trades: Vec<Trade> = per_strategy.into_iter().flatten().collect();
    trades.sort_by_key(|t| t.trade_date);
    Ok(trades)
}

//business days spanned by the first strategy's instrument
pub fn pnl_dates(
    data: &MarketData,
    strategies: &[Box<dyn Strategy>],
) -> Result<Vec<NaiveDate>, DataError> {
    let Some(first) = strategies.first() else {
        return Ok(vec![]);
    };
    let instrument = &first.params().instrument;
    let bars = data
        .get(instrument)
        .ok_or_else(|| DataError::UnknownInstrument(instrument.clone()))?;

    Ok(match (bars.first_date(), bars.last_date()) {
        (Some(start), Some(end)) => business_days(start, end),
        _ => vec![],
    })
}

//summed log return per date, zero on days without a position.
//trades dated outside dates are dropped
pub fn daily_log_returns(trades: &[Trade], dates: &[NaiveDate]) -> DailySeries {
    let mut pnl: DailySeries = dates.iter().map(|d| (*d, 0.0)).collect();
    for trade in trades {
        if let Some(total) = pnl.get_mut(&trade.trade_date) {
            *total += trade.log_ret;
        }
    }
    pnl
}

//named daily log return columns sharing one date index
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PnlTable {
    columns: IndexMap<String, DailySeries>,
}

impl PnlTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, series: DailySeries) {
        self.columns.insert(name.to_string(), series);
    }

    pub fn column(&self, name: &str) -> Option<&DailySeries> {
        self.columns.get(name)
    }

    //union of every column's dates
    pub fn dates(&self) -> Vec<NaiveDate> {
        let all: BTreeSet<NaiveDate> = self
            .columns
            .values()
            .flat_map(|c| c.keys().copied())
            .collect();
        all.into_iter().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    //date column followed by one column per name, missing values as 0
    pub fn write_csv<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let mut wtr = csv::Writer::from_path(path)
            .with_context(|| format!("Failed to create {:?}", path))?;

        let mut header = vec!["date".to_string()];
        header.extend(self.columns.keys().cloned());
        wtr.write_record(&header)?;

        for date in self.dates() {
            let mut record = vec![date.to_string()];
            record.extend(
                self.columns
                    .values()
                    .map(|c| c.get(&date).copied().unwrap_or(0.0).to_string()),
            );
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

//risk statistics with the description of what produced them
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioStats {
    pub summary: RiskSummary,
    pub description: IndexMap<String, String>,
}

impl ScenarioStats {
    pub fn to_map(&self) -> IndexMap<String, String> {
        let mut out = self.summary.to_map();
        for (k, v) in &self.description {
            out.insert(k.clone(), v.clone());
        }
        out
    }
}

#[derive(Debug, Clone, Default)]
pub struct ScenarioReport {
    //scenario -> trades
    pub trades: IndexMap<String, Vec<Trade>>,
    //one column per scenario
    pub scenario_pnl: PnlTable,
    pub scenario_stats: IndexMap<String, ScenarioStats>,
    //strategy -> one column per scenario
    pub strategy_pnl: IndexMap<String, PnlTable>,
    //strategy -> scenario -> stats
    pub strategy_stats: IndexMap<String, IndexMap<String, ScenarioStats>>,
}

impl ScenarioReport {
    pub fn scenario_stats_table(&self) -> Table {
        let columns = self
            .scenario_stats
            .iter()
            .map(|(name, stats)| (name.clone(), stats.to_map()))
            .collect();
        stats_table(&columns)
    }

    //one strategy compared across scenarios
    pub fn strategy_stats_table(&self, strategy: &str) -> Option<Table> {
        let per_scenario = self.strategy_stats.get(strategy)?;
        let columns = per_scenario
            .iter()
            .map(|(name, stats)| (name.clone(), stats.to_map()))
            .collect();
        Some(stats_table(&columns))
    }

    pub fn total_trades(&self) -> usize {
        self.trades.values().map(Vec::len).sum()
    }
}

//runs every scenario in order, collecting trades, daily pnl and statistics
//at scenario and at strategy level. every column shares the date index of
//the first scenario's first strategy
pub fn run_scenarios(
    data: &MarketData,
    scenarios: &Scenarios,
) -> Result<ScenarioReport, DataError> {
    let mut report = ScenarioReport::default();

    let dates = match scenarios.first() {
        Some((_, strategies)) => pnl_dates(data, strategies)?,
        None => vec![],
    };

    for (name, strategies) in scenarios {
        info!("running {}", name);

        let trades = run_scenario(data, strategies)?;

        let pnl = daily_log_returns(&trades, &dates);
        let returns: Vec<f64> = pnl.values().copied().collect();
        let summary = RiskSummary::from_log_returns(&dates, &returns, Frequency::BusinessDay)
            .with_trades(trades.len());

        for strategy in strategies {
            let own: Vec<Trade> = trades
                .iter()
                .filter(|t| t.strategy == strategy.name())
                .cloned()
                .collect();
            let strategy_pnl = daily_log_returns(&own, &dates);
            let returns: Vec<f64> = strategy_pnl.values().copied().collect();
            let stats = ScenarioStats {
                summary: RiskSummary::from_log_returns(&dates, &returns, Frequency::BusinessDay)
                    .with_trades(own.len()),
                description: strategy.description(),
            };

            report
                .strategy_pnl
                .entry(strategy.name().to_string())
                .or_default()
                .insert(name, strategy_pnl);
            report
                .strategy_stats
                .entry(strategy.name().to_string())
                .or_default()
                .insert(name.clone(), stats);
        }

        report.scenario_pnl.insert(name, pnl);
        report.scenario_stats.insert(
            name.clone(),
            ScenarioStats {
                summary,
                description: IndexMap::new(),
            },
        );

        info!("{}: {} trades", name, trades.len());
        report.trades.insert(name.clone(), trades);
    }

    Ok(report)
}

#[derive(Serialize)]
struct TradeRecord<'a> {
    scenario: &'a str,
    strategy: &'a str,
    trade_date: NaiveDate,
    side: Side,
    signal: f64,
    signal_ts: DateTime<Utc>,
    entry_ts: DateTime<Utc>,
    entry_price: f64,
    entry_volume: f64,
    exit_ts: DateTime<Utc>,
    exit_price: f64,
    exit_volume: f64,
    stop_ts: Option<DateTime<Utc>>,
    stop_trigger: Option<f64>,
    log_ret: f64,
}

//one row per trade across all scenarios
pub fn write_trades_csv<P: AsRef<Path>>(
    trades: &IndexMap<String, Vec<Trade>>,
    path: P,
) -> Result<()> {
    let path = path.as_ref();
    let mut wtr =
        csv::Writer::from_path(path).with_context(|| format!("Failed to create {:?}", path))?;

    for (scenario, list) in trades {
        for t in list {
            wtr.serialize(TradeRecord {
                scenario,
                strategy: &t.strategy,
                trade_date: t.trade_date,
                side: t.side(),
                signal: t.signal,
                signal_ts: t.signal_ts,
                entry_ts: t.entry_ts,
                entry_price: t.entry_price,
                entry_volume: t.entry_volume,
                exit_ts: t.exit_ts,
                exit_price: t.exit_price,
                exit_volume: t.exit_volume,
                stop_ts: t.stop_ts,
                stop_trigger: t.stop_trigger,
                log_ret: t.log_ret,
            })?;
        }
    }

    wtr.flush()?;
    Ok(())
}
