//intraday e-mini signal strategies and scenario backtests

pub mod config;
pub mod data;
pub mod engine;
pub mod metrics;
pub mod signal;
pub mod strategy;

//prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{
        ConfigError, InstrumentConfig, RuleSpec, ScenarioConfiguration, StrategySpec,
    };
    pub use crate::data::{
        daily_snapshot, daily_snapshots, load_csv, synthetic_prices, Bar, BarSeries, DailySeries,
        DataError, MarketData, PriceField, SnapshotTable,
    };
    pub use crate::engine::{
        run_scenario, run_scenarios, write_trades_csv, PnlTable, ScenarioReport, Scenarios, Side,
        Trade,
    };
    pub use crate::metrics::{Frequency, RiskSummary};
    pub use crate::signal::{rise_or_fall, rise_or_fall_table};
    pub use crate::strategy::{
        NewRule1, NewRule2, NewRule3, NewRule4, NewRule5, NewRule6, NewRule7, NewRule8, Overnight,
        RiseFall, RiseFallVolume, StopPolicy, Strategy, StrategyParams,
    };
}
