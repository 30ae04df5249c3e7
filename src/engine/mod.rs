pub mod scenario;
pub mod trade;

pub use scenario::{
    daily_log_returns, pnl_dates, run_scenario, run_scenarios, write_trades_csv, PnlTable,
    Scenario, ScenarioReport, ScenarioStats, Scenarios,
};
pub use trade::{log_return, Side, Trade};
