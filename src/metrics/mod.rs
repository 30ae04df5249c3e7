pub mod risk;
pub mod summary;
pub mod timeseries;

pub use risk::{annual_sharpe, annual_sortino, annual_volatility, downside_risk, Frequency};
pub use summary::{stats_table, RiskSummary, MIN_ANNUAL_RETURN};
pub use timeseries::{log_returns, max_drawdown, price_from_log_returns, Drawdown};
