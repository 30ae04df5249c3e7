pub mod scenario_config;

pub use scenario_config::{
    parse_time, parse_times, ConfigError, InstrumentConfig, RuleSpec, ScenarioConfiguration,
    StrategySpec, GOLD, SP500_EMINI,
};
