use crate::data::{load_csv, synthetic_prices, DataError, MarketData, PriceField, SYNTHETIC_BASE};
use crate::engine::Scenarios;
use crate::strategy::{
    NewRule1, NewRule2, NewRule3, NewRule4, NewRule5, NewRule6, NewRule7, NewRule8, Overnight,
    RiseFall, RiseFallVolume, StopPolicy, Strategy, StrategyParams,
};
use chrono::{Duration, NaiveTime};
use chrono_tz::Tz;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

pub const SP500_EMINI: &str = "CME SP500 eMini";
pub const GOLD: &str = "COMEX Gold 100oz";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid sample time '{0}', expected HH:MM")]
    BadTime(String),

    #[error("strategy {0} has no current sample times")]
    NoSamples(String),

    #[error("unknown timezone {0}")]
    UnknownTimezone(String),

    #[error("strategy {strategy}: stop percentage must be positive, got {pct}")]
    BadStop { strategy: String, pct: f64 },

    #[error("scenario {scenario}: instrument {instrument} is not configured")]
    UnknownInstrument { scenario: String, instrument: String },

    #[error("bar_minutes must be positive, got {0}")]
    BadInterval(i64),

    #[error("cannot access {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration json")]
    Json(#[from] serde_json::Error),
}

//parses "09:30, 09:45" style lists
pub fn parse_times(s: &str) -> Result<Vec<NaiveTime>, ConfigError> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(parse_time)
        .collect()
}

pub fn parse_time(s: &str) -> Result<NaiveTime, ConfigError> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| ConfigError::BadTime(s.to_string()))
}

//strategy kind with its kind-specific parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleSpec {
    RiseFall,
    RiseFallVolume,
    Overnight,
    NewRule1 {
        #[serde(default)]
        qty_days: Option<usize>,
    },
    NewRule2 {
        #[serde(default)]
        window: Option<usize>,
    },
    NewRule3 {
        #[serde(default)]
        window: Option<usize>,
    },
    NewRule4 {
        #[serde(default)]
        window: Option<usize>,
    },
    NewRule5 {
        #[serde(default)]
        window: Option<usize>,
        #[serde(default)]
        high_from: Option<String>,
        #[serde(default)]
        high_to: Option<String>,
    },
    NewRule6 {
        #[serde(default)]
        window: Option<usize>,
    },
    NewRule7 {
        #[serde(default)]
        window: Option<usize>,
    },
    NewRule8 {
        #[serde(default)]
        window: Option<usize>,
    },
}

impl RuleSpec {
    //sample times used when the strategy entry leaves them out
    pub fn default_current(&self) -> Option<&'static str> {
        match self {
            RuleSpec::NewRule2 { .. } => Some("09:45, 10:00"),
            RuleSpec::NewRule4 { .. } | RuleSpec::NewRule5 { .. } => Some("09:30, 09:45"),
            RuleSpec::NewRule8 { .. } => Some("09:30"),
            RuleSpec::NewRule3 { .. } | RuleSpec::NewRule6 { .. } | RuleSpec::NewRule7 { .. } => {
                Some("09:00, 12:00")
            }
            _ => None,
        }
    }

    pub fn default_previous(&self) -> Option<&'static str> {
        match self {
            RuleSpec::NewRule4 { .. } => Some("09:30, 16:00"),
            RuleSpec::NewRule5 { .. } | RuleSpec::NewRule8 { .. } => Some("16:00"),
            _ => None,
        }
    }
}

fn default_price_field() -> PriceField {
    PriceField::Close
}

fn default_unwind() -> String {
    "16:00".to_string()
}

//one strategy entry of a scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySpec {
    pub name: String,
    pub instrument: String,

    #[serde(default = "default_price_field")]
    pub price_field: PriceField,

    #[serde(default)]
    pub stop: StopPolicy,

    #[serde(default = "default_unwind")]
    pub unwind: String,

    //comma separated HH:MM lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hi_lo: Option<String>,

    pub rule: RuleSpec,
}

impl StrategySpec {
    pub fn new(name: &str, instrument: &str, stop: StopPolicy, rule: RuleSpec) -> Self {
        StrategySpec {
            name: name.to_string(),
            instrument: instrument.to_string(),
            price_field: PriceField::Close,
            stop,
            unwind: default_unwind(),
            current: None,
            previous: None,
            hi_lo: None,
            rule,
        }
    }

    pub fn unwind(mut self, unwind: &str) -> Self {
        self.unwind = unwind.to_string();
        self
    }

    pub fn current(mut self, times: &str) -> Self {
        self.current = Some(times.to_string());
        self
    }

    pub fn previous(mut self, times: &str) -> Self {
        self.previous = Some(times.to_string());
        self
    }

    pub fn hi_lo(mut self, times: &str) -> Self {
        self.hi_lo = Some(times.to_string());
        self
    }

    pub fn params(&self) -> Result<StrategyParams, ConfigError> {
        match self.stop {
            StopPolicy::Simple { pct } | StopPolicy::Trailing { pct } if !(pct > 0.0) => {
                return Err(ConfigError::BadStop {
                    strategy: self.name.clone(),
                    pct,
                });
            }
            _ => {}
        }

        let current = match self.current.as_deref().or(self.rule.default_current()) {
            Some(times) => parse_times(times)?,
            None => vec![],
        };
        if current.is_empty() {
            return Err(ConfigError::NoSamples(self.name.clone()));
        }

        let previous = self
            .previous
            .as_deref()
            .or(self.rule.default_previous())
            .map(parse_times)
            .transpose()?;
        let hi_lo = self.hi_lo.as_deref().map(parse_times).transpose()?;

        Ok(StrategyParams {
            name: self.name.clone(),
            instrument: self.instrument.clone(),
            price_field: self.price_field,
            stop: self.stop,
            unwind: parse_time(&self.unwind)?,
            current,
            previous,
            hi_lo,
        })
    }

    pub fn build(&self) -> Result<Box<dyn Strategy>, ConfigError> {
        let params = self.params()?;

        let strategy: Box<dyn Strategy> = match &self.rule {
            RuleSpec::RiseFall => Box::new(RiseFall::new(params)),
            RuleSpec::RiseFallVolume => Box::new(RiseFallVolume::new(params)),
            RuleSpec::Overnight => Box::new(Overnight::new(params)),
            RuleSpec::NewRule1 { qty_days } => Box::new(NewRule1::new(params, *qty_days)),
            RuleSpec::NewRule2 { window } => {
                let rule = NewRule2::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule3 { window } => {
                let rule = NewRule3::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule4 { window } => {
                let rule = NewRule4::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule5 {
                window,
                high_from,
                high_to,
            } => {
                let from = parse_time(high_from.as_deref().unwrap_or("09:45"))?;
                let to = parse_time(high_to.as_deref().unwrap_or("16:00"))?;
                let rule = NewRule5::new(params, from, to);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule6 { window } => {
                let rule = NewRule6::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule7 { window } => {
                let rule = NewRule7::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
            RuleSpec::NewRule8 { window } => {
                let rule = NewRule8::new(params);
                Box::new(match window {
                    Some(w) => rule.with_window(*w),
                    None => rule,
                })
            }
        };

        Ok(strategy)
    }
}

//where one instrument's bars come from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub path: PathBuf,

    //rebuild a roll-free price line from log returns after loading
    #[serde(default)]
    pub synthetic: bool,
}

fn default_timezone() -> String {
    "America/New_York".to_string()
}

fn default_bar_minutes() -> i64 {
    15
}

//complete scenario run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioConfiguration {
    #[serde(default = "default_timezone")]
    pub timezone: String,

    #[serde(default = "default_bar_minutes")]
    pub bar_minutes: i64,

    pub instruments: IndexMap<String, InstrumentConfig>,

    pub scenarios: IndexMap<String, Vec<StrategySpec>>,
}

impl Default for ScenarioConfiguration {
    //the stop / no-stop and hi-lo / no hi-lo grid over the e-mini with a
    //gold overnight comparison, then the day rules with and without a stop
    fn default() -> Self {
        let mut instruments = IndexMap::new();
        instruments.insert(
            SP500_EMINI.to_string(),
            InstrumentConfig {
                path: PathBuf::from("data/es_15min.csv"),
                synthetic: false,
            },
        );
        instruments.insert(
            GOLD.to_string(),
            InstrumentConfig {
                path: PathBuf::from("data/gc_15min.csv"),
                synthetic: false,
            },
        );

        let mut scenarios = IndexMap::new();
        for (stop_label, stop) in [
            ("in-stop", StopPolicy::Simple { pct: 0.008 }),
            ("no-stop", StopPolicy::None),
        ] {
            for hi_lo in [false, true] {
                let name = if hi_lo {
                    format!("unw 16:00, {}, hilo, strat1 09:45", stop_label)
                } else {
                    format!("unw 16:00, {}, strat1 09:45", stop_label)
                };
                scenarios.insert(name, default_strategies(&stop, hi_lo));
            }
        }
        for (stop_label, stop) in [
            ("in-stop", StopPolicy::Simple { pct: 0.008 }),
            ("no-stop", StopPolicy::None),
        ] {
            scenarios.insert(
                format!("unw 16:00, day rules, {}", stop_label),
                day_rule_strategies(&stop),
            );
        }

        ScenarioConfiguration {
            timezone: default_timezone(),
            bar_minutes: default_bar_minutes(),
            instruments,
            scenarios,
        }
    }
}

fn default_strategies(stop: &StopPolicy, hi_lo: bool) -> Vec<StrategySpec> {
    let band = |spec: StrategySpec| if hi_lo { spec.hi_lo("09:30, 09:45") } else { spec };

    vec![
        band(
            StrategySpec::new("1", SP500_EMINI, *stop, RuleSpec::RiseFall)
                .current("09:00, 09:15, 09:30, 09:45"),
        ),
        band(
            StrategySpec::new("2", SP500_EMINI, *stop, RuleSpec::RiseFall)
                .previous("09:45, 15:15, 16:00")
                .current("09:30, 09:45"),
        ),
        band(
            StrategySpec::new("3", SP500_EMINI, *stop, RuleSpec::RiseFallVolume)
                .current("09:30, 09:45"),
        ),
        StrategySpec::new("4", SP500_EMINI, *stop, RuleSpec::Overnight)
            .current("16:00")
            .unwind("09:30"),
        StrategySpec::new("5", GOLD, *stop, RuleSpec::Overnight)
            .current("16:00")
            .unwind("09:30"),
    ]
}

//rise/fall across the open against the new day rules on their default samples
fn day_rule_strategies(stop: &StopPolicy) -> Vec<StrategySpec> {
    vec![
        StrategySpec::new("1", SP500_EMINI, *stop, RuleSpec::RiseFall)
            .previous("16:00")
            .current("09:30, 09:45"),
        StrategySpec::new("2", SP500_EMINI, *stop, RuleSpec::NewRule2 { window: None }),
        StrategySpec::new("4", SP500_EMINI, *stop, RuleSpec::NewRule4 { window: None }),
        StrategySpec::new(
            "5",
            SP500_EMINI,
            *stop,
            RuleSpec::NewRule5 {
                window: None,
                high_from: None,
                high_to: None,
            },
        ),
        StrategySpec::new("8", SP500_EMINI, *stop, RuleSpec::NewRule8 { window: None }),
    ]
}

impl ScenarioConfiguration {
    //load configuration from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ScenarioConfiguration = serde_json::from_str(&contents)?;
        Ok(config)
    }

    //save configuration to a JSON file
    pub fn to_json_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn tz(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::UnknownTimezone(self.timezone.clone()))
    }

    //every scenario's strategies, checked against the configured instruments
    pub fn build_scenarios(&self) -> Result<Scenarios, ConfigError> {
        self.tz()?;
        if self.bar_minutes <= 0 {
            return Err(ConfigError::BadInterval(self.bar_minutes));
        }

        let mut out = Scenarios::new();

        for (scenario, specs) in &self.scenarios {
            let mut strategies = Vec::with_capacity(specs.len());
            for spec in specs {
                if !self.instruments.contains_key(&spec.instrument) {
                    return Err(ConfigError::UnknownInstrument {
                        scenario: scenario.clone(),
                        instrument: spec.instrument.clone(),
                    });
                }
                strategies.push(spec.build()?);
            }
            out.insert(scenario.clone(), strategies);
        }

        Ok(out)
    }

    //loads every instrument, optionally rebuilding synthetic prices for all
    pub fn load_market_data(&self, force_synthetic: bool) -> Result<MarketData, DataError> {
        let tz = self
            .timezone
            .parse::<Tz>()
            .map_err(|_| DataError::UnknownTimezone(self.timezone.clone()))?;
        let interval = Duration::minutes(self.bar_minutes.max(1));

        let mut data = MarketData::new();
        for (name, instrument) in &self.instruments {
            let series = load_csv(&instrument.path, name, tz, interval)?;
            let series = if instrument.synthetic || force_synthetic {
                info!("{}: rebuilding synthetic prices", name);
                synthetic_prices(&series, SYNTHETIC_BASE)
            } else {
                series
            };
            data.insert(name.clone(), series);
        }

        Ok(data)
    }
}
