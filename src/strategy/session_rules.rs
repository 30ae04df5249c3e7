use crate::data::calendar::business_days;
use crate::data::{Bar, BarSeries, DailySeries};
use crate::signal::{rolling_max, rolling_mean, rolling_min};
use crate::strategy::new_rules::THIRTY_DAY_WINDOW;
use crate::strategy::volume::HOLIDAY_VOLUME_FLOOR;
use crate::strategy::{format_times, Strategy, StrategyParams};
use chrono::NaiveDate;
use indexmap::IndexMap;
use statrs::statistics::Statistics;

//seven calendar days of direction changes
pub const CHANGES_WINDOW: usize = 5;

//share of the session range the open-to-close move must cover
pub const RANGE_SHARE: f64 = 0.7;

//applies f to the bars between the first and last current sample of every
//business day that has any
fn per_session<F>(params: &StrategyParams, bars: &BarSeries, mut f: F) -> DailySeries
where
    F: FnMut(NaiveDate, &[Bar]) -> Option<f64>,
{
    let (Some(from), Some(to)) = (params.current.first(), params.current.last()) else {
        return DailySeries::new();
    };
    let (Some(first), Some(last)) = (bars.first_date(), bars.last_date()) else {
        return DailySeries::new();
    };

    business_days(first, last)
        .into_iter()
        .filter_map(|date| {
            let session = bars.session(date, *from, *to);
            if session.is_empty() {
                return None;
            }
            f(date, session).map(|value| (date, value))
        })
        .collect()
}

//short at the rolling high, long at the rolling low, flat when both hold
//(the window is constant) or before the window fills
fn extreme_signal(series: &DailySeries, window: usize) -> DailySeries {
    let high = rolling_max(series, window);
    let low = rolling_min(series, window);

    series
        .iter()
        .map(|(date, value)| {
            let signal = match (high.get(date), low.get(date)) {
                (Some(hi), Some(lo)) if hi == lo => 0.0,
                (Some(hi), _) if value >= hi => -1.0,
                (_, Some(lo)) if value <= lo => 1.0,
                _ => 0.0,
            };
            (*date, signal)
        })
        .collect()
}

fn session_description(params: &StrategyParams, window: usize) -> IndexMap<String, String> {
    let mut descr = params.description();
    let bounds: Vec<_> = params
        .current
        .first()
        .into_iter()
        .chain(params.current.last())
        .copied()
        .collect();
    descr.insert("Session".to_string(), format_times(&bounds));
    descr.insert("Window".to_string(), window.to_string());
    descr
}

//narrow session on good volume: follow a move that covers most of the range
#[derive(Debug, Clone)]
pub struct NewRule3 {
    params: StrategyParams,
    window: usize,
}

impl NewRule3 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule3 {
            params,
            window: THIRTY_DAY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Strategy for NewRule3 {
    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let mut moves = DailySeries::new();
        let mut volumes = DailySeries::new();

        let ranges = per_session(&self.params, bars, |date, session| {
            let volume: f64 = session.iter().map(|b| b.volume).sum();
            if volume <= HOLIDAY_VOLUME_FLOOR {
                return None;
            }

            let high = session.iter().map(|b| b.high).fold(f64::MIN, f64::max);
            let low = session.iter().map(|b| b.low).fold(f64::MAX, f64::min);
            let (first, last) = (session.first()?, session.last()?);

            moves.insert(date, last.close - first.open);
            volumes.insert(date, volume);
            Some(high - low)
        });

        let range_min = rolling_min(&ranges, self.window);
        let volume_mean = rolling_mean(&volumes, self.window);

        ranges
            .iter()
            .map(|(date, range)| {
                let quiet = *range > 0.0 && range_min.get(date).is_some_and(|m| range <= m);
                let busy = match (volumes.get(date), volume_mean.get(date)) {
                    (Some(v), Some(m)) => v >= m,
                    _ => false,
                };
                let mv = moves.get(date).copied().unwrap_or(0.0);

                let signal = if !(quiet && busy) {
                    0.0
                } else if mv >= RANGE_SHARE * range {
                    1.0
                } else if mv <= -RANGE_SHARE * range {
                    -1.0
                } else {
                    0.0
                };
                (*date, signal)
            })
            .collect()
    }

    fn description(&self) -> IndexMap<String, String> {
        session_description(&self.params, self.window)
    }
}

//choppy sessions revert: count close-to-close direction changes and fade
//the extremes
#[derive(Debug, Clone)]
pub struct NewRule6 {
    params: StrategyParams,
    window: usize,
}

impl NewRule6 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule6 {
            params,
            window: CHANGES_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

//flat steps neither start nor break a run
pub fn direction_changes(closes: &[f64]) -> usize {
    let mut changes = 0;
    let mut last_dir = 0.0;

    for pair in closes.windows(2) {
        if pair[1] == pair[0] {
            continue;
        }
        let dir = (pair[1] - pair[0]).signum();
        if last_dir != 0.0 && dir != last_dir {
            changes += 1;
        }
        last_dir = dir;
    }

    changes
}

impl Strategy for NewRule6 {
    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let changes = per_session(&self.params, bars, |_, session| {
            let closes: Vec<f64> = session.iter().map(|b| b.close).collect();
            Some(direction_changes(&closes) as f64)
        });
        extreme_signal(&changes, self.window)
    }

    fn description(&self) -> IndexMap<String, String> {
        session_description(&self.params, self.window)
    }
}

//volatile sessions revert: sample standard deviation of close-to-close log
//returns, fading the extremes
#[derive(Debug, Clone)]
pub struct NewRule7 {
    params: StrategyParams,
    window: usize,
}

impl NewRule7 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule7 {
            params,
            window: THIRTY_DAY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Strategy for NewRule7 {
    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let vol = per_session(&self.params, bars, |_, session| {
            let returns: Vec<f64> = session
                .windows(2)
                .filter(|pair| pair[0].close > 0.0 && pair[1].close > 0.0)
                .map(|pair| (pair[1].close / pair[0].close).ln())
                .collect();
            if returns.len() < 2 {
                return None;
            }
            Some(returns.std_dev())
        });
        extreme_signal(&vol, self.window)
    }

    fn description(&self) -> IndexMap<String, String> {
        session_description(&self.params, self.window)
    }
}
