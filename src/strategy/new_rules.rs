use crate::data::calendar::business_days;
use crate::data::snapshot::column_name;
use crate::data::{daily_snapshots, BarSeries, DailySeries, PriceField};
use crate::signal::{rolling_max, rolling_min, shift_forward};
use crate::strategy::rise_fall::RiseFall;
use crate::strategy::{Strategy, StrategyParams};
use chrono::NaiveTime;
use indexmap::IndexMap;

//trading-day stand-ins for calendar lookbacks, not exact across holidays
pub const THIRTY_DAY_WINDOW: usize = 21;
pub const NINETY_DAY_WINDOW: usize = 65;

fn with_window(params: &StrategyParams, window: usize) -> IndexMap<String, String> {
    let mut descr = params.description();
    descr.insert("Window".to_string(), window.to_string());
    descr
}

//rise/fall kept only when open-to-high or open-to-low at the last sample
//hits its 30-day low
#[derive(Debug, Clone)]
pub struct NewRule2 {
    base: RiseFall,
    window: usize,
}

impl NewRule2 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule2 {
            base: RiseFall::new(params),
            window: THIRTY_DAY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Strategy for NewRule2 {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);
        let Some(last) = self.params().current.last() else {
            return flag;
        };

        let ohl = daily_snapshots(
            bars,
            &[PriceField::Open, PriceField::High, PriceField::Low],
            &[*last],
        );

        let mut open_high = DailySeries::new();
        let mut open_low = DailySeries::new();
        for (date, row) in ohl.rows() {
            if !flag.contains_key(&date) {
                continue;
            }
            if let [Some(open), Some(high), Some(low)] = row {
                open_high.insert(date, high - open);
                open_low.insert(date, open - low);
            }
        }

        let min_high = rolling_min(&open_high, self.window);
        let min_low = rolling_min(&open_low, self.window);

        open_high
            .iter()
            .map(|(date, hi)| {
                let hit = match (min_high.get(date), min_low.get(date), open_low.get(date)) {
                    (Some(mh), Some(ml), Some(lo)) => hi <= mh || lo <= ml,
                    _ => false,
                };
                (*date, if hit { flag[date] } else { 0.0 })
            })
            .collect()
    }

    fn description(&self) -> IndexMap<String, String> {
        with_window(self.params(), self.window)
    }
}

//longs only: yesterday's move between the previous-day samples is its
//90-day low and the rise/fall test passes
#[derive(Debug, Clone)]
pub struct NewRule4 {
    base: RiseFall,
    window: usize,
}

impl NewRule4 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule4 {
            base: RiseFall::new(params),
            window: NINETY_DAY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Strategy for NewRule4 {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);
        let params = self.params();
        let Some(previous) = params.previous.as_ref().filter(|p| !p.is_empty()) else {
            return flag;
        };

        let prev = daily_snapshots(bars, &[params.price_field], previous)
            .lag_onto(flag.keys().copied());
        let first_col = column_name(params.price_field, previous[0]);
        let last_col = column_name(params.price_field, previous[previous.len() - 1]);

        let days: Vec<_> = prev.dates().collect();

        let diff: DailySeries = days
            .iter()
            .filter_map(|date| {
                let start = prev.value(*date, &first_col)?;
                let end = prev.value(*date, &last_col)?;
                Some((*date, end - start))
            })
            .collect();
        let diff_min = rolling_min(&diff, self.window);

        days.iter()
            .map(|date| {
                let signal = flag[date];
                let hit = match (diff.get(date), diff_min.get(date)) {
                    (Some(x), Some(m)) => x <= m,
                    _ => false,
                };
                (*date, if signal > 0.0 && hit { signal } else { 0.0 })
            })
            .collect()
    }

    fn description(&self) -> IndexMap<String, String> {
        with_window(self.params(), self.window)
    }
}

//longs only: yesterday's session high is a 30-day high and the rise/fall
//test passes
#[derive(Debug, Clone)]
pub struct NewRule5 {
    base: RiseFall,
    window: usize,
    high_from: NaiveTime,
    high_to: NaiveTime,
}

impl NewRule5 {
    pub fn new(params: StrategyParams, high_from: NaiveTime, high_to: NaiveTime) -> Self {
        NewRule5 {
            base: RiseFall::new(params),
            window: THIRTY_DAY_WINDOW,
            high_from,
            high_to,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    //highest high between high_from and high_to for each business day with bars
    fn session_highs(&self, bars: &BarSeries) -> DailySeries {
        let (Some(first), Some(last)) = (bars.first_date(), bars.last_date()) else {
            return DailySeries::new();
        };

        business_days(first, last)
            .into_iter()
            .filter_map(|date| {
                let session = bars.session(date, self.high_from, self.high_to);
                session
                    .iter()
                    .map(|b| b.high)
                    .reduce(f64::max)
                    .map(|high| (date, high))
            })
            .collect()
    }
}

impl Strategy for NewRule5 {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);

        let prev_high = shift_forward(&self.session_highs(bars));
        let high_max = rolling_max(&prev_high, self.window);

        prev_high
            .iter()
            .filter(|(date, _)| flag.contains_key(date))
            .map(|(date, high)| {
                let signal = flag[date];
                let hit = high_max.get(date).is_some_and(|m| high >= m);
                (*date, if signal > 0.0 && hit { signal } else { 0.0 })
            })
            .collect()
    }

    fn description(&self) -> IndexMap<String, String> {
        let mut descr = with_window(self.params(), self.window);
        descr.insert(
            "HighWindow".to_string(),
            format!(
                "{}-{}",
                self.high_from.format("%H:%M"),
                self.high_to.format("%H:%M")
            ),
        );
        descr
    }
}

//overnight move (previous close sample to first current sample) in the
//signal's direction that is also its 30-day extreme
#[derive(Debug, Clone)]
pub struct NewRule8 {
    base: RiseFall,
    window: usize,
}

impl NewRule8 {
    pub fn new(params: StrategyParams) -> Self {
        NewRule8 {
            base: RiseFall::new(params),
            window: THIRTY_DAY_WINDOW,
        }
    }

    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

impl Strategy for NewRule8 {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);
        let params = self.params();
        let (Some(prev_time), Some(cur_time)) = (
            params.previous.as_ref().and_then(|p| p.last()),
            params.current.first(),
        ) else {
            return flag;
        };

        let field = params.price_field;
        let cur = daily_snapshots(bars, &[field], &[*cur_time]);
        let prev = daily_snapshots(bars, &[field], &[*prev_time]).lag_onto(cur.dates());
        let samples = prev.outer_join(&cur);

        let days: Vec<_> = samples.dates().filter(|d| flag.contains_key(d)).collect();

        let diff: DailySeries = days
            .iter()
            .filter_map(|date| match samples.row(*date) {
                Some([Some(before), Some(after)]) => Some((*date, after - before)),
                _ => None,
            })
            .collect();
        let up = rolling_max(&diff, self.window);
        let down = rolling_min(&diff, self.window);

        days.iter()
            .map(|date| {
                let signal = flag[date];
                let out = match (diff.get(date), up.get(date), down.get(date)) {
                    (Some(x), Some(hi), _) if signal > 0.0 && *x > 0.0 && x >= hi => 1.0,
                    (Some(x), _, Some(lo)) if signal < 0.0 && *x < 0.0 && x <= lo => -1.0,
                    _ => 0.0,
                };
                (*date, out)
            })
            .collect()
    }

    fn description(&self) -> IndexMap<String, String> {
        with_window(self.params(), self.window)
    }
}
