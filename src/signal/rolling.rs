use crate::data::DailySeries;
use chrono::NaiveDate;
use std::collections::{BTreeMap, VecDeque};

//statistic computed over a trailing window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RollingStat {
    Max,
    Min,
    Mean,
}

//trailing-window statistic including the current point.
//none until the window is full or while a value in it is not finite
pub fn rolling(values: &[f64], window: usize, stat: RollingStat) -> Vec<Option<f64>> {
    let mut out = Vec::with_capacity(values.len());
    if window == 0 {
        out.resize(values.len(), None);
        return out;
    }

    let mut buf: VecDeque<f64> = VecDeque::with_capacity(window);

    for &value in values {
        if buf.len() == window {
            buf.pop_front();
        }
        buf.push_back(value);

        if buf.len() < window || buf.iter().any(|v| !v.is_finite()) {
            out.push(None);
            continue;
        }

        let result = match stat {
            RollingStat::Max => buf.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            RollingStat::Min => buf.iter().copied().fold(f64::INFINITY, f64::min),
            RollingStat::Mean => buf.iter().sum::<f64>() / window as f64,
        };
        out.push(Some(result));
    }

    out
}

//rolling statistic of an ordered daily series, warm-up days omitted
pub fn rolling_series(series: &DailySeries, window: usize, stat: RollingStat) -> DailySeries {
    let values: Vec<f64> = series.values().copied().collect();
    series
        .keys()
        .zip(rolling(&values, window, stat))
        .filter_map(|(date, value)| value.map(|v| (*date, v)))
        .collect()
}

pub fn rolling_max(series: &DailySeries, window: usize) -> DailySeries {
    rolling_series(series, window, RollingStat::Max)
}

pub fn rolling_min(series: &DailySeries, window: usize) -> DailySeries {
    rolling_series(series, window, RollingStat::Min)
}

pub fn rolling_mean(series: &DailySeries, window: usize) -> DailySeries {
    rolling_series(series, window, RollingStat::Mean)
}

//each value moves to the next date of the series (t -> t+1); the first date drops out
pub fn shift_forward(series: &DailySeries) -> DailySeries {
    let dates: Vec<NaiveDate> = series.keys().copied().collect();
    series
        .values()
        .zip(dates.iter().skip(1))
        .map(|(value, date)| (*date, *value))
        .collect()
}

//keeps only the dates also present in other
pub fn restrict_to<T>(series: &DailySeries, other: &BTreeMap<NaiveDate, T>) -> DailySeries {
    series
        .iter()
        .filter(|(date, _)| other.contains_key(date))
        .map(|(date, value)| (*date, *value))
        .collect()
}
