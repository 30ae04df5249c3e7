#![allow(dead_code)]

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use emini::prelude::*;

pub const ES: &str = "CME SP500 eMini";

pub fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
}

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn ny(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    New_York
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .unwrap()
        .with_timezone(&Utc)
}

//15 minute bars from 09:00 through 16:00. closes[i] is the close of bar i,
//any bars past the end of closes repeat the last close
pub fn day_bars(date: NaiveDate, closes: &[f64]) -> Vec<Bar> {
    let count = 29;
    let mut prev = closes[0];
    (0..count)
        .map(|i| {
            let close = closes.get(i).copied().unwrap_or(*closes.last().unwrap());
            let open = prev;
            prev = close;
            Bar::new_unchecked(
                ny(date, t(9, 0)) + Duration::minutes(15 * i as i64),
                open,
                open.max(close) + 0.25,
                open.min(close) - 0.25,
                close,
                1000.0,
                "ESH4".into(),
            )
        })
        .collect()
}

pub fn series(instrument: &str, bars: Vec<Bar>) -> BarSeries {
    BarSeries::new(instrument.into(), New_York, Duration::minutes(15), bars)
}

pub fn market(series: BarSeries) -> MarketData {
    let mut data = MarketData::new();
    data.insert(series.instrument.clone(), series);
    data
}

pub fn rise_fall_params(name: &str, stop: StopPolicy) -> StrategyParams {
    StrategyParams {
        name: name.into(),
        instrument: ES.into(),
        price_field: PriceField::Close,
        stop,
        unwind: t(16, 0),
        current: vec![t(9, 0), t(9, 15), t(9, 30), t(9, 45)],
        previous: None,
        hi_lo: None,
    }
}
