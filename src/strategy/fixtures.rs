//synthetic new york session bars shared by the strategy tests

use crate::data::{Bar, BarSeries};
use chrono::{Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;

pub fn t(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

pub fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[allow(clippy::too_many_arguments)]
pub fn ny_bar(
    date: NaiveDate,
    time: NaiveTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
) -> Bar {
    let ts = New_York
        .from_local_datetime(&date.and_time(time))
        .earliest()
        .unwrap()
        .with_timezone(&Utc);
    Bar::new_unchecked(ts, open, high, low, close, volume, "ESH4".into())
}

//consecutive 15 minute bars from start, each opening at the previous close
pub fn session(date: NaiveDate, start: NaiveTime, closes: &[f64], volume: f64) -> Vec<Bar> {
    let mut prev = closes.first().copied().unwrap_or(0.0);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = prev;
            prev = close;
            ny_bar(
                date,
                start + Duration::minutes(15 * i as i64),
                open,
                open.max(close) + 0.25,
                open.min(close) - 0.25,
                close,
                volume,
            )
        })
        .collect()
}

pub fn series(bars: Vec<Bar>) -> BarSeries {
    BarSeries::new(
        "CME SP500 eMini".into(),
        New_York,
        Duration::minutes(15),
        bars,
    )
}
