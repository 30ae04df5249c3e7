use crate::data::bar::Bar;
use crate::data::calendar::{local_date, localize};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use chrono_tz::Tz;

//time-ordered bars for one instrument at one bar frequency
#[derive(Debug, Clone)]
pub struct BarSeries {
    pub instrument: String,

    //exchange timezone used for sample and unwind clock times
    pub tz: Tz,

    //bar length, entry executes one bar after the last sample
    pub interval: Duration,

    bars: Vec<Bar>,
}

impl BarSeries {
    //creates a series, sorting bars chronologically
    pub fn new(instrument: String, tz: Tz, interval: Duration, mut bars: Vec<Bar>) -> Self {
        bars.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

        BarSeries {
            instrument,
            tz,
            interval,
            bars,
        }
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    //exchange-local date of the first bar
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.bars.first().map(|b| local_date(self.tz, b.timestamp))
    }

    //exchange-local date of the last bar
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| local_date(self.tz, b.timestamp))
    }

    //position of the latest bar at or before ts (ffill)
    pub fn index_at_or_before(&self, ts: DateTime<Utc>) -> Option<usize> {
        let after = self.bars.partition_point(|b| b.timestamp <= ts);
        after.checked_sub(1)
    }

    //position of the earliest bar at or after ts (bfill)
    pub fn index_at_or_after(&self, ts: DateTime<Utc>) -> Option<usize> {
        let idx = self.bars.partition_point(|b| b.timestamp < ts);
        (idx < self.bars.len()).then_some(idx)
    }

    //as-of lookup: latest bar at or before ts
    pub fn asof(&self, ts: DateTime<Utc>) -> Option<&Bar> {
        self.index_at_or_before(ts).map(|i| &self.bars[i])
    }

    //bars with start <= timestamp <= end
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[Bar] {
        let lo = self.bars.partition_point(|b| b.timestamp < start);
        let hi = self.bars.partition_point(|b| b.timestamp <= end);
        if lo >= hi {
            return &[];
        }
        &self.bars[lo..hi]
    }

    //bars of one local date between two clock times, inclusive
    pub fn session(&self, date: NaiveDate, from: NaiveTime, to: NaiveTime) -> &[Bar] {
        match (localize(self.tz, date, from), localize(self.tz, date, to)) {
            (Some(start), Some(end)) => self.between(start, end),
            _ => &[],
        }
    }

    //same instrument and timing with a replaced set of bars
    pub fn with_bars(&self, bars: Vec<Bar>) -> Self {
        BarSeries::new(self.instrument.clone(), self.tz, self.interval, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn bar_at(h: u32, m: u32, close: f64) -> Bar {
        let ts = New_York
            .with_ymd_and_hms(2024, 1, 8, h, m, 0)
            .unwrap()
            .with_timezone(&Utc);
        Bar::new_unchecked(ts, close, close, close, close, 100.0, "ESH4".into())
    }

    fn series() -> BarSeries {
        //deliberately unsorted
        BarSeries::new(
            "ES".into(),
            New_York,
            Duration::minutes(15),
            vec![bar_at(9, 45, 3.0), bar_at(9, 15, 1.0), bar_at(9, 30, 2.0)],
        )
    }

    fn ny(h: u32, m: u32) -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(2024, 1, 8, h, m, 0)
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn test_bars_are_sorted() {
        let s = series();
        let closes: Vec<f64> = s.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_asof_and_fills() {
        let s = series();
        assert_eq!(s.asof(ny(9, 40)).unwrap().close, 2.0);
        assert_eq!(s.asof(ny(9, 30)).unwrap().close, 2.0);
        assert!(s.asof(ny(9, 0)).is_none());
        assert_eq!(s.index_at_or_after(ny(9, 20)), Some(1));
        assert_eq!(s.index_at_or_after(ny(10, 0)), None);
        assert_eq!(s.index_at_or_before(ny(9, 14)), None);
    }

    #[test]
    fn test_session_is_inclusive() {
        let s = series();
        let date = NaiveDate::from_ymd_opt(2024, 1, 8).unwrap();
        let window = s.session(
            date,
            NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            NaiveTime::from_hms_opt(9, 45, 0).unwrap(),
        );
        assert_eq!(window.len(), 2);
        assert_eq!(s.first_date(), Some(date));
        assert_eq!(s.last_date(), Some(date));
    }
}
