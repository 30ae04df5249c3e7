use crate::data::{daily_snapshot, BarSeries, DailySeries, PriceField};
use crate::signal::{restrict_to, rolling_max};
use crate::strategy::rise_fall::RiseFall;
use crate::strategy::{Strategy, StrategyParams};
use chrono::NaiveTime;
use indexmap::IndexMap;

//sampled volume at or below this is a holiday session, not a data point
pub const HOLIDAY_VOLUME_FLOOR: f64 = 500.0;

//nine trading days, close to the ten calendar days first tested
pub const VOLUME_MAX_DAYS: usize = 9;

//keeps a flag only on days where the volume sampled at time is the rolling
//max over days trading days. holidays are dropped before the window is
//computed and the result only covers days with both a flag and a volume
pub fn volume_max_filter(
    flag: &DailySeries,
    bars: &BarSeries,
    time: NaiveTime,
    days: usize,
) -> DailySeries {
    let qty: DailySeries = daily_snapshot(bars, PriceField::Volume, time)
        .into_iter()
        .filter(|(_, qty)| *qty > HOLIDAY_VOLUME_FLOOR)
        .collect();
    let qty = restrict_to(&qty, flag);

    let max = rolling_max(&qty, days);

    qty.iter()
        .map(|(date, q)| {
            let keep = max.get(date).is_some_and(|m| q >= m);
            (*date, if keep { flag[date] } else { 0.0 })
        })
        .collect()
}

//rise/fall confirmed by a rolling 9-day high in volume at the last sample
#[derive(Debug, Clone)]
pub struct RiseFallVolume {
    base: RiseFall,
    days: usize,
}

impl RiseFallVolume {
    pub fn new(params: StrategyParams) -> Self {
        RiseFallVolume {
            base: RiseFall::new(params),
            days: VOLUME_MAX_DAYS,
        }
    }
}

impl Strategy for RiseFallVolume {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);
        volume_max_filter(&flag, bars, self.params().last_sample(), self.days)
    }

    fn description(&self) -> IndexMap<String, String> {
        let mut descr = self.params().description();
        descr.insert("VolDays".to_string(), self.days.to_string());
        descr
    }
}

//rise/fall with an optional n-day volume high filter
#[derive(Debug, Clone)]
pub struct NewRule1 {
    base: RiseFall,
    qty_days: Option<usize>,
}

impl NewRule1 {
    pub fn new(params: StrategyParams, qty_days: Option<usize>) -> Self {
        NewRule1 {
            base: RiseFall::new(params),
            qty_days,
        }
    }
}

impl Strategy for NewRule1 {
    fn params(&self) -> &StrategyParams {
        self.base.params()
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let flag = self.base.signals(bars);
        match self.qty_days {
            Some(days) => volume_max_filter(&flag, bars, self.params().last_sample(), days),
            None => flag,
        }
    }

    fn description(&self) -> IndexMap<String, String> {
        let mut descr = self.params().description();
        if let Some(days) = self.qty_days {
            descr.insert("QtyDays".to_string(), days.to_string());
        }
        descr
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{d, series, session, t};
    use crate::strategy::StopPolicy;

    fn params() -> StrategyParams {
        StrategyParams {
            name: "3".into(),
            instrument: "CME SP500 eMini".into(),
            price_field: PriceField::Close,
            stop: StopPolicy::None,
            unwind: t(16, 0),
            current: vec![t(9, 30), t(9, 45)],
            previous: None,
            hi_lo: None,
        }
    }

    fn rising_days(volumes: &[(u32, f64)]) -> BarSeries {
        let bars = volumes
            .iter()
            .flat_map(|(day, vol)| session(d(2024, 1, *day), t(9, 30), &[100.0, 101.0], *vol))
            .collect();
        series(bars)
    }

    #[test]
    fn test_volume_high_filter_with_holiday() {
        //the 11th is a thin holiday session and must not enter the window
        let bars = rising_days(&[
            (8, 1000.0),
            (9, 2000.0),
            (10, 1500.0),
            (11, 300.0),
            (12, 2500.0),
        ]);

        let flags = NewRule1::new(params(), Some(3)).signals(&bars);
        assert_eq!(flags.get(&d(2024, 1, 8)), Some(&0.0));
        assert_eq!(flags.get(&d(2024, 1, 9)), Some(&0.0));
        assert_eq!(flags.get(&d(2024, 1, 10)), Some(&0.0));
        assert_eq!(flags.get(&d(2024, 1, 11)), None);
        assert_eq!(flags.get(&d(2024, 1, 12)), Some(&1.0));
    }

    #[test]
    fn test_new_rule1_without_filter_is_plain_rise_fall() {
        let bars = rising_days(&[(8, 100.0), (9, 100.0)]);
        let flags = NewRule1::new(params(), None).signals(&bars);
        assert_eq!(flags.values().copied().collect::<Vec<_>>(), vec![1.0, 1.0]);
    }

    #[test]
    fn test_rise_fall_volume_needs_nine_days() {
        let days: Vec<(u32, f64)> = [8, 9, 10, 11, 12, 15, 16, 17, 18, 19]
            .iter()
            .enumerate()
            .map(|(i, day)| (*day, 1000.0 + 100.0 * i as f64))
            .collect();
        let strat = RiseFallVolume::new(params());
        let flags = strat.signals(&rising_days(&days));

        let live: Vec<u32> = flags
            .iter()
            .filter(|(_, v)| **v != 0.0)
            .map(|(date, _)| chrono::Datelike::day(date))
            .collect();
        assert_eq!(live, vec![18, 19]);
        assert_eq!(strat.description()["VolDays"], "9");
    }
}
