use crate::data::{daily_snapshots, BarSeries, DailySeries, PriceField};
use crate::signal::rise_or_fall_table;
use crate::strategy::{Strategy, StrategyParams};

//goes with the market when the sampled price moves the same way at every sample
//eg 09:00, 09:15, 09:30, 09:45 all rising -> long at 10:00, flat at 16:00
#[derive(Debug, Clone)]
pub struct RiseFall {
    params: StrategyParams,
}

impl RiseFall {
    pub fn new(params: StrategyParams) -> Self {
        RiseFall { params }
    }
}

impl Strategy for RiseFall {
    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        let params = &self.params;
        let current = daily_snapshots(bars, &[params.price_field], &params.current);

        //previous day's samples come first, taken from the last earlier day
        //that has them
        let samples = match &params.previous {
            Some(previous) => daily_snapshots(bars, &[params.price_field], previous)
                .lag_onto(current.dates())
                .prefixed("prev")
                .outer_join(&current),
            None => current,
        };

        let mut out = rise_or_fall_table(&samples);

        //a rise only counts if the lows rose too, a fall only if the highs fell
        if let Some(hi_lo) = &params.hi_lo {
            let lows = rise_or_fall_table(&daily_snapshots(bars, &[PriceField::Low], hi_lo));
            let highs = rise_or_fall_table(&daily_snapshots(bars, &[PriceField::High], hi_lo));

            for (date, value) in out.iter_mut() {
                let confirmed = if *value > 0.0 {
                    lows.get(date).is_some_and(|v| *v > 0.0)
                } else if *value < 0.0 {
                    highs.get(date).is_some_and(|v| *v < 0.0)
                } else {
                    true
                };

                if !confirmed {
                    *value = 0.0;
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::fixtures::{d, ny_bar, series, session, t};
    use crate::strategy::StopPolicy;

    fn params() -> StrategyParams {
        StrategyParams {
            name: "1".into(),
            instrument: "CME SP500 eMini".into(),
            price_field: PriceField::Close,
            stop: StopPolicy::None,
            unwind: t(16, 0),
            current: vec![t(9, 0), t(9, 15), t(9, 30), t(9, 45)],
            previous: None,
            hi_lo: None,
        }
    }

    #[test]
    fn test_signals_follow_consistent_moves() {
        let mut bars = session(d(2024, 1, 8), t(9, 0), &[100.0, 101.0, 102.0, 103.0], 1000.0);
        bars.extend(session(d(2024, 1, 9), t(9, 0), &[103.0, 102.0, 101.0, 100.0], 1000.0));
        bars.extend(session(d(2024, 1, 10), t(9, 0), &[100.0, 101.0, 100.5, 102.0], 1000.0));

        let flags = RiseFall::new(params()).signals(&series(bars));
        assert_eq!(flags.get(&d(2024, 1, 8)), Some(&1.0));
        assert_eq!(flags.get(&d(2024, 1, 9)), Some(&-1.0));
        assert_eq!(flags.get(&d(2024, 1, 10)), Some(&0.0));
    }

    #[test]
    fn test_previous_day_samples_lead() {
        let mut p = params();
        p.previous = Some(vec![t(15, 45)]);
        p.current = vec![t(9, 30), t(9, 45)];

        let mut bars = session(d(2024, 1, 8), t(9, 30), &[100.0, 101.0], 1000.0);
        bars.push(ny_bar(d(2024, 1, 8), t(15, 45), 99.0, 99.5, 98.5, 99.0, 1000.0));
        bars.extend(session(d(2024, 1, 9), t(9, 30), &[100.0, 101.0], 1000.0));
        bars.push(ny_bar(d(2024, 1, 9), t(15, 45), 101.5, 102.5, 101.0, 102.0, 1000.0));

        let flags = RiseFall::new(p).signals(&series(bars));
        //nothing before the first day to compare against
        assert_eq!(flags.get(&d(2024, 1, 8)), Some(&0.0));
        //99.0 -> 100.0 -> 101.0
        assert_eq!(flags.get(&d(2024, 1, 9)), Some(&1.0));
    }

    #[test]
    fn test_hi_lo_band_zeroes_unconfirmed_rise() {
        let mut p = params();
        p.current = vec![t(9, 30), t(9, 45)];
        p.hi_lo = Some(vec![t(9, 30), t(9, 45)]);

        let date = d(2024, 1, 8);
        //close rises but the 09:45 bar's low undercuts the 09:30 low
        let bars = vec![
            ny_bar(date, t(9, 30), 100.0, 100.5, 99.5, 100.0, 1000.0),
            ny_bar(date, t(9, 45), 100.0, 101.5, 99.0, 101.0, 1000.0),
        ];
        let flags = RiseFall::new(p.clone()).signals(&series(bars));
        assert_eq!(flags.get(&date), Some(&0.0));

        let bars = vec![
            ny_bar(date, t(9, 30), 100.0, 100.5, 99.5, 100.0, 1000.0),
            ny_bar(date, t(9, 45), 100.0, 101.5, 99.8, 101.0, 1000.0),
        ];
        let flags = RiseFall::new(p).signals(&series(bars));
        assert_eq!(flags.get(&date), Some(&1.0));
    }

    #[test]
    fn test_previous_sample_reaches_day_without_its_own() {
        let mut p = params();
        p.previous = Some(vec![t(16, 0)]);
        p.current = vec![t(9, 30), t(9, 45)];

        //the 9th closes early, its own 16:00 sample is missing
        let mut bars = session(d(2024, 1, 8), t(9, 30), &[100.0, 101.0], 1000.0);
        bars.push(ny_bar(d(2024, 1, 8), t(16, 0), 99.0, 99.5, 98.5, 99.0, 1000.0));
        bars.extend(session(d(2024, 1, 9), t(9, 30), &[100.0, 101.0], 1000.0));

        let flags = RiseFall::new(p).signals(&series(bars));
        //99.0 -> 100.0 -> 101.0
        assert_eq!(flags.get(&d(2024, 1, 9)), Some(&1.0));
    }

    #[test]
    fn test_hi_lo_band_zeroes_unconfirmed_fall() {
        let mut p = params();
        p.current = vec![t(9, 30), t(9, 45)];
        p.hi_lo = Some(vec![t(9, 30), t(9, 45)]);

        let date = d(2024, 1, 8);
        //close falls but the 09:45 bar's high tops the 09:30 high
        let bars = vec![
            ny_bar(date, t(9, 30), 100.0, 100.5, 99.5, 100.0, 1000.0),
            ny_bar(date, t(9, 45), 100.0, 100.8, 98.5, 99.0, 1000.0),
        ];
        let flags = RiseFall::new(p.clone()).signals(&series(bars));
        assert_eq!(flags.get(&date), Some(&0.0));

        let bars = vec![
            ny_bar(date, t(9, 30), 100.0, 100.5, 99.5, 100.0, 1000.0),
            ny_bar(date, t(9, 45), 100.0, 100.2, 98.5, 99.0, 1000.0),
        ];
        let flags = RiseFall::new(p).signals(&series(bars));
        assert_eq!(flags.get(&date), Some(&-1.0));
    }
}
