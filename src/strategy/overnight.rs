use crate::data::{daily_snapshots, BarSeries, DailySeries};
use crate::strategy::{Strategy, StrategyParams};

//long every day from the trade time to the unwind time, usually across the
//close into the next morning. days without a price at the trade time are skipped
#[derive(Debug, Clone)]
pub struct Overnight {
    params: StrategyParams,
}

impl Overnight {
    pub fn new(params: StrategyParams) -> Self {
        Overnight { params }
    }
}

impl Strategy for Overnight {
    fn params(&self) -> &StrategyParams {
        &self.params
    }

    fn signals(&self, bars: &BarSeries) -> DailySeries {
        daily_snapshots(bars, &[self.params.price_field], &self.params.current)
            .dates()
            .map(|date| (date, 1.0))
            .collect()
    }
}
