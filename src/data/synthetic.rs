use crate::data::bar::Bar;
use crate::data::series::BarSeries;
use crate::metrics::timeseries::{log_returns, price_from_log_returns};

//starting level of the synthetic close
pub const SYNTHETIC_BASE: f64 = 2000.0;

fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

//rebuilds a continuous series from bar-to-bar log returns so contract rolls
//do not show up as price jumps. the return across a roll is taken as zero;
//open, high and low keep their log offset from the close of the same bar
pub fn synthetic_prices(series: &BarSeries, base: f64) -> BarSeries {
    let bars = series.bars();

    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let mut returns = log_returns(&closes);
    for i in 1..bars.len() {
        if bars[i].contract != bars[i - 1].contract {
            returns[i] = 0.0;
        }
    }

    let out = bars
        .iter()
        .zip(price_from_log_returns(&returns, base))
        .map(|(bar, close)| {
            let level = |px: f64| {
                if bar.close > 0.0 && px > 0.0 {
                    round4(px / bar.close * close)
                } else {
                    round4(close)
                }
            };

            Bar::new_unchecked(
                bar.timestamp,
                level(bar.open),
                level(bar.high),
                level(bar.low),
                round4(close),
                bar.volume,
                bar.contract.clone(),
            )
        })
        .collect();

    series.with_bars(out)
}
