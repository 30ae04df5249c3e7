use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

//log returns of a price line, the first return is zero.
//a non-positive price on either side of a step gives a zero return
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    if prices.is_empty() {
        return vec![];
    }

    let mut returns = Vec::with_capacity(prices.len());
    returns.push(0.0);
    for pair in prices.windows(2) {
        let ret = if pair[0] > 0.0 && pair[1] > 0.0 {
            (pair[1] / pair[0]).ln()
        } else {
            0.0
        };
        returns.push(ret);
    }
    returns
}

//synthetic price line: start * exp(cumulative log return)
pub fn price_from_log_returns(returns: &[f64], start: f64) -> Vec<f64> {
    cumulative(returns)
        .into_iter()
        .map(|c| c.exp() * start)
        .collect()
}

pub fn cumulative(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(0.0, |acc, r| {
            *acc += r;
            Some(*acc)
        })
        .collect()
}

//worst peak-to-trough fall of the cumulative log return curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    //as a log return, 0 or negative
    pub pct: f64,
    //trough
    pub date: NaiveDate,
    //last peak before the trough
    pub start: NaiveDate,
    //first recovery after the trough, or the closest approach when it never recovers
    pub end: NaiveDate,
}

//the running peak is floored at zero so a curve that starts by losing
//counts from the starting level. with no drawdown all dates are the first date
pub fn max_drawdown(dates: &[NaiveDate], returns: &[f64]) -> Option<Drawdown> {
    let first = *dates.first()?;
    let n = dates.len().min(returns.len());

    let mut peak = 0.0_f64;
    let dd: Vec<f64> = cumulative(&returns[..n])
        .into_iter()
        .map(|c| {
            peak = peak.max(c);
            c - peak
        })
        .collect();

    let (trough, pct) = dd
        .iter()
        .copied()
        .enumerate()
        .fold((0, 0.0), |best, (i, v)| if v < best.1 { (i, v) } else { best });

    if pct >= 0.0 {
        return Some(Drawdown {
            pct: 0.0,
            date: first,
            start: first,
            end: first,
        });
    }

    //first maximum scanning back from the trough is the latest peak
    let mut start = trough;
    for i in (0..=trough).rev() {
        if dd[i] > dd[start] {
            start = i;
        }
    }

    let mut end = trough;
    for i in trough..n {
        if dd[i] > dd[end] {
            end = i;
        }
    }

    Some(Drawdown {
        pct,
        date: dates[trough],
        start: dates[start],
        end: dates[end],
    })
}
