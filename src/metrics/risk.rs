use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

//sampling frequency of a return series, used to annualise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    BusinessDay,
    Day,
    Weekly,
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    //periods per year
    pub fn periods(&self) -> f64 {
        match self {
            Frequency::BusinessDay => 252.0,
            Frequency::Day => 365.0,
            Frequency::Weekly => 52.0,
            Frequency::Monthly => 12.0,
            Frequency::Quarterly => 4.0,
            Frequency::Annual => 1.0,
        }
    }
}

//annual arithmetic target as a per-period log return
fn period_target(min_ann_ret: f64, freq: Frequency) -> f64 {
    min_ann_ret.ln_1p() / freq.periods()
}

//sample standard deviation, 0 for fewer than two points
fn std_dev(returns: &[f64]) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    returns.std_dev()
}

fn ratio(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator > 0.0 && denominator.is_finite() && numerator.is_finite() {
        Some(numerator / denominator)
    } else {
        None
    }
}

pub fn annual_volatility(returns: &[f64], freq: Frequency) -> f64 {
    freq.periods().sqrt() * std_dev(returns)
}

//semi-deviation: root mean square of the shortfall below rmin
pub fn downside_risk(returns: &[f64], rmin: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let sum: f64 = returns
        .iter()
        .map(|r| (r - rmin).min(0.0).powi(2))
        .sum();
    (sum / returns.len() as f64).sqrt()
}

//sqrt(p) * (mean - target) / stdev, None when the deviation is zero
pub fn annual_sharpe(returns: &[f64], min_ann_ret: f64, freq: Frequency) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let target = period_target(min_ann_ret, freq);
    let excess = returns.mean() - target;
    ratio(freq.periods().sqrt() * excess, std_dev(returns))
}

//sharpe with the semi-deviation below the target in place of the stdev
pub fn annual_sortino(returns: &[f64], min_ann_ret: f64, freq: Frequency) -> Option<f64> {
    if returns.is_empty() {
        return None;
    }
    let target = period_target(min_ann_ret, freq);
    let excess = returns.mean() - target;
    ratio(freq.periods().sqrt() * excess, downside_risk(returns, target))
}
