pub mod rolling;

use crate::data::{DailySeries, SnapshotTable};

pub use rolling::{
    restrict_to, rolling, rolling_max, rolling_mean, rolling_min, rolling_series,
    shift_forward, RollingStat,
};

fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

//directional consistency of one ordered set of samples.
//+1 if every step rose, -1 if every step fell, 0 otherwise.
//a missing or non-finite sample, or fewer than two samples, gives 0
pub fn rise_or_fall_values(values: &[Option<f64>]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }

    let steps = (values.len() - 1) as f64;
    let mut sum = 0.0;

    for pair in values.windows(2) {
        match (pair[0], pair[1]) {
            (Some(a), Some(b)) if a.is_finite() && b.is_finite() => sum += sign(b - a),
            _ => return 0.0,
        }
    }

    if sum.abs() < steps {
        0.0
    } else {
        sum / steps
    }
}

//signal per date of the first series, comparing series in order
pub fn rise_or_fall(series: &[&DailySeries]) -> DailySeries {
    let Some(first) = series.first() else {
        return DailySeries::new();
    };

    first
        .keys()
        .map(|date| {
            let values: Vec<Option<f64>> = series.iter().map(|s| s.get(date).copied()).collect();
            (*date, rise_or_fall_values(&values))
        })
        .collect()
}

//signal per row of the table, comparing columns left to right
pub fn rise_or_fall_table(table: &SnapshotTable) -> DailySeries {
    table
        .rows()
        .map(|(date, row)| (date, rise_or_fall_values(row)))
        .collect()
}
