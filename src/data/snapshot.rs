use crate::data::bar::PriceField;
use crate::data::calendar::{business_days, localize};
use crate::data::series::BarSeries;
use chrono::{Duration, NaiveDate, NaiveTime};
use std::collections::BTreeMap;

//one value per business day, ordered by date
pub type DailySeries = BTreeMap<NaiveDate, f64>;

//gap between an early close (13:30) and the regular close (17:00)
pub fn snapshot_tolerance() -> Duration {
    Duration::hours(3) + Duration::minutes(30)
}

//column label for a sampled field, eg "clsPrc-09:45"
pub fn column_name(field: PriceField, time: NaiveTime) -> String {
    format!("{}-{}", field.label(), time.format("%H:%M"))
}

//date-keyed table of sampled values, one column per (field, time)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapshotTable {
    columns: Vec<String>,
    rows: BTreeMap<NaiveDate, Vec<Option<f64>>>,
}

impl SnapshotTable {
    pub fn new(columns: Vec<String>) -> Self {
        SnapshotTable {
            columns,
            rows: BTreeMap::new(),
        }
    }

    //adds or replaces a row, panics in debug if the width is wrong
    pub fn insert(&mut self, date: NaiveDate, values: Vec<Option<f64>>) {
        debug_assert_eq!(values.len(), self.columns.len());
        self.rows.insert(date, values);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.rows.keys().copied()
    }

    pub fn rows(&self) -> impl Iterator<Item = (NaiveDate, &[Option<f64>])> + '_ {
        self.rows.iter().map(|(d, v)| (*d, v.as_slice()))
    }

    pub fn row(&self, date: NaiveDate) -> Option<&[Option<f64>]> {
        self.rows.get(&date).map(|v| v.as_slice())
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    //single cell, none if the date, the column or the value is missing
    pub fn value(&self, date: NaiveDate, column: &str) -> Option<f64> {
        let idx = self.column_index(column)?;
        self.rows.get(&date).and_then(|row| row[idx])
    }

    pub fn column_at(&self, idx: usize) -> DailySeries {
        self.rows
            .iter()
            .filter_map(|(d, row)| row.get(idx).copied().flatten().map(|v| (*d, v)))
            .collect()
    }

    //previous available day: each target date takes the row of the latest
    //date strictly before it, all missing when there is none
    pub fn lag_onto<I>(&self, dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        let width = self.columns.len();
        let rows = dates
            .into_iter()
            .map(|date| {
                let row = self
                    .rows
                    .range(..date)
                    .next_back()
                    .map(|(_, row)| row.clone())
                    .unwrap_or_else(|| vec![None; width]);
                (date, row)
            })
            .collect();

        SnapshotTable {
            columns: self.columns.clone(),
            rows,
        }
    }

    //renames every column to "{prefix}-{column}"
    pub fn prefixed(mut self, prefix: &str) -> Self {
        self.columns = self
            .columns
            .iter()
            .map(|c| format!("{}-{}", prefix, c))
            .collect();
        self
    }

    //union of dates, columns of self followed by columns of other
    pub fn outer_join(&self, other: &SnapshotTable) -> Self {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());

        let left_width = self.columns.len();
        let right_width = other.columns.len();
        let mut rows = BTreeMap::new();

        for date in self.rows.keys().chain(other.rows.keys()) {
            if rows.contains_key(date) {
                continue;
            }
            let mut row = self
                .rows
                .get(date)
                .cloned()
                .unwrap_or_else(|| vec![None; left_width]);
            row.extend(
                other
                    .rows
                    .get(date)
                    .cloned()
                    .unwrap_or_else(|| vec![None; right_width]),
            );
            rows.insert(*date, row);
        }

        SnapshotTable { columns, rows }
    }

    //drops every row with at least one missing value
    pub fn drop_missing(mut self) -> Self {
        self.rows.retain(|_, row| row.iter().all(|v| v.is_some()));
        self
    }
}

//one value per business day for field sampled as-of clock time
pub fn daily_snapshot(series: &BarSeries, field: PriceField, time: NaiveTime) -> DailySeries {
    daily_snapshots(series, &[field], &[time]).column_at(0)
}

//batched snapshot: for every business day between the first and last bar,
//each (field, time) takes the latest bar at or before date + time within the
//tolerance. days missing any column are dropped
pub fn daily_snapshots(
    series: &BarSeries,
    fields: &[PriceField],
    times: &[NaiveTime],
) -> SnapshotTable {
    let columns = fields
        .iter()
        .flat_map(|f| times.iter().map(move |t| column_name(*f, *t)))
        .collect();
    let mut table = SnapshotTable::new(columns);

    let (first, last) = match (series.first_date(), series.last_date()) {
        (Some(first), Some(last)) => (first, last),
        _ => return table,
    };

    let tolerance = snapshot_tolerance();

    for date in business_days(first, last) {
        let mut row = Vec::with_capacity(fields.len() * times.len());

        for field in fields {
            for time in times {
                let value = localize(series.tz, date, *time).and_then(|target| {
                    series
                        .asof(target)
                        .filter(|bar| target - bar.timestamp <= tolerance)
                        .map(|bar| bar.field(*field))
                });
                row.push(value);
            }
        }

        table.insert(date, row);
    }

    table.drop_missing()
}
