use crate::data::bar::Bar;
use crate::data::series::BarSeries;
use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("market data unavailable at {path:?}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("no bars in {path:?}")]
    Empty { path: PathBuf },
    #[error("failed to parse record at line {line}: {message}")]
    Parse { line: usize, message: String },
    #[error("no market data loaded for instrument {0}")]
    UnknownInstrument(String),
    #[error("unknown timezone: {0}")]
    UnknownTimezone(String),
}

//sources disagree on column names, accept the ones we have seen
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "ts", alias = "date", alias = "datetime", alias = "Date")]
    timestamp: String,
    #[serde(alias = "opnPrc", alias = "Open")]
    open: f64,
    #[serde(alias = "higPrc", alias = "High")]
    high: f64,
    #[serde(alias = "lowPrc", alias = "Low")]
    low: f64,
    #[serde(
        alias = "clsPrc",
        alias = "Close",
        alias = "settle",
        alias = "Settle",
        alias = "sprc"
    )]
    close: f64,
    #[serde(alias = "trdQty", alias = "Volume")]
    volume: f64,
    #[serde(default, alias = "futc", alias = "bbt", alias = "symbol")]
    contract: Option<String>,
}

//parses rfc3339, or a naive local timestamp in the exchange timezone
fn parse_timestamp(raw: &str, tz: Tz) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }

    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| tz.from_local_datetime(&naive).earliest())
        .map(|local| local.with_timezone(&Utc))
}

//loads intraday bars for one instrument from a csv file
pub fn load_csv<P: AsRef<Path>>(
    path: P,
    instrument: &str,
    tz: Tz,
    interval: Duration,
) -> Result<BarSeries, DataError> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|source| DataError::Unavailable {
            path: path.to_path_buf(),
            source,
        })?;

    let mut bars = Vec::new();

    for (index, result) in reader.deserialize().enumerate() {
        let line = index + 2;
        let record: CsvRecord = result.map_err(|e| DataError::Parse {
            line,
            message: e.to_string(),
        })?;

        let timestamp =
            parse_timestamp(&record.timestamp, tz).ok_or_else(|| DataError::Parse {
                line,
                message: format!("bad timestamp '{}'", record.timestamp),
            })?;

        let bar = Bar::new(
            timestamp,
            record.open,
            record.high,
            record.low,
            record.close,
            record.volume,
            record.contract.unwrap_or_else(|| instrument.to_string()),
        )
        .map_err(|e| DataError::Parse {
            line,
            message: e.to_string(),
        })?;
        bars.push(bar);
    }

    if bars.is_empty() {
        return Err(DataError::Empty {
            path: path.to_path_buf(),
        });
    }

    info!("loaded {} bars for {} from {:?}", bars.len(), instrument, path);

    Ok(BarSeries::new(instrument.to_string(), tz, interval, bars))
}
