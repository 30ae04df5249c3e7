pub mod bar;
pub mod calendar;
pub mod loader;
pub mod series;
pub mod snapshot;
pub mod synthetic;

pub use bar::{Bar, BarError, PriceField};
pub use calendar::{business_days, localize, next_business_day};
pub use loader::{load_csv, DataError};
pub use series::BarSeries;
pub use snapshot::{daily_snapshot, daily_snapshots, DailySeries, SnapshotTable};
pub use synthetic::{synthetic_prices, SYNTHETIC_BASE};

use indexmap::IndexMap;

//bars by instrument name, in load order
pub type MarketData = IndexMap<String, BarSeries>;
