//! Unit-root testing against trend-stationarity with up to five structural breaks.
//!
//! ```ignore
//! use unit_root_breaks::stats::stationarity::{kapetanios_test, KapetaniosConfig};
//!
//! let res = kapetanios_test(&series, KapetaniosConfig::default())?;
//! println!("{} at {:?}", res.statistic, res.breaks);
//! ```

pub mod stats;
