//! Unit-root tests against trend-stationarity with structural breaks.

mod common;
mod error;

pub mod critical;
pub mod kapetanios;
pub mod lag;
pub mod model;
pub mod search;

pub use common::normalize_series;
pub use common::LagSelection;
pub use critical::CriticalValueTable;
pub use critical::CriticalValues;
pub use critical::Decision;
pub use error::EstimationError;
pub use error::UnitRootError;
pub use error::UnitRootResult;
pub use kapetanios::kapetanios_test;
pub use kapetanios::KapetaniosConfig;
pub use kapetanios::KapetaniosResult;
pub use model::BreakConfiguration;
pub use model::EstimationResult;
pub use model::ModelType;
