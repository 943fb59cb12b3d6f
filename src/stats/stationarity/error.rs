use thiserror::Error;

pub type UnitRootResult<T> = Result<T, UnitRootError>;

/// Failures of a single regression fit.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EstimationError {
  /// `XᵀX` has numerically zero singular values (collinear regressors).
  #[error("design matrix is rank deficient: rank {rank} < {columns} columns")]
  RankDeficient { rank: usize, columns: usize },

  /// Target and design matrix disagree on the number of observations.
  #[error("design matrix has {rows} rows but target has {targets} observations")]
  DimensionMismatch { rows: usize, targets: usize },

  /// A design row has the wrong number of regressors.
  #[error("design row {row} has {actual} columns, expected {expected}")]
  RaggedDesign {
    row: usize,
    expected: usize,
    actual: usize,
  },

  /// Not enough observations to leave positive residual degrees of freedom.
  #[error("{nobs} observations cannot identify {columns} regressors")]
  TooFewObservations { nobs: usize, columns: usize },

  /// More lagged differences requested than the regression sample reserves.
  #[error("{lags} lagged differences exceed the reserved maximum of {max_lag}")]
  LagExceedsSample { lags: usize, max_lag: usize },

  /// The unit-root coefficient has a zero or non-finite standard error.
  #[error("t-statistic of the lagged level is not finite")]
  NonFiniteStatistic,
}

/// Error taxonomy of the break-augmented unit-root test.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UnitRootError {
  /// Invalid model, trimming, lag rule or break count. Raised before any estimation.
  #[error("invalid {parameter}: {reason}")]
  Configuration {
    parameter: &'static str,
    reason: String,
  },

  /// The series is too short for the requested breaks, trimming or lags.
  #[error("insufficient data: {reason}")]
  InsufficientData { reason: String },

  /// A regression could not be estimated.
  #[error("estimation failed: {0}")]
  Estimation(#[from] EstimationError),

  /// Raw input could not be turned into a usable series.
  #[error("invalid input: {reason}")]
  InvalidInput { reason: String },
}

impl UnitRootError {
  pub(crate) fn configuration(parameter: &'static str, reason: impl Into<String>) -> Self {
    Self::Configuration {
      parameter,
      reason: reason.into(),
    }
  }

  pub(crate) fn insufficient(reason: impl Into<String>) -> Self {
    Self::InsufficientData {
      reason: reason.into(),
    }
  }
}
