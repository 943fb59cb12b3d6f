//! Break-augmented Dickey-Fuller regression.
//!
//! $$
//! \Delta y_t = \mu + \beta t + \rho y_{t-1}
//!   + \sum_{i=1}^{m} \theta_i DU_{i,t} + \sum_{i=1}^{m} \gamma_i DT_{i,t}
//!   + \sum_{j=1}^{p} c_j \Delta y_{t-j} + \varepsilon_t
//! $$
//!
//! with `DU_{i,t} = 1(t > b_i)` and `DT_{i,t} = (t - b_i - 1) 1(t > b_i)`.
//! The test statistic is the t-ratio of `ρ`.

use std::fmt;
use std::str::FromStr;

use super::common::difference;
use super::common::ols;
use super::error::EstimationError;
use super::error::UnitRootError;

/// Column of the lagged level `y_{t-1}` in every design row.
pub const LEVEL_INDEX: usize = 2;

/// Which deterministic components are allowed to break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelType {
  /// Model A: breaks in the intercept only.
  Intercept,
  /// Model B: breaks in the trend slope only.
  Trend,
  /// Model C: breaks in both intercept and slope.
  Both,
}

impl ModelType {
  pub fn has_intercept_breaks(self) -> bool {
    matches!(self, Self::Intercept | Self::Both)
  }

  pub fn has_trend_breaks(self) -> bool {
    matches!(self, Self::Trend | Self::Both)
  }

  /// Dummy columns contributed by each break.
  pub fn columns_per_break(self) -> usize {
    usize::from(self.has_intercept_breaks()) + usize::from(self.has_trend_breaks())
  }

  /// Design-matrix width for `n_breaks` breaks and `lags` lagged differences.
  pub fn n_columns(self, n_breaks: usize, lags: usize) -> usize {
    LEVEL_INDEX + 1 + n_breaks * self.columns_per_break() + lags
  }
}

impl FromStr for ModelType {
  type Err = UnitRootError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim() {
      "A" | "a" => Ok(Self::Intercept),
      "B" | "b" => Ok(Self::Trend),
      "C" | "c" => Ok(Self::Both),
      other => Err(UnitRootError::configuration(
        "model",
        format!("unknown model '{other}', expected one of A, B, C"),
      )),
    }
  }
}

impl fmt::Display for ModelType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Intercept => "A",
      Self::Trend => "B",
      Self::Both => "C",
    })
  }
}

/// Strictly increasing break dates (indices into the series).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct BreakConfiguration(Vec<usize>);

impl BreakConfiguration {
  pub fn new(mut breaks: Vec<usize>) -> Self {
    breaks.sort_unstable();
    breaks.dedup();
    Self(breaks)
  }

  /// Copy of `self` with `tb` inserted in order.
  pub fn with_break(&self, tb: usize) -> Self {
    let pos = self.0.partition_point(|&b| b < tb);
    let mut breaks = Vec::with_capacity(self.0.len() + 1);
    breaks.extend_from_slice(&self.0[..pos]);
    breaks.push(tb);
    breaks.extend_from_slice(&self.0[pos..]);
    Self::new(breaks)
  }

  pub fn as_slice(&self) -> &[usize] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn contains(&self, tb: usize) -> bool {
    self.0.binary_search(&tb).is_ok()
  }
}

impl From<BreakConfiguration> for Vec<usize> {
  fn from(cfg: BreakConfiguration) -> Self {
    cfg.0
  }
}

impl fmt::Display for BreakConfiguration {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{:?}", self.0)
  }
}

/// Output of one regression fit.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationResult {
  pub beta: Vec<f64>,
  pub std_err: Vec<f64>,
  /// Sum of squared residuals.
  pub ssr: f64,
  /// t-ratio of the lagged level coefficient.
  pub t_stat: f64,
  pub lags: usize,
  pub nobs: usize,
  pub k: usize,
}

impl EstimationResult {
  /// t-ratio of the highest-order lagged difference, if any.
  pub fn last_lag_t(&self) -> Option<f64> {
    if self.lags == 0 {
      return None;
    }
    let i = self.k - 1;
    let se = self.std_err[i];
    let t = self.beta[i] / se;
    (se > 0.0 && t.is_finite()).then_some(t)
  }
}

/// Target and design rows for `t = 1 + max_lag .. T-1`.
///
/// The row range depends on `max_lag` only, so every fit in a lag sweep
/// uses the same observations.
pub fn build_design(
  y: &[f64],
  model: ModelType,
  breaks: &[usize],
  lags: usize,
  max_lag: usize,
) -> Result<(Vec<f64>, Vec<Vec<f64>>), EstimationError> {
  if lags > max_lag {
    return Err(EstimationError::LagExceedsSample { lags, max_lag });
  }
  let n = y.len();
  let start = 1 + max_lag;
  let k = model.n_columns(breaks.len(), lags);
  if n <= start {
    return Err(EstimationError::TooFewObservations {
      nobs: 0,
      columns: k,
    });
  }

  // dy[t - 1] = y[t] - y[t - 1]
  let dy = difference(y);
  let mut lhs = Vec::with_capacity(n - start);
  let mut rhs = Vec::with_capacity(n - start);

  for t in start..n {
    lhs.push(dy[t - 1]);

    let mut row = Vec::with_capacity(k);
    row.push(1.0);
    row.push(t as f64);
    row.push(y[t - 1]);

    for &b in breaks {
      let after = t > b;
      if model.has_intercept_breaks() {
        row.push(if after { 1.0 } else { 0.0 });
      }
      if model.has_trend_breaks() {
        row.push(if after { (t - b - 1) as f64 } else { 0.0 });
      }
    }

    for j in 1..=lags {
      row.push(dy[t - 1 - j]);
    }

    rhs.push(row);
  }

  Ok((lhs, rhs))
}

/// Fits the regression for one break configuration and lag count.
pub fn estimate(
  y: &[f64],
  model: ModelType,
  breaks: &[usize],
  lags: usize,
  max_lag: usize,
) -> Result<EstimationResult, EstimationError> {
  let (lhs, rhs) = build_design(y, model, breaks, lags, max_lag)?;
  let fit = ols(&lhs, &rhs)?;
  let t_stat = fit
    .t_value(LEVEL_INDEX)
    .ok_or(EstimationError::NonFiniteStatistic)?;

  Ok(EstimationResult {
    beta: fit.beta,
    std_err: fit.std_err,
    ssr: fit.sse,
    t_stat,
    lags,
    nobs: fit.nobs,
    k: fit.k,
  })
}
