use std::fmt;
use std::str::FromStr;

use nalgebra::DMatrix;
use nalgebra::DVector;

use super::error::EstimationError;
use super::error::UnitRootError;
use super::error::UnitRootResult;

/// Two-sided 10% normal quantile used by the backward t-test on the last lag.
pub const TSTAT_LAG_THRESHOLD: f64 = 1.644_853_626_951_472_2;

/// Lag-order rule for the augmentation terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LagSelection {
  /// Use exactly this many lagged differences.
  Fixed(usize),
  Aic,
  Bic,
  /// Backward general-to-specific t-test on the highest lag.
  TStat,
}

impl FromStr for LagSelection {
  type Err = UnitRootError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str() {
      "aic" => Ok(Self::Aic),
      "bic" => Ok(Self::Bic),
      "t-stat" | "tstat" | "t_stat" => Ok(Self::TStat),
      other => Err(UnitRootError::configuration(
        "lag_selection",
        format!("unknown rule '{other}', expected one of aic, bic, t-stat"),
      )),
    }
  }
}

impl fmt::Display for LagSelection {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Fixed(p) => write!(f, "fixed({p})"),
      Self::Aic => f.write_str("aic"),
      Self::Bic => f.write_str("bic"),
      Self::TStat => f.write_str("t-stat"),
    }
  }
}

#[derive(Debug, Clone)]
pub struct OlsResult {
  pub beta: Vec<f64>,
  pub std_err: Vec<f64>,
  pub sse: f64,
  pub nobs: usize,
  pub k: usize,
}

impl OlsResult {
  /// `beta[i] / std_err[i]`, `None` when the standard error degenerates.
  pub fn t_value(&self, i: usize) -> Option<f64> {
    let se = self.std_err[i];
    let t = self.beta[i] / se;
    (se > 0.0 && t.is_finite()).then_some(t)
  }
}

/// Drops NaN entries and rejects inputs that leave nothing usable.
pub fn normalize_series<I>(values: I) -> UnitRootResult<Vec<f64>>
where
  I: IntoIterator<Item = f64>,
{
  let mut seen = 0usize;
  let mut out = Vec::new();
  for (i, v) in values.into_iter().enumerate() {
    seen += 1;
    if v.is_nan() {
      continue;
    }
    if v.is_infinite() {
      return Err(UnitRootError::InvalidInput {
        reason: format!("value at position {i} is infinite"),
      });
    }
    out.push(v);
  }

  if seen == 0 {
    return Err(UnitRootError::InvalidInput {
      reason: "series is empty".into(),
    });
  }
  if out.is_empty() {
    return Err(UnitRootError::InvalidInput {
      reason: "series contains only NaN values".into(),
    });
  }
  Ok(out)
}

pub fn validate_series(y: &[f64], min_n: usize) -> UnitRootResult<()> {
  if y.len() < min_n {
    return Err(UnitRootError::insufficient(format!(
      "series must have at least {min_n} observations, got {}",
      y.len()
    )));
  }
  if let Some(i) = y.iter().position(|v| !v.is_finite()) {
    return Err(UnitRootError::InvalidInput {
      reason: format!("value at position {i} is not finite"),
    });
  }
  Ok(())
}

pub fn difference(y: &[f64]) -> Vec<f64> {
  y.windows(2).map(|w| w[1] - w[0]).collect()
}

pub fn schwert_max_lags(n: usize) -> usize {
  if n <= 1 {
    return 0;
  }
  (12.0 * (n as f64 / 100.0).powf(0.25)).floor() as usize
}

/// `ln(SSR/n) + 2k/n`
pub fn aic_from_sse(sse: f64, nobs: usize, k: usize) -> f64 {
  let n = nobs as f64;
  (sse / n).ln() + 2.0 * k as f64 / n
}

/// `ln(SSR/n) + k ln(n)/n`
pub fn bic_from_sse(sse: f64, nobs: usize, k: usize) -> f64 {
  let n = nobs as f64;
  (sse / n).ln() + k as f64 * n.ln() / n
}

pub fn ols(y: &[f64], x: &[Vec<f64>]) -> Result<OlsResult, EstimationError> {
  let n = y.len();
  if x.len() != n {
    return Err(EstimationError::DimensionMismatch {
      rows: x.len(),
      targets: n,
    });
  }
  let k = x.first().map_or(0, Vec::len);
  if let Some((row, r)) = x.iter().enumerate().find(|(_, r)| r.len() != k) {
    return Err(EstimationError::RaggedDesign {
      row,
      expected: k,
      actual: r.len(),
    });
  }
  if k == 0 || n <= k {
    return Err(EstimationError::TooFewObservations { nobs: n, columns: k });
  }

  let mut flat_x = Vec::with_capacity(n * k);
  for row in x {
    flat_x.extend_from_slice(row);
  }

  let x_mat = DMatrix::from_row_slice(n, k, &flat_x);
  let y_vec = DVector::from_row_slice(y);

  let xtx = x_mat.transpose() * &x_mat;
  let singular = xtx.singular_values();
  let tol = singular.max() * (n.max(k) * k) as f64 * f64::EPSILON;
  let rank = singular.iter().filter(|s| **s > tol).count();
  if rank < k {
    return Err(EstimationError::RankDeficient { rank, columns: k });
  }
  let Some(xtx_inv) = xtx.try_inverse() else {
    return Err(EstimationError::RankDeficient { rank, columns: k });
  };

  let beta = &xtx_inv * x_mat.transpose() * &y_vec;
  let fitted = &x_mat * &beta;
  let residuals = y_vec - fitted;

  let sse = residuals.norm_squared();
  let dof = (n - k) as f64;
  let sigma2 = (sse / dof).max(0.0);

  let cov = xtx_inv * sigma2;
  let std_err = (0..k).map(|i| cov[(i, i)].max(0.0).sqrt()).collect();

  Ok(OlsResult {
    beta: beta.iter().copied().collect(),
    std_err,
    sse,
    nobs: n,
    k,
  })
}
