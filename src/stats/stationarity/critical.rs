//! Critical values of the minimum-t statistic, by model and break count.
//!
//! The `m = 1` rows are the Zivot-Andrews asymptotic values. Rows for
//! `m = 2..=5` are placeholders, not taken from any published table: they
//! only keep the ordering (more negative with `m`, increasing in the level)
//! so the decision rule and p-value interpolation work. Decisions for
//! `m >= 2` are not calibrated until those rows are replaced.

use std::sync::LazyLock;

use super::error::UnitRootError;
use super::error::UnitRootResult;
use super::model::ModelType;

/// Largest tabulated break count.
pub const MAX_TABULATED_BREAKS: usize = 5;

/// Tabulated significance levels, most to least stringent.
pub const LEVELS: [f64; 4] = [0.01, 0.025, 0.05, 0.10];

/// Thresholds at the tabulated significance levels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CriticalValues {
  pub one_percent: f64,
  pub two_point_five_percent: f64,
  pub five_percent: f64,
  pub ten_percent: f64,
}

impl CriticalValues {
  const fn from_row(row: [f64; 4]) -> Self {
    Self {
      one_percent: row[0],
      two_point_five_percent: row[1],
      five_percent: row[2],
      ten_percent: row[3],
    }
  }

  /// Thresholds in [`LEVELS`] order.
  pub fn as_array(self) -> [f64; 4] {
    [
      self.one_percent,
      self.two_point_five_percent,
      self.five_percent,
      self.ten_percent,
    ]
  }

  /// Threshold of the most stringent tabulated level not below `alpha`.
  pub fn value_at(self, alpha: f64) -> f64 {
    if alpha <= 0.01 {
      self.one_percent
    } else if alpha <= 0.025 {
      self.two_point_five_percent
    } else if alpha <= 0.05 {
      self.five_percent
    } else {
      self.ten_percent
    }
  }

  fn is_strictly_increasing(self) -> bool {
    let v = self.as_array();
    v.iter().all(|x| x.is_finite()) && v.windows(2).all(|w| w[0] < w[1])
  }
}

/// Reject/fail-to-reject flags at each tabulated level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
  pub one_percent: bool,
  pub two_point_five_percent: bool,
  pub five_percent: bool,
  pub ten_percent: bool,
}

impl Decision {
  pub fn at(self, alpha: f64) -> bool {
    if alpha <= 0.01 {
      self.one_percent
    } else if alpha <= 0.025 {
      self.two_point_five_percent
    } else if alpha <= 0.05 {
      self.five_percent
    } else {
      self.ten_percent
    }
  }
}

// Rows 2..=5 of each model are unpublished placeholders.
const MODEL_A: [[f64; 4]; MAX_TABULATED_BREAKS] = [
  [-5.34, -5.02, -4.80, -4.58],
  [-6.16, -5.86, -5.59, -5.28],
  [-6.84, -6.54, -6.26, -5.96],
  [-7.46, -7.14, -6.85, -6.55],
  [-7.99, -7.65, -7.38, -7.08],
];

const MODEL_B: [[f64; 4]; MAX_TABULATED_BREAKS] = [
  [-4.93, -4.67, -4.42, -4.11],
  [-5.58, -5.30, -5.05, -4.78],
  [-6.10, -5.82, -5.56, -5.30],
  [-6.58, -6.30, -6.03, -5.77],
  [-7.03, -6.74, -6.46, -6.19],
];

const MODEL_C: [[f64; 4]; MAX_TABULATED_BREAKS] = [
  [-5.57, -5.30, -5.08, -4.82],
  [-6.66, -6.37, -6.12, -5.83],
  [-7.63, -7.33, -7.07, -6.78],
  [-8.51, -8.19, -7.92, -7.63],
  [-9.31, -8.98, -8.70, -8.40],
];

static TABLE: LazyLock<UnitRootResult<CriticalValueTable>> =
  LazyLock::new(|| CriticalValueTable::new(MODEL_A, MODEL_B, MODEL_C));

/// Read-only lookup of thresholds keyed by `(model, break_count)`.
#[derive(Debug, Clone)]
pub struct CriticalValueTable {
  intercept: [CriticalValues; MAX_TABULATED_BREAKS],
  trend: [CriticalValues; MAX_TABULATED_BREAKS],
  both: [CriticalValues; MAX_TABULATED_BREAKS],
}

impl CriticalValueTable {
  /// Builds a table, checking that every row is strictly increasing in the level.
  pub fn new(
    intercept: [[f64; 4]; MAX_TABULATED_BREAKS],
    trend: [[f64; 4]; MAX_TABULATED_BREAKS],
    both: [[f64; 4]; MAX_TABULATED_BREAKS],
  ) -> UnitRootResult<Self> {
    let table = Self {
      intercept: intercept.map(CriticalValues::from_row),
      trend: trend.map(CriticalValues::from_row),
      both: both.map(CriticalValues::from_row),
    };

    for model in [ModelType::Intercept, ModelType::Trend, ModelType::Both] {
      for (i, cv) in table.rows(model).iter().enumerate() {
        if !cv.is_strictly_increasing() {
          return Err(UnitRootError::configuration(
            "critical value table",
            format!(
              "model {model}, m = {}: thresholds {:?} are not strictly increasing",
              i + 1,
              cv.as_array()
            ),
          ));
        }
      }
    }

    Ok(table)
  }

  /// The process-wide embedded table.
  pub fn global() -> UnitRootResult<&'static Self> {
    match &*TABLE {
      Ok(table) => Ok(table),
      Err(err) => Err(err.clone()),
    }
  }

  fn rows(&self, model: ModelType) -> &[CriticalValues; MAX_TABULATED_BREAKS] {
    match model {
      ModelType::Intercept => &self.intercept,
      ModelType::Trend => &self.trend,
      ModelType::Both => &self.both,
    }
  }

  pub fn lookup(&self, model: ModelType, break_count: usize) -> UnitRootResult<CriticalValues> {
    if !(1..=MAX_TABULATED_BREAKS).contains(&break_count) {
      return Err(UnitRootError::configuration(
        "break_count",
        format!("critical values exist for 1..={MAX_TABULATED_BREAKS} breaks, got {break_count}"),
      ));
    }
    Ok(self.rows(model)[break_count - 1])
  }

  /// Rejects the unit root at a level iff `statistic` is below its threshold.
  pub fn decide(
    &self,
    statistic: f64,
    model: ModelType,
    break_count: usize,
  ) -> UnitRootResult<Decision> {
    let cv = self.lookup(model, break_count)?;
    Ok(Decision {
      one_percent: statistic < cv.one_percent,
      two_point_five_percent: statistic < cv.two_point_five_percent,
      five_percent: statistic < cv.five_percent,
      ten_percent: statistic < cv.ten_percent,
    })
  }

  /// Piecewise-linear p-value through the four `(threshold, level)` points,
  /// extrapolated linearly past either end and clipped to `[0, 1]`.
  pub fn approx_pvalue(
    &self,
    statistic: f64,
    model: ModelType,
    break_count: usize,
  ) -> UnitRootResult<f64> {
    let cv = self.lookup(model, break_count)?.as_array();
    if statistic.is_nan() {
      return Err(UnitRootError::InvalidInput {
        reason: "statistic is NaN".into(),
      });
    }

    let seg = if statistic <= cv[1] {
      0
    } else if statistic <= cv[2] {
      1
    } else {
      2
    };
    let (x0, x1) = (cv[seg], cv[seg + 1]);
    let (p0, p1) = (LEVELS[seg], LEVELS[seg + 1]);
    let p = p0 + (statistic - x0) * (p1 - p0) / (x1 - x0);

    Ok(p.clamp(0.0, 1.0))
  }
}
