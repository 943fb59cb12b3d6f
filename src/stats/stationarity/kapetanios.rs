//! Unit-root test against trend-stationarity with up to `m` structural breaks.
//!
//! Breaks are placed one at a time: each pass scans every admissible date,
//! keeps the one with the smallest SSR and fixes it for the next pass. The
//! statistic is the smallest unit-root t-ratio seen over every configuration
//! evaluated on the way, compared with the critical values of its break count.

use tracing::info;
use tracing::warn;

use super::common::schwert_max_lags;
use super::common::validate_series;
use super::common::LagSelection;
use super::critical::CriticalValueTable;
use super::critical::CriticalValues;
use super::critical::Decision;
use super::critical::MAX_TABULATED_BREAKS;
use super::error::UnitRootError;
use super::error::UnitRootResult;
use super::model::BreakConfiguration;
use super::model::ModelType;
use super::search::max_feasible_breaks;
use super::search::search_one_break;
use super::search::trim_width;
use super::search::SearchOptions;
use super::search::SkippedCandidate;
use super::search::TraceEntry;

/// Configuration for the sequential break unit-root test.
#[derive(Debug, Clone, Copy)]
pub struct KapetaniosConfig {
  /// Deterministic components allowed to break.
  pub model: ModelType,
  /// Upper bound on the number of breaks, `1..=5`.
  pub max_breaks: usize,
  /// Minimum fraction of the sample between breaks and the sample ends.
  pub trimming: f64,
  /// Lag-order selection strategy.
  pub lag_selection: LagSelection,
  /// Maximum lag considered by automatic lag selection.
  pub max_lags: Option<usize>,
  /// Significance level used to compute `reject_unit_root`.
  pub alpha: f64,
  /// Evaluate break candidates in parallel.
  pub parallel: bool,
}

impl Default for KapetaniosConfig {
  fn default() -> Self {
    Self {
      model: ModelType::Both,
      max_breaks: MAX_TABULATED_BREAKS,
      trimming: 0.15,
      lag_selection: LagSelection::Aic,
      max_lags: None,
      alpha: 0.05,
      parallel: true,
    }
  }
}

impl KapetaniosConfig {
  /// Range checks that do not depend on the series.
  pub fn validate(&self) -> UnitRootResult<()> {
    if !(1..=MAX_TABULATED_BREAKS).contains(&self.max_breaks) {
      return Err(UnitRootError::configuration(
        "max_breaks",
        format!(
          "must lie in 1..={MAX_TABULATED_BREAKS}, got {}",
          self.max_breaks
        ),
      ));
    }
    if !(self.trimming > 0.0 && self.trimming < 0.5) {
      return Err(UnitRootError::configuration(
        "trimming",
        format!("must lie in (0, 0.5), got {}", self.trimming),
      ));
    }
    if !(self.alpha > 0.0 && self.alpha < 1.0) {
      return Err(UnitRootError::configuration(
        "alpha",
        format!("must lie in (0, 1), got {}", self.alpha),
      ));
    }
    if let (LagSelection::Fixed(p), Some(max)) = (self.lag_selection, self.max_lags) {
      if p > max {
        return Err(UnitRootError::configuration(
          "lag_selection",
          format!("fixed lag {p} exceeds max_lags {max}"),
        ));
      }
    }
    Ok(())
  }
}

/// Result of the sequential break unit-root test.
#[derive(Debug, Clone)]
pub struct KapetaniosResult {
  /// Minimum unit-root t-statistic over every evaluated configuration.
  pub statistic: f64,
  /// Break dates of the configuration attaining `statistic`.
  pub breaks: Vec<usize>,
  /// Lag order used for that configuration.
  pub used_lags: usize,
  /// Regression observations per fit.
  pub nobs: usize,
  pub model: ModelType,
  pub trimming: f64,
  /// Largest lag order considered.
  pub max_lag: usize,
  /// Number of breaks searched after clamping to what the sample allows.
  pub max_breaks: usize,
  /// Breaks in the order they were fixed; `break_path[..m]` is the set after pass `m`.
  pub break_path: Vec<usize>,
  /// Critical values for `breaks.len()` breaks.
  pub critical_values: CriticalValues,
  /// Reject flags at 1%, 2.5%, 5%, 10%.
  pub decision: Decision,
  /// Interpolated p-value.
  pub p_value: f64,
  /// Whether the null (unit root) is rejected at `alpha`.
  pub reject_unit_root: bool,
  /// Configurations estimated across all passes.
  pub evaluated: usize,
  /// Configurations dropped because they could not be estimated.
  pub skipped: Vec<SkippedCandidate>,
}

/// Largest lag that still leaves the widest regression identified.
fn resolve_max_lag(n: usize, cfg: &KapetaniosConfig) -> UnitRootResult<usize> {
  let widest = |lag: usize| cfg.model.n_columns(cfg.max_breaks, lag);
  let rows = |lag: usize| n.saturating_sub(1 + lag);

  match (cfg.max_lags, cfg.lag_selection) {
    (Some(max), _) => {
      if rows(max) <= widest(max) {
        return Err(UnitRootError::insufficient(format!(
          "max_lags = {max} leaves {} regression rows for up to {} regressors",
          rows(max),
          widest(max)
        )));
      }
      Ok(max)
    }
    (None, LagSelection::Fixed(p)) => Ok(p),
    (None, _) => {
      let mut lag = schwert_max_lags(n);
      while lag > 0 && rows(lag) <= widest(lag) {
        lag -= 1;
      }
      Ok(lag)
    }
  }
}

/// Sequential minimum-t unit-root test with up to `cfg.max_breaks` breaks.
pub fn kapetanios_test(y: &[f64], cfg: KapetaniosConfig) -> UnitRootResult<KapetaniosResult> {
  cfg.validate()?;
  let table = CriticalValueTable::global()?;
  validate_series(y, 3)?;

  let n = y.len();
  let max_lag = resolve_max_lag(n, &cfg)?;
  let rows = n - 1 - max_lag.min(n - 1);
  let h = trim_width(cfg.trimming, n);

  let feasible = max_feasible_breaks(rows, h);
  if feasible == 0 {
    return Err(UnitRootError::insufficient(format!(
      "{n} observations with trimming {} need {h} rows per segment, but only {rows} regression rows remain after {max_lag} lags",
      cfg.trimming
    )));
  }
  let max_breaks = cfg.max_breaks.min(feasible);
  if max_breaks < cfg.max_breaks {
    warn!(
      requested = cfg.max_breaks,
      allowed = max_breaks,
      trimming = cfg.trimming,
      n,
      "clamping max_breaks to what the trimming allows"
    );
  }

  let widest = cfg.model.n_columns(max_breaks, max_lag);
  if rows <= widest {
    return Err(UnitRootError::insufficient(format!(
      "{rows} regression rows cannot identify {widest} regressors"
    )));
  }

  let opts = SearchOptions {
    model: cfg.model,
    max_lag,
    trimming: cfg.trimming,
    lag_selection: cfg.lag_selection,
    parallel: cfg.parallel,
  };

  let mut fixed = BreakConfiguration::default();
  let mut break_path = Vec::with_capacity(max_breaks);
  let mut trace: Vec<TraceEntry> = Vec::new();
  let mut skipped = Vec::new();

  for _ in 1..=max_breaks {
    let search = search_one_break(y, &fixed, &opts)?;
    trace.extend(search.trace);
    skipped.extend(search.skipped);
    fixed = fixed.with_break(search.best_break);
    break_path.push(search.best_break);
  }

  // earliest entry keeps a tie
  let Some(winner) = trace
    .iter()
    .reduce(|best, e| if e.t_stat < best.t_stat { e } else { best })
  else {
    return Err(UnitRootError::insufficient(
      "no break configuration could be evaluated",
    ));
  };

  let m = winner.breaks.len();
  let statistic = winner.t_stat;
  let critical_values = table.lookup(cfg.model, m)?;
  let decision = table.decide(statistic, cfg.model, m)?;
  let p_value = table.approx_pvalue(statistic, cfg.model, m)?;
  let reject_unit_root = statistic < critical_values.value_at(cfg.alpha);

  info!(
    model = %cfg.model,
    statistic,
    breaks = %winner.breaks,
    lags = winner.lags,
    p_value,
    evaluated = trace.len(),
    skipped = skipped.len(),
    "unit-root test with breaks finished"
  );

  Ok(KapetaniosResult {
    statistic,
    breaks: winner.breaks.as_slice().to_vec(),
    used_lags: winner.lags,
    nobs: rows,
    model: cfg.model,
    trimming: cfg.trimming,
    max_lag,
    max_breaks,
    break_path,
    critical_values,
    decision,
    p_value,
    reject_unit_root,
    evaluated: trace.len(),
    skipped,
  })
}
