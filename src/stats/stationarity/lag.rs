use super::common::aic_from_sse;
use super::common::bic_from_sse;
use super::common::LagSelection;
use super::common::TSTAT_LAG_THRESHOLD;
use super::error::EstimationError;
use super::model::estimate;
use super::model::ModelType;

/// Picks the number of lagged differences for a fixed break configuration.
///
/// Every candidate is fitted on the same rows (`t > max_lag`), so the
/// criteria compare like with like. Selection only ever calls
/// [`estimate`]; the caller re-estimates with the returned count.
pub fn select_lags(
  y: &[f64],
  model: ModelType,
  breaks: &[usize],
  max_lag: usize,
  selection: LagSelection,
) -> Result<usize, EstimationError> {
  match selection {
    LagSelection::Fixed(p) => {
      if p > max_lag {
        return Err(EstimationError::LagExceedsSample { lags: p, max_lag });
      }
      Ok(p)
    }
    LagSelection::Aic | LagSelection::Bic => {
      let mut best_lag = 0usize;
      let mut best_score = f64::INFINITY;

      for lag in 0..=max_lag {
        let fit = estimate(y, model, breaks, lag, max_lag)?;
        let score = match selection {
          LagSelection::Aic => aic_from_sse(fit.ssr, fit.nobs, fit.k),
          _ => bic_from_sse(fit.ssr, fit.nobs, fit.k),
        };
        // strict comparison keeps the smallest lag on ties
        if score < best_score {
          best_score = score;
          best_lag = lag;
        }
      }

      Ok(best_lag)
    }
    LagSelection::TStat => {
      for lag in (1..=max_lag).rev() {
        let fit = estimate(y, model, breaks, lag, max_lag)?;
        if fit
          .last_lag_t()
          .is_some_and(|t| t.abs() >= TSTAT_LAG_THRESHOLD)
        {
          return Ok(lag);
        }
      }
      Ok(0)
    }
  }
}
