use std::ops::RangeInclusive;

use impl_new_derive::ImplNew;
use rayon::prelude::*;
use tracing::debug;

use super::common::LagSelection;
use super::error::EstimationError;
use super::error::UnitRootError;
use super::error::UnitRootResult;
use super::lag::select_lags;
use super::model::estimate;
use super::model::BreakConfiguration;
use super::model::EstimationResult;
use super::model::ModelType;

/// Settings shared by every candidate evaluation of one run.
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
  pub model: ModelType,
  pub max_lag: usize,
  pub trimming: f64,
  pub lag_selection: LagSelection,
  /// Evaluate candidates on the rayon pool.
  pub parallel: bool,
}

/// One evaluated break configuration.
#[derive(ImplNew, Debug, Clone, PartialEq)]
pub struct TraceEntry {
  pub breaks: BreakConfiguration,
  pub ssr: f64,
  pub t_stat: f64,
  pub lags: usize,
}

/// A candidate that could not be estimated and was left out of the trace.
#[derive(ImplNew, Debug, Clone, PartialEq)]
pub struct SkippedCandidate {
  pub breaks: BreakConfiguration,
  pub reason: EstimationError,
}

/// Outcome of a scan for one additional break.
#[derive(Debug, Clone)]
pub struct BreakSearch {
  /// SSR-minimizing new break date.
  pub best_break: usize,
  /// t-statistic of the SSR-minimizing configuration.
  pub best_t_stat: f64,
  /// The SSR-minimizing configuration itself.
  pub best: TraceEntry,
  /// Every successfully evaluated candidate, in scan order.
  pub trace: Vec<TraceEntry>,
  pub skipped: Vec<SkippedCandidate>,
}

/// Minimum rows each side of a break: `ceil(trimming * n)`.
pub fn trim_width(trimming: f64, n: usize) -> usize {
  ((trimming * n as f64).ceil() as usize).max(1)
}

/// Largest break count that greedy placement can always accommodate.
///
/// After `m` breaks some segment still spans `2h` rows whenever
/// `rows > (m + 1)(2h - 1)`.
pub fn max_feasible_breaks(rows: usize, h: usize) -> usize {
  if rows == 0 {
    return 0;
  }
  (rows - 1) / (2 * h - 1)
}

/// Candidate ranges for a new break.
///
/// The regression rows `1 + max_lag ..= n - 1` are cut into segments by
/// `fixed`; a break `tb` closes a segment at `tb` and may only sit where both
/// halves keep at least `h` rows.
pub fn admissible_regions(
  n: usize,
  max_lag: usize,
  fixed: &[usize],
  h: usize,
) -> Vec<RangeInclusive<usize>> {
  let start = 1 + max_lag;
  if n <= start {
    return Vec::new();
  }

  let mut bounds = Vec::with_capacity(fixed.len() + 1);
  let mut lo = start;
  for &b in fixed {
    bounds.push((lo, b));
    lo = b + 1;
  }
  bounds.push((lo, n - 1));

  bounds
    .into_iter()
    .filter_map(|(lo, hi)| {
      let first = lo + h - 1;
      let last = hi.checked_sub(h)?;
      (first <= last).then_some(first..=last)
    })
    .collect()
}

/// Lag selection followed by one estimate with the chosen lag count.
pub fn evaluate_candidate(
  y: &[f64],
  breaks: &BreakConfiguration,
  opts: &SearchOptions,
) -> Result<EstimationResult, EstimationError> {
  let lags = select_lags(
    y,
    opts.model,
    breaks.as_slice(),
    opts.max_lag,
    opts.lag_selection,
  )?;
  estimate(y, opts.model, breaks.as_slice(), lags, opts.max_lag)
}

/// Scans every admissible date for one more break beyond `fixed`.
///
/// The winner minimizes SSR; ties go to the earliest date. Candidates that
/// fail to estimate are reported in `skipped` and never compete.
pub fn search_one_break(
  y: &[f64],
  fixed: &BreakConfiguration,
  opts: &SearchOptions,
) -> UnitRootResult<BreakSearch> {
  let n = y.len();
  let h = trim_width(opts.trimming, n);
  let regions = admissible_regions(n, opts.max_lag, fixed.as_slice(), h);
  if regions.is_empty() {
    return Err(UnitRootError::insufficient(format!(
      "no admissible break date beyond {fixed}: {n} observations, trimming {} ({h} rows per segment), max lag {}",
      opts.trimming, opts.max_lag
    )));
  }

  let candidates: Vec<(usize, BreakConfiguration)> = regions
    .into_iter()
    .flatten()
    .map(|tb| (tb, fixed.with_break(tb)))
    .collect();

  let outcomes: Vec<Result<EstimationResult, EstimationError>> = if opts.parallel {
    candidates
      .par_iter()
      .map(|(_, cfg)| evaluate_candidate(y, cfg, opts))
      .collect()
  } else {
    candidates
      .iter()
      .map(|(_, cfg)| evaluate_candidate(y, cfg, opts))
      .collect()
  };

  let search = reduce_scan(candidates, outcomes)?;
  debug!(
    best_break = search.best_break,
    breaks = %search.best.breaks,
    ssr = search.best.ssr,
    t_stat = search.best.t_stat,
    lags = search.best.lags,
    "break located"
  );
  Ok(search)
}

/// Folds candidate outcomes in scan order into a [`BreakSearch`].
fn reduce_scan(
  candidates: Vec<(usize, BreakConfiguration)>,
  outcomes: Vec<Result<EstimationResult, EstimationError>>,
) -> UnitRootResult<BreakSearch> {
  let mut trace: Vec<TraceEntry> = Vec::with_capacity(candidates.len());
  let mut skipped = Vec::new();
  let mut best: Option<(usize, usize)> = None;

  for ((tb, cfg), outcome) in candidates.into_iter().zip(outcomes) {
    match outcome {
      Ok(fit) => {
        // strict: the earliest date keeps an SSR tie
        if best.map_or(true, |(i, _)| fit.ssr < trace[i].ssr) {
          best = Some((trace.len(), tb));
        }
        trace.push(TraceEntry::new(cfg, fit.ssr, fit.t_stat, fit.lags));
      }
      Err(reason) => {
        debug!(breaks = %cfg, %reason, "skipping break candidate");
        skipped.push(SkippedCandidate::new(cfg, reason));
      }
    }
  }

  let Some((best_idx, best_break)) = best else {
    let reason = skipped
      .first()
      .map(|s| s.reason.clone())
      .unwrap_or(EstimationError::NonFiniteStatistic);
    return Err(UnitRootError::Estimation(reason));
  };

  let best = trace[best_idx].clone();
  Ok(BreakSearch {
    best_break,
    best_t_stat: best.t_stat,
    best,
    trace,
    skipped,
  })
}

#[cfg(test)]
mod tests {
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;
  use rand_distr::StandardNormal;
  use tracing_test::traced_test;

  use super::*;

  fn opts(parallel: bool) -> SearchOptions {
    SearchOptions {
      model: ModelType::Intercept,
      max_lag: 1,
      trimming: 0.15,
      lag_selection: LagSelection::Aic,
      parallel,
    }
  }

  fn shifted_ar1(n: usize, at: usize, shift: f64, seed: u64) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = vec![0.0; n];
    for t in 1..n {
      x[t] = 0.5 * x[t - 1] + rng.sample::<f64, _>(StandardNormal);
    }
    x.iter()
      .enumerate()
      .map(|(t, v)| if t >= at { v + shift } else { *v })
      .collect()
  }

  #[test]
  fn regions_respect_trimming_on_both_sides() {
    // rows 1..=99, h = 15
    let regions = admissible_regions(100, 0, &[], 15);
    assert_eq!(regions, vec![15..=84]);

    let regions = admissible_regions(100, 0, &[50], 15);
    assert_eq!(regions, vec![15..=35, 65..=84]);
  }

  #[test]
  fn regions_vanish_when_segments_are_too_short() {
    assert!(admissible_regions(50, 0, &[], 25).is_empty());
    assert!(admissible_regions(3, 5, &[], 1).is_empty());
    assert_eq!(
      admissible_regions(100, 0, &[20, 50], 15),
      vec![35..=35, 65..=84]
    );
  }

  #[test]
  fn feasible_break_bound_matches_greedy_worst_case() {
    assert_eq!(max_feasible_breaks(185, 30), 3);
    assert_eq!(max_feasible_breaks(49, 25), 0);
    assert_eq!(max_feasible_breaks(0, 5), 0);
    assert_eq!(trim_width(0.15, 200), 30);
    assert_eq!(trim_width(0.49, 50), 25);
  }

  #[test]
  fn locates_level_shift() {
    let y = shifted_ar1(160, 80, 6.0, 21);
    let search = search_one_break(&y, &BreakConfiguration::default(), &opts(false)).unwrap();
    assert!(
      (77..=81).contains(&search.best_break),
      "break at {}",
      search.best_break
    );
    assert_eq!(search.best.breaks.as_slice(), &[search.best_break]);
    assert!(search.skipped.is_empty());
  }

  #[test]
  fn winner_has_minimum_ssr_and_earliest_on_ties() {
    let y = shifted_ar1(120, 60, 4.0, 5);
    let search = search_one_break(&y, &BreakConfiguration::default(), &opts(false)).unwrap();
    let min_ssr = search
      .trace
      .iter()
      .map(|e| e.ssr)
      .fold(f64::INFINITY, f64::min);
    assert_eq!(search.best.ssr, min_ssr);
    let first_min = search.trace.iter().find(|e| e.ssr == min_ssr).unwrap();
    assert_eq!(first_min.breaks, search.best.breaks);
  }

  #[test]
  fn parallel_scan_matches_sequential() {
    let y = shifted_ar1(140, 50, 3.0, 8);
    let fixed = BreakConfiguration::new(vec![100]);
    let a = search_one_break(&y, &fixed, &opts(false)).unwrap();
    let b = search_one_break(&y, &fixed, &opts(true)).unwrap();
    assert_eq!(a.trace, b.trace);
    assert_eq!(a.best_break, b.best_break);
    assert_eq!(a.best_t_stat.to_bits(), b.best_t_stat.to_bits());
  }

  #[test]
  fn new_break_extends_fixed_set() {
    let y = shifted_ar1(150, 100, 5.0, 13);
    let fixed = BreakConfiguration::new(vec![40]);
    let search = search_one_break(&y, &fixed, &opts(false)).unwrap();
    assert!(!fixed.contains(search.best_break));
    assert_eq!(search.best.breaks.len(), 2);
    assert!(search.best.breaks.contains(40));
    assert!(search.trace.iter().all(|e| e.breaks.contains(40)));
  }

  #[test]
  fn no_room_is_insufficient_data() {
    let y = shifted_ar1(50, 25, 1.0, 1);
    let options = SearchOptions {
      trimming: 0.49,
      ..opts(false)
    };
    let err = search_one_break(&y, &BreakConfiguration::default(), &options).unwrap_err();
    assert!(matches!(err, UnitRootError::InsufficientData { .. }), "{err}");
    assert!(err.to_string().contains("trimming 0.49"));
  }

  fn fake_fit(ssr: f64, t_stat: f64) -> Result<EstimationResult, EstimationError> {
    Ok(EstimationResult {
      beta: vec![0.0; 3],
      std_err: vec![1.0; 3],
      ssr,
      t_stat,
      lags: 0,
      nobs: 50,
      k: 4,
    })
  }

  #[traced_test]
  #[test]
  fn failing_candidates_are_skipped_and_logged() {
    let candidates: Vec<(usize, BreakConfiguration)> = (20..25)
      .map(|tb| (tb, BreakConfiguration::new(vec![tb])))
      .collect();
    let outcomes = vec![
      fake_fit(12.0, -3.0),
      Err(EstimationError::RankDeficient {
        rank: 3,
        columns: 4,
      }),
      fake_fit(9.0, -2.0),
      fake_fit(9.0, -4.0),
      Err(EstimationError::NonFiniteStatistic),
    ];
    let search = reduce_scan(candidates, outcomes).unwrap();
    assert_eq!(search.trace.len(), 3);
    assert_eq!(search.skipped.len(), 2);
    assert_eq!(search.skipped[0].breaks.as_slice(), &[21]);
    // tie on SSR 9.0 goes to the earlier date
    assert_eq!(search.best_break, 22);
    assert_eq!(search.best_t_stat, -2.0);
    assert!(logs_contain("skipping break candidate"));
  }

  #[test]
  fn all_candidates_failing_is_an_estimation_error() {
    let candidates = vec![(30, BreakConfiguration::new(vec![30]))];
    let outcomes = vec![Err(EstimationError::RankDeficient {
      rank: 4,
      columns: 5,
    })];
    let err = reduce_scan(candidates, outcomes).unwrap_err();
    assert!(matches!(
      err,
      UnitRootError::Estimation(EstimationError::RankDeficient { .. })
    ));
  }
}
