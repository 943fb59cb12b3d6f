use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rand_distr::StandardNormal;
use unit_root_breaks::stats::stationarity::kapetanios_test;
use unit_root_breaks::stats::stationarity::normalize_series;
use unit_root_breaks::stats::stationarity::KapetaniosConfig;
use unit_root_breaks::stats::stationarity::LagSelection;
use unit_root_breaks::stats::stationarity::ModelType;
use unit_root_breaks::stats::stationarity::UnitRootError;

const N: usize = 200;

fn innovations(n: usize, seed: u64) -> Vec<f64> {
  let mut rng = StdRng::seed_from_u64(seed);
  (0..n).map(|_| rng.sample::<f64, _>(StandardNormal)).collect()
}

fn cumsum(eps: &[f64]) -> Vec<f64> {
  let mut acc = 0.0;
  eps
    .iter()
    .map(|e| {
      acc += e;
      acc
    })
    .collect()
}

fn ar1(eps: &[f64], phi: f64) -> Vec<f64> {
  let mut x = vec![0.0; eps.len()];
  for t in 1..eps.len() {
    x[t] = phi * x[t - 1] + eps[t];
  }
  x
}

fn scenario_cfg() -> KapetaniosConfig {
  KapetaniosConfig {
    model: ModelType::Both,
    max_breaks: 3,
    trimming: 0.15,
    lag_selection: LagSelection::Aic,
    max_lags: Some(2),
    ..KapetaniosConfig::default()
  }
}

/// Model C, three breaks, 15% trimming, AIC over the Schwert lag range.
fn default_lag_cfg() -> KapetaniosConfig {
  KapetaniosConfig {
    model: ModelType::Both,
    max_breaks: 3,
    trimming: 0.15,
    ..KapetaniosConfig::default()
  }
}

// Random walk plus +5 from t = 100, seeds 0..20. A shift in an I(1) series
// is a one-period pulse in the differences, so the location is weakly
// identified: a break lands in 95..=105 in 11 of 20 seeds and the statistic
// beats the shift-free walk in 14 of 20.
#[test]
fn level_shift_on_random_walk_is_found_in_most_seeds() {
  let seeds = 20u64;
  let mut located = 0;
  let mut sharper = 0;
  for seed in 0..seeds {
    let eps = innovations(N, seed);
    let baseline = cumsum(&eps);
    let shifted: Vec<f64> = baseline
      .iter()
      .enumerate()
      .map(|(t, v)| if t >= 100 { v + 5.0 } else { *v })
      .collect();

    let res = kapetanios_test(&shifted, default_lag_cfg()).unwrap();
    let base = kapetanios_test(&baseline, default_lag_cfg()).unwrap();

    if res.breaks.iter().any(|b| (95..=105).contains(b)) {
      located += 1;
    }
    if res.statistic < base.statistic {
      sharper += 1;
    }
  }
  assert!(located >= 9, "shift located in {located} of {seeds} seeds");
  assert!(sharper >= 12, "statistic sharper in {sharper} of {seeds} seeds");
}

#[test]
fn level_shift_is_located_and_rejects_unit_root() {
  for seed in [11, 12, 13] {
    let eps = innovations(N, seed);
    let shifted: Vec<f64> = ar1(&eps, 0.5)
      .into_iter()
      .enumerate()
      .map(|(t, v)| if t >= 100 { v + 5.0 } else { v })
      .collect();
    let baseline = cumsum(&eps);

    let res = kapetanios_test(&shifted, scenario_cfg()).unwrap();
    let base = kapetanios_test(&baseline, scenario_cfg()).unwrap();

    let first = res.break_path[0];
    assert!(
      (95..=105).contains(&first),
      "seed {seed}: first break at {first}, path {:?}",
      res.break_path
    );
    assert!(
      res.statistic < base.statistic,
      "seed {seed}: {} vs random walk {}",
      res.statistic,
      base.statistic
    );
    assert!(res.decision.five_percent, "seed {seed}: {res:?}");
    assert!(res.p_value < 0.05);
  }
}

#[test]
fn trend_break_is_located_by_model_b() {
  for seed in [1, 2, 3] {
    let eps = innovations(N, seed);
    let y: Vec<f64> = ar1(&eps, 0.5)
      .into_iter()
      .enumerate()
      .map(|(t, v)| if t > 120 { v + 0.3 * (t - 120) as f64 } else { v })
      .collect();
    let cfg = KapetaniosConfig {
      model: ModelType::Trend,
      max_breaks: 1,
      lag_selection: LagSelection::Fixed(1),
      max_lags: Some(1),
      ..KapetaniosConfig::default()
    };
    let res = kapetanios_test(&y, cfg).unwrap();
    assert!(
      (110..=128).contains(&res.breaks[0]),
      "seed {seed}: break at {:?}",
      res.breaks
    );
    assert!(res.reject_unit_root, "seed {seed}: {res:?}");
  }
}

// Measured size at 5% is about 4.7% (14 of 300 walks).
#[test]
#[ignore = "slow: 300 full runs with the default lag sweep"]
fn random_walk_rejection_rate_is_near_nominal() {
  let seeds = 300u64;
  let rejections = (0..seeds)
    .filter(|seed| {
      let y = cumsum(&innovations(N, 1_000 + seed));
      kapetanios_test(&y, default_lag_cfg()).unwrap().decision.five_percent
    })
    .count();
  let rate = rejections as f64 / seeds as f64;
  assert!(
    (0.01..=0.10).contains(&rate),
    "rejected the unit root in {rejections} of {seeds} random walks"
  );
}

#[test]
fn decision_agrees_with_pvalue() {
  let eps = innovations(N, 77);
  for y in [cumsum(&eps), ar1(&eps, 0.3)] {
    let res = kapetanios_test(&y, scenario_cfg()).unwrap();
    assert_eq!(res.decision.five_percent, res.p_value < 0.05, "{res:?}");
    assert_eq!(res.decision.one_percent, res.p_value < 0.01, "{res:?}");
    assert_eq!(res.reject_unit_root, res.decision.five_percent);
  }
}

#[test]
fn result_echoes_configuration() {
  let y = cumsum(&innovations(N, 5));
  let res = kapetanios_test(&y, scenario_cfg()).unwrap();
  assert_eq!(res.model, ModelType::Both);
  assert_eq!(res.trimming, 0.15);
  assert_eq!(res.max_lag, 2);
  assert_eq!(res.max_breaks, 3);
  assert!(res.used_lags <= 2);
  assert!(res.breaks.windows(2).all(|w| w[0] < w[1]));
  assert!(res.breaks.iter().all(|b| *b >= 30 && *b < N - 30));
}

#[test]
fn short_series_with_wide_trimming_is_insufficient_data() {
  let y = cumsum(&innovations(50, 3));
  let cfg = KapetaniosConfig {
    trimming: 0.49,
    ..KapetaniosConfig::default()
  };
  assert!(matches!(
    kapetanios_test(&y, cfg),
    Err(UnitRootError::InsufficientData { .. })
  ));
}

#[test]
fn unknown_model_or_lag_rule_is_a_configuration_error() {
  assert!(matches!(
    "D".parse::<ModelType>(),
    Err(UnitRootError::Configuration {
      parameter: "model",
      ..
    })
  ));
  assert!(matches!(
    "median".parse::<LagSelection>(),
    Err(UnitRootError::Configuration {
      parameter: "lag_selection",
      ..
    })
  ));
}

#[test]
fn nan_gaps_are_dropped_before_testing() {
  let mut raw = cumsum(&innovations(N + 10, 8));
  for i in (0..raw.len()).step_by(21) {
    raw[i] = f64::NAN;
  }
  let y = normalize_series(raw).unwrap();
  assert_eq!(y.len(), N);
  let res = kapetanios_test(&y, scenario_cfg()).unwrap();
  assert!(res.statistic.is_finite());
}
