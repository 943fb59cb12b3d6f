use std::fs::File;
use std::io::BufRead;
use std::io::BufReader;

use anyhow::Context;
use anyhow::Result;
use unit_root_breaks::stats::stationarity::kapetanios_test;
use unit_root_breaks::stats::stationarity::normalize_series;
use unit_root_breaks::stats::stationarity::KapetaniosConfig;

fn main() -> Result<()> {
  let paths: Vec<String> = std::env::args().skip(1).collect();
  if paths.is_empty() {
    anyhow::bail!("usage: unit-root-breaks <series.txt>...");
  }

  for path in paths {
    println!("\nProcessing {path}");
    let raw = read_vector_from_file(&path)?;
    let series = normalize_series(raw).with_context(|| format!("normalizing {path}"))?;

    let res = kapetanios_test(&series, KapetaniosConfig::default())
      .with_context(|| format!("testing {path}"))?;
    println!("  Model: {}", res.model);
    println!("  Statistic: {:.4}", res.statistic);
    println!("  Breaks: {:?}", res.breaks);
    println!("  Lags: {}", res.used_lags);
    println!("  Approx. p-value: {:.4}", res.p_value);
    println!(
      "  Reject at 1% / 2.5% / 5% / 10%: {} / {} / {} / {}",
      res.decision.one_percent,
      res.decision.two_point_five_percent,
      res.decision.five_percent,
      res.decision.ten_percent
    );
  }

  Ok(())
}

/// One value per line; blank lines are skipped and `nan` is kept for normalization.
fn read_vector_from_file(filename: &str) -> Result<Vec<f64>> {
  let file = File::open(filename).with_context(|| format!("opening {filename}"))?;
  let reader = BufReader::new(file);
  let mut data = Vec::new();

  for (i, line) in reader.lines().enumerate() {
    let line = line?;
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    let value: f64 = line
      .parse()
      .with_context(|| format!("{filename}:{}: cannot parse '{line}'", i + 1))?;
    data.push(value);
  }

  Ok(data)
}
