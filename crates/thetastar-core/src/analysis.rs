//! Post-sweep analysis of recorded runs.
//!
//! Works on the persisted layout only (`<base>/<run_id>/results.csv` and
//! `run_meta.json`): χ² statistics, θ★ quantile summaries under χ² cuts,
//! multi-run posterior summaries and run roll-ups.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};

use crate::error::{Error, Result};
use crate::results::{ResultsTable, read_results_table, results_csv_path};
use crate::runlog::{META_FILE, read_run_meta};

/// Default χ² cut of the posterior summary.
pub const DEFAULT_CHI2_MAX: f64 = 50.0;

/// Default output of the posterior summary.
pub const DEFAULT_POSTERIOR_OUTPUT: &str = "data/processed/theta_star_posterior_summary.json";

/// Angle columns in order of preference.
pub const THETA_COLUMNS: [&str; 2] = ["p_theta_star", "pmns_deltaCP"];

// ---------------------------------------------------------------------------
// Order statistics
// ---------------------------------------------------------------------------

fn sorted_finite(values: &[f64]) -> Vec<f64> {
    let mut v: Vec<f64> = values.iter().copied().filter(|x| !x.is_nan()).collect();
    v.sort_by(f64::total_cmp);
    v
}

/// Quantile of sorted data with linear interpolation between order statistics.
///
/// `q` is clamped into `[0, 1]`. Returns NaN for empty input.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let h = (n - 1) as f64 * q.clamp(0.0, 1.0);
            let lo = h.floor() as usize;
            let hi = (lo + 1).min(n - 1);
            sorted[lo] + (h - lo as f64) * (sorted[hi] - sorted[lo])
        }
    }
}

/// min / mean / median of `chi2_total`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Chi2Stats {
    pub n: usize,
    pub min: f64,
    pub mean: f64,
    pub median: f64,
}

/// `None` when there is no non-NaN value.
pub fn chi2_stats(chi2: &[f64]) -> Option<Chi2Stats> {
    let sorted = sorted_finite(chi2);
    if sorted.is_empty() {
        return None;
    }
    let n = sorted.len();
    Some(Chi2Stats {
        n,
        min: sorted[0],
        mean: sorted.iter().sum::<f64>() / n as f64,
        median: quantile_sorted(&sorted, 0.5),
    })
}

/// Spread of θ★ over a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThetaSummary {
    pub n: usize,
    pub min: f64,
    pub max: f64,
    pub q16: f64,
    pub q50: f64,
    pub q84: f64,
}

/// `None` when there is no non-NaN value.
pub fn theta_summary(theta: &[f64]) -> Option<ThetaSummary> {
    let sorted = sorted_finite(theta);
    let (&min, &max) = (sorted.first()?, sorted.last()?);
    Some(ThetaSummary {
        n: sorted.len(),
        min,
        max,
        q16: quantile_sorted(&sorted, 0.16),
        q50: quantile_sorted(&sorted, 0.50),
        q84: quantile_sorted(&sorted, 0.84),
    })
}

// ---------------------------------------------------------------------------
// χ² distribution
// ---------------------------------------------------------------------------

fn chi_squared(dof: usize) -> Result<ChiSquared> {
    ChiSquared::new(dof as f64).map_err(|e| Error::Stats(format!("chi2 with {dof} dof: {e}")))
}

/// Upper-tail probability `P(X >= chi2)` for `dof` degrees of freedom.
pub fn chi2_p_value(chi2: f64, dof: usize) -> Result<f64> {
    if chi2.is_nan() {
        return Err(Error::Stats("chi2 is NaN".to_string()));
    }
    Ok(1.0 - chi_squared(dof)?.cdf(chi2.max(0.0)))
}

/// Δχ² threshold enclosing confidence level `cl` for `dof` parameters
/// (e.g. `cl = 0.95, dof = 1` → 3.84).
pub fn delta_chi2_for_cl(cl: f64, dof: usize) -> Result<f64> {
    if !(cl > 0.0 && cl < 1.0) {
        return Err(Error::Stats(format!(
            "confidence level must lie in (0, 1), got {cl}"
        )));
    }
    Ok(chi_squared(dof)?.inverse_cdf(cl))
}

// ---------------------------------------------------------------------------
// Sample selection
// ---------------------------------------------------------------------------

/// Which samples of a run count as "good".
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    All,
    /// `chi2_total <= cut`
    Chi2Max(f64),
    /// `chi2_total <= chi2_min + delta`
    DeltaChi2(f64),
}

impl Selection {
    /// Absolute χ² threshold, `None` for [`Selection::All`].
    pub fn threshold(self, chi2_min: f64) -> Option<f64> {
        match self {
            Selection::All => None,
            Selection::Chi2Max(cut) => Some(cut),
            Selection::DeltaChi2(delta) => Some(chi2_min + delta),
        }
    }
}

impl std::fmt::Display for Selection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Selection::All => write!(f, "ALL"),
            Selection::Chi2Max(cut) => write!(f, "chi2 <= {cut}"),
            Selection::DeltaChi2(delta) => write!(f, "chi2 <= chi2_min + {delta}"),
        }
    }
}

/// χ² and θ★ columns of one run.
#[derive(Debug, Clone)]
pub struct RunSamples {
    pub run_id: String,
    pub path: PathBuf,
    pub theta_column: &'static str,
    pub chi2: Vec<f64>,
    pub theta: Vec<f64>,
    /// Contributing observables per sample, when the table records them.
    pub n_obs: Option<Vec<f64>>,
}

/// Preferred angle column present in `table`.
pub fn select_theta_column(table: &ResultsTable) -> Result<&'static str> {
    THETA_COLUMNS
        .iter()
        .copied()
        .find(|c| table.has_column(c))
        .ok_or_else(|| Error::MissingColumn {
            column: THETA_COLUMNS.join("' or '"),
            path: table.path().to_path_buf(),
        })
}

impl RunSamples {
    pub fn from_table(run_id: &str, table: &ResultsTable) -> Result<Self> {
        let chi2 = table.column("chi2_total")?.to_vec();
        let theta_column = select_theta_column(table)?;
        let theta = table.column(theta_column)?.to_vec();
        let n_obs = match (table.column("n_pmns"), table.column("n_ckm")) {
            (Ok(p), Ok(c)) => Some(p.iter().zip(c).map(|(a, b)| a + b).collect()),
            _ => None,
        };
        Ok(Self {
            run_id: run_id.to_string(),
            path: table.path().to_path_buf(),
            theta_column,
            chi2,
            theta,
            n_obs,
        })
    }

    pub fn len(&self) -> usize {
        self.chi2.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chi2.is_empty()
    }

    /// Smallest χ² (NaN if none).
    pub fn chi2_min(&self) -> f64 {
        self.chi2
            .iter()
            .copied()
            .filter(|x| !x.is_nan())
            .fold(f64::NAN, f64::min)
    }

    /// θ★ values of the samples passing `selection`.
    pub fn select(&self, selection: Selection) -> Vec<f64> {
        match selection.threshold(self.chi2_min()) {
            None => self.theta.clone(),
            Some(t) => self
                .chi2
                .iter()
                .zip(&self.theta)
                .filter(|(c, _)| **c <= t)
                .map(|(_, th)| *th)
                .collect(),
        }
    }

    /// p-value of the best sample, with one degree of freedom per
    /// contributing observable. `None` if the table lacks the counts.
    pub fn best_fit_p_value(&self) -> Result<Option<f64>> {
        let Some(n_obs) = &self.n_obs else {
            return Ok(None);
        };
        let best = self
            .chi2
            .iter()
            .enumerate()
            .filter(|(_, c)| !c.is_nan())
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i);
        match best {
            Some(i) if n_obs[i] >= 1.0 => {
                chi2_p_value(self.chi2[i], n_obs[i] as usize).map(Some)
            }
            _ => Ok(None),
        }
    }
}

/// Load `<base>/<run_id>/results.csv`.
pub fn load_run(base: &Path, run_id: &str) -> Result<RunSamples> {
    let table = read_results_table(&results_csv_path(base, run_id))?;
    RunSamples::from_table(run_id, &table)
}

// ---------------------------------------------------------------------------
// Posterior summary
// ---------------------------------------------------------------------------

/// θ★ posterior of one run after the χ² cut.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPosterior {
    pub run_id: String,
    pub n_total: usize,
    pub n_used: usize,
    pub chi2_min: f64,
    pub chi2_max_cut: f64,
    pub theta_q16: f64,
    pub theta_q50: f64,
    pub theta_q84: f64,
}

/// θ★ posterior over all runs combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalPosterior {
    pub n_total_used: usize,
    pub chi2_max_cut: f64,
    pub theta_q16: f64,
    pub theta_q50: f64,
    pub theta_q84: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PosteriorSummary {
    pub chi2_max: f64,
    pub per_run: Vec<RunPosterior>,
    pub global: GlobalPosterior,
}

/// Apply `chi2_total <= chi2_max` to one run and summarize θ★.
///
/// Returns the summary and the surviving θ★ values.
pub fn summarize_run_posterior(
    samples: &RunSamples,
    chi2_max: f64,
) -> Result<(RunPosterior, Vec<f64>)> {
    let chi2_min = samples.chi2_min();
    let theta = samples.select(Selection::Chi2Max(chi2_max));
    let Some(s) = theta_summary(&theta) else {
        return Err(Error::NoSamplesSelected {
            run_id: samples.run_id.clone(),
            cut: chi2_max,
            chi2_min,
        });
    };
    let posterior = RunPosterior {
        run_id: samples.run_id.clone(),
        n_total: samples.len(),
        n_used: theta.len(),
        chi2_min,
        chi2_max_cut: chi2_max,
        theta_q16: s.q16,
        theta_q50: s.q50,
        theta_q84: s.q84,
    };
    Ok((posterior, theta))
}

/// Per-run and combined θ★ posteriors for `run_ids` under `base`.
pub fn summarize_posterior(
    base: &Path,
    run_ids: &[String],
    chi2_max: f64,
) -> Result<PosteriorSummary> {
    let mut per_run = Vec::with_capacity(run_ids.len());
    let mut all_theta = Vec::new();
    for run_id in run_ids {
        let samples = load_run(base, run_id)?;
        let (posterior, theta) = summarize_run_posterior(&samples, chi2_max)?;
        log::info!(
            "{run_id}: {}/{} samples pass chi2 <= {chi2_max}",
            posterior.n_used,
            posterior.n_total
        );
        per_run.push(posterior);
        all_theta.extend(theta);
    }

    let Some(s) = theta_summary(&all_theta) else {
        return Err(Error::Stats("no runs to summarize".to_string()));
    };
    Ok(PosteriorSummary {
        chi2_max,
        per_run,
        global: GlobalPosterior {
            n_total_used: s.n,
            chi2_max_cut: chi2_max,
            theta_q16: s.q16,
            theta_q50: s.q50,
            theta_q84: s.q84,
        },
    })
}

/// Write a posterior summary as pretty JSON, creating parent directories.
pub fn write_posterior_summary(path: &Path, summary: &PosteriorSummary) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(summary)?)?;
    log::info!("wrote posterior summary to {}", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Roll-up
// ---------------------------------------------------------------------------

pub const ROLLUP_HEADER: &str = "run_id,ansatz,N,seed,chi2_min,theta_star_best";

/// One line of the run roll-up.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollupEntry {
    pub run_id: String,
    pub ansatz: String,
    pub n_samples: usize,
    pub seed: u64,
    pub chi2_min: f64,
    pub theta_star_best: Option<f64>,
}

impl RollupEntry {
    pub fn csv_line(&self) -> String {
        let theta = self
            .theta_star_best
            .map(|t| t.to_string())
            .unwrap_or_default();
        format!(
            "{},{},{},{},{},{}",
            self.run_id, self.ansatz, self.n_samples, self.seed, self.chi2_min, theta
        )
    }
}

/// One entry per run directory under `base` with a readable `run_meta.json`,
/// sorted by directory name. A missing `base` yields no entries.
pub fn rollup_runs(base: &Path) -> Result<Vec<RollupEntry>> {
    if !base.is_dir() {
        log::warn!("no runs directory at {}", base.display());
        return Ok(Vec::new());
    }

    let mut dirs: Vec<PathBuf> = fs::read_dir(base)?
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();

    let mut entries = Vec::new();
    for dir in dirs {
        let meta_path = dir.join(META_FILE);
        if !meta_path.exists() {
            continue;
        }
        let meta = match read_run_meta(&meta_path) {
            Ok(m) => m,
            Err(e) => {
                log::warn!("skipping {}: {e}", meta_path.display());
                continue;
            }
        };
        let run_id = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| meta.run_id.clone());
        let s = &meta.summary;
        entries.push(RollupEntry {
            run_id,
            ansatz: s.ansatz_name.clone(),
            n_samples: s.n_samples,
            seed: s.seed_used,
            chi2_min: s.best_loss.chi2_total,
            theta_star_best: s.best_params.get(crate::ansatz::THETA_STAR).copied(),
        });
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(chi2: &[f64], theta: &[f64]) -> RunSamples {
        RunSamples {
            run_id: "r".to_string(),
            path: PathBuf::from("r/results.csv"),
            theta_column: "p_theta_star",
            chi2: chi2.to_vec(),
            theta: theta.to_vec(),
            n_obs: None,
        }
    }

    #[test]
    fn quantile_interpolates_linearly() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(quantile_sorted(&v, 0.5), 3.0);
        assert_eq!(quantile_sorted(&v, 0.0), 1.0);
        assert_eq!(quantile_sorted(&v, 1.0), 5.0);
        assert!((quantile_sorted(&v, 0.16) - 1.64).abs() < 1e-12);
        assert!((quantile_sorted(&v, 0.84) - 4.36).abs() < 1e-12);
        assert!(quantile_sorted(&[], 0.5).is_nan());
        assert_eq!(quantile_sorted(&[7.0], 0.84), 7.0);
    }

    #[test]
    fn chi2_stats_even_count_median() {
        let s = chi2_stats(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.min, 1.0);
        assert_eq!(s.mean, 2.5);
        assert_eq!(s.median, 2.5);
        assert!(chi2_stats(&[]).is_none());
        assert!(chi2_stats(&[f64::NAN]).is_none());
    }

    #[test]
    fn theta_summary_orders_values() {
        let s = theta_summary(&[3.0, 1.0, 2.0]).unwrap();
        assert_eq!((s.n, s.min, s.max, s.q50), (3, 1.0, 3.0, 2.0));
        assert!(s.q16 <= s.q50 && s.q50 <= s.q84);
    }

    #[test]
    fn p_value_and_cl_threshold() {
        // 3.841 is the 95% point of chi2 with 1 dof
        let d = delta_chi2_for_cl(0.95, 1).unwrap();
        assert!((d - 3.841_458_820_694_124).abs() < 1e-4, "{d}");
        let p = chi2_p_value(d, 1).unwrap();
        assert!((p - 0.05).abs() < 1e-4, "{p}");
        assert_eq!(chi2_p_value(0.0, 3).unwrap(), 1.0);
        assert!(delta_chi2_for_cl(1.5, 1).is_err());
        assert!(chi2_p_value(1.0, 0).is_err());
    }

    #[test]
    fn selections() {
        let s = samples(&[10.0, 2.0, 5.0, 60.0], &[0.1, 0.2, 0.3, 0.4]);
        assert_eq!(s.chi2_min(), 2.0);
        assert_eq!(s.select(Selection::All).len(), 4);
        assert_eq!(s.select(Selection::Chi2Max(10.0)), vec![0.1, 0.2, 0.3]);
        assert_eq!(s.select(Selection::DeltaChi2(3.0)), vec![0.2, 0.3]);
        assert_eq!(Selection::DeltaChi2(3.84).to_string(), "chi2 <= chi2_min + 3.84");
    }

    #[test]
    fn posterior_cut_leaving_nothing_fails() {
        let s = samples(&[80.0, 90.0], &[1.0, 2.0]);
        match summarize_run_posterior(&s, 50.0) {
            Err(Error::NoSamplesSelected { run_id, cut, chi2_min }) => {
                assert_eq!(run_id, "r");
                assert_eq!(cut, 50.0);
                assert_eq!(chi2_min, 80.0);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn posterior_counts() {
        let s = samples(&[1.0, 70.0, 3.0], &[1.0, 9.0, 2.0]);
        let (p, theta) = summarize_run_posterior(&s, 50.0).unwrap();
        assert_eq!((p.n_total, p.n_used), (3, 2));
        assert_eq!(theta, vec![1.0, 2.0]);
        assert_eq!(p.theta_q50, 1.5);
    }

    #[test]
    fn best_fit_p_value_uses_observable_count() {
        let mut s = samples(&[4.0, 2.0], &[0.1, 0.2]);
        assert_eq!(s.best_fit_p_value().unwrap(), None);
        s.n_obs = Some(vec![2.0, 2.0]);
        // chi2 = 2 with 2 dof: p = exp(-1)
        let p = s.best_fit_p_value().unwrap().unwrap();
        assert!((p - (-1.0f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn rollup_of_missing_base_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(rollup_runs(&tmp.path().join("nope")).unwrap().is_empty());
    }

    #[test]
    fn rollup_line_format() {
        let e = RollupEntry {
            run_id: "NO_theta_star_v1_N10".to_string(),
            ansatz: "theta_star_v1".to_string(),
            n_samples: 10,
            seed: 123,
            chi2_min: 1.5,
            theta_star_best: Some(3.25),
        };
        assert_eq!(e.csv_line(), "NO_theta_star_v1_N10,theta_star_v1,10,123,1.5,3.25");
    }
}
