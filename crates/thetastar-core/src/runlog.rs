//! Run metadata written next to every results table.
//!
//! `<base>/<run_id>/run_meta.json` records enough to replay and audit a run:
//! the full sweep summary (configuration, seed actually used, best fit),
//! when and where it ran, and the command line that produced it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::sweep::SweepSummary;

pub const META_FILE: &str = "run_meta.json";

/// Current `run_meta.json` schema version.
pub const META_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Machine info
// ---------------------------------------------------------------------------

/// Host the run executed on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MachineInfo {
    pub os: String,
    pub arch: String,
    pub cores: usize,
}

/// Best-effort host description.
pub fn detect_machine_info() -> MachineInfo {
    let family = std::env::consts::OS;
    // Linux distributions name themselves in os-release; elsewhere the
    // family alone is recorded.
    let release = if cfg!(target_os = "linux") {
        std::fs::read_to_string("/etc/os-release")
            .ok()
            .and_then(|text| {
                text.lines()
                    .find_map(|l| l.strip_prefix("PRETTY_NAME="))
                    .map(|v| v.trim_matches('"').to_string())
            })
    } else {
        None
    };
    MachineInfo {
        os: release.map_or_else(|| family.to_string(), |r| format!("{family} {r}")),
        arch: std::env::consts::ARCH.to_string(),
        cores: std::thread::available_parallelism().map_or(1, |n| n.get()),
    }
}

/// `git rev-parse HEAD` in the working directory, if it succeeds.
pub fn git_head() -> Option<String> {
    let output = std::process::Command::new("git")
        .args(["rev-parse", "HEAD"])
        .stderr(std::process::Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let head = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if head.is_empty() { None } else { Some(head) }
}

// ---------------------------------------------------------------------------
// run_meta.json
// ---------------------------------------------------------------------------

/// Contents of `run_meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMeta {
    pub version: u32,
    pub run_id: String,
    pub created_at: String,
    pub invocation_id: String,
    pub git_head: Option<String>,
    pub argv: Vec<String>,
    pub machine: MachineInfo,
    pub thetastar_version: String,
    pub results_csv: PathBuf,
    #[serde(flatten)]
    pub summary: SweepSummary,
}

impl RunMeta {
    /// Stamp a summary with the current time, host, git head and argv.
    pub fn new(run_id: &str, results_csv: &Path, summary: SweepSummary) -> Self {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            version: META_VERSION,
            run_id: run_id.to_string(),
            created_at: format_iso8601(now),
            invocation_id: Uuid::new_v4().to_string(),
            git_head: git_head(),
            argv: std::env::args().collect(),
            machine: detect_machine_info(),
            thetastar_version: crate::VERSION.to_string(),
            results_csv: results_csv.to_path_buf(),
            summary,
        }
    }
}

/// Write `meta` as pretty JSON, creating parent directories.
pub fn write_run_meta(path: &Path, meta: &RunMeta) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut json = serde_json::to_string_pretty(meta)?;
    json.push('\n');
    fs::write(path, json)?;
    log::info!("wrote run metadata to {}", path.display());
    Ok(())
}

pub fn read_run_meta(path: &Path) -> Result<RunMeta> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Format a duration-since-epoch as a full ISO-8601 timestamp.
/// Example: `2026-02-15T01:30:00Z`
pub fn format_iso8601(since_epoch: Duration) -> String {
    let (year, month, day, hour, min, sec) = secs_to_utc(since_epoch.as_secs());
    format!("{year:04}-{month:02}-{day:02}T{hour:02}:{min:02}:{sec:02}Z")
}

/// Seconds since the Unix epoch to (year, month, day, hour, minute, second) UTC.
/// No leap seconds.
fn secs_to_utc(secs: u64) -> (u64, u64, u64, u64, u64, u64) {
    let sec = secs % 60;
    let min = (secs / 60) % 60;
    let hour = (secs / 3600) % 24;

    let mut days = secs / 86400;
    let mut year = 1970u64;
    loop {
        let len = days_in_year(year);
        if days < len {
            break;
        }
        days -= len;
        year += 1;
    }

    let feb = days_in_year(year) - 337;
    let month_lengths = [31, feb, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let mut month = 1u64;
    for len in month_lengths {
        if days < len {
            break;
        }
        days -= len;
        month += 1;
    }

    (year, month, days + 1, hour, min, sec)
}

/// Gregorian year length.
fn days_in_year(year: u64) -> u64 {
    let leap = match (year % 4, year % 100, year % 400) {
        (_, _, 0) => true,
        (_, 0, _) => false,
        (r, _, _) => r == 0,
    };
    if leap { 366 } else { 365 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sweep::{SweepConfig, run_sweep};
    use crate::targets::TargetCatalog;

    fn summary() -> SweepSummary {
        let config = SweepConfig {
            n_samples: 10,
            seed: Some(5),
            ..SweepConfig::default()
        };
        run_sweep(&config, &TargetCatalog::builtin()).unwrap().summary
    }

    #[test]
    fn machine_info_is_populated() {
        let info = detect_machine_info();
        assert!(!info.os.is_empty());
        assert!(!info.arch.is_empty());
        assert!(info.cores > 0);
    }

    #[test]
    fn iso8601_epoch() {
        assert_eq!(format_iso8601(Duration::from_secs(0)), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn iso8601_known_dates() {
        // 2000-01-01 00:00:00 UTC
        assert_eq!(
            format_iso8601(Duration::from_secs(946_684_800)),
            "2000-01-01T00:00:00Z"
        );
        // 2024-02-29 12:34:56 UTC
        assert_eq!(
            format_iso8601(Duration::from_secs(1_709_210_096)),
            "2024-02-29T12:34:56Z"
        );
        // 2023-12-31 23:59:59 UTC
        assert_eq!(
            format_iso8601(Duration::from_secs(1_704_067_199)),
            "2023-12-31T23:59:59Z"
        );
    }

    #[test]
    fn leap_years() {
        assert_eq!(days_in_year(2000), 366);
        assert_eq!(days_in_year(2024), 366);
        assert_eq!(days_in_year(1900), 365);
        assert_eq!(days_in_year(2023), 365);
    }

    #[test]
    fn summary_fields_are_flattened() {
        let meta = RunMeta::new("NO_x_N10", Path::new("runs/NO_x_N10/results.csv"), summary());
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json["run_id"], "NO_x_N10");
        assert_eq!(json["ordering"], "NO");
        assert_eq!(json["ansatz_name"], "theta_star_delta_only");
        assert_eq!(json["n_samples"], 10);
        assert_eq!(json["seed_used"], 5);
        assert_eq!(json["config"]["seed"], 5);
        assert_eq!(json["config"]["base_dir"], "data/processed/runs");
        assert!(json["best_loss"]["chi2_total"].is_number());
        assert!(json["best_params"]["theta_star"].is_number());
        assert_eq!(json["results_csv"], "runs/NO_x_N10/results.csv");
        assert!(Uuid::parse_str(json["invocation_id"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn write_then_read() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("run").join(META_FILE);
        let meta = RunMeta::new("run", Path::new("run/results.csv"), summary());
        write_run_meta(&path, &meta).unwrap();
        let back = read_run_meta(&path).unwrap();
        assert_eq!(back.run_id, "run");
        assert_eq!(back.invocation_id, meta.invocation_id);
        assert_eq!(back.created_at, meta.created_at);
        assert_eq!(back.summary.config, meta.summary.config);
        assert_eq!(back.summary.best_sample, meta.summary.best_sample);
        assert_eq!(back.summary.seed_used, 5);
        let (a, b) = (back.summary.best_loss.chi2_total, meta.summary.best_loss.chi2_total);
        assert!((a - b).abs() <= 1e-12 * b.abs().max(1.0));
    }
}
