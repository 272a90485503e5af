pub mod analyze;
pub mod ansatze;
pub mod inspect;
pub mod posterior;
pub mod rollup;
pub mod sweep;
pub mod targets;

use std::path::Path;

use thetastar_core::TargetCatalog;
use thetastar_core::analysis::ThetaSummary;

/// Unwrap a core result or report the error and exit with status 1.
pub fn or_exit<T>(result: thetastar_core::Result<T>) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Built-in catalog, or the one loaded from `path`.
pub fn load_catalog(path: Option<&Path>) -> thetastar_core::Result<TargetCatalog> {
    match path {
        Some(p) => TargetCatalog::from_path(p),
        None => Ok(TargetCatalog::builtin()),
    }
}

/// Multi-line θ★ summary block, as printed by `inspect` and `analyze`.
pub fn format_theta_summary(label: &str, summary: Option<&ThetaSummary>) -> String {
    match summary {
        None => format!("[{label}] no samples – nothing to summarize"),
        Some(s) => [
            format!("[{label}] n_samples = {}", s.n),
            format!("  theta_star min = {:.4} rad", s.min),
            format!("  theta_star max = {:.4} rad", s.max),
            format!("  theta_star 16% = {:.4} rad", s.q16),
            format!("  theta_star 50% (median) = {:.4} rad", s.q50),
            format!("  theta_star 84% = {:.4} rad", s.q84),
            format!("  approx 1σ band: [{:.4}, {:.4}] rad", s.q16, s.q84),
        ]
        .join("\n"),
    }
}
