//! `thetastar inspect`: χ² statistics and θ★ spread of one run.

use std::path::Path;

use thetastar_core::analysis::{RunSamples, Selection, chi2_stats, load_run, theta_summary};

use super::{format_theta_summary, or_exit};

pub fn run(run_id: &str, base_dir: &Path) {
    let samples = or_exit(load_run(base_dir, run_id));
    println!("{}", or_exit(report(&samples)));
}

fn report(samples: &RunSamples) -> thetastar_core::Result<String> {
    let mut lines = vec![
        format!("Run: {}", samples.run_id),
        format!("Table: {}", samples.path.display()),
        format!("Total samples: {}", samples.len()),
    ];
    match chi2_stats(&samples.chi2) {
        Some(s) => lines.push(format!(
            "chi2_total: min={:.3}, mean={:.3}, median={:.3}",
            s.min, s.mean, s.median
        )),
        None => lines.push("chi2_total: no finite values".to_string()),
    }
    if let Some(p) = samples.best_fit_p_value()? {
        lines.push(format!("best-fit p-value = {p:.4}"));
    }
    lines.push(format!("theta column: {}", samples.theta_column));
    let all = samples.select(Selection::All);
    lines.push(format_theta_summary("ALL", theta_summary(&all).as_ref()));
    Ok(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn report_lists_chi2_stats_and_p_value() {
        let samples = RunSamples {
            run_id: "NO_x_N3".to_string(),
            path: PathBuf::from("runs/NO_x_N3/results.csv"),
            theta_column: "p_theta_star",
            chi2: vec![2.0, 4.0, 6.0],
            theta: vec![1.0, 2.0, 3.0],
            n_obs: Some(vec![2.0, 2.0, 2.0]),
        };
        let text = report(&samples).unwrap();
        assert!(text.contains("Total samples: 3"));
        assert!(text.contains("chi2_total: min=2.000, mean=4.000, median=4.000"));
        assert!(text.contains("best-fit p-value = 0.3679"));
        assert!(text.contains("[ALL] n_samples = 3"));
    }
}
