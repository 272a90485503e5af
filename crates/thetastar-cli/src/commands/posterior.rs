//! `thetastar posterior`: combine several runs into one θ★ posterior summary.

use std::path::Path;

use thetastar_core::analysis::{PosteriorSummary, summarize_posterior, write_posterior_summary};

use super::or_exit;

const RULE: usize = 72;

fn render(summary: &PosteriorSummary) -> String {
    let mut out = String::new();
    for r in &summary.per_run {
        out.push_str(&format!("[{}]\n", r.run_id));
        out.push_str(&format!("  n_total   = {}\n", r.n_total));
        out.push_str(&format!("  n_used    = {}\n", r.n_used));
        out.push_str(&format!("  chi2_min  = {:.4}\n", r.chi2_min));
        out.push_str(&format!(
            "  theta★ (q16, q50, q84) = ({:.4}, {:.4}, {:.4})\n",
            r.theta_q16, r.theta_q50, r.theta_q84
        ));
        out.push_str(&"-".repeat(RULE));
        out.push('\n');
    }
    let g = &summary.global;
    out.push_str("GLOBAL theta★ summary (all runs combined):\n");
    out.push_str(&format!("  n_total_used = {}\n", g.n_total_used));
    out.push_str(&format!(
        "  theta★ (q16, q50, q84) = ({:.4}, {:.4}, {:.4})\n",
        g.theta_q16, g.theta_q50, g.theta_q84
    ));
    out
}

pub fn run(run_ids: &[String], chi2_max: f64, base_dir: &Path, output: &Path) {
    println!("Summarizing theta★ for runs: {}", run_ids.join(", "));
    println!("Chi² cut: chi2_total <= {chi2_max:.3}");
    println!("{}", "-".repeat(RULE));

    let summary = or_exit(summarize_posterior(base_dir, run_ids, chi2_max));
    print!("{}", render(&summary));

    or_exit(write_posterior_summary(output, &summary));
    println!();
    println!("Wrote JSON summary to {}", output.display());
}
