//! `thetastar analyze`: θ★ distribution in the good-χ² region of a run.

use std::path::Path;

use thetastar_core::analysis::{RunSamples, Selection, delta_chi2_for_cl, load_run, theta_summary};

use super::{format_theta_summary, or_exit};

/// Selections requested on the command line, always starting with ALL.
fn selections(
    chi2_max: Option<f64>,
    delta_chi2: Option<f64>,
    cl: Option<f64>,
) -> thetastar_core::Result<Vec<Selection>> {
    let mut out = vec![Selection::All];
    if let Some(cut) = chi2_max {
        out.push(Selection::Chi2Max(cut));
    }
    if let Some(delta) = delta_chi2 {
        out.push(Selection::DeltaChi2(delta));
    }
    if let Some(cl) = cl {
        out.push(Selection::DeltaChi2(delta_chi2_for_cl(cl, 1)?));
    }
    Ok(out)
}

fn report(samples: &RunSamples, selections: &[Selection]) -> String {
    let mut blocks = vec![
        format!("Run: {}", samples.run_id),
        format!("Total samples: {}", samples.len()),
        format!("chi2_min = {:.4}", samples.chi2_min()),
    ];
    for sel in selections {
        let theta = samples.select(*sel);
        let label = match sel {
            Selection::DeltaChi2(d) => format!("chi2 <= chi2_min + {d:.4}"),
            other => other.to_string(),
        };
        blocks.push(format_theta_summary(&label, theta_summary(&theta).as_ref()));
    }
    blocks.join("\n")
}

pub fn run(
    run_id: &str,
    base_dir: &Path,
    chi2_max: Option<f64>,
    delta_chi2: Option<f64>,
    cl: Option<f64>,
) {
    let selections = or_exit(selections(chi2_max, delta_chi2, cl));
    let samples = or_exit(load_run(base_dir, run_id));
    println!("{}", report(&samples, &selections));
}
