//! Sweep every registered ansatz in both mass orderings and print the best fit.
//!
//! Run with: `cargo run -p thetastar-core --example compare_ansatze`

use thetastar_core::{MassOrdering, SweepConfig, TargetCatalog, all_ansatze, run_sweep};

fn main() -> thetastar_core::Result<()> {
    let catalog = TargetCatalog::builtin();

    println!(
        "{:<24} {:>3} {:>10} {:>10} {:>10}",
        "ansatz", "ord", "chi2", "chi2_pmns", "theta*"
    );
    for ansatz in all_ansatze() {
        for ordering in [MassOrdering::Normal, MassOrdering::Inverted] {
            let config = SweepConfig {
                ansatz_name: ansatz.name().to_string(),
                ordering,
                n_samples: 2000,
                seed: Some(123),
                ..SweepConfig::default()
            };
            let summary = run_sweep(&config, &catalog)?.summary;
            let theta = summary.best_params.get("theta_star").copied().unwrap_or(f64::NAN);
            println!(
                "{:<24} {:>3} {:>10.3} {:>10.3} {:>10.4}",
                summary.ansatz_name,
                summary.ordering,
                summary.best_loss.chi2_total,
                summary.best_loss.chi2_pmns,
                theta
            );
        }
    }
    Ok(())
}
