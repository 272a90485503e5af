//! `thetastar ansatze`: list registered ansätze, parameters and bounds.

use std::path::Path;

use thetastar_core::{Ansatz, MassOrdering, TargetCatalog, all_ansatze};

use super::{load_catalog, or_exit};

pub fn run(ordering: MassOrdering, targets_path: Option<&Path>) {
    let catalog = or_exit(load_catalog(targets_path));
    for ansatz in all_ansatze() {
        println!("{}", or_exit(describe(ansatz.as_ref(), &catalog, ordering)));
    }
}

/// Name, description and one bound line per parameter.
fn describe(
    ansatz: &dyn Ansatz,
    catalog: &TargetCatalog,
    ordering: MassOrdering,
) -> thetastar_core::Result<String> {
    let bounds = ansatz.param_bounds(catalog, ordering)?;
    let mut out = format!("{}\n  {}\n", ansatz.name(), ansatz.description());
    for (name, b) in bounds.iter() {
        out.push_str(&format!("  {name:<12} [{:>12.6e}, {:>12.6e}]\n", b.low, b.high));
    }
    Ok(out)
}
