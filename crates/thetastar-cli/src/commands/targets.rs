//! `thetastar targets`: print the active target catalog.

use std::path::Path;

use thetastar_core::{MassOrdering, TargetCatalog, TargetMap};

use super::{load_catalog, or_exit};

pub fn run(json: bool, targets_path: Option<&Path>) {
    let catalog = or_exit(load_catalog(targets_path));
    if json {
        match serde_json::to_string_pretty(&catalog) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }
    print!("{}", render(&catalog));
}

fn render_map(title: &str, map: &TargetMap) -> String {
    let mut out = format!("{title}\n");
    if map.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }
    out.push_str(&format!(
        "  {:<8} {:>14} {:>14}  {:<6} {}\n",
        "key", "value", "sigma", "unit", "ref"
    ));
    for (key, t) in map {
        out.push_str(&format!(
            "  {:<8} {:>14.6e} {:>14.6e}  {:<6} {}\n",
            key, t.value, t.sigma, t.unit, t.reference
        ));
    }
    out
}

fn render(catalog: &TargetCatalog) -> String {
    [
        render_map("PMNS (NO)", catalog.pmns(MassOrdering::Normal)),
        render_map("PMNS (IO)", catalog.pmns(MassOrdering::Inverted)),
        render_map("CKM", catalog.ckm_targets()),
    ]
    .join("\n")
}
