//! `thetastar rollup`: one CSV line per recorded run.

use std::path::Path;

use thetastar_core::analysis::{ROLLUP_HEADER, rollup_runs};

use super::or_exit;

pub fn run(base_dir: &Path) {
    if !base_dir.is_dir() {
        println!("No runs directory at {}", base_dir.display());
        return;
    }
    println!("{ROLLUP_HEADER}");
    for entry in or_exit(rollup_runs(base_dir)) {
        println!("{}", entry.csv_line());
    }
}
