//! Results tables: one CSV per run, one line per sample.
//!
//! # Storage Format
//!
//! `<base>/<run_id>/results.csv` with a header taken from the first row's
//! columns (`sample, chi2_total, chi2_pmns, chi2_ckm, n_pmns, n_ckm`, then
//! `p_*`, `pmns_*`, `ckm_*`). Numbers use Rust's shortest round-trip
//! formatting, so reading a table back yields the exact values written.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::sweep::SampleRow;

pub const RESULTS_FILE: &str = "results.csv";

/// Directory of a run under `base`.
pub fn run_dir(base: &Path, run_id: &str) -> PathBuf {
    base.join(run_id)
}

/// Path of a run's results table.
pub fn results_csv_path(base: &Path, run_id: &str) -> PathBuf {
    run_dir(base, run_id).join(RESULTS_FILE)
}

/// Write sweep rows to `<base>/<run_id>/results.csv`, creating directories as
/// needed. Returns the written path.
pub fn write_results_table(base: &Path, run_id: &str, rows: &[SampleRow]) -> Result<PathBuf> {
    let dir = run_dir(base, run_id);
    fs::create_dir_all(&dir)?;
    let path = dir.join(RESULTS_FILE);
    let mut out = BufWriter::new(File::create(&path)?);

    if let Some(first) = rows.first() {
        let columns = first.columns();
        writeln!(out, "{}", columns.join(","))?;
        for (i, row) in rows.iter().enumerate() {
            let values = row.values();
            if values.len() != columns.len() {
                return Err(Error::Table {
                    path,
                    line: i + 2,
                    message: format!(
                        "row has {} fields, header has {}",
                        values.len(),
                        columns.len()
                    ),
                });
            }
            let line: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            writeln!(out, "{}", line.join(","))?;
        }
    }
    out.flush()?;

    log::info!("wrote {} rows to {}", rows.len(), path.display());
    Ok(path)
}

/// Column-addressable numeric table read back from a results CSV.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    path: PathBuf,
    columns: Vec<String>,
    data: Vec<Vec<f64>>,
}

impl ResultsTable {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.data.first().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Values of one column in row order.
    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.data[i].as_slice())
            .ok_or_else(|| Error::MissingColumn {
                column: name.to_string(),
                path: self.path.clone(),
            })
    }
}

/// Read a results CSV. Empty cells read as NaN.
pub fn read_results_table(path: &Path) -> Result<ResultsTable> {
    let reader = BufReader::new(File::open(path)?);
    let mut lines = reader.lines();

    let columns: Vec<String> = match lines.next() {
        Some(header) => header?
            .trim_end()
            .split(',')
            .map(|c| c.trim().to_string())
            .collect(),
        None => Vec::new(),
    };
    let mut data: Vec<Vec<f64>> = vec![Vec::new(); columns.len()];

    for (idx, line) in lines.enumerate() {
        let line = line?;
        let lineno = idx + 2;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim_end().split(',').collect();
        if fields.len() != columns.len() {
            return Err(Error::Table {
                path: path.to_path_buf(),
                line: lineno,
                message: format!(
                    "expected {} fields, found {}",
                    columns.len(),
                    fields.len()
                ),
            });
        }
        for (col, field) in data.iter_mut().zip(fields) {
            let field = field.trim();
            let value = if field.is_empty() {
                f64::NAN
            } else {
                field.parse::<f64>().map_err(|e| Error::Table {
                    path: path.to_path_buf(),
                    line: lineno,
                    message: format!("bad number '{field}': {e}"),
                })?
            };
            col.push(value);
        }
    }

    Ok(ResultsTable {
        path: path.to_path_buf(),
        columns,
        data,
    })
}
