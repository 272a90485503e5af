//! Weighted χ² loss.
//!
//! ```text
//! χ² = Σ ((pred_i - target_i) / σ_i)²
//! ```
//!
//! The Dirac phase uses the shortest distance on the circle instead of a
//! plain difference. Targets with `σ <= 0` are unconstrained: they add
//! nothing to χ² and are not counted, though their (zero) term is still
//! reported.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ansatz::Prediction;
use crate::targets::{DELTA_CP, MassOrdering, Target, TargetCatalog, TargetMap, angle_distance};

/// χ² of one sector.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectorChi2 {
    pub chi2: f64,
    pub n_used: usize,
    /// Per-observable contributions keyed `<sector>_<name>`.
    pub terms: BTreeMap<String, f64>,
}

/// Joint χ² with per-sector totals and per-observable terms.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LossBreakdown {
    pub chi2_total: f64,
    pub chi2_ckm: f64,
    pub chi2_pmns: f64,
    pub n_ckm: usize,
    pub n_pmns: usize,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub terms: BTreeMap<String, f64>,
}

/// `((pred - value) / σ)²`, or 0 for an unconstrained target.
pub fn chi2_term(pred: f64, target: &Target) -> f64 {
    if !target.is_constrained() {
        return 0.0;
    }
    let r = (pred - target.value) / target.sigma;
    r * r
}

/// Like [`chi2_term`] but with the periodic distance.
pub fn chi2_term_periodic(pred: f64, target: &Target) -> f64 {
    if !target.is_constrained() {
        return 0.0;
    }
    let r = angle_distance(pred, target.value) / target.sigma;
    r * r
}

fn sector_chi2(
    prefix: &str,
    pred: &Prediction,
    targets: &TargetMap,
    term: impl Fn(&str, f64, &Target) -> f64,
) -> SectorChi2 {
    let mut out = SectorChi2::default();
    for (name, t) in targets {
        let Some(&p) = pred.get(name) else {
            continue;
        };
        let c = term(name, p, t);
        out.chi2 += c;
        if t.is_constrained() {
            out.n_used += 1;
        }
        out.terms.insert(format!("{prefix}_{name}"), c);
    }
    out
}

/// χ² over the PMNS targets of `ordering`. Names missing from `pred` are skipped.
pub fn pmns_chi2(pred: &Prediction, targets: &TargetCatalog, ordering: MassOrdering) -> SectorChi2 {
    sector_chi2("pmns", pred, targets.pmns(ordering), |name, p, t| {
        if name == DELTA_CP {
            chi2_term_periodic(p, t)
        } else {
            chi2_term(p, t)
        }
    })
}

/// χ² over the CKM targets; zero with no terms when the catalog has none.
pub fn ckm_chi2(pred: &Prediction, targets: &TargetCatalog) -> SectorChi2 {
    let ckm = targets.ckm_targets();
    if ckm.is_empty() {
        return SectorChi2::default();
    }
    sector_chi2("ckm", pred, ckm, |_, p, t| chi2_term(p, t))
}

/// Joint χ². A disabled sector contributes zero, no count and no terms.
pub fn joint_chi2(
    pred_pmns: &Prediction,
    pred_ckm: &Prediction,
    targets: &TargetCatalog,
    ordering: MassOrdering,
    include_pmns: bool,
    include_ckm: bool,
) -> LossBreakdown {
    let pmns = if include_pmns {
        pmns_chi2(pred_pmns, targets, ordering)
    } else {
        SectorChi2::default()
    };
    let ckm = if include_ckm {
        ckm_chi2(pred_ckm, targets)
    } else {
        SectorChi2::default()
    };

    let mut terms = pmns.terms;
    terms.extend(ckm.terms);

    LossBreakdown {
        chi2_total: pmns.chi2 + ckm.chi2,
        chi2_ckm: ckm.chi2,
        chi2_pmns: pmns.chi2,
        n_ckm: ckm.n_used,
        n_pmns: pmns.n_used,
        terms,
    }
}
