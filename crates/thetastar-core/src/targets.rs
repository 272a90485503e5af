//! Experimental targets for the CKM and PMNS observables we fit to.
//!
//! The catalog is an explicit, immutable value: build it once (usually
//! [`TargetCatalog::builtin`] or [`TargetCatalog::from_path`]) and pass a
//! reference to everything that scores or predicts.
//!
//! # Conventions
//!
//! - mixing angles as `sin²θ` (dimensionless, `s12_2`, `s13_2`, `s23_2`)
//! - `deltaCP` in radians, treated as periodic by the loss model
//! - mass splittings in eV² (`dm3l` is positive for NO, negative for IO)
//!
//! ## Data Sources
//!
//! | Sector | Source | Notes |
//! |--------|--------|-------|
//! | PMNS | NuFIT 5.2 (2022), JHEP 09 (2020) 178 | without SK atmospheric data; asymmetric errors symmetrized |
//! | CKM | PDG 2024, Phys. Rev. D 110, 030001 | Wolfenstein parameters, global fit |

use std::collections::BTreeMap;
use std::f64::consts::PI;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Full turn in radians.
pub const TAU: f64 = std::f64::consts::TAU;

/// One degree in radians.
pub const DEG: f64 = PI / 180.0;

/// Key of the periodic CP-phase observable.
pub const DELTA_CP: &str = "deltaCP";

/// PMNS observable vocabulary. Every catalog slice carries all of these.
pub const PMNS_KEYS: [&str; 6] = ["s12_2", "s13_2", "s23_2", DELTA_CP, "dm21", "dm3l"];

/// Wolfenstein parameters carried by the builtin CKM catalog.
pub const CKM_KEYS: [&str; 4] = ["lambda", "A", "rhobar", "etabar"];

/// Convert degrees to radians.
pub fn deg2rad(x_deg: f64) -> f64 {
    x_deg * DEG
}

/// Neutrino mass ordering hypothesis.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum MassOrdering {
    /// Normal ordering (`m1 < m2 < m3`).
    #[default]
    #[serde(rename = "NO")]
    Normal,
    /// Inverted ordering (`m3 < m1 < m2`).
    #[serde(rename = "IO")]
    Inverted,
}

impl MassOrdering {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "NO",
            Self::Inverted => "IO",
        }
    }
}

impl std::fmt::Display for MassOrdering {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MassOrdering {
    type Err = Error;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "NO" => Ok(Self::Normal),
            "IO" => Ok(Self::Inverted),
            _ => Err(Error::InvalidOrdering(s.to_string())),
        }
    }
}

/// A single target observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Target {
    /// Central value.
    pub value: f64,
    /// 1σ scale for loss weighting. `0` means unconstrained.
    pub sigma: f64,
    /// Human label.
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub unit: String,
    /// Provenance of the numbers.
    #[serde(default, rename = "ref")]
    pub reference: String,
}

impl Target {
    pub fn new(value: f64, sigma: f64, name: &str, unit: &str, reference: &str) -> Self {
        Self {
            value,
            sigma,
            name: name.to_string(),
            unit: unit.to_string(),
            reference: reference.to_string(),
        }
    }

    /// Whether this target contributes to χ² at all.
    pub fn is_constrained(&self) -> bool {
        self.sigma > 0.0
    }
}

/// Observable name → target.
pub type TargetMap = BTreeMap<String, Target>;

/// PMNS targets per mass ordering plus ordering-independent CKM targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCatalog")]
pub struct TargetCatalog {
    pmns_no: TargetMap,
    pmns_io: TargetMap,
    ckm: TargetMap,
}

#[derive(Deserialize)]
struct RawCatalog {
    pmns_no: TargetMap,
    pmns_io: TargetMap,
    #[serde(default)]
    ckm: TargetMap,
}

impl TryFrom<RawCatalog> for TargetCatalog {
    type Error = Error;

    fn try_from(raw: RawCatalog) -> Result<Self> {
        Self::new(raw.pmns_no, raw.pmns_io, raw.ckm)
    }
}

const NUFIT: &str = "NuFIT 5.2 (2022)";
const PDG: &str = "PDG 2024";

impl TargetCatalog {
    /// Build a catalog, checking that both PMNS slices carry the full
    /// [`PMNS_KEYS`] vocabulary, that every number is finite and that no CKM
    /// key shadows an ansatz parameter.
    pub fn new(pmns_no: TargetMap, pmns_io: TargetMap, ckm: TargetMap) -> Result<Self> {
        for (label, slice) in [("NO", &pmns_no), ("IO", &pmns_io)] {
            if let Some(missing) = PMNS_KEYS.iter().find(|k| !slice.contains_key(**k)) {
                return Err(Error::InvalidCatalog(format!(
                    "PMNS {label} slice is missing '{missing}'"
                )));
            }
        }
        let reserved = crate::ansatz::reserved_param_names();
        if let Some(key) = ckm.keys().find(|k| reserved.contains(&k.as_str())) {
            return Err(Error::InvalidCatalog(format!(
                "CKM key '{key}' collides with an ansatz parameter"
            )));
        }
        for (sector, map) in [("pmns_no", &pmns_no), ("pmns_io", &pmns_io), ("ckm", &ckm)] {
            for (key, t) in map {
                if !t.value.is_finite() || !t.sigma.is_finite() {
                    return Err(Error::InvalidCatalog(format!(
                        "{sector}.{key} has non-finite value or sigma"
                    )));
                }
            }
        }
        Ok(Self {
            pmns_no,
            pmns_io,
            ckm,
        })
    }

    /// NuFIT 5.2 PMNS targets and PDG Wolfenstein CKM targets.
    pub fn builtin() -> Self {
        let pmns_no = target_map([
            ("s12_2", Target::new(0.303, 0.012, "sin^2 theta12", "", NUFIT)),
            ("s13_2", Target::new(0.02203, 0.000575, "sin^2 theta13", "", NUFIT)),
            ("s23_2", Target::new(0.572, 0.0205, "sin^2 theta23", "", NUFIT)),
            (
                DELTA_CP,
                Target::new(deg2rad(197.0), deg2rad(33.5), "delta_CP", "rad", NUFIT),
            ),
            ("dm21", Target::new(7.41e-5, 0.205e-5, "Delta m^2_21", "eV^2", NUFIT)),
            (
                "dm3l",
                Target::new(2.511e-3, 0.0275e-3, "Delta m^2_3l (NO)", "eV^2", NUFIT),
            ),
        ]);
        let pmns_io = target_map([
            ("s12_2", Target::new(0.303, 0.012, "sin^2 theta12", "", NUFIT)),
            ("s13_2", Target::new(0.02219, 0.000585, "sin^2 theta13", "", NUFIT)),
            ("s23_2", Target::new(0.578, 0.0185, "sin^2 theta23", "", NUFIT)),
            (
                DELTA_CP,
                Target::new(deg2rad(286.0), deg2rad(29.5), "delta_CP", "rad", NUFIT),
            ),
            ("dm21", Target::new(7.41e-5, 0.205e-5, "Delta m^2_21", "eV^2", NUFIT)),
            (
                "dm3l",
                Target::new(-2.498e-3, 0.0285e-3, "Delta m^2_3l (IO)", "eV^2", NUFIT),
            ),
        ]);
        let ckm = target_map([
            ("lambda", Target::new(0.22501, 0.00068, "lambda", "", PDG)),
            ("A", Target::new(0.826, 0.015, "A", "", PDG)),
            ("rhobar", Target::new(0.1591, 0.0094, "rho-bar", "", PDG)),
            ("etabar", Target::new(0.3523, 0.0072, "eta-bar", "", PDG)),
        ]);
        Self {
            pmns_no,
            pmns_io,
            ckm,
        }
    }

    /// Load a catalog from a JSON file shaped like this type's serde form.
    pub fn from_path(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Self = serde_json::from_str(&contents)?;
        log::info!("loaded target catalog from {}", path.display());
        Ok(catalog)
    }

    /// Same PMNS targets, no CKM targets.
    pub fn without_ckm(mut self) -> Self {
        self.ckm.clear();
        self
    }

    /// Replace the CKM targets.
    pub fn with_ckm(mut self, ckm: TargetMap) -> Result<Self> {
        self.ckm = ckm;
        Self::new(self.pmns_no, self.pmns_io, self.ckm)
    }

    /// PMNS targets for an ordering.
    pub fn pmns(&self, ordering: MassOrdering) -> &TargetMap {
        match ordering {
            MassOrdering::Normal => &self.pmns_no,
            MassOrdering::Inverted => &self.pmns_io,
        }
    }

    /// PMNS targets for a raw ordering token (`"NO"`, `"io"`, ...).
    pub fn get_pmns_targets(&self, ordering: &str) -> Result<&TargetMap> {
        Ok(self.pmns(ordering.parse()?))
    }

    /// CKM targets; empty when none are configured.
    pub fn ckm_targets(&self) -> &TargetMap {
        &self.ckm
    }

    /// Central value of a PMNS observable.
    ///
    /// Construction guarantees every [`PMNS_KEYS`] entry, so the 0 fallback
    /// only applies to keys outside that vocabulary.
    pub fn pmns_center(&self, ordering: MassOrdering, key: &str) -> f64 {
        self.pmns(ordering).get(key).map_or(0.0, |t| t.value)
    }
}

fn target_map<const N: usize>(entries: [(&str, Target); N]) -> TargetMap {
    entries
        .into_iter()
        .map(|(k, t)| (k.to_string(), t))
        .collect()
}

// ---------------------------------------------------------------------------
// Periodic angle helpers
// ---------------------------------------------------------------------------

/// Map any angle (radians) into `(-π, π]`.
pub fn wrap_to_interval(angle: f64) -> f64 {
    let x = angle.rem_euclid(TAU);
    if x > PI { x - TAU } else { x }
}

/// Smallest distance between two angles on the circle, in `[0, π]`.
///
/// Equal to `|wrap_to_interval(a - b)|`, but each argument is reduced to
/// `[0, 2π)` first so huge inputs cannot overflow the difference, and the
/// result is bitwise symmetric in its arguments. Residues at the rounding
/// level of the inputs (e.g. `b = a + 2π` computed in floating point) are
/// reported as exactly zero.
pub fn angle_distance(a: f64, b: f64) -> f64 {
    let r = (a.rem_euclid(TAU) - b.rem_euclid(TAU)).abs();
    let d = if r > PI { TAU - r } else { r };
    let noise = 8.0 * f64::EPSILON * a.abs().max(b.abs()).max(TAU);
    if d <= noise { 0.0 } else { d }
}
