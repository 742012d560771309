//! The emission-factor catalog.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// How a material's CO2e contribution scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FactorType {
  /// Area-based: contribution scales with surface area alone.
  PerSqm,
  /// Mass-based: contribution scales with area × thickness × density.
  PerKg,
}

/// A catalog entry mapping a material to its per-unit CO2e contribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionFactor {
  pub material_name:     String,
  pub factor_type:       FactorType,
  /// kg CO2e per m² ([`FactorType::PerSqm`]) or per kg ([`FactorType::PerKg`]).
  pub co2e_per_unit:     f64,
  /// Required by the formula only when `factor_type` is
  /// [`FactorType::PerKg`].
  pub density_kg_per_m3: Option<f64>,
}

/// All configured emission factors, keyed by material name.
///
/// Exactly one factor exists per material name. Lookups for unknown
/// materials return `None`; the calculator turns that into a zero
/// contribution rather than an error (fail-open, see [`crate::calc`]).
#[derive(Debug, Clone, Default)]
pub struct FactorCatalog {
  factors: HashMap<String, EmissionFactor>,
}

impl FactorCatalog {
  pub fn get(&self, material_name: &str) -> Option<&EmissionFactor> {
    self.factors.get(material_name)
  }

  pub fn len(&self) -> usize { self.factors.len() }

  pub fn is_empty(&self) -> bool { self.factors.is_empty() }
}

impl FromIterator<EmissionFactor> for FactorCatalog {
  fn from_iter<I: IntoIterator<Item = EmissionFactor>>(iter: I) -> Self {
    Self {
      factors: iter
        .into_iter()
        .map(|f| (f.material_name.clone(), f))
        .collect(),
    }
  }
}
