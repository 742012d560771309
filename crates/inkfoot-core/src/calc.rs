//! The CO2e aggregation engine.
//!
//! Every read view in the portal derives from one per-project formula:
//!
//! ```text
//! total = Σ material contributions + kwh_used × 0.5 + freight_km × 0.1
//! ```
//!
//! where a PER_SQM material contributes `sqm × co2e_per_unit`, a PER_KG
//! material contributes `sqm × (thickness_mm / 1000) × density ×
//! co2e_per_unit`, and a material with no catalog entry contributes zero.
//! Zero-on-missing is a fail-open policy: a gap in the factor catalog must
//! never take reporting down for a client. [`missing_factors`] surfaces those
//! gaps to operators instead.
//!
//! All functions here are pure and synchronous. They recompute from the
//! records handed to them on every call; nothing is cached or persisted, and
//! nothing rounds mid-computation — display code applies [`round2`] at the
//! very edge.
//!
//! One asymmetry is carried over from the product deliberately: the
//! media-level views ([`impact_by_media`], [`chart_data`]) sum the materials
//! contribution only and omit materials without a catalog entry, while the
//! project-level views ([`impact_by_store`], [`store_geo`], [`project_list`],
//! [`trend`]) use the full per-project total including energy and freight.
//! Product has been asked whether the exclusion is intentional; until then
//! both behaviours are preserved as-is.

use std::{
  cmp::Ordering,
  collections::{BTreeMap, BTreeSet, HashMap},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{
  entity::{ClientId, ProjectId, StoreId},
  factor::{EmissionFactor, FactorCatalog, FactorType},
  filter::ReportFilter,
};

// ─── Constants ───────────────────────────────────────────────────────────────

/// Fixed grid-intensity factor, kg CO2e per kWh.
pub const GRID_KG_CO2E_PER_KWH: f64 = 0.5;

/// Fixed freight factor, kg CO2e per km.
pub const FREIGHT_KG_CO2E_PER_KM: f64 = 0.1;

/// Ranked views return at most this many rows.
pub const TOP_N: usize = 5;

// ─── Read model ──────────────────────────────────────────────────────────────

/// One material line of an [`EmissionRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialUsage {
  pub material_name: String,
  pub material_sqm:  f64,
  pub thickness_mm:  Option<f64>,
}

/// A project joined with its store, state and bill of materials — the input
/// the calculator works over. Materialised by
/// [`crate::store::PortalStore::emission_records`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionRecord {
  pub project_id:   ProjectId,
  pub job_id:       String,
  pub project_name: String,
  pub project_date: NaiveDate,
  pub client_id:    ClientId,
  pub store_id:     StoreId,
  pub store_name:   String,
  pub state_name:   String,
  pub lat:          Option<f64>,
  pub lng:          Option<f64>,
  pub kwh_used:     f64,
  pub freight_km:   f64,
  pub materials:    Vec<MaterialUsage>,
}

// ─── The formula ─────────────────────────────────────────────────────────────

/// CO2e contribution of a single material line, in kg.
///
/// `None` for the factor — or a PER_KG line missing its thickness or
/// density — degrades to zero rather than erroring.
pub fn material_co2e(usage: &MaterialUsage, factor: Option<&EmissionFactor>) -> f64 {
  let Some(factor) = factor else { return 0.0 };
  match factor.factor_type {
    FactorType::PerSqm => usage.material_sqm * factor.co2e_per_unit,
    FactorType::PerKg => {
      let thickness_m = usage.thickness_mm.unwrap_or(0.0) / 1000.0;
      let density = factor.density_kg_per_m3.unwrap_or(0.0);
      usage.material_sqm * thickness_m * density * factor.co2e_per_unit
    }
  }
}

/// Sum of the material contributions of a record.
pub fn materials_co2e(record: &EmissionRecord, catalog: &FactorCatalog) -> f64 {
  record
    .materials
    .iter()
    .map(|usage| material_co2e(usage, catalog.get(&usage.material_name)))
    .sum()
}

/// The per-project total — the single source of truth reproduced by every
/// view below. Non-negative and deterministic given its inputs.
pub fn project_co2e(record: &EmissionRecord, catalog: &FactorCatalog) -> f64 {
  materials_co2e(record, catalog)
    + record.kwh_used * GRID_KG_CO2E_PER_KWH
    + record.freight_km * FREIGHT_KG_CO2E_PER_KM
}

/// Round for display (2 decimal places). Never applied inside the engine.
pub fn round2(value: f64) -> f64 { (value * 100.0).round() / 100.0 }

/// Calendar-month bucket label, e.g. `2024-03`.
pub fn month_period(date: NaiveDate) -> String { date.format("%Y-%m").to_string() }

fn select<'a>(
  records: &'a [EmissionRecord],
  filter: &'a ReportFilter,
) -> impl Iterator<Item = &'a EmissionRecord> {
  records.iter().filter(|r| filter.matches(r))
}

/// Descending by total; callers chain a name comparison for stable ties.
/// Totals are finite, so the fallback ordering is unreachable in practice.
fn total_desc(a: f64, b: f64) -> Ordering {
  b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

// ─── Aggregation views ───────────────────────────────────────────────────────

/// One row of [`impact_by_store`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreImpact {
  pub store_name: String,
  pub state_name: String,
  pub total_co2e: f64,
}

/// Top stores by full per-project total (materials + energy + freight),
/// descending, ties broken by store name.
pub fn impact_by_store(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<StoreImpact> {
  let mut by_store: HashMap<StoreId, StoreImpact> = HashMap::new();
  for record in select(records, filter) {
    let entry = by_store
      .entry(record.store_id)
      .or_insert_with(|| StoreImpact {
        store_name: record.store_name.clone(),
        state_name: record.state_name.clone(),
        total_co2e: 0.0,
      });
    entry.total_co2e += project_co2e(record, catalog);
  }

  let mut ranked: Vec<StoreImpact> = by_store.into_values().collect();
  ranked.sort_by(|a, b| {
    total_desc(a.total_co2e, b.total_co2e).then_with(|| a.store_name.cmp(&b.store_name))
  });
  ranked.truncate(TOP_N);
  ranked
}

/// One row of [`impact_by_media`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MediaImpact {
  pub material_name: String,
  pub total_co2e:    f64,
}

/// Top materials by materials contribution only — energy and freight are
/// excluded here. Materials with no catalog entry are omitted entirely
/// rather than shown as zero rows.
pub fn impact_by_media(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<MediaImpact> {
  let mut by_material: BTreeMap<String, f64> = BTreeMap::new();
  for record in select(records, filter) {
    for usage in &record.materials {
      let Some(factor) = catalog.get(&usage.material_name) else {
        continue;
      };
      *by_material.entry(usage.material_name.clone()).or_insert(0.0) +=
        material_co2e(usage, Some(factor));
    }
  }

  let mut ranked: Vec<MediaImpact> = by_material
    .into_iter()
    .map(|(material_name, total_co2e)| MediaImpact {
      material_name,
      total_co2e,
    })
    .collect();
  ranked.sort_by(|a, b| {
    total_desc(a.total_co2e, b.total_co2e).then_with(|| a.material_name.cmp(&b.material_name))
  });
  ranked.truncate(TOP_N);
  ranked
}

/// One stacked series of [`chart_data`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MaterialSeries {
  pub material_name: String,
  /// One value per period label, zero-filled where the material saw no use.
  pub values:        Vec<f64>,
}

/// The month × material matrix behind the stacked dashboard chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
  /// Sorted calendar-month labels (`YYYY-MM`).
  pub periods: Vec<String>,
  /// One series per material name, sorted, each zero-filled across
  /// `periods`.
  pub series:  Vec<MaterialSeries>,
}

/// Materials contribution per (calendar month, material). Like
/// [`impact_by_media`], unknown materials are omitted and energy/freight are
/// not part of these numbers.
pub fn chart_data(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> ChartData {
  let mut periods: BTreeSet<String> = BTreeSet::new();
  let mut materials: BTreeSet<String> = BTreeSet::new();
  let mut cells: HashMap<(String, String), f64> = HashMap::new();

  for record in select(records, filter) {
    let period = month_period(record.project_date);
    for usage in &record.materials {
      let Some(factor) = catalog.get(&usage.material_name) else {
        continue;
      };
      periods.insert(period.clone());
      materials.insert(usage.material_name.clone());
      *cells
        .entry((period.clone(), usage.material_name.clone()))
        .or_insert(0.0) += material_co2e(usage, Some(factor));
    }
  }

  let periods: Vec<String> = periods.into_iter().collect();
  let series = materials
    .into_iter()
    .map(|material_name| MaterialSeries {
      values: periods
        .iter()
        .map(|period| {
          cells
            .get(&(period.clone(), material_name.clone()))
            .copied()
            .unwrap_or(0.0)
        })
        .collect(),
      material_name,
    })
    .collect();

  ChartData { periods, series }
}

/// One map marker of [`store_geo`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreGeoPoint {
  pub store_id:   StoreId,
  pub store_name: String,
  pub lat:        Option<f64>,
  pub lng:        Option<f64>,
  pub total_co2e: f64,
}

/// Every store with at least one matching project, with its summed total,
/// sorted by store name — feeds the map markers.
pub fn store_geo(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<StoreGeoPoint> {
  let mut by_store: HashMap<StoreId, StoreGeoPoint> = HashMap::new();
  for record in select(records, filter) {
    let entry = by_store
      .entry(record.store_id)
      .or_insert_with(|| StoreGeoPoint {
        store_id:   record.store_id,
        store_name: record.store_name.clone(),
        lat:        record.lat,
        lng:        record.lng,
        total_co2e: 0.0,
      });
    entry.total_co2e += project_co2e(record, catalog);
  }

  let mut points: Vec<StoreGeoPoint> = by_store.into_values().collect();
  points.sort_by(|a, b| {
    a.store_name
      .cmp(&b.store_name)
      .then_with(|| a.store_id.cmp(&b.store_id))
  });
  points
}

/// One row of [`project_list`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEmissions {
  pub project_id:   ProjectId,
  pub job_id:       String,
  pub name:         String,
  pub project_date: NaiveDate,
  pub store_name:   String,
  pub state_name:   String,
  pub total_co2e:   f64,
}

/// Every matching project with its total, newest first — feeds the report
/// generator.
pub fn project_list(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<ProjectEmissions> {
  let mut rows: Vec<ProjectEmissions> = select(records, filter)
    .map(|record| ProjectEmissions {
      project_id:   record.project_id,
      job_id:       record.job_id.clone(),
      name:         record.project_name.clone(),
      project_date: record.project_date,
      store_name:   record.store_name.clone(),
      state_name:   record.state_name.clone(),
      total_co2e:   project_co2e(record, catalog),
    })
    .collect();
  rows.sort_by(|a, b| b.project_date.cmp(&a.project_date));
  rows
}

/// One point of [`trend`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
  pub period:     String,
  pub total_co2e: f64,
}

/// Full per-project totals bucketed by calendar month, ascending — the
/// internal trend-over-time view.
pub fn trend(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<TrendPoint> {
  let mut by_period: BTreeMap<String, f64> = BTreeMap::new();
  for record in select(records, filter) {
    *by_period
      .entry(month_period(record.project_date))
      .or_insert(0.0) += project_co2e(record, catalog);
  }
  by_period
    .into_iter()
    .map(|(period, total_co2e)| TrendPoint { period, total_co2e })
    .collect()
}

/// Distinct material names referenced by the matching records that have no
/// catalog entry, sorted — the operator-facing audit for catalog gaps that
/// the fail-open formula would otherwise hide.
pub fn missing_factors(
  records: &[EmissionRecord],
  filter: &ReportFilter,
  catalog: &FactorCatalog,
) -> Vec<String> {
  let mut missing: BTreeSet<String> = BTreeSet::new();
  for record in select(records, filter) {
    for usage in &record.materials {
      if catalog.get(&usage.material_name).is_none() {
        missing.insert(usage.material_name.clone());
      }
    }
  }
  missing.into_iter().collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

  fn sqm_factor(name: &str, co2e_per_unit: f64) -> EmissionFactor {
    EmissionFactor {
      material_name:     name.into(),
      factor_type:       FactorType::PerSqm,
      co2e_per_unit,
      density_kg_per_m3: None,
    }
  }

  fn kg_factor(name: &str, co2e_per_unit: f64, density: f64) -> EmissionFactor {
    EmissionFactor {
      material_name:     name.into(),
      factor_type:       FactorType::PerKg,
      co2e_per_unit,
      density_kg_per_m3: Some(density),
    }
  }

  fn catalog() -> FactorCatalog {
    [
      sqm_factor("Self Adhesive Vinyl", 3.0),
      sqm_factor("Paper", 1.2),
      kg_factor("Foam Board", 2.0, 500.0),
    ]
    .into_iter()
    .collect()
  }

  fn usage(name: &str, sqm: f64, thickness: Option<f64>) -> MaterialUsage {
    MaterialUsage {
      material_name: name.into(),
      material_sqm:  sqm,
      thickness_mm:  thickness,
    }
  }

  fn record(
    project_id: ProjectId,
    store_id: StoreId,
    store_name: &str,
    date: NaiveDate,
    materials: Vec<MaterialUsage>,
  ) -> EmissionRecord {
    EmissionRecord {
      project_id,
      job_id: format!("J-{project_id}"),
      project_name: format!("Project {project_id}"),
      project_date: date,
      client_id: 1,
      store_id,
      store_name: store_name.into(),
      state_name: "Victoria".into(),
      lat: Some(-37.81),
      lng: Some(144.96),
      kwh_used: 0.0,
      freight_km: 0.0,
      materials,
    }
  }

  // ── Formula ─────────────────────────────────────────────────────────────

  #[test]
  fn per_sqm_contribution_ignores_thickness() {
    let factor = sqm_factor("Self Adhesive Vinyl", 3.0);
    let bare = usage("Self Adhesive Vinyl", 20.0, None);
    let with_thickness = usage("Self Adhesive Vinyl", 20.0, Some(12.0));

    assert_eq!(material_co2e(&bare, Some(&factor)), 60.0);
    assert_eq!(material_co2e(&with_thickness, Some(&factor)), 60.0);
  }

  #[test]
  fn per_kg_contribution_scales_linearly_with_thickness() {
    let factor = kg_factor("Foam Board", 2.0, 500.0);
    let thin = usage("Foam Board", 10.0, Some(5.0));
    let thick = usage("Foam Board", 10.0, Some(10.0));

    assert_eq!(material_co2e(&thin, Some(&factor)), 50.0);
    assert_eq!(material_co2e(&thick, Some(&factor)), 100.0);
  }

  #[test]
  fn missing_factor_contributes_zero() {
    assert_eq!(material_co2e(&usage("Mystery Foil", 100.0, Some(5.0)), None), 0.0);
  }

  #[test]
  fn per_kg_without_thickness_or_density_degrades_to_zero() {
    let factor = kg_factor("Foam Board", 2.0, 500.0);
    assert_eq!(material_co2e(&usage("Foam Board", 10.0, None), Some(&factor)), 0.0);

    let no_density = EmissionFactor {
      density_kg_per_m3: None,
      ..kg_factor("Foam Board", 2.0, 0.0)
    };
    assert_eq!(
      material_co2e(&usage("Foam Board", 10.0, Some(5.0)), Some(&no_density)),
      0.0
    );
  }

  #[test]
  fn worked_example_totals_105() {
    // Foam Board: 10 × 0.005 × 500 × 2.0 = 50; energy 100 × 0.5 = 50;
    // freight 50 × 0.1 = 5.
    let mut r = record(1, 1, "Chadstone", d(2024, 1, 10), vec![usage(
      "Foam Board",
      10.0,
      Some(5.0),
    )]);
    r.kwh_used = 100.0;
    r.freight_km = 50.0;

    assert_eq!(project_co2e(&r, &catalog()), 105.0);
  }

  #[test]
  fn energy_and_freight_still_count_when_every_factor_is_missing() {
    let mut r = record(1, 1, "Chadstone", d(2024, 1, 10), vec![usage(
      "Mystery Foil",
      40.0,
      None,
    )]);
    r.kwh_used = 10.0;
    r.freight_km = 10.0;

    assert_eq!(project_co2e(&r, &catalog()), 6.0);
  }

  #[test]
  fn round2_is_display_only() {
    assert_eq!(round2(6.666), 6.67);
    assert_eq!(round2(1.234), 1.23);
    assert_eq!(round2(105.0), 105.0);
  }

  // ── Views ───────────────────────────────────────────────────────────────

  fn fleet() -> Vec<EmissionRecord> {
    // Six stores so the top-5 cut is observable. Store 6 ties store 5.
    let mut records = vec![
      record(1, 1, "Altona", d(2024, 1, 5), vec![usage("Paper", 100.0, None)]), // 120
      record(2, 2, "Brighton", d(2024, 1, 12), vec![usage("Paper", 80.0, None)]), // 96
      record(3, 3, "Carlton", d(2024, 2, 3), vec![usage("Paper", 60.0, None)]), // 72
      record(4, 4, "Doncaster", d(2024, 2, 20), vec![usage("Paper", 40.0, None)]), // 48
      record(5, 5, "Elwood", d(2024, 3, 1), vec![usage("Paper", 20.0, None)]), // 24
      record(6, 6, "Fitzroy", d(2024, 3, 9), vec![usage("Paper", 20.0, None)]), // 24
    ];
    // A second project for Altona in a later month.
    records.push(record(7, 1, "Altona", d(2024, 3, 9), vec![usage(
      "Self Adhesive Vinyl",
      10.0,
      None,
    )])); // 30
    records
  }

  #[test]
  fn impact_by_store_ranks_sums_and_cuts_at_five() {
    let records = fleet();
    let ranked = impact_by_store(&records, &ReportFilter::default(), &catalog());

    assert_eq!(ranked.len(), TOP_N);
    assert_eq!(ranked[0].store_name, "Altona");
    assert_eq!(ranked[0].total_co2e, 150.0);
    assert_eq!(ranked[1].store_name, "Brighton");
    // Elwood and Fitzroy tie at 24; the name order decides, and only one
    // survives the cut.
    assert_eq!(ranked[4].store_name, "Elwood");
    assert!(ranked.iter().all(|row| row.store_name != "Fitzroy"));
  }

  #[test]
  fn impact_by_media_excludes_energy_freight_and_unknown_materials() {
    let mut r1 = record(1, 1, "Altona", d(2024, 1, 5), vec![
      usage("Paper", 50.0, None),
      usage("Mystery Foil", 99.0, None),
    ]);
    r1.kwh_used = 1000.0; // must not appear anywhere in media numbers
    let r2 = record(2, 2, "Brighton", d(2024, 1, 8), vec![usage("Paper", 25.0, None)]);

    let ranked = impact_by_media(&[r1, r2], &ReportFilter::default(), &catalog());

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].material_name, "Paper");
    assert_eq!(ranked[0].total_co2e, 90.0);
  }

  #[test]
  fn chart_data_zero_fills_the_month_material_matrix() {
    let records = vec![
      record(1, 1, "Altona", d(2024, 1, 5), vec![usage("Paper", 10.0, None)]),
      record(2, 1, "Altona", d(2024, 3, 5), vec![usage("Self Adhesive Vinyl", 10.0, None)]),
    ];
    let chart = chart_data(&records, &ReportFilter::default(), &catalog());

    assert_eq!(chart.periods, vec!["2024-01", "2024-03"]);
    assert_eq!(chart.series.len(), 2);

    let paper = chart
      .series
      .iter()
      .find(|s| s.material_name == "Paper")
      .unwrap();
    assert_eq!(paper.values, vec![12.0, 0.0]);

    let vinyl = chart
      .series
      .iter()
      .find(|s| s.material_name == "Self Adhesive Vinyl")
      .unwrap();
    assert_eq!(vinyl.values, vec![0.0, 30.0]);
  }

  #[test]
  fn store_geo_sorts_by_name_and_carries_coordinates() {
    let records = fleet();
    let points = store_geo(&records, &ReportFilter::default(), &catalog());

    assert_eq!(points.len(), 6);
    let names: Vec<&str> = points.iter().map(|p| p.store_name.as_str()).collect();
    assert_eq!(names, vec![
      "Altona",
      "Brighton",
      "Carlton",
      "Doncaster",
      "Elwood",
      "Fitzroy"
    ]);
    assert_eq!(points[0].total_co2e, 150.0);
    assert_eq!(points[0].lat, Some(-37.81));
  }

  #[test]
  fn project_list_is_newest_first() {
    let records = fleet();
    let rows = project_list(&records, &ReportFilter::default(), &catalog());

    assert_eq!(rows.len(), 7);
    assert!(rows.windows(2).all(|w| w[0].project_date >= w[1].project_date));
    assert_eq!(rows.last().unwrap().project_id, 1);
  }

  #[test]
  fn trend_buckets_full_totals_by_month() {
    let records = fleet();
    let points = trend(&records, &ReportFilter::default(), &catalog());

    assert_eq!(points.len(), 3);
    assert_eq!(points[0].period, "2024-01");
    assert_eq!(points[0].total_co2e, 216.0); // 120 + 96
    assert_eq!(points[2].period, "2024-03");
    assert_eq!(points[2].total_co2e, 78.0); // 24 + 24 + 30
  }

  // ── Cross-view invariants ───────────────────────────────────────────────

  #[test]
  fn store_and_project_views_agree_on_the_filtered_total() {
    // Fewer stores than the top-N cut so impact_by_store returns them all.
    let records: Vec<EmissionRecord> = fleet()
      .into_iter()
      .filter(|r| r.store_id <= 3)
      .collect();
    let filter = ReportFilter {
      start_date: Some(d(2024, 1, 1)),
      end_date: Some(d(2024, 12, 31)),
      ..ReportFilter::default()
    };
    let catalog = catalog();

    let by_store: f64 = impact_by_store(&records, &filter, &catalog)
      .iter()
      .map(|row| row.total_co2e)
      .sum();
    let by_project: f64 = project_list(&records, &filter, &catalog)
      .iter()
      .map(|row| row.total_co2e)
      .sum();

    assert!((by_store - by_project).abs() < 1e-9);
  }

  #[test]
  fn adding_a_filter_only_narrows_the_project_list() {
    let records = fleet();
    let catalog = catalog();

    let unfiltered: BTreeSet<ProjectId> =
      project_list(&records, &ReportFilter::default(), &catalog)
        .iter()
        .map(|row| row.project_id)
        .collect();
    let narrowed: BTreeSet<ProjectId> = project_list(
      &records,
      &ReportFilter {
        store: Some("Altona".into()),
        ..ReportFilter::default()
      },
      &catalog,
    )
    .iter()
    .map(|row| row.project_id)
    .collect();

    assert!(narrowed.is_subset(&unfiltered));
    assert_eq!(narrowed.len(), 2);
  }

  #[test]
  fn missing_factors_lists_distinct_gaps_sorted() {
    let records = vec![
      record(1, 1, "Altona", d(2024, 1, 5), vec![
        usage("Mystery Foil", 10.0, None),
        usage("Acrylic Sheet", 5.0, None),
      ]),
      record(2, 2, "Brighton", d(2024, 1, 8), vec![
        usage("Mystery Foil", 3.0, None),
        usage("Paper", 3.0, None),
      ]),
    ];
    let gaps = missing_factors(&records, &ReportFilter::default(), &catalog());

    assert_eq!(gaps, vec!["Acrylic Sheet".to_string(), "Mystery Foil".to_string()]);
  }
}
