//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, dates as `YYYY-MM-DD`. Factor
//! types are stored as their wire spelling (`PER_SQM` / `PER_KG`).

use chrono::{DateTime, NaiveDate, Utc};
use inkfoot_core::{
  calc::{EmissionRecord, MaterialUsage},
  entity::{Project, ProjectOverview, User},
  factor::{EmissionFactor, FactorType},
};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(date: NaiveDate) -> String { date.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::DateParse(e.to_string()))
}

// ─── FactorType ──────────────────────────────────────────────────────────────

pub fn encode_factor_type(t: FactorType) -> &'static str {
  match t {
    FactorType::PerSqm => "PER_SQM",
    FactorType::PerKg => "PER_KG",
  }
}

pub fn decode_factor_type(s: &str) -> Result<FactorType> {
  match s {
    "PER_SQM" => Ok(FactorType::PerSqm),
    "PER_KG" => Ok(FactorType::PerKg),
    other => Err(Error::DateParse(format!("unknown factor type: {other:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `projects` row.
pub struct RawProject {
  pub project_id:   i64,
  pub client_id:    i64,
  pub store_id:     i64,
  pub job_id:       String,
  pub name:         String,
  pub project_date: String,
  pub kwh_used:     f64,
  pub freight_km:   f64,
}

impl RawProject {
  pub fn into_project(self) -> Result<Project> {
    Ok(Project {
      project_id:   self.project_id,
      client_id:    self.client_id,
      store_id:     self.store_id,
      job_id:       self.job_id,
      name:         self.name,
      project_date: decode_date(&self.project_date)?,
      kwh_used:     self.kwh_used,
      freight_km:   self.freight_km,
    })
  }
}

/// Raw row of the internal all-projects overview.
pub struct RawProjectOverview {
  pub project_id:   i64,
  pub job_id:       String,
  pub name:         String,
  pub project_date: String,
  pub client_name:  String,
  pub store_name:   String,
}

impl RawProjectOverview {
  pub fn into_overview(self) -> Result<ProjectOverview> {
    Ok(ProjectOverview {
      project_id:   self.project_id,
      job_id:       self.job_id,
      name:         self.name,
      project_date: decode_date(&self.project_date)?,
      client_name:  self.client_name,
      store_name:   self.store_name,
    })
  }
}

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       i64,
  pub client_id:     i64,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub password_hash: String,
  pub created_at:    String,
}

impl RawUser {
  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       self.user_id,
      client_id:     self.client_id,
      first_name:    self.first_name,
      last_name:     self.last_name,
      email:         self.email,
      password_hash: self.password_hash,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from an `emission_factors` row.
pub struct RawFactor {
  pub material_name:     String,
  pub factor_type:       String,
  pub co2e_per_unit:     f64,
  pub density_kg_per_m3: Option<f64>,
}

impl RawFactor {
  pub fn into_factor(self) -> Result<EmissionFactor> {
    Ok(EmissionFactor {
      material_name:     self.material_name,
      factor_type:       decode_factor_type(&self.factor_type)?,
      co2e_per_unit:     self.co2e_per_unit,
      density_kg_per_m3: self.density_kg_per_m3,
    })
  }
}

/// One flat row of the projects ⋈ stores ⋈ states ⋈ materials join backing
/// [`inkfoot_core::store::PortalStore::emission_records`]. Rows arrive
/// ordered by project; [`fold_emission_rows`] groups the material lines back
/// under their project.
pub struct RawEmissionRow {
  pub project_id:    i64,
  pub job_id:        String,
  pub project_name:  String,
  pub project_date:  String,
  pub client_id:     i64,
  pub store_id:      i64,
  pub store_name:    String,
  pub state_name:    String,
  pub lat:           Option<f64>,
  pub lng:           Option<f64>,
  pub kwh_used:      f64,
  pub freight_km:    f64,
  pub material_name: Option<String>,
  pub material_sqm:  Option<f64>,
  pub thickness_mm:  Option<f64>,
}

pub fn fold_emission_rows(rows: Vec<RawEmissionRow>) -> Result<Vec<EmissionRecord>> {
  let mut records: Vec<EmissionRecord> = Vec::new();
  for row in rows {
    if records.last().map(|r| r.project_id) != Some(row.project_id) {
      records.push(EmissionRecord {
        project_id:   row.project_id,
        job_id:       row.job_id,
        project_name: row.project_name,
        project_date: decode_date(&row.project_date)?,
        client_id:    row.client_id,
        store_id:     row.store_id,
        store_name:   row.store_name,
        state_name:   row.state_name,
        lat:          row.lat,
        lng:          row.lng,
        kwh_used:     row.kwh_used,
        freight_km:   row.freight_km,
        materials:    Vec::new(),
      });
    }
    if let (Some(material_name), Some(material_sqm)) = (row.material_name, row.material_sqm)
      && let Some(record) = records.last_mut()
    {
      record.materials.push(MaterialUsage {
        material_name,
        material_sqm,
        thickness_mm: row.thickness_mm,
      });
    }
  }
  Ok(records)
}
