//! Portal entities — clients, users, states, stores, projects.
//!
//! These are owned and mutated by the CRUD layer; the emission calculator
//! consumes them read-only through the [`crate::calc`] read model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type ClientId = i64;
pub type UserId = i64;
pub type StateId = i64;
pub type StoreId = i64;
pub type ProjectId = i64;

// ─── Tenancy ─────────────────────────────────────────────────────────────────

/// A tenant of the portal — a business whose projects, stores and emissions
/// are tracked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
  pub client_id: ClientId,
  pub name:      String,
}

/// A client row joined with its primary contact — the first user created for
/// the client, used for display only.
#[derive(Debug, Clone, Serialize)]
pub struct ClientContact {
  pub client_id:     ClientId,
  pub name:          String,
  pub contact_email: Option<String>,
}

/// A portal login belonging to a client.
#[derive(Debug, Clone, Serialize)]
pub struct User {
  pub user_id:       UserId,
  pub client_id:     ClientId,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  /// argon2 PHC string, e.g. `$argon2id$v=19$…`. Never serialised.
  #[serde(skip_serializing)]
  pub password_hash: String,
  pub created_at:    DateTime<Utc>,
}

// ─── Reference data ──────────────────────────────────────────────────────────

/// A state/region row, keyed both ways: by full name (geocoder results) and
/// by abbreviation (bulk store import rows).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
  pub state_id:     StateId,
  pub name:         String,
  pub abbreviation: String,
}

// ─── Stores ──────────────────────────────────────────────────────────────────

/// A physical store location belonging to a client.
/// `lat`/`lng` are null when geocoding was skipped (bulk import rows may omit
/// coordinates).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
  pub store_id:  StoreId,
  pub client_id: ClientId,
  pub state_id:  StateId,
  pub name:      String,
  pub address:   Option<String>,
  pub lat:       Option<f64>,
  pub lng:       Option<f64>,
}

/// Store row for global dropdowns.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
  pub store_id: StoreId,
  pub name:     String,
}

/// Store row joined with its state, for the per-client management view.
#[derive(Debug, Clone, Serialize)]
pub struct StoreDetail {
  pub store_id:   StoreId,
  pub name:       String,
  pub address:    Option<String>,
  pub state_id:   StateId,
  pub state_name: String,
}

// ─── Projects ────────────────────────────────────────────────────────────────

/// A printed-media project. Owns one or more [`ProjectMaterial`] lines; a
/// project with zero materials is rejected at creation, so no consumer ever
/// sees one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
  pub project_id:   ProjectId,
  pub client_id:    ClientId,
  pub store_id:     StoreId,
  pub job_id:       String,
  pub name:         String,
  pub project_date: NaiveDate,
  pub kwh_used:     f64,
  pub freight_km:   f64,
}

/// One material consumed by a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectMaterial {
  pub project_id:    ProjectId,
  pub material_name: String,
  pub material_sqm:  f64,
  /// Whole millimetres in `[1, 25]`; only meaningful for mass-based
  /// materials.
  pub thickness_mm:  Option<f64>,
}

/// A project with its full bill of materials.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectDetail {
  pub project:   Project,
  pub materials: Vec<ProjectMaterial>,
}

/// Project row joined with client and store names, for the internal
/// all-projects table.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectOverview {
  pub project_id:   ProjectId,
  pub job_id:       String,
  pub name:         String,
  pub project_date: NaiveDate,
  pub client_name:  String,
  pub store_name:   String,
}
