//! The `PortalStore` trait and its input types.
//!
//! The trait is implemented by storage backends (e.g.
//! `inkfoot-store-sqlite`). Handlers depend on this abstraction, not on any
//! concrete backend.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`). Backend errors
//! must convert into [`crate::Error`] so callers can classify failures
//! (validation / conflict / not-found) without naming a concrete backend.

use std::future::Future;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Deserialize;

use crate::{
  calc::EmissionRecord,
  entity::{
    Client, ClientContact, ClientId, ProjectDetail, ProjectId, ProjectOverview, State, StateId,
    Store, StoreDetail, StoreId, StoreSummary, User,
  },
  factor::{EmissionFactor, FactorCatalog},
  Error,
};

// ─── Write inputs ────────────────────────────────────────────────────────────

/// One material line of a [`NewProject`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProjectMaterial {
  pub material_name: String,
  pub material_sqm:  f64,
  /// Whole millimetres in `[1, 25]`; validated only when supplied.
  pub thickness_mm:  Option<f64>,
}

/// Input to [`PortalStore::add_project`].
///
/// The project row and all of its material rows are written in one
/// transaction — a project visible with a partial bill of materials would
/// silently under-report its emissions.
#[derive(Debug, Clone, Deserialize)]
pub struct NewProject {
  pub job_id:       String,
  pub name:         String,
  pub project_date: NaiveDate,
  pub store_id:     StoreId,
  pub client_id:    ClientId,
  #[serde(default)]
  pub kwh_used:     f64,
  #[serde(default)]
  pub freight_km:   f64,
  pub materials:    Vec<NewProjectMaterial>,
}

impl NewProject {
  /// Validate before any row is written. Any failure aborts the whole
  /// project.
  pub fn validate(&self) -> Result<(), Error> {
    if self.job_id.trim().is_empty() {
      return Err(Error::MissingField("job_id"));
    }
    if self.name.trim().is_empty() {
      return Err(Error::MissingField("name"));
    }
    if self.materials.is_empty() {
      return Err(Error::NoMaterials);
    }
    for material in &self.materials {
      if material.material_name.trim().is_empty() {
        return Err(Error::MissingField("material_name"));
      }
      if !(material.material_sqm > 0.0) {
        return Err(Error::InvalidArea {
          material: material.material_name.clone(),
          sqm:      material.material_sqm,
        });
      }
      if let Some(thickness) = material.thickness_mm
        && (thickness.fract() != 0.0 || !(1.0..=25.0).contains(&thickness))
      {
        return Err(Error::InvalidThickness {
          material:     material.material_name.clone(),
          thickness_mm: thickness,
        });
      }
    }
    Ok(())
  }
}

/// Input to [`PortalStore::add_store`]. Geocoding has already happened — the
/// caller supplies resolved coordinates and a state that exists.
#[derive(Debug, Clone, Deserialize)]
pub struct NewStore {
  pub client_id: ClientId,
  pub state_id:  StateId,
  pub name:      String,
  pub address:   Option<String>,
  pub lat:       Option<f64>,
  pub lng:       Option<f64>,
}

/// Input to [`PortalStore::update_store`]. The owning client never changes.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreUpdate {
  pub state_id: StateId,
  pub name:     String,
  pub address:  Option<String>,
  pub lat:      Option<f64>,
  pub lng:      Option<f64>,
}

/// One pre-parsed row of a bulk store import. CSV parsing happens on the
/// client; the server receives rows like these and writes the whole batch in
/// one transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct BulkStoreRow {
  pub name:               String,
  pub state_abbreviation: String,
  pub lat:                Option<f64>,
  pub lng:                Option<f64>,
}

/// A registration invite: an opaque token a new user presents to join the
/// client it was issued for. Single-use, expiring.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Invite {
  pub client_id:  ClientId,
  pub token:      String,
  pub expires_at: DateTime<Utc>,
}

/// Input to [`PortalStore::register_user`]. The password is hashed by the
/// caller; stores never see plaintext credentials.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub token:         String,
  pub first_name:    String,
  pub last_name:     String,
  pub email:         String,
  pub password_hash: String,
}

impl NewUser {
  pub fn validate(&self) -> Result<(), Error> {
    if self.token.trim().is_empty() {
      return Err(Error::MissingField("token"));
    }
    if self.first_name.trim().is_empty() {
      return Err(Error::MissingField("first_name"));
    }
    if self.last_name.trim().is_empty() {
      return Err(Error::MissingField("last_name"));
    }
    if self.email.trim().is_empty() {
      return Err(Error::MissingField("email"));
    }
    Ok(())
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the portal's storage backend.
pub trait PortalStore: Send + Sync {
  type Error: std::error::Error + Into<Error> + Send + Sync + 'static;

  // ── Emission read model ───────────────────────────────────────────────

  /// Materialise the calculator's read model: every project joined with its
  /// store, state and bill of materials. `client` pushes the tenant scope
  /// down to the backend; the calculator re-applies the full filter either
  /// way, so the pushdown is purely an optimisation.
  fn emission_records(
    &self,
    client: Option<ClientId>,
  ) -> impl Future<Output = Result<Vec<EmissionRecord>, Self::Error>> + Send + '_;

  /// All configured emission factors, keyed by material name.
  fn factor_catalog(
    &self,
  ) -> impl Future<Output = Result<FactorCatalog, Self::Error>> + Send + '_;

  /// Insert or replace the factor for a material (operator tooling).
  fn put_factor(
    &self,
    factor: EmissionFactor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  // ── Filter values ─────────────────────────────────────────────────────

  /// Distinct project names for a client, sorted.
  fn project_names(
    &self,
    client: ClientId,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  /// Distinct state names a client has stores in, sorted.
  fn client_states(
    &self,
    client: ClientId,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  // ── Clients ───────────────────────────────────────────────────────────

  /// Fetch the client named `name`, creating it if absent.
  fn get_or_create_client(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  fn get_client(
    &self,
    id: ClientId,
  ) -> impl Future<Output = Result<Option<Client>, Self::Error>> + Send + '_;

  /// Rename a client. A name collision is a distinct conflict error.
  fn rename_client(
    &self,
    id: ClientId,
    name: String,
  ) -> impl Future<Output = Result<Client, Self::Error>> + Send + '_;

  /// Delete a client together with its users, stores, projects and
  /// materials, in one transaction.
  fn delete_client(
    &self,
    id: ClientId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All clients with their primary contact (first user by creation order),
  /// sorted by name.
  fn list_clients(
    &self,
  ) -> impl Future<Output = Result<Vec<ClientContact>, Self::Error>> + Send + '_;

  // ── States ────────────────────────────────────────────────────────────

  fn add_state(
    &self,
    name: String,
    abbreviation: String,
  ) -> impl Future<Output = Result<State, Self::Error>> + Send + '_;

  /// All states, sorted by name.
  fn list_states(&self) -> impl Future<Output = Result<Vec<State>, Self::Error>> + Send + '_;

  /// Exact-match lookup by full state name (geocoder results resolve through
  /// here; no fuzzy matching).
  fn state_by_name(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Option<State>, Self::Error>> + Send + '_;

  // ── Stores ────────────────────────────────────────────────────────────

  fn add_store(
    &self,
    store: NewStore,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  fn update_store(
    &self,
    id: StoreId,
    update: StoreUpdate,
  ) -> impl Future<Output = Result<Store, Self::Error>> + Send + '_;

  /// Rejected while any project still references the store.
  fn delete_store(
    &self,
    id: StoreId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// All stores, sorted by name.
  fn list_stores(
    &self,
  ) -> impl Future<Output = Result<Vec<StoreSummary>, Self::Error>> + Send + '_;

  /// A client's stores with state names, sorted by store name.
  fn stores_for_client(
    &self,
    client: ClientId,
  ) -> impl Future<Output = Result<Vec<StoreDetail>, Self::Error>> + Send + '_;

  /// Insert a whole batch of imported stores for one client. A row with an
  /// unknown state abbreviation or a missing name aborts the batch; zero
  /// rows are persisted in that case.
  fn bulk_add_stores(
    &self,
    client: ClientId,
    rows: Vec<BulkStoreRow>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Projects ──────────────────────────────────────────────────────────

  /// Insert a project and its materials atomically. Validation failures and
  /// uniqueness conflicts leave the database untouched.
  fn add_project(
    &self,
    project: NewProject,
  ) -> impl Future<Output = Result<ProjectId, Self::Error>> + Send + '_;

  fn get_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<Option<ProjectDetail>, Self::Error>> + Send + '_;

  fn delete_project(
    &self,
    id: ProjectId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Every project across all clients, newest first (internal overview).
  fn list_projects(
    &self,
  ) -> impl Future<Output = Result<Vec<ProjectOverview>, Self::Error>> + Send + '_;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Issue a registration invite for `client_name`, creating the client if
  /// it does not exist yet. The token is random, single-use and expires
  /// after `ttl`.
  fn create_invite(
    &self,
    client_name: String,
    ttl: Duration,
  ) -> impl Future<Output = Result<Invite, Self::Error>> + Send + '_;

  /// Redeem an invite token and create the user, atomically: the token must
  /// exist, be unused and unexpired, the email must be free, and the token
  /// is marked used in the same transaction.
  fn register_user(
    &self,
    user: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Credential lookup for login verification.
  fn user_by_email(
    &self,
    email: String,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;
}
