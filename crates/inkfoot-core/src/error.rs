//! Error types for `inkfoot-core`.
//!
//! This is the write-side taxonomy: validation failures, uniqueness
//! conflicts, and not-found lookups are distinct variants so the API layer
//! can map them to distinct status codes. The emission calculator itself has
//! no error states — missing reference data degrades to a zero contribution.

use thiserror::Error;

use crate::entity::{ClientId, ProjectId, StoreId};

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ────────────────────────────────────────────────────────

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("a project needs at least one material line")]
  NoMaterials,

  #[error(
    "invalid thickness for {material}: must be a whole number between 1 and 25, got {thickness_mm}"
  )]
  InvalidThickness { material: String, thickness_mm: f64 },

  #[error("invalid area for {material}: material_sqm must be greater than zero, got {sqm}")]
  InvalidArea { material: String, sqm: f64 },

  #[error("invalid or expired registration token")]
  InvalidRegistrationToken,

  #[error("the state {0:?} is not configured in the system")]
  UnknownState(String),

  #[error("unknown state abbreviation {0:?}")]
  UnknownStateAbbreviation(String),

  #[error("store {0} is still linked to existing projects")]
  StoreHasProjects(StoreId),

  // ── Uniqueness conflicts ──────────────────────────────────────────────

  #[error("a project with job id {job_id:?} or name {name:?} already exists for this client")]
  ProjectConflict { job_id: String, name: String },

  #[error("a client named {0:?} already exists")]
  ClientNameTaken(String),

  #[error("a user with email {0:?} already exists")]
  EmailTaken(String),

  // ── Not found ─────────────────────────────────────────────────────────

  #[error("client not found: {0}")]
  ClientNotFound(ClientId),

  #[error("store not found: {0}")]
  StoreNotFound(StoreId),

  #[error("project not found: {0}")]
  ProjectNotFound(ProjectId),

  // ── Backend ───────────────────────────────────────────────────────────

  #[error("storage error: {0}")]
  Backend(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
