//! Handlers for invites, registration and credential verification.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/internal/invites` | Body: `{"client_name":"..."}`; 201 + token |
//! | `POST` | `/users/register` | redeems an invite token, 201 + user |
//! | `POST` | `/users/login` | verifies credentials; 401 otherwise |
//!
//! Passwords are argon2-hashed here; the store only ever sees PHC strings.
//! Login verifies and returns the caller's identity — session issuance is
//! the upstream gateway's job (it then stamps `x-client-id` on requests).

use argon2::{
  password_hash::SaltString, Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Duration;
use inkfoot_core::{
  entity::{ClientId, User, UserId},
  geocode::Geocoder,
  store::{Invite, NewUser, PortalStore},
};
use rand_core::OsRng;
use serde::{Deserialize, Serialize};

use crate::{error::ApiError, AppState};

/// Invite tokens are valid for this long.
const INVITE_TTL_HOURS: i64 = 24;

// ─── Invites ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateInviteBody {
  pub client_name: String,
}

/// `POST /internal/invites`
pub async fn create_invite<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<CreateInviteBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.client_name.trim().is_empty() {
    return Err(ApiError::BadRequest("client name is required".into()));
  }
  let invite: Invite = state
    .store
    .create_invite(body.client_name, Duration::hours(INVITE_TTL_HOURS))
    .await
    .map_err(ApiError::from_store)?;
  Ok((StatusCode::CREATED, Json(invite)))
}

// ─── Registration ─────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub token:      String,
  pub first_name: String,
  pub last_name:  String,
  pub email:      String,
  pub password:   String,
}

/// `POST /users/register`
pub async fn register<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<RegisterBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  if body.password.is_empty() {
    return Err(ApiError::BadRequest("password is required".into()));
  }
  let password_hash = hash_password(&body.password)?;

  let user: User = state
    .store
    .register_user(NewUser {
      token: body.token,
      first_name: body.first_name,
      last_name: body.last_name,
      email: body.email,
      password_hash,
    })
    .await
    .map_err(ApiError::from_store)?;

  Ok((StatusCode::CREATED, Json(user)))
}

fn hash_password(password: &str) -> Result<String, ApiError> {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(password.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub email:    String,
  pub password: String,
}

/// The verified identity handed back to the gateway.
#[derive(Debug, Serialize)]
pub struct LoginResponse {
  pub user_id:   UserId,
  pub client_id: ClientId,
  pub email:     String,
}

/// `POST /users/login`
pub async fn login<S, G>(
  State(state): State<AppState<S, G>>,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: PortalStore,
  G: Geocoder,
{
  let invalid = || ApiError::Unauthorized("invalid credentials".into());

  let user = state
    .store
    .user_by_email(body.email)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(invalid)?;

  let parsed_hash = PasswordHash::new(&user.password_hash).map_err(|_| invalid())?;
  Argon2::default()
    .verify_password(body.password.as_bytes(), &parsed_hash)
    .map_err(|_| invalid())?;

  Ok(Json(LoginResponse {
    user_id:   user.user_id,
    client_id: user.client_id,
    email:     user.email,
  }))
}
