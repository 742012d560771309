//! [`SqliteStore`] — the SQLite implementation of [`PortalStore`].

use std::{collections::HashMap, path::Path};

use chrono::{Duration, Utc};
use rand_core::{OsRng, RngCore as _};
use rusqlite::OptionalExtension as _;

use inkfoot_core::{
  calc::EmissionRecord,
  entity::{
    Client, ClientContact, ClientId, ProjectDetail, ProjectId, ProjectMaterial, ProjectOverview,
    State, Store, StoreDetail, StoreId, StoreSummary, User,
  },
  error::Error as CoreError,
  factor::{EmissionFactor, FactorCatalog},
  store::{BulkStoreRow, Invite, NewProject, NewStore, NewUser, PortalStore, StoreUpdate},
};

use crate::{
  encode::{
    encode_date, encode_dt, encode_factor_type, fold_emission_rows, RawEmissionRow, RawFactor,
    RawProject, RawProjectOverview, RawUser,
  },
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// An inkfoot portal store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// UNIQUE / PRIMARY KEY violations become the distinct conflict errors of the
/// core taxonomy; every other constraint failure stays a database error.
fn is_unique_violation(err: &tokio_rusqlite::Error) -> bool {
  matches!(
    err,
    tokio_rusqlite::Error::Rusqlite(rusqlite::Error::SqliteFailure(e, _))
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
        || e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
  )
}

/// Fetch-or-insert a client by name. Runs inside the caller's transaction.
fn get_or_create_client_tx(conn: &rusqlite::Connection, name: &str) -> rusqlite::Result<Client> {
  let existing: Option<Client> = conn
    .query_row(
      "SELECT client_id, name FROM clients WHERE name = ?1",
      rusqlite::params![name],
      |row| {
        Ok(Client {
          client_id: row.get(0)?,
          name:      row.get(1)?,
        })
      },
    )
    .optional()?;

  if let Some(client) = existing {
    return Ok(client);
  }

  conn.execute("INSERT INTO clients (name) VALUES (?1)", rusqlite::params![name])?;
  Ok(Client {
    client_id: conn.last_insert_rowid(),
    name:      name.to_owned(),
  })
}

fn read_emission_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawEmissionRow> {
  Ok(RawEmissionRow {
    project_id:    row.get(0)?,
    job_id:        row.get(1)?,
    project_name:  row.get(2)?,
    project_date:  row.get(3)?,
    client_id:     row.get(4)?,
    store_id:      row.get(5)?,
    store_name:    row.get(6)?,
    state_name:    row.get(7)?,
    lat:           row.get(8)?,
    lng:           row.get(9)?,
    kwh_used:      row.get(10)?,
    freight_km:    row.get(11)?,
    material_name: row.get(12)?,
    material_sqm:  row.get(13)?,
    thickness_mm:  row.get(14)?,
  })
}

const EMISSION_ROWS_SQL: &str = "
  SELECT
    p.project_id, p.job_id, p.name, p.project_date, p.client_id,
    p.store_id, s.name, st.name, s.lat, s.lng, p.kwh_used, p.freight_km,
    pm.material_name, pm.material_sqm, pm.thickness_mm
  FROM projects p
  JOIN stores s  ON s.store_id  = p.store_id
  JOIN states st ON st.state_id = s.state_id
  LEFT JOIN project_materials pm ON pm.project_id = p.project_id";

/// Outcome of the register-user transaction, resolved to an error (or a new
/// user id) outside the connection closure.
enum RegisterOutcome {
  Created { user_id: i64, client_id: i64 },
  BadToken,
  EmailTaken,
}

// ─── PortalStore impl ────────────────────────────────────────────────────────

impl PortalStore for SqliteStore {
  type Error = Error;

  // ── Emission read model ───────────────────────────────────────────────────

  async fn emission_records(&self, client: Option<ClientId>) -> Result<Vec<EmissionRecord>> {
    let rows: Vec<RawEmissionRow> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(client) = client {
          let sql =
            format!("{EMISSION_ROWS_SQL} WHERE p.client_id = ?1 ORDER BY p.project_id, pm.material_id");
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params![client], read_emission_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let sql = format!("{EMISSION_ROWS_SQL} ORDER BY p.project_id, pm.material_id");
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map([], read_emission_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    fold_emission_rows(rows)
  }

  async fn factor_catalog(&self) -> Result<FactorCatalog> {
    let raws: Vec<RawFactor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT material_name, factor_type, co2e_per_unit, density_kg_per_m3
           FROM emission_factors",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawFactor {
              material_name:     row.get(0)?,
              factor_type:       row.get(1)?,
              co2e_per_unit:     row.get(2)?,
              density_kg_per_m3: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawFactor::into_factor).collect()
  }

  async fn put_factor(&self, factor: EmissionFactor) -> Result<()> {
    let factor_type = encode_factor_type(factor.factor_type).to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO emission_factors (material_name, factor_type, co2e_per_unit, density_kg_per_m3)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (material_name) DO UPDATE SET
             factor_type = ?2, co2e_per_unit = ?3, density_kg_per_m3 = ?4",
          rusqlite::params![
            factor.material_name,
            factor_type,
            factor.co2e_per_unit,
            factor.density_kg_per_m3,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Filter values ─────────────────────────────────────────────────────────

  async fn project_names(&self, client: ClientId) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(move |conn| {
        let mut stmt = conn
          .prepare("SELECT DISTINCT name FROM projects WHERE client_id = ?1 ORDER BY name")?;
        let rows = stmt
          .query_map(rusqlite::params![client], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn client_states(&self, client: ClientId) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT st.name
           FROM states st
           JOIN stores s ON s.state_id = st.state_id
           WHERE s.client_id = ?1
           ORDER BY st.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![client], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  // ── Clients ───────────────────────────────────────────────────────────────

  async fn get_or_create_client(&self, name: String) -> Result<Client> {
    let client = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let client = get_or_create_client_tx(&tx, &name)?;
        tx.commit()?;
        Ok(client)
      })
      .await?;
    Ok(client)
  }

  async fn get_client(&self, id: ClientId) -> Result<Option<Client>> {
    let client = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT client_id, name FROM clients WHERE client_id = ?1",
              rusqlite::params![id],
              |row| {
                Ok(Client {
                  client_id: row.get(0)?,
                  name:      row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(client)
  }

  async fn rename_client(&self, id: ClientId, name: String) -> Result<Client> {
    let new_name = name.clone();
    let result = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE clients SET name = ?1 WHERE client_id = ?2",
          rusqlite::params![new_name, id],
        )?)
      })
      .await;

    match result {
      Ok(0) => Err(CoreError::ClientNotFound(id).into()),
      Ok(_) => Ok(Client {
        client_id: id,
        name,
      }),
      Err(e) if is_unique_violation(&e) => Err(CoreError::ClientNameTaken(name).into()),
      Err(e) => Err(e.into()),
    }
  }

  async fn delete_client(&self, id: ClientId) -> Result<()> {
    let existed = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM clients WHERE client_id = ?1",
            rusqlite::params![id],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);

        if exists {
          tx.execute(
            "DELETE FROM project_materials WHERE project_id IN
               (SELECT project_id FROM projects WHERE client_id = ?1)",
            rusqlite::params![id],
          )?;
          tx.execute("DELETE FROM projects WHERE client_id = ?1", rusqlite::params![id])?;
          tx.execute("DELETE FROM stores WHERE client_id = ?1", rusqlite::params![id])?;
          tx.execute(
            "DELETE FROM registration_tokens WHERE client_id = ?1",
            rusqlite::params![id],
          )?;
          tx.execute("DELETE FROM users WHERE client_id = ?1", rusqlite::params![id])?;
          tx.execute("DELETE FROM clients WHERE client_id = ?1", rusqlite::params![id])?;
        }
        tx.commit()?;
        Ok(exists)
      })
      .await?;

    if existed {
      Ok(())
    } else {
      Err(CoreError::ClientNotFound(id).into())
    }
  }

  async fn list_clients(&self) -> Result<Vec<ClientContact>> {
    let clients = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT c.client_id, c.name,
                  (SELECT u.email FROM users u
                   WHERE u.client_id = c.client_id
                   ORDER BY u.user_id LIMIT 1) AS contact_email
           FROM clients c
           ORDER BY c.name",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(ClientContact {
              client_id:     row.get(0)?,
              name:          row.get(1)?,
              contact_email: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(clients)
  }

  // ── States ────────────────────────────────────────────────────────────────

  async fn add_state(&self, name: String, abbreviation: String) -> Result<State> {
    let state = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO states (name, abbreviation) VALUES (?1, ?2)",
          rusqlite::params![name, abbreviation],
        )?;
        Ok(State {
          state_id: conn.last_insert_rowid(),
          name,
          abbreviation,
        })
      })
      .await?;
    Ok(state)
  }

  async fn list_states(&self) -> Result<Vec<State>> {
    let states = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT state_id, name, abbreviation FROM states ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(State {
              state_id:     row.get(0)?,
              name:         row.get(1)?,
              abbreviation: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(states)
  }

  async fn state_by_name(&self, name: String) -> Result<Option<State>> {
    let state = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT state_id, name, abbreviation FROM states WHERE name = ?1",
              rusqlite::params![name],
              |row| {
                Ok(State {
                  state_id:     row.get(0)?,
                  name:         row.get(1)?,
                  abbreviation: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(state)
  }

  // ── Stores ────────────────────────────────────────────────────────────────

  async fn add_store(&self, store: NewStore) -> Result<Store> {
    let created = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO stores (client_id, state_id, name, address, lat, lng)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            store.client_id,
            store.state_id,
            store.name,
            store.address,
            store.lat,
            store.lng,
          ],
        )?;
        Ok(Store {
          store_id:  conn.last_insert_rowid(),
          client_id: store.client_id,
          state_id:  store.state_id,
          name:      store.name,
          address:   store.address,
          lat:       store.lat,
          lng:       store.lng,
        })
      })
      .await?;
    Ok(created)
  }

  async fn update_store(&self, id: StoreId, update: StoreUpdate) -> Result<Store> {
    let updated: Option<Store> = self
      .conn
      .call(move |conn| {
        let affected = conn.execute(
          "UPDATE stores SET state_id = ?1, name = ?2, address = ?3, lat = ?4, lng = ?5
           WHERE store_id = ?6",
          rusqlite::params![
            update.state_id,
            update.name,
            update.address,
            update.lat,
            update.lng,
            id,
          ],
        )?;
        if affected == 0 {
          return Ok(None);
        }
        let store = conn.query_row(
          "SELECT store_id, client_id, state_id, name, address, lat, lng
           FROM stores WHERE store_id = ?1",
          rusqlite::params![id],
          |row| {
            Ok(Store {
              store_id:  row.get(0)?,
              client_id: row.get(1)?,
              state_id:  row.get(2)?,
              name:      row.get(3)?,
              address:   row.get(4)?,
              lat:       row.get(5)?,
              lng:       row.get(6)?,
            })
          },
        )?;
        Ok(Some(store))
      })
      .await?;

    updated.ok_or_else(|| CoreError::StoreNotFound(id).into())
  }

  async fn delete_store(&self, id: StoreId) -> Result<()> {
    let (found, has_projects) = self
      .conn
      .call(move |conn| {
        let projects: i64 = conn.query_row(
          "SELECT COUNT(*) FROM projects WHERE store_id = ?1",
          rusqlite::params![id],
          |row| row.get(0),
        )?;
        if projects > 0 {
          return Ok((true, true));
        }
        let affected =
          conn.execute("DELETE FROM stores WHERE store_id = ?1", rusqlite::params![id])?;
        Ok((affected > 0, false))
      })
      .await?;

    if has_projects {
      Err(CoreError::StoreHasProjects(id).into())
    } else if !found {
      Err(CoreError::StoreNotFound(id).into())
    } else {
      Ok(())
    }
  }

  async fn list_stores(&self) -> Result<Vec<StoreSummary>> {
    let stores = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT store_id, name FROM stores ORDER BY name")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(StoreSummary {
              store_id: row.get(0)?,
              name:     row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(stores)
  }

  async fn stores_for_client(&self, client: ClientId) -> Result<Vec<StoreDetail>> {
    let stores = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT s.store_id, s.name, s.address, s.state_id, st.name
           FROM stores s
           JOIN states st ON st.state_id = s.state_id
           WHERE s.client_id = ?1
           ORDER BY s.name",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![client], |row| {
            Ok(StoreDetail {
              store_id:   row.get(0)?,
              name:       row.get(1)?,
              address:    row.get(2)?,
              state_id:   row.get(3)?,
              state_name: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(stores)
  }

  async fn bulk_add_stores(&self, client: ClientId, rows: Vec<BulkStoreRow>) -> Result<usize> {
    // Resolve every abbreviation before anything is written — fail-fast, no
    // partial import.
    let states: Vec<(i64, String)> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT state_id, abbreviation FROM states")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    let by_abbreviation: HashMap<String, i64> =
      states.into_iter().map(|(id, abbr)| (abbr, id)).collect();

    let mut resolved: Vec<(String, i64, Option<f64>, Option<f64>)> =
      Vec::with_capacity(rows.len());
    for row in rows {
      if row.name.trim().is_empty() {
        return Err(CoreError::MissingField("name").into());
      }
      let state_id = by_abbreviation
        .get(&row.state_abbreviation)
        .copied()
        .ok_or_else(|| {
          Error::Core(CoreError::UnknownStateAbbreviation(row.state_abbreviation.clone()))
        })?;
      resolved.push((row.name, state_id, row.lat, row.lng));
    }

    let inserted = resolved.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO stores (client_id, state_id, name, lat, lng)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for (name, state_id, lat, lng) in &resolved {
            stmt.execute(rusqlite::params![client, state_id, name, lat, lng])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(inserted)
  }

  // ── Projects ──────────────────────────────────────────────────────────────

  async fn add_project(&self, project: NewProject) -> Result<ProjectId> {
    project.validate().map_err(Error::Core)?;

    let job_id = project.job_id.clone();
    let name = project.name.clone();
    let date_str = encode_date(project.project_date);

    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO projects (client_id, store_id, job_id, name, project_date, kwh_used, freight_km)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            project.client_id,
            project.store_id,
            project.job_id,
            project.name,
            date_str,
            project.kwh_used,
            project.freight_km,
          ],
        )?;
        let project_id = tx.last_insert_rowid();
        {
          let mut stmt = tx.prepare(
            "INSERT INTO project_materials (project_id, material_name, material_sqm, thickness_mm)
             VALUES (?1, ?2, ?3, ?4)",
          )?;
          for material in &project.materials {
            stmt.execute(rusqlite::params![
              project_id,
              material.material_name,
              material.material_sqm,
              material.thickness_mm,
            ])?;
          }
        }
        tx.commit()?;
        Ok(project_id)
      })
      .await;

    match result {
      Ok(project_id) => Ok(project_id),
      Err(e) if is_unique_violation(&e) => {
        Err(CoreError::ProjectConflict { job_id, name }.into())
      }
      Err(e) => Err(e.into()),
    }
  }

  async fn get_project(&self, id: ProjectId) -> Result<Option<ProjectDetail>> {
    let raw: Option<(RawProject, Vec<ProjectMaterial>)> = self
      .conn
      .call(move |conn| {
        let project = conn
          .query_row(
            "SELECT project_id, client_id, store_id, job_id, name, project_date, kwh_used, freight_km
             FROM projects WHERE project_id = ?1",
            rusqlite::params![id],
            |row| {
              Ok(RawProject {
                project_id:   row.get(0)?,
                client_id:    row.get(1)?,
                store_id:     row.get(2)?,
                job_id:       row.get(3)?,
                name:         row.get(4)?,
                project_date: row.get(5)?,
                kwh_used:     row.get(6)?,
                freight_km:   row.get(7)?,
              })
            },
          )
          .optional()?;

        let Some(project) = project else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT project_id, material_name, material_sqm, thickness_mm
           FROM project_materials WHERE project_id = ?1
           ORDER BY material_id",
        )?;
        let materials = stmt
          .query_map(rusqlite::params![id], |row| {
            Ok(ProjectMaterial {
              project_id:    row.get(0)?,
              material_name: row.get(1)?,
              material_sqm:  row.get(2)?,
              thickness_mm:  row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Some((project, materials)))
      })
      .await?;

    match raw {
      Some((project, materials)) => Ok(Some(ProjectDetail {
        project: project.into_project()?,
        materials,
      })),
      None => Ok(None),
    }
  }

  async fn delete_project(&self, id: ProjectId) -> Result<()> {
    let affected = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "DELETE FROM project_materials WHERE project_id = ?1",
          rusqlite::params![id],
        )?;
        let affected =
          tx.execute("DELETE FROM projects WHERE project_id = ?1", rusqlite::params![id])?;
        tx.commit()?;
        Ok(affected)
      })
      .await?;

    if affected == 0 {
      Err(CoreError::ProjectNotFound(id).into())
    } else {
      Ok(())
    }
  }

  async fn list_projects(&self) -> Result<Vec<ProjectOverview>> {
    let raws: Vec<RawProjectOverview> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.project_id, p.job_id, p.name, p.project_date, c.name, s.name
           FROM projects p
           JOIN clients c ON c.client_id = p.client_id
           JOIN stores s  ON s.store_id  = p.store_id
           ORDER BY p.project_date DESC, p.project_id DESC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawProjectOverview {
              project_id:   row.get(0)?,
              job_id:       row.get(1)?,
              name:         row.get(2)?,
              project_date: row.get(3)?,
              client_name:  row.get(4)?,
              store_name:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws
      .into_iter()
      .map(RawProjectOverview::into_overview)
      .collect()
  }

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn create_invite(&self, client_name: String, ttl: Duration) -> Result<Invite> {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    let token = hex::encode(bytes);
    let expires_at = Utc::now() + ttl;

    let token_param = token.clone();
    let expires_str = encode_dt(expires_at);

    let client_id = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let client = get_or_create_client_tx(&tx, &client_name)?;
        tx.execute(
          "INSERT INTO registration_tokens (token, client_id, expires_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![token_param, client.client_id, expires_str],
        )?;
        tx.commit()?;
        Ok(client.client_id)
      })
      .await?;

    Ok(Invite {
      client_id,
      token,
      expires_at,
    })
  }

  async fn register_user(&self, user: NewUser) -> Result<User> {
    user.validate().map_err(Error::Core)?;

    let created_at = Utc::now();
    let now_str = encode_dt(created_at);
    let first_name = user.first_name.clone();
    let last_name = user.last_name.clone();
    let email = user.email.clone();
    let password_hash = user.password_hash.clone();

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let token_row: Option<(i64, String, bool)> = tx
          .query_row(
            "SELECT client_id, expires_at, is_used FROM registration_tokens WHERE token = ?1",
            rusqlite::params![user.token],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
          )
          .optional()?;

        let Some((client_id, expires_at, is_used)) = token_row else {
          return Ok(RegisterOutcome::BadToken);
        };
        // RFC 3339 UTC strings compare correctly as text.
        if is_used || expires_at <= now_str {
          return Ok(RegisterOutcome::BadToken);
        }

        let email_taken: bool = tx
          .query_row(
            "SELECT 1 FROM users WHERE email = ?1",
            rusqlite::params![user.email],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if email_taken {
          return Ok(RegisterOutcome::EmailTaken);
        }

        tx.execute(
          "INSERT INTO users (client_id, first_name, last_name, email, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![
            client_id,
            user.first_name,
            user.last_name,
            user.email,
            user.password_hash,
            now_str,
          ],
        )?;
        let user_id = tx.last_insert_rowid();
        tx.execute(
          "UPDATE registration_tokens SET is_used = 1 WHERE token = ?1",
          rusqlite::params![user.token],
        )?;
        tx.commit()?;
        Ok(RegisterOutcome::Created { user_id, client_id })
      })
      .await?;

    match outcome {
      RegisterOutcome::Created { user_id, client_id } => Ok(User {
        user_id,
        client_id,
        first_name,
        last_name,
        email,
        password_hash,
        created_at,
      }),
      RegisterOutcome::BadToken => Err(CoreError::InvalidRegistrationToken.into()),
      RegisterOutcome::EmailTaken => Err(CoreError::EmailTaken(email).into()),
    }
  }

  async fn user_by_email(&self, email: String) -> Result<Option<User>> {
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, client_id, first_name, last_name, email, password_hash, created_at
               FROM users WHERE email = ?1",
              rusqlite::params![email],
              |row| {
                Ok(RawUser {
                  user_id:       row.get(0)?,
                  client_id:     row.get(1)?,
                  first_name:    row.get(2)?,
                  last_name:     row.get(3)?,
                  email:         row.get(4)?,
                  password_hash: row.get(5)?,
                  created_at:    row.get(6)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }
}
