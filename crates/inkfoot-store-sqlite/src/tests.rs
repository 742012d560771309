//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Duration, NaiveDate};
use inkfoot_core::{
  entity::{Client, ClientId, Store, StoreId},
  error::Error as CoreError,
  factor::{EmissionFactor, FactorType},
  store::{BulkStoreRow, NewProject, NewProjectMaterial, NewStore, NewUser, PortalStore},
};

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn d(y: i32, m: u32, day: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, day).unwrap() }

async fn seed_states(s: &SqliteStore) {
  s.add_state("Victoria".into(), "VIC".into()).await.unwrap();
  s.add_state("New South Wales".into(), "NSW".into())
    .await
    .unwrap();
}

async fn seed_factors(s: &SqliteStore) {
  s.put_factor(EmissionFactor {
    material_name:     "Self Adhesive Vinyl".into(),
    factor_type:       FactorType::PerSqm,
    co2e_per_unit:     3.0,
    density_kg_per_m3: None,
  })
  .await
  .unwrap();
  s.put_factor(EmissionFactor {
    material_name:     "Foam Board".into(),
    factor_type:       FactorType::PerKg,
    co2e_per_unit:     2.0,
    density_kg_per_m3: Some(500.0),
  })
  .await
  .unwrap();
}

/// One client with one Victorian store, ready for projects.
async fn client_with_store(s: &SqliteStore) -> (Client, Store) {
  seed_states(s).await;
  let client = s.get_or_create_client("Acme Retail".into()).await.unwrap();
  let state = s.state_by_name("Victoria".into()).await.unwrap().unwrap();
  let store = s
    .add_store(NewStore {
      client_id: client.client_id,
      state_id:  state.state_id,
      name:      "Chadstone".into(),
      address:   Some("1341 Dandenong Rd, Chadstone VIC".into()),
      lat:       Some(-37.886),
      lng:       Some(145.083),
    })
    .await
    .unwrap();
  (client, store)
}

fn material(name: &str, sqm: f64, thickness: Option<f64>) -> NewProjectMaterial {
  NewProjectMaterial {
    material_name: name.into(),
    material_sqm:  sqm,
    thickness_mm:  thickness,
  }
}

fn project(
  client_id: ClientId,
  store_id: StoreId,
  job_id: &str,
  name: &str,
  materials: Vec<NewProjectMaterial>,
) -> NewProject {
  NewProject {
    job_id: job_id.into(),
    name: name.into(),
    project_date: d(2024, 3, 15),
    store_id,
    client_id,
    kwh_used: 0.0,
    freight_km: 0.0,
    materials,
  }
}

// ─── Clients ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_or_create_client_is_idempotent() {
  let s = store().await;

  let first = s.get_or_create_client("Acme Retail".into()).await.unwrap();
  let second = s.get_or_create_client("Acme Retail".into()).await.unwrap();
  assert_eq!(first.client_id, second.client_id);

  let fetched = s.get_client(first.client_id).await.unwrap().unwrap();
  assert_eq!(fetched.name, "Acme Retail");
}

#[tokio::test]
async fn rename_client_reports_conflicts_distinctly() {
  let s = store().await;
  let a = s.get_or_create_client("Acme Retail".into()).await.unwrap();
  s.get_or_create_client("Budget Signs".into()).await.unwrap();

  let renamed = s
    .rename_client(a.client_id, "Acme Group".into())
    .await
    .unwrap();
  assert_eq!(renamed.name, "Acme Group");

  let err = s
    .rename_client(a.client_id, "Budget Signs".into())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ClientNameTaken(_))));

  let err = s.rename_client(9999, "Whoever".into()).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ClientNotFound(9999))));
}

#[tokio::test]
async fn delete_client_removes_stores_projects_and_users() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  s.add_project(project(client.client_id, shop.store_id, "J-1", "Launch", vec![material(
    "Foam Board",
    10.0,
    Some(5.0),
  )]))
  .await
  .unwrap();

  s.delete_client(client.client_id).await.unwrap();

  assert!(s.get_client(client.client_id).await.unwrap().is_none());
  assert!(s.emission_records(None).await.unwrap().is_empty());
  assert!(s.list_projects().await.unwrap().is_empty());
  assert!(s.list_stores().await.unwrap().is_empty());

  let err = s.delete_client(client.client_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ClientNotFound(_))));
}

#[tokio::test]
async fn list_clients_picks_the_first_user_as_contact() {
  let s = store().await;

  let invite = s
    .create_invite("Acme Retail".into(), Duration::hours(24))
    .await
    .unwrap();
  s.register_user(NewUser {
    token:         invite.token,
    first_name:    "Ada".into(),
    last_name:     "Nguyen".into(),
    email:         "ada@acme.example".into(),
    password_hash: "$argon2id$fake".into(),
  })
  .await
  .unwrap();
  let invite = s
    .create_invite("Acme Retail".into(), Duration::hours(24))
    .await
    .unwrap();
  s.register_user(NewUser {
    token:         invite.token,
    first_name:    "Ben".into(),
    last_name:     "Okafor".into(),
    email:         "ben@acme.example".into(),
    password_hash: "$argon2id$fake".into(),
  })
  .await
  .unwrap();
  s.get_or_create_client("Budget Signs".into()).await.unwrap();

  let clients = s.list_clients().await.unwrap();
  assert_eq!(clients.len(), 2);
  assert_eq!(clients[0].name, "Acme Retail");
  assert_eq!(clients[0].contact_email.as_deref(), Some("ada@acme.example"));
  assert_eq!(clients[1].name, "Budget Signs");
  assert_eq!(clients[1].contact_email, None);
}

// ─── States & stores ─────────────────────────────────────────────────────────

#[tokio::test]
async fn states_are_listed_sorted_and_found_by_exact_name() {
  let s = store().await;
  seed_states(&s).await;

  let states = s.list_states().await.unwrap();
  assert_eq!(states.len(), 2);
  assert_eq!(states[0].name, "New South Wales");

  assert!(s.state_by_name("Victoria".into()).await.unwrap().is_some());
  // Exact match only — no abbreviation fallback.
  assert!(s.state_by_name("VIC".into()).await.unwrap().is_none());
  assert!(s.state_by_name("victoria".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn update_store_rewrites_location_fields() {
  let s = store().await;
  let (_, shop) = client_with_store(&s).await;
  let nsw = s
    .state_by_name("New South Wales".into())
    .await
    .unwrap()
    .unwrap();

  let updated = s
    .update_store(shop.store_id, inkfoot_core::store::StoreUpdate {
      state_id: nsw.state_id,
      name:     "Chatswood".into(),
      address:  Some("1 Anderson St, Chatswood NSW".into()),
      lat:      Some(-33.796),
      lng:      Some(151.183),
    })
    .await
    .unwrap();

  assert_eq!(updated.name, "Chatswood");
  assert_eq!(updated.state_id, nsw.state_id);
  assert_eq!(updated.client_id, shop.client_id);
}

#[tokio::test]
async fn delete_store_is_rejected_while_projects_reference_it() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  s.add_project(project(client.client_id, shop.store_id, "J-1", "Launch", vec![material(
    "Foam Board",
    10.0,
    Some(5.0),
  )]))
  .await
  .unwrap();

  let err = s.delete_store(shop.store_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StoreHasProjects(id)) if id == shop.store_id));

  // Still there.
  assert_eq!(s.list_stores().await.unwrap().len(), 1);

  let projects = s.list_projects().await.unwrap();
  s.delete_project(projects[0].project_id).await.unwrap();
  s.delete_store(shop.store_id).await.unwrap();
  assert!(s.list_stores().await.unwrap().is_empty());

  let err = s.delete_store(shop.store_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::StoreNotFound(_))));
}

#[tokio::test]
async fn bulk_add_stores_inserts_the_whole_batch() {
  let s = store().await;
  seed_states(&s).await;
  let client = s.get_or_create_client("Acme Retail".into()).await.unwrap();

  let inserted = s
    .bulk_add_stores(client.client_id, vec![
      BulkStoreRow {
        name:               "Chadstone".into(),
        state_abbreviation: "VIC".into(),
        lat:                Some(-37.886),
        lng:                Some(145.083),
      },
      BulkStoreRow {
        name:               "Chatswood".into(),
        state_abbreviation: "NSW".into(),
        lat:                None,
        lng:                None,
      },
    ])
    .await
    .unwrap();

  assert_eq!(inserted, 2);
  let stores = s.stores_for_client(client.client_id).await.unwrap();
  assert_eq!(stores.len(), 2);
  assert_eq!(stores[0].name, "Chadstone");
  assert_eq!(stores[0].state_name, "Victoria");
}

#[tokio::test]
async fn bulk_add_stores_rolls_back_on_one_bad_abbreviation() {
  let s = store().await;
  seed_states(&s).await;
  let client = s.get_or_create_client("Acme Retail".into()).await.unwrap();

  let rows = vec![
    BulkStoreRow {
      name:               "Store 1".into(),
      state_abbreviation: "VIC".into(),
      lat:                None,
      lng:                None,
    },
    BulkStoreRow {
      name:               "Store 2".into(),
      state_abbreviation: "NSW".into(),
      lat:                None,
      lng:                None,
    },
    BulkStoreRow {
      name:               "Store 3".into(),
      state_abbreviation: "XX".into(),
      lat:                None,
      lng:                None,
    },
    BulkStoreRow {
      name:               "Store 4".into(),
      state_abbreviation: "VIC".into(),
      lat:                None,
      lng:                None,
    },
    BulkStoreRow {
      name:               "Store 5".into(),
      state_abbreviation: "NSW".into(),
      lat:                None,
      lng:                None,
    },
  ];

  let err = s.bulk_add_stores(client.client_id, rows).await.unwrap_err();
  assert!(
    matches!(&err, Error::Core(CoreError::UnknownStateAbbreviation(abbr)) if abbr == "XX"),
    "got: {err}"
  );
  // The error message names the bad abbreviation for the operator.
  assert!(err.to_string().contains("XX"));

  // Zero rows persisted.
  assert!(s.stores_for_client(client.client_id).await.unwrap().is_empty());
}

// ─── Projects ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn add_project_persists_all_material_lines() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;

  let project_id = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Winter Launch", vec![
      material("Foam Board", 10.0, Some(5.0)),
      material("Self Adhesive Vinyl", 20.0, None),
    ]))
    .await
    .unwrap();

  let detail = s.get_project(project_id).await.unwrap().unwrap();
  assert_eq!(detail.project.job_id, "J-100");
  assert_eq!(detail.materials.len(), 2);
  assert_eq!(detail.materials[0].material_name, "Foam Board");
  assert_eq!(detail.materials[0].thickness_mm, Some(5.0));
  assert_eq!(detail.materials[1].thickness_mm, None);
}

#[tokio::test]
async fn add_project_with_out_of_range_thickness_persists_nothing() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;

  let err = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Winter Launch", vec![
      material("Self Adhesive Vinyl", 20.0, None),
      material("Foam Board", 10.0, Some(26.0)),
    ]))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Core(CoreError::InvalidThickness { ref material, thickness_mm })
      if material == "Foam Board" && thickness_mm == 26.0
  ));

  // Rollback verified by absence, not just the error response.
  assert!(s.list_projects().await.unwrap().is_empty());
  assert!(s.emission_records(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn add_project_rejects_fractional_thickness() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;

  let err = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Launch", vec![material(
      "Foam Board",
      10.0,
      Some(5.5),
    )]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidThickness { .. })));
}

#[tokio::test]
async fn add_project_requires_at_least_one_material() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;

  let err = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Launch", vec![]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::NoMaterials)));
}

#[tokio::test]
async fn add_project_rejects_non_positive_area() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;

  let err = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Launch", vec![material(
      "Foam Board",
      0.0,
      Some(5.0),
    )]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidArea { .. })));
}

#[tokio::test]
async fn duplicate_job_id_is_a_conflict_scoped_to_the_client() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  s.add_project(project(client.client_id, shop.store_id, "J-100", "Launch", vec![material(
    "Foam Board",
    10.0,
    Some(5.0),
  )]))
  .await
  .unwrap();

  let err = s
    .add_project(project(client.client_id, shop.store_id, "J-100", "Different Name", vec![
      material("Foam Board", 1.0, Some(5.0)),
    ]))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProjectConflict { .. })));
  assert_eq!(s.list_projects().await.unwrap().len(), 1);

  // Same job id under a different client is fine.
  let other = s.get_or_create_client("Budget Signs".into()).await.unwrap();
  let state = s.state_by_name("Victoria".into()).await.unwrap().unwrap();
  let other_shop = s
    .add_store(NewStore {
      client_id: other.client_id,
      state_id:  state.state_id,
      name:      "Doncaster".into(),
      address:   None,
      lat:       None,
      lng:       None,
    })
    .await
    .unwrap();
  s.add_project(project(other.client_id, other_shop.store_id, "J-100", "Launch", vec![
    material("Foam Board", 1.0, Some(5.0)),
  ]))
  .await
  .unwrap();
}

#[tokio::test]
async fn delete_project_removes_its_materials_from_the_read_model() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  let project_id = s
    .add_project(project(client.client_id, shop.store_id, "J-1", "Launch", vec![material(
      "Foam Board",
      10.0,
      Some(5.0),
    )]))
    .await
    .unwrap();

  s.delete_project(project_id).await.unwrap();
  assert!(s.get_project(project_id).await.unwrap().is_none());
  assert!(s.emission_records(None).await.unwrap().is_empty());

  let err = s.delete_project(project_id).await.unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::ProjectNotFound(_))));
}

// ─── Emission read model ─────────────────────────────────────────────────────

#[tokio::test]
async fn emission_records_join_store_state_and_materials() {
  let s = store().await;
  seed_factors(&s).await;
  let (client, shop) = client_with_store(&s).await;

  let mut new = project(client.client_id, shop.store_id, "J-1", "Winter Launch", vec![
    material("Foam Board", 10.0, Some(5.0)),
    material("Self Adhesive Vinyl", 20.0, None),
  ]);
  new.kwh_used = 100.0;
  new.freight_km = 50.0;
  s.add_project(new).await.unwrap();

  let records = s.emission_records(None).await.unwrap();
  assert_eq!(records.len(), 1);

  let record = &records[0];
  assert_eq!(record.project_name, "Winter Launch");
  assert_eq!(record.store_name, "Chadstone");
  assert_eq!(record.state_name, "Victoria");
  assert_eq!(record.lat, Some(-37.886));
  assert_eq!(record.materials.len(), 2);
  assert_eq!(record.kwh_used, 100.0);

  // The worked example: 50 (materials) + 60 + 50 (energy) + 5 (freight).
  let catalog = s.factor_catalog().await.unwrap();
  let total = inkfoot_core::calc::project_co2e(record, &catalog);
  assert_eq!(total, 165.0);
}

#[tokio::test]
async fn emission_records_can_push_the_tenant_scope_down() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  s.add_project(project(client.client_id, shop.store_id, "J-1", "Launch", vec![material(
    "Foam Board",
    10.0,
    Some(5.0),
  )]))
  .await
  .unwrap();

  let other = s.get_or_create_client("Budget Signs".into()).await.unwrap();

  assert_eq!(s.emission_records(None).await.unwrap().len(), 1);
  assert_eq!(
    s.emission_records(Some(client.client_id)).await.unwrap().len(),
    1
  );
  assert!(
    s.emission_records(Some(other.client_id))
      .await
      .unwrap()
      .is_empty()
  );
}

#[tokio::test]
async fn factor_catalog_upserts_one_row_per_material() {
  let s = store().await;
  seed_factors(&s).await;

  let catalog = s.factor_catalog().await.unwrap();
  assert_eq!(catalog.len(), 2);

  // Replacing a factor keeps one row per material.
  s.put_factor(EmissionFactor {
    material_name:     "Foam Board".into(),
    factor_type:       FactorType::PerKg,
    co2e_per_unit:     2.5,
    density_kg_per_m3: Some(480.0),
  })
  .await
  .unwrap();

  let catalog = s.factor_catalog().await.unwrap();
  assert_eq!(catalog.len(), 2);
  assert_eq!(catalog.get("Foam Board").unwrap().co2e_per_unit, 2.5);
}

#[tokio::test]
async fn filter_value_lists_are_distinct_and_sorted() {
  let s = store().await;
  let (client, shop) = client_with_store(&s).await;
  s.add_project(project(client.client_id, shop.store_id, "J-1", "Winter Launch", vec![
    material("Foam Board", 1.0, Some(5.0)),
  ]))
  .await
  .unwrap();
  s.add_project(project(client.client_id, shop.store_id, "J-2", "Autumn Launch", vec![
    material("Foam Board", 1.0, Some(5.0)),
  ]))
  .await
  .unwrap();

  assert_eq!(s.project_names(client.client_id).await.unwrap(), vec![
    "Autumn Launch".to_string(),
    "Winter Launch".to_string(),
  ]);
  assert_eq!(s.client_states(client.client_id).await.unwrap(), vec![
    "Victoria".to_string()
  ]);
}

// ─── Invites & users ─────────────────────────────────────────────────────────

#[tokio::test]
async fn invite_tokens_are_single_use() {
  let s = store().await;
  let invite = s
    .create_invite("Acme Retail".into(), Duration::hours(24))
    .await
    .unwrap();
  assert_eq!(invite.token.len(), 64);

  let user = s
    .register_user(NewUser {
      token:         invite.token.clone(),
      first_name:    "Ada".into(),
      last_name:     "Nguyen".into(),
      email:         "ada@acme.example".into(),
      password_hash: "$argon2id$fake".into(),
    })
    .await
    .unwrap();
  assert_eq!(user.client_id, invite.client_id);

  let err = s
    .register_user(NewUser {
      token:         invite.token,
      first_name:    "Eve".into(),
      last_name:     "Mallory".into(),
      email:         "eve@acme.example".into(),
      password_hash: "$argon2id$fake".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidRegistrationToken)));
}

#[tokio::test]
async fn expired_or_unknown_tokens_are_rejected() {
  let s = store().await;

  let err = s
    .register_user(NewUser {
      token:         "not-a-token".into(),
      first_name:    "Ada".into(),
      last_name:     "Nguyen".into(),
      email:         "ada@acme.example".into(),
      password_hash: "$argon2id$fake".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidRegistrationToken)));

  let expired = s
    .create_invite("Acme Retail".into(), Duration::hours(-1))
    .await
    .unwrap();
  let err = s
    .register_user(NewUser {
      token:         expired.token,
      first_name:    "Ada".into(),
      last_name:     "Nguyen".into(),
      email:         "ada@acme.example".into(),
      password_hash: "$argon2id$fake".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::InvalidRegistrationToken)));
}

#[tokio::test]
async fn duplicate_email_is_a_distinct_conflict() {
  let s = store().await;
  let invite = s
    .create_invite("Acme Retail".into(), Duration::hours(24))
    .await
    .unwrap();
  s.register_user(NewUser {
    token:         invite.token,
    first_name:    "Ada".into(),
    last_name:     "Nguyen".into(),
    email:         "ada@acme.example".into(),
    password_hash: "$argon2id$fake".into(),
  })
  .await
  .unwrap();

  let invite = s
    .create_invite("Budget Signs".into(), Duration::hours(24))
    .await
    .unwrap();
  let err = s
    .register_user(NewUser {
      token:         invite.token,
      first_name:    "Ada".into(),
      last_name:     "Again".into(),
      email:         "ada@acme.example".into(),
      password_hash: "$argon2id$fake".into(),
    })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(CoreError::EmailTaken(_))));
}

#[tokio::test]
async fn user_lookup_by_email_returns_the_stored_hash() {
  let s = store().await;
  let invite = s
    .create_invite("Acme Retail".into(), Duration::hours(24))
    .await
    .unwrap();
  s.register_user(NewUser {
    token:         invite.token,
    first_name:    "Ada".into(),
    last_name:     "Nguyen".into(),
    email:         "ada@acme.example".into(),
    password_hash: "$argon2id$v=19$m=19456,t=2,p=1$abc$def".into(),
  })
  .await
  .unwrap();

  let user = s
    .user_by_email("ada@acme.example".into())
    .await
    .unwrap()
    .unwrap();
  assert_eq!(user.first_name, "Ada");
  assert_eq!(user.password_hash, "$argon2id$v=19$m=19456,t=2,p=1$abc$def");

  assert!(
    s.user_by_email("nobody@acme.example".into())
      .await
      .unwrap()
      .is_none()
  );
}
