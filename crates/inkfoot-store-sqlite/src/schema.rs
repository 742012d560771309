//! SQL schema for the inkfoot SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS clients (
    client_id  INTEGER PRIMARY KEY,
    name       TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS users (
    user_id       INTEGER PRIMARY KEY,
    client_id     INTEGER NOT NULL REFERENCES clients(client_id),
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    email         TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,   -- argon2 PHC string; plaintext never stored
    created_at    TEXT NOT NULL    -- ISO 8601 UTC
);

-- Single-use, expiring registration invites.
CREATE TABLE IF NOT EXISTS registration_tokens (
    token      TEXT PRIMARY KEY,
    client_id  INTEGER NOT NULL REFERENCES clients(client_id),
    expires_at TEXT NOT NULL,
    is_used    INTEGER NOT NULL DEFAULT 0
);

-- Reference table; looked up by name (geocoder results) and by
-- abbreviation (bulk import rows).
CREATE TABLE IF NOT EXISTS states (
    state_id     INTEGER PRIMARY KEY,
    name         TEXT NOT NULL UNIQUE,
    abbreviation TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS stores (
    store_id  INTEGER PRIMARY KEY,
    client_id INTEGER NOT NULL REFERENCES clients(client_id),
    state_id  INTEGER NOT NULL REFERENCES states(state_id),
    name      TEXT NOT NULL,
    address   TEXT,
    lat       REAL,               -- NULL when geocoding was skipped
    lng       REAL
);

CREATE TABLE IF NOT EXISTS projects (
    project_id   INTEGER PRIMARY KEY,
    client_id    INTEGER NOT NULL REFERENCES clients(client_id),
    store_id     INTEGER NOT NULL REFERENCES stores(store_id),
    job_id       TEXT NOT NULL,
    name         TEXT NOT NULL,
    project_date TEXT NOT NULL,   -- YYYY-MM-DD
    kwh_used     REAL NOT NULL DEFAULT 0,
    freight_km   REAL NOT NULL DEFAULT 0,
    UNIQUE (client_id, job_id),
    UNIQUE (client_id, name)
);

-- A project always owns at least one row here; both are written in the same
-- transaction.
CREATE TABLE IF NOT EXISTS project_materials (
    material_id   INTEGER PRIMARY KEY,
    project_id    INTEGER NOT NULL REFERENCES projects(project_id) ON DELETE CASCADE,
    material_name TEXT NOT NULL,
    material_sqm  REAL NOT NULL,
    thickness_mm  REAL             -- whole millimetres in [1, 25] when present
);

-- Exactly one factor per material name.
CREATE TABLE IF NOT EXISTS emission_factors (
    material_name     TEXT PRIMARY KEY,
    factor_type       TEXT NOT NULL,  -- 'PER_SQM' | 'PER_KG'
    co2e_per_unit     REAL NOT NULL,
    density_kg_per_m3 REAL            -- required by PER_KG only
);

CREATE INDEX IF NOT EXISTS projects_client_idx  ON projects(client_id);
CREATE INDEX IF NOT EXISTS projects_store_idx   ON projects(store_id);
CREATE INDEX IF NOT EXISTS materials_project_idx ON project_materials(project_id);
CREATE INDEX IF NOT EXISTS stores_client_idx    ON stores(client_id);
CREATE INDEX IF NOT EXISTS users_client_idx     ON users(client_id);

PRAGMA user_version = 1;
";
