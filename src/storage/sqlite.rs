//! SQLite record store

use std::path::{Path, PathBuf};

use rusqlite::{named_params, params_from_iter, Connection, OptionalExtension};
use serde::Serialize;

use super::schema;
use super::value::{Row, Value};
use crate::appointment::{self, Appointment, AppointmentFields};
use crate::{Error, Result};

/// Lifecycle of a [`RecordStore`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreState {
    /// Before `initialize`; every query fails with `NotInitialized`
    Closed,
    Open,
}

/// Owns the single connection to the appointments database.
///
/// Every mutating call runs in SQLite's autocommit mode, so it is durable as
/// soon as it returns. A failed statement leaves the connection usable.
#[derive(Default)]
pub struct RecordStore {
    conn: Option<Connection>,
    path: Option<PathBuf>,
}

impl RecordStore {
    /// A closed store. Call [`RecordStore::initialize`] before querying.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let mut store = Self::new();
        store.initialize(path)?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let path = PathBuf::from(":memory:");
        let conn = Connection::open_in_memory().map_err(|source| Error::StorageUnavailable {
            path: path.clone(),
            source,
        })?;
        Self::apply_schema(&conn, &path)?;
        Ok(Self {
            conn: Some(conn),
            path: Some(path),
        })
    }

    /// Open (or create) the database at `path` and ensure the `citas` table
    /// exists. Safe to call repeatedly; existing rows are never touched.
    pub fn initialize(&mut self, path: &Path) -> Result<()> {
        let conn = Connection::open(path).map_err(|source| Error::StorageUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::apply_schema(&conn, path)?;
        tracing::debug!(path = %path.display(), "record store open");

        self.conn = Some(conn);
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn apply_schema(conn: &Connection, path: &Path) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, [])
                .map_err(|source| Error::StorageUnavailable {
                    path: path.to_path_buf(),
                    source,
                })?;
        }
        Ok(())
    }

    pub fn state(&self) -> StoreState {
        if self.conn.is_some() {
            StoreState::Open
        } else {
            StoreState::Closed
        }
    }

    /// Path of the open database, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn conn(&self) -> Result<&Connection> {
        self.conn.as_ref().ok_or(Error::NotInitialized)
    }

    // ========== Raw Query Interface ==========

    /// Run one parameterized statement.
    ///
    /// Returns every produced row in order (empty for statements that produce
    /// none). Positional parameters (`?`, `?N`) bind from `params` in order.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<Vec<Row>> {
        let conn = self.conn()?;
        tracing::debug!(sql = sql.trim(), params = params.len(), "execute");

        let mut stmt = conn.prepare(sql)?;
        let columns = stmt.column_count();
        let mut rows = stmt.query(params_from_iter(params.iter()))?;

        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let mut values = Vec::with_capacity(columns);
            for idx in 0..columns {
                values.push(Value::from(row.get_ref(idx)?));
            }
            result.push(values);
        }
        Ok(result)
    }

    /// Every row of the `citas` table, in storage order
    pub fn fetch_all(&self) -> Result<Vec<Row>> {
        self.execute(schema::SELECT_ALL, &[])
    }

    /// Rows whose client name contains `substring`.
    ///
    /// Uses SQLite `LIKE`: ASCII letters compare case-insensitively, other
    /// letters compare exactly.
    pub fn search_by_name(&self, substring: &str) -> Result<Vec<Row>> {
        let sql = format!("{} {}", schema::SELECT_ALL, schema::WHERE_NAME_CONTAINS);
        self.execute(&sql, &[Value::Text(contains_pattern(substring))])
    }

    // ========== Appointment Operations ==========

    /// Insert an appointment, returning its new id
    pub fn insert(&self, fields: &AppointmentFields) -> Result<i64> {
        let conn = self.conn()?;
        let date = fields.date_string();
        conn.execute(
            schema::INSERT_CITA,
            named_params! {
                ":nombre_cliente": fields.client_name,
                ":servicio": fields.service.as_str(),
                ":fecha": date,
                ":hora": fields.time,
                ":estado": fields.status.as_str(),
            },
        )?;
        let id = conn.last_insert_rowid();
        tracing::debug!(id, "inserted appointment");
        Ok(id)
    }

    /// Replace all five fields of appointment `id`. Returns false if no such row.
    pub fn update(&self, id: i64, fields: &AppointmentFields) -> Result<bool> {
        let conn = self.conn()?;
        let date = fields.date_string();
        let changed = conn.execute(
            schema::UPDATE_CITA,
            named_params! {
                ":nombre_cliente": fields.client_name,
                ":servicio": fields.service.as_str(),
                ":fecha": date,
                ":hora": fields.time,
                ":estado": fields.status.as_str(),
                ":id": id,
            },
        )?;
        Ok(changed > 0)
    }

    /// Delete appointment `id`. Returns false if no such row.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self.conn()?.execute(schema::DELETE_CITA, [id])?;
        Ok(changed > 0)
    }

    /// Get an appointment by id
    pub fn get(&self, id: i64) -> Result<Option<Appointment>> {
        let sql = format!("{} WHERE {} = ?1", schema::SELECT_COLUMNS, schema::COL_ID);
        self.conn()?
            .query_row(&sql, [id], row_to_appointment)
            .optional()
            .map_err(Into::into)
    }

    /// All appointments, ordered by id
    pub fn list(&self) -> Result<Vec<Appointment>> {
        let sql = format!("{} ORDER BY {}", schema::SELECT_COLUMNS, schema::COL_ID);
        let mut stmt = self.conn()?.prepare(&sql)?;
        let appointments = stmt
            .query_map([], row_to_appointment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(appointments)
    }

    /// Appointments whose client name contains `substring`, ordered by id
    pub fn search(&self, substring: &str) -> Result<Vec<Appointment>> {
        let sql = format!(
            "{} {} ORDER BY {}",
            schema::SELECT_COLUMNS,
            schema::WHERE_NAME_CONTAINS,
            schema::COL_ID
        );
        let mut stmt = self.conn()?.prepare(&sql)?;
        let appointments = stmt
            .query_map([contains_pattern(substring)], row_to_appointment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(appointments)
    }

    /// Totals per status
    pub fn stats(&self) -> Result<StoreStats> {
        let mut stmt = self.conn()?.prepare(
            "SELECT COALESCE(estado, ''), COUNT(*) FROM citas GROUP BY estado ORDER BY estado",
        )?;
        let by_status = stmt
            .query_map([], |row| {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((status, count as usize))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(StoreStats {
            total: by_status.iter().map(|(_, n)| n).sum(),
            by_status,
        })
    }
}

/// `%substring%` with LIKE wildcards escaped
fn contains_pattern(substring: &str) -> String {
    let mut pattern = String::with_capacity(substring.len() + 2);
    pattern.push('%');
    for c in substring.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Helper to convert a row (columns as in `SELECT_COLUMNS`) to an Appointment
fn row_to_appointment(row: &rusqlite::Row) -> rusqlite::Result<Appointment> {
    let date_str: String = row.get(3)?;
    let date = appointment::parse_date(&date_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(Appointment {
        id: row.get(0)?,
        fields: AppointmentFields {
            client_name: row.get(1)?,
            service: row.get::<_, String>(2)?.into(),
            date,
            time: row.get(4)?,
            status: row.get::<_, String>(5)?.into(),
        },
    })
}

/// Appointment totals
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub total: usize,
    pub by_status: Vec<(String, usize)>,
}

impl std::fmt::Display for StoreStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Appointments: {}", self.total)?;
        for (status, count) in &self.by_status {
            writeln!(f, "  {}: {}", status, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::appointment::{Service, Status};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn ana() -> AppointmentFields {
        AppointmentFields::new(
            "Ana García",
            Service::Manicura,
            NaiveDate::from_ymd_opt(2024, 5, 24).unwrap(),
            "10:00 am",
            Status::Pendiente,
        )
    }

    fn juan() -> AppointmentFields {
        AppointmentFields::new(
            "Juan Pérez",
            Service::Pedicura,
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            "4:00 pm",
            Status::Confirmada,
        )
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn names(rows: &[Row]) -> Vec<String> {
        rows.iter().map(|r| r[1].to_string()).collect()
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("citas.db");

        let mut store = RecordStore::open(&path).unwrap();
        store.insert(&ana()).unwrap();

        store.initialize(&path).unwrap();
        assert_eq!(store.fetch_all().unwrap().len(), 1);

        let reopened = RecordStore::open(&path).unwrap();
        assert_eq!(reopened.fetch_all().unwrap().len(), 1);
    }

    #[test]
    fn test_round_trip_raw_insert() {
        let store = RecordStore::open_in_memory().unwrap();
        let rows = store
            .execute(
                "INSERT INTO citas (nombre_cliente, servicio, fecha, hora, estado) VALUES (?, ?, ?, ?, ?)",
                &[text("Ana García"), text("Manicura"), text("24/05/2024"), text("10:00 am"), text("Pendiente")],
            )
            .unwrap();
        assert!(rows.is_empty());

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        let row = &all[0];
        assert_eq!(row.len(), 6);
        assert!(row[0].as_i64().unwrap() >= 1);
        assert_eq!(
            &row[1..],
            &[text("Ana García"), text("Manicura"), text("24/05/2024"), text("10:00 am"), text("Pendiente")]
        );
    }

    #[test]
    fn test_typed_insert_matches_raw_columns() {
        let store = RecordStore::open_in_memory().unwrap();
        let id = store.insert(&ana()).unwrap();
        assert!(id >= 1);

        let all = store.fetch_all().unwrap();
        assert_eq!(all[0][0], Value::Integer(id));
        assert_eq!(all[0][3], text("24/05/2024"));

        let appt = store.get(id).unwrap().unwrap();
        assert_eq!(appt.fields, ana());
    }

    #[test]
    fn test_update_by_id() {
        let store = RecordStore::open_in_memory().unwrap();
        let n = store.insert(&ana()).unwrap();
        let m = store.insert(&juan()).unwrap();

        let mut changed = ana();
        changed.status = Status::Confirmada;
        assert!(store.update(n, &changed).unwrap());

        let all = store.list().unwrap();
        assert_eq!(all.len(), 2);
        let updated = all.iter().find(|a| a.id == n).unwrap();
        assert_eq!(updated.fields.status, Status::Confirmada);
        assert_eq!(updated.fields.client_name, "Ana García");
        assert_eq!(updated.fields.service, Service::Manicura);
        assert_eq!(updated.fields.time, "10:00 am");
        assert_eq!(store.get(m).unwrap().unwrap().fields, juan());
    }

    #[test]
    fn test_update_missing_id() {
        let store = RecordStore::open_in_memory().unwrap();
        assert!(!store.update(99, &ana()).unwrap());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn test_delete_removes_exactly_one() {
        let store = RecordStore::open_in_memory().unwrap();
        let n = store.insert(&ana()).unwrap();
        let m = store.insert(&juan()).unwrap();

        assert!(store.delete(n).unwrap());
        let ids: Vec<i64> = store.list().unwrap().iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![m]);

        assert!(!store.delete(n).unwrap());
    }

    #[test]
    fn test_search_case_behaviour() {
        let store = RecordStore::open_in_memory().unwrap();
        store.insert(&ana()).unwrap();
        store.insert(&juan()).unwrap();

        // ASCII letters ignore case: "an" is in "Juan" and "Ana"
        assert_eq!(names(&store.search_by_name("an").unwrap()), vec!["Ana García", "Juan Pérez"]);
        assert_eq!(names(&store.search_by_name("AN").unwrap()), vec!["Ana García", "Juan Pérez"]);
        assert_eq!(names(&store.search_by_name("Pér").unwrap()), vec!["Juan Pérez"]);

        // Non-ASCII letters are compared exactly
        assert!(store.search_by_name("GARCÍA").unwrap().is_empty());
        assert_eq!(names(&store.search_by_name("garcía").unwrap()), vec!["Ana García"]);

        assert!(store.search_by_name("Luis").unwrap().is_empty());
    }

    #[test]
    fn test_search_wildcards_are_literal() {
        let store = RecordStore::open_in_memory().unwrap();
        store.insert(&ana()).unwrap();
        let mut odd = juan();
        odd.client_name = "50% Off_Client".to_string();
        store.insert(&odd).unwrap();

        assert_eq!(names(&store.search_by_name("%").unwrap()), vec!["50% Off_Client"]);
        assert_eq!(names(&store.search_by_name("_").unwrap()), vec!["50% Off_Client"]);
        assert_eq!(store.search("a_a").unwrap().len(), 0);
        assert_eq!(store.search("garc").unwrap()[0].fields, ana());
    }

    #[test]
    fn test_query_error_keeps_connection_usable() {
        let store = RecordStore::open_in_memory().unwrap();
        store.insert(&ana()).unwrap();
        let before = store.fetch_all().unwrap();

        let err = store
            .execute("DELETE FROM citas WHERE id = ?", &[Value::Integer(1), Value::Integer(2)])
            .unwrap_err();
        assert!(matches!(err, Error::Query(_)));

        let err = store.execute("SELEC nonsense", &[]).unwrap_err();
        assert!(matches!(err, Error::Query(_)));

        assert_eq!(store.fetch_all().unwrap(), before);
    }

    #[test]
    fn test_uninitialized_access() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("never.db");

        let store = RecordStore::new();
        assert_eq!(store.state(), StoreState::Closed);
        assert!(matches!(store.execute("SELECT 1", &[]), Err(Error::NotInitialized)));
        assert!(matches!(store.fetch_all(), Err(Error::NotInitialized)));
        assert!(matches!(store.search_by_name("a"), Err(Error::NotInitialized)));
        assert!(matches!(store.insert(&ana()), Err(Error::NotInitialized)));
        assert!(!path.exists());
    }

    #[test]
    fn test_storage_unavailable() {
        let dir = TempDir::new().unwrap();

        let missing_parent = dir.path().join("no").join("such").join("citas.db");
        let err = RecordStore::open(&missing_parent).err().unwrap();
        assert!(matches!(err, Error::StorageUnavailable { .. }));

        let garbage = dir.path().join("garbage.db");
        std::fs::write(&garbage, "not a database ".repeat(100)).unwrap();
        let mut store = RecordStore::new();
        let err = store.initialize(&garbage).unwrap_err();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert_eq!(store.state(), StoreState::Closed);
    }

    #[test]
    fn test_unparseable_date_surfaces_as_error() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .execute(
                "INSERT INTO citas (nombre_cliente, servicio, fecha, hora, estado) VALUES (?1, ?2, ?3, ?4, ?5)",
                &[text("Eva"), text("Manicura"), text("mañana"), text("9:00 am"), text("Pendiente")],
            )
            .unwrap();

        assert_eq!(store.fetch_all().unwrap().len(), 1);
        assert!(matches!(store.list(), Err(Error::Query(_))));
    }

    #[test]
    fn test_numeric_looking_time_reads_back_as_text() {
        let store = RecordStore::open_in_memory().unwrap();
        let mut ten = ana();
        ten.time = "10".to_string();
        let mut half = juan();
        half.time = "9.5".to_string();
        let n = store.insert(&ten).unwrap();
        let m = store.insert(&half).unwrap();

        // NUMERIC affinity stores these as numbers
        let raw = store.fetch_all().unwrap();
        assert_eq!(raw[0][4], Value::Integer(10));
        assert_eq!(raw[1][4], Value::Real(9.5));

        assert_eq!(store.get(n).unwrap().unwrap().fields, ten);
        assert_eq!(store.get(m).unwrap().unwrap().fields.time, "9.5");
        let times: Vec<String> = store.list().unwrap().into_iter().map(|a| a.fields.time).collect();
        assert_eq!(times, vec!["10", "9.5"]);
        assert_eq!(store.search("ana").unwrap()[0].fields.time, "10");

        let mut confirmed = ten.clone();
        confirmed.status = Status::Confirmada;
        assert!(store.update(n, &confirmed).unwrap());
        assert_eq!(store.get(n).unwrap().unwrap().fields, confirmed);
    }

    #[test]
    fn test_stored_text_is_not_normalized() {
        let store = RecordStore::open_in_memory().unwrap();
        store
            .execute(
                "INSERT INTO citas (nombre_cliente, servicio, fecha, hora, estado) VALUES (?1, ?2, ?3, ?4, ?5)",
                &[text("Eva"), text(" manicura"), text("24/05/2024"), text("9:00 am"), text("pendiente")],
            )
            .unwrap();

        let stored = store.get(1).unwrap().unwrap().fields;
        assert_eq!(stored.service, Service::Other(" manicura".into()));
        assert_eq!(stored.status, Status::Other("pendiente".into()));

        let changes = crate::appointment::FieldChanges {
            time: Some("11:00 am".to_string()),
            ..Default::default()
        };
        assert!(store.update(1, &stored.apply(&changes).unwrap()).unwrap());
        let row = &store.fetch_all().unwrap()[0];
        assert_eq!(row[2], text(" manicura"));
        assert_eq!(row[4], text("11:00 am"));
        assert_eq!(row[5], text("pendiente"));
    }

    #[test]
    fn test_path_follows_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("citas.db");

        let mut store = RecordStore::new();
        assert!(store.path().is_none());
        store.initialize(&path).unwrap();
        assert_eq!(store.state(), StoreState::Open);
        assert_eq!(store.path(), Some(path.as_path()));
    }

    #[test]
    fn test_stats() {
        let store = RecordStore::open_in_memory().unwrap();
        store.insert(&ana()).unwrap();
        store.insert(&ana()).unwrap();
        store.insert(&juan()).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(
            stats.by_status,
            vec![("Confirmada".to_string(), 1), ("Pendiente".to_string(), 2)]
        );
    }
}
