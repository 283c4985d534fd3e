use std::{
    env,
    path::PathBuf,
    sync::{LazyLock, Mutex},
};

use anyhow::{Result, bail};
use log::{error, info};
use rusqlite::{Connection, Params, Statement, types::Null};
use serde::{Serialize, de::DeserializeOwned};

use crate::models::*;

const SETTINGS: &str = "settings";

static CONNECTION: LazyLock<Mutex<Connection>> = LazyLock::new(|| {
    let path = database_path();
    let conn = Connection::open(&path)
        .inspect(|_| {
            info!(target: "database", "opened {}", path.display());
        })
        .unwrap_or_else(|err| {
            let path = path.display();
            error!(target: "database", "failed to open {path}, using in-memory database {err}");
            Connection::open_in_memory().expect("in-memory database always opens")
        });
    create_tables(&conn).expect("failed to create tables");
    Mutex::new(conn)
});

pub trait Identifiable {
    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);
}

#[macro_export]
macro_rules! impl_identifiable {
    ($type:ty) => {
        impl $crate::database::Identifiable for $type {
            fn id(&self) -> Option<i64> {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = Some(id);
            }
        }
    };
}

pub fn query_settings() -> Settings {
    let conn = CONNECTION.lock().unwrap();
    query_or_insert_settings(&conn)
}

pub fn upsert_settings(settings: &mut Settings) -> Result<()> {
    let conn = CONNECTION.lock().unwrap();
    upsert_to_table(&conn, SETTINGS, settings)
}

fn database_path() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("local.db")))
        .unwrap_or_else(|| PathBuf::from("local.db"))
}

fn create_tables(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        format!(
            r#"
            CREATE TABLE IF NOT EXISTS {SETTINGS} (
                id INTEGER PRIMARY KEY,
                data TEXT NOT NULL
            );
            "#
        )
        .as_str(),
    )?;
    Ok(())
}

fn query_or_insert_settings(conn: &Connection) -> Settings {
    let mut settings = query_from_table::<Settings>(conn, SETTINGS)
        .inspect_err(|err| {
            error!(target: "database", "failed to query settings {err}");
        })
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_default();
    if settings.id.is_none() {
        let _ = upsert_to_table(conn, SETTINGS, &mut settings).inspect_err(|err| {
            error!(target: "database", "failed to insert default settings {err}");
        });
    }
    settings
}

fn map_data<T>(mut stmt: Statement<'_>, params: impl Params) -> Result<Vec<T>>
where
    T: DeserializeOwned + Identifiable + Default,
{
    Ok(stmt
        .query_map::<T, _, _>(params, |row| {
            let id = row.get::<_, i64>(0)?;
            let data = row.get::<_, String>(1)?;
            let mut value = serde_json::from_str::<'_, T>(data.as_str()).unwrap_or_default();
            value.set_id(id);
            Ok(value)
        })?
        .filter_map(|c| c.ok())
        .collect::<Vec<_>>())
}

fn query_from_table<T>(conn: &Connection, table: &str) -> Result<Vec<T>>
where
    T: DeserializeOwned + Identifiable + Default,
{
    let stmt = format!("SELECT id, data FROM {table};");
    let stmt = conn.prepare(&stmt)?;
    map_data(stmt, [])
}

fn upsert_to_table<T>(conn: &Connection, table: &str, data: &mut T) -> Result<()>
where
    T: Serialize + Identifiable,
{
    let json = serde_json::to_string(&data)?;
    let stmt = format!(
        "INSERT INTO {table} (id, data) VALUES (?1, ?2) ON CONFLICT (id) DO UPDATE SET data = ?2;",
    );
    match data.id() {
        Some(id) => {
            if conn.execute(&stmt, (id, &json))? > 0 {
                Ok(())
            } else {
                bail!("no row was updated")
            }
        }
        None => {
            if conn.execute(&stmt, (Null, &json))? > 0 {
                data.set_id(conn.last_insert_rowid());
                Ok(())
            } else {
                bail!("no row was inserted")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        conn
    }

    #[test]
    fn query_inserts_default_settings_once() {
        let conn = connection();

        let first = query_or_insert_settings(&conn);
        let second = query_or_insert_settings(&conn);

        assert!(first.id.is_some());
        assert_eq!(first, second);
        assert_eq!(
            query_from_table::<Settings>(&conn, SETTINGS).unwrap().len(),
            1
        );
    }

    #[test]
    fn upsert_updates_existing_row() {
        let conn = connection();
        let mut settings = query_or_insert_settings(&conn);
        settings.controller_url = "http://drone.local:5077".to_string();
        settings.status_interval_millis = 1000;

        upsert_to_table(&conn, SETTINGS, &mut settings).unwrap();

        let stored = query_or_insert_settings(&conn);
        assert_eq!(stored, settings);
    }

    #[test]
    fn corrupted_row_falls_back_to_default() {
        let conn = connection();
        conn.execute(
            "INSERT INTO settings (id, data) VALUES (7, 'not json');",
            [],
        )
        .unwrap();

        let settings = query_or_insert_settings(&conn);

        assert_eq!(settings.id, Some(7));
        assert_eq!(settings.controller_url, Settings::default().controller_url);
    }
}
