use std::path::Path;
use std::sync::Arc;

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info};

use super::{schema, Context, Scope, SettingsStore, StoreError};

/// SQLite-backed settings store.
///
/// Cheaply cloneable; the connection is shared behind `Arc<Mutex<_>>`.
#[derive(Clone)]
pub struct SqliteSettingsStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteSettingsStore {
    /// Open (or create) the database at `path` and apply migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::Unavailable(format!(
                        "cannot create settings directory '{}': {e}",
                        parent.display()
                    ))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        schema::run_migrations(&conn)?;
        info!(db = %path.display(), "settings store ready");

        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open a private in-memory database. Mostly useful in tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        schema::run_migrations(&conn)?;
        Ok(Self {
            db: Arc::new(Mutex::new(conn)),
        })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get(
        &self,
        context: &Context,
        scope: &Scope,
        key: &str,
    ) -> Result<Option<String>, StoreError> {
        let conn = self.db.lock();
        let value = conn
            .query_row(
                "SELECT value FROM settings WHERE context = ?1 AND scope = ?2 AND key = ?3",
                params![context.id(), scope.key(), key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(
        &self,
        context: &Context,
        scope: &Scope,
        key: &str,
        value: &str,
    ) -> Result<(), StoreError> {
        let conn = self.db.lock();
        conn.execute(
            "INSERT INTO settings (context, scope, key, value) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT (context, scope, key) DO UPDATE SET
                value = excluded.value,
                updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')",
            params![context.id(), scope.key(), key, value],
        )?;
        debug!(scope = %scope, key, "setting stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_key_reads_as_none() {
        let store = SqliteSettingsStore::open_in_memory().unwrap();
        let scope = Scope::global("webconferencing.jitsi");
        assert_eq!(store.get(&Context::Global, &scope, "jitsi-settings").unwrap(), None);
    }

    #[test]
    fn set_overwrites_previous_value() {
        let store = SqliteSettingsStore::open_in_memory().unwrap();
        let scope = Scope::global("webconferencing.jitsi");
        store.set(&Context::Global, &scope, "k", "one").unwrap();
        store.set(&Context::Global, &scope, "k", "two").unwrap();
        assert_eq!(
            store.get(&Context::Global, &scope, "k").unwrap().as_deref(),
            Some("two")
        );
    }

    #[test]
    fn scopes_do_not_collide() {
        let store = SqliteSettingsStore::open_in_memory().unwrap();
        let jitsi = Scope::global("webconferencing.jitsi");
        let other = Scope::global("webconferencing.other");
        store.set(&Context::Global, &jitsi, "k", "jitsi").unwrap();
        assert_eq!(store.get(&Context::Global, &other, "k").unwrap(), None);
        assert_eq!(
            store.get(&Context::Global, &jitsi, "k").unwrap().as_deref(),
            Some("jitsi")
        );
    }

    #[test]
    fn values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join("settings.db");
        let scope = Scope::global("webconferencing.jitsi");

        {
            let store = SqliteSettingsStore::open(&path).unwrap();
            store
                .set(&Context::Global, &scope, "jitsi-settings", r#"{"logEnabled":true}"#)
                .unwrap();
        }

        let store = SqliteSettingsStore::open(&path).unwrap();
        assert_eq!(
            store.get(&Context::Global, &scope, "jitsi-settings").unwrap().as_deref(),
            Some(r#"{"logEnabled":true}"#)
        );
    }
}
