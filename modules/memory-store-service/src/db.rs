//! SQLite storage for memory records.

use chrono::{SecondsFormat, Utc};
use memory_store_types::{MemoryRecord, decode_tags, encode_tags};
use rusqlite::Connection;
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("memory {0} not found")]
    NotFound(i64),
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Filters for [`Db::list`]. Only `user_id` is mandatory.
#[derive(Debug, Clone)]
pub struct ListFilter<'a> {
    pub user_id: &'a str,
    pub key: Option<&'a str>,
    pub tag: Option<&'a str>,
    pub limit: u32,
}

pub struct Db {
    conn: Mutex<Connection>,
}

impl Db {
    pub fn open(path: &str) -> StoreResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.create_tables()?;
        Ok(db)
    }

    /// Exclusive access to the connection for the duration of one operation.
    ///
    /// A panic while holding the guard leaves any open transaction to be
    /// rolled back on drop, so a poisoned lock still guards a usable
    /// connection.
    fn session(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn create_tables(&self) -> StoreResult<()> {
        let conn = self.session();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS memory_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL,
                key TEXT NOT NULL,
                value TEXT NOT NULL,
                tags TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memory_user ON memory_items(user_id)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memory_user_key ON memory_items(user_id, key)",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_memory_user_time
             ON memory_items(user_id, created_at DESC, id DESC)",
            [],
        )?;
        Ok(())
    }

    /// Store a new memory. Required fields are assumed already validated.
    pub fn insert(
        &self,
        user_id: &str,
        key: &str,
        value: &str,
        tags: Option<&[String]>,
    ) -> StoreResult<MemoryRecord> {
        let mut conn = self.session();
        let stored_tags = encode_tags(tags);
        let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO memory_items (user_id, key, value, tags, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![user_id, key, value, stored_tags, created_at],
        )?;
        let id = tx.last_insert_rowid();
        tx.commit()?;

        log::debug!("Stored memory {} for user {} (key {})", id, user_id, key);

        Ok(MemoryRecord {
            id,
            user_id: user_id.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            tags: decode_tags(stored_tags.as_deref()),
            created_at,
        })
    }

    /// Newest-first listing for one user.
    ///
    /// `tag` is a literal substring match on the stored comma-joined column,
    /// so it can match part of a tag or span two adjacent tags.
    pub fn list(&self, filter: &ListFilter<'_>) -> StoreResult<Vec<MemoryRecord>> {
        if filter.limit == 0 {
            return Ok(Vec::new());
        }

        let conn = self.session();

        let mut conditions = vec!["user_id = ?1".to_string()];
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![Box::new(filter.user_id.to_string())];
        let mut param_idx = 2;

        if let Some(key) = filter.key {
            conditions.push(format!("key = ?{}", param_idx));
            params.push(Box::new(key.to_string()));
            param_idx += 1;
        }
        if let Some(tag) = filter.tag {
            conditions.push(format!("instr(tags, ?{}) > 0", param_idx));
            params.push(Box::new(tag.to_string()));
            param_idx += 1;
        }
        params.push(Box::new(i64::from(filter.limit)));

        let sql = format!(
            "SELECT id, user_id, key, value, tags, created_at
             FROM memory_items
             WHERE {}
             ORDER BY created_at DESC, id DESC
             LIMIT ?{}",
            conditions.join(" AND "),
            param_idx
        );

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params_ref.as_slice(), row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// Hard-delete a memory by id.
    pub fn delete(&self, id: i64) -> StoreResult<i64> {
        let conn = self.session();
        let rows_affected = conn.execute("DELETE FROM memory_items WHERE id = ?1", [id])?;
        if rows_affected == 0 {
            return Err(StoreError::NotFound(id));
        }
        log::debug!("Deleted memory {}", id);
        Ok(id)
    }

    pub fn count(&self) -> StoreResult<i64> {
        let conn = self.session();
        let total = conn.query_row("SELECT COUNT(*) FROM memory_items", [], |r| r.get(0))?;
        Ok(total)
    }
}

fn row_to_record(row: &rusqlite::Row) -> rusqlite::Result<MemoryRecord> {
    let tags: Option<String> = row.get(4)?;
    Ok(MemoryRecord {
        id: row.get(0)?,
        user_id: row.get(1)?,
        key: row.get(2)?,
        value: row.get(3)?,
        tags: decode_tags(tags.as_deref()),
        created_at: row.get(5)?,
    })
}
