use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Transaction, params};

use super::models::{Card, Column, ColumnRecord};
use crate::errors::{BoardError, BoardResult};

/// Async-safe handle to the board store.
///
/// Wraps `BoardStore` behind `Arc<Mutex>` and runs all access on tokio's
/// blocking thread pool via `spawn_blocking`, so synchronous SQLite I/O never
/// ties up async worker threads.
#[derive(Clone)]
pub struct DbHandle {
    inner: Arc<std::sync::Mutex<BoardStore>>,
}

impl DbHandle {
    pub fn new(store: BoardStore) -> Self {
        Self {
            inner: Arc::new(std::sync::Mutex::new(store)),
        }
    }

    /// Run a closure with access to the store on a blocking thread.
    /// All data passed into `f` must be owned (`'static`).
    pub async fn call<F, R>(&self, f: F) -> BoardResult<R>
    where
        F: FnOnce(&BoardStore) -> BoardResult<R> + Send + 'static,
        R: Send + 'static,
    {
        let store = self.inner.clone();
        tokio::task::spawn_blocking(move || {
            let guard = store.lock().map_err(|_| BoardError::LockPoisoned)?;
            f(&guard)
        })
        .await
        .map_err(|e| BoardError::Other(anyhow::anyhow!("store task panicked: {}", e)))?
    }
}

pub struct BoardStore {
    conn: Connection,
}

impl BoardStore {
    /// Open (or create) a SQLite database at the given path and run migrations.
    pub fn new(path: &Path) -> BoardResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open SQLite database {}", path.display()))?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    pub fn new_in_memory() -> BoardResult<Self> {
        let conn =
            Connection::open_in_memory().context("Failed to open in-memory SQLite database")?;
        let store = Self { conn };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> BoardResult<()> {
        self.conn
            .execute_batch("PRAGMA foreign_keys = ON;")
            .context("Failed to enable foreign keys")?;
        self.run_migrations().context("Failed to run migrations")?;
        Ok(())
    }

    fn run_migrations(&self) -> rusqlite::Result<()> {
        // No UNIQUE(column_id, position): range shifts update row by row and
        // pass through transient duplicates.
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS columns (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                position INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS cards (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL,
                column_id TEXT NOT NULL REFERENCES columns(id) ON DELETE CASCADE,
                position INTEGER NOT NULL DEFAULT 0,
                color TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_columns_position ON columns(position);
            CREATE INDEX IF NOT EXISTS idx_cards_column_position ON cards(column_id, position);
            ",
        )
    }

    /// Run `f` inside a single transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back and hands the error back
    /// when it returns `Err`. If `f` panics the transaction guard is dropped,
    /// which also rolls back.
    pub fn transaction<T, F>(&self, f: F) -> BoardResult<T>
    where
        F: FnOnce(&BoardTx<'_>) -> BoardResult<T>,
    {
        // Safety: DbHandle's Mutex already guarantees single-threaded access.
        let scoped = BoardTx {
            tx: self.conn.unchecked_transaction()?,
        };
        match f(&scoped) {
            Ok(value) => {
                scoped.tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                scoped.tx.rollback()?;
                Err(err)
            }
        }
    }

    /// Columns ascending by position, each with its cards ascending by position.
    pub fn list_columns_ordered(&self) -> BoardResult<Vec<Column>> {
        self.transaction(|tx| {
            let records = tx.list_columns()?;
            let mut cards_by_column: HashMap<String, Vec<Card>> = HashMap::new();
            for card in tx.list_all_cards()? {
                cards_by_column
                    .entry(card.column_id.clone())
                    .or_default()
                    .push(card);
            }
            Ok(records
                .into_iter()
                .map(|record| {
                    let cards = cards_by_column.remove(&record.id).unwrap_or_default();
                    Column::from_record(record, cards)
                })
                .collect())
        })
    }
}

/// Read/write access to columns and cards inside one open transaction.
pub struct BoardTx<'conn> {
    tx: Transaction<'conn>,
}

const CARD_COLUMNS: &str = "id, title, description, created_at, column_id, position, color";

impl BoardTx<'_> {
    // ── Columns ───────────────────────────────────────────────────────

    pub fn column(&self, id: &str) -> BoardResult<Option<ColumnRecord>> {
        let record = self
            .tx
            .query_row(
                "SELECT id, title, position FROM columns WHERE id = ?1",
                params![id],
                |row| {
                    Ok(ColumnRecord {
                        id: row.get(0)?,
                        title: row.get(1)?,
                        position: row.get(2)?,
                    })
                },
            )
            .optional()?;
        Ok(record)
    }

    pub fn require_column(&self, id: &str) -> BoardResult<ColumnRecord> {
        self.column(id)?
            .ok_or_else(|| BoardError::ColumnNotFound { id: id.to_string() })
    }

    pub fn list_columns(&self) -> BoardResult<Vec<ColumnRecord>> {
        let mut stmt = self
            .tx
            .prepare("SELECT id, title, position FROM columns ORDER BY position, id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ColumnRecord {
                id: row.get(0)?,
                title: row.get(1)?,
                position: row.get(2)?,
            })
        })?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn column_count(&self) -> BoardResult<i64> {
        Ok(self
            .tx
            .query_row("SELECT COUNT(*) FROM columns", [], |row| row.get(0))?)
    }

    pub fn max_column_position(&self) -> BoardResult<Option<i64>> {
        Ok(self
            .tx
            .query_row("SELECT MAX(position) FROM columns", [], |row| row.get(0))?)
    }

    pub fn insert_column(&self, id: &str, title: &str, position: i64) -> BoardResult<()> {
        self.tx.execute(
            "INSERT INTO columns (id, title, position) VALUES (?1, ?2, ?3)",
            params![id, title, position],
        )?;
        Ok(())
    }

    pub fn delete_column_row(&self, id: &str) -> BoardResult<usize> {
        Ok(self
            .tx
            .execute("DELETE FROM columns WHERE id = ?1", params![id])?)
    }

    pub fn update_column_title(&self, id: &str, title: &str) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE columns SET title = ?1 WHERE id = ?2",
            params![title, id],
        )?)
    }

    pub fn set_column_position(&self, id: &str, position: i64) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE columns SET position = ?1 WHERE id = ?2",
            params![position, id],
        )?)
    }

    /// Add `delta` to every column whose position lies in `[from, to]`
    /// (`to = None` means unbounded).
    pub fn shift_columns(&self, from: i64, to: Option<i64>, delta: i64) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE columns SET position = position + ?1 WHERE position >= ?2 AND position <= ?3",
            params![delta, from, to.unwrap_or(i64::MAX)],
        )?)
    }

    // ── Cards ─────────────────────────────────────────────────────────

    pub fn card(&self, id: &str) -> BoardResult<Option<Card>> {
        let row = self
            .tx
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
                params![id],
                CardRow::from_row,
            )
            .optional()?;
        row.map(CardRow::into_card).transpose()
    }

    pub fn require_card(&self, id: &str) -> BoardResult<Card> {
        self.card(id)?
            .ok_or_else(|| BoardError::CardNotFound { id: id.to_string() })
    }

    pub fn list_cards(&self, column_id: &str) -> BoardResult<Vec<Card>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards WHERE column_id = ?1 ORDER BY position, id"
        ))?;
        let rows = stmt.query_map(params![column_id], CardRow::from_row)?;
        rows.map(|row| -> BoardResult<Card> { row?.into_card() })
            .collect()
    }

    fn list_all_cards(&self) -> BoardResult<Vec<Card>> {
        let mut stmt = self.tx.prepare(&format!(
            "SELECT {CARD_COLUMNS} FROM cards ORDER BY column_id, position, id"
        ))?;
        let rows = stmt.query_map([], CardRow::from_row)?;
        rows.map(|row| -> BoardResult<Card> { row?.into_card() })
            .collect()
    }

    pub fn card_count(&self, column_id: &str) -> BoardResult<i64> {
        Ok(self.tx.query_row(
            "SELECT COUNT(*) FROM cards WHERE column_id = ?1",
            params![column_id],
            |row| row.get(0),
        )?)
    }

    pub fn max_card_position(&self, column_id: &str) -> BoardResult<Option<i64>> {
        Ok(self.tx.query_row(
            "SELECT MAX(position) FROM cards WHERE column_id = ?1",
            params![column_id],
            |row| row.get(0),
        )?)
    }

    pub fn insert_card(&self, card: &Card) -> BoardResult<()> {
        self.tx.execute(
            "INSERT INTO cards (id, title, description, created_at, column_id, position, color)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                card.id,
                card.title,
                card.description,
                format_timestamp(&card.created_at),
                card.column_id,
                card.position,
                card.color,
            ],
        )?;
        Ok(())
    }

    pub fn delete_card_row(&self, id: &str) -> BoardResult<usize> {
        Ok(self
            .tx
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?)
    }

    pub fn delete_cards_in_column(&self, column_id: &str) -> BoardResult<usize> {
        Ok(self
            .tx
            .execute("DELETE FROM cards WHERE column_id = ?1", params![column_id])?)
    }

    /// Overwrite title and description; `color = None` leaves the color as is.
    pub fn update_card_fields(
        &self,
        id: &str,
        title: &str,
        description: &str,
        color: Option<&str>,
    ) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE cards SET title = ?1, description = ?2, color = COALESCE(?3, color) WHERE id = ?4",
            params![title, description, color, id],
        )?)
    }

    /// Set the position of a card only if it lives in `column_id`.
    pub fn set_card_position(&self, id: &str, column_id: &str, position: i64) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE cards SET position = ?1 WHERE id = ?2 AND column_id = ?3",
            params![position, id, column_id],
        )?)
    }

    /// Put a card into `column_id` at `position`.
    pub fn set_card_placement(&self, id: &str, column_id: &str, position: i64) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE cards SET column_id = ?1, position = ?2 WHERE id = ?3",
            params![column_id, position, id],
        )?)
    }

    /// Add `delta` to every card of `column_id` whose position lies in
    /// `[from, to]` (`to = None` means unbounded).
    pub fn shift_cards(
        &self,
        column_id: &str,
        from: i64,
        to: Option<i64>,
        delta: i64,
    ) -> BoardResult<usize> {
        Ok(self.tx.execute(
            "UPDATE cards SET position = position + ?1
             WHERE column_id = ?2 AND position >= ?3 AND position <= ?4",
            params![delta, column_id, from, to.unwrap_or(i64::MAX)],
        )?)
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Intermediate row struct for reading cards before parsing the timestamp.
struct CardRow {
    id: String,
    title: String,
    description: String,
    created_at: String,
    column_id: String,
    position: i64,
    color: Option<String>,
}

impl CardRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            created_at: row.get(3)?,
            column_id: row.get(4)?,
            position: row.get(5)?,
            color: row.get(6)?,
        })
    }

    fn into_card(self) -> BoardResult<Card> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .with_context(|| format!("Failed to parse created_at of card {}", self.id))?
            .with_timezone(&Utc);
        Ok(Card {
            id: self.id,
            title: self.title,
            description: self.description,
            created_at,
            column_id: self.column_id,
            position: self.position,
            color: self.color,
        })
    }
}

// ── Tests ─────────────────────────────────────────────────────────────
