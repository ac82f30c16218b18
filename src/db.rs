use std::path::Path;

use rusqlite::Connection;
use serde_json::Value;
use tracing::warn;

use crate::error::Result;
use crate::store::{Document, DocumentStore, TitleQuery};

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS texts (
            id         INTEGER PRIMARY KEY,
            title      TEXT NOT NULL,
            language   TEXT NOT NULL,
            chapter    TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_texts_language ON texts(language);
        CREATE INDEX IF NOT EXISTS idx_texts_title ON texts(title);
        ",
    )?;
    Ok(())
}

// ── Import ──

pub fn insert_documents(conn: &Connection, docs: &[Document]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    let mut count = 0;
    {
        let mut stmt =
            tx.prepare("INSERT INTO texts (title, language, chapter) VALUES (?1, ?2, ?3)")?;
        for d in docs {
            let chapter = serde_json::to_string(&d.chapter)?;
            count += stmt.execute(rusqlite::params![d.title, d.language, chapter])?;
        }
    }
    tx.commit()?;
    Ok(count)
}

// ── Query ──

/// SQLite-backed document store.
///
/// Language and the `" on "` separator are filtered in SQL; the tractate
/// alternation runs as a regex on the candidate titles.
pub struct SqliteStore<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteStore<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteStore { conn }
    }
}

impl DocumentStore for SqliteStore<'_> {
    fn find(&self, query: &TitleQuery) -> Result<Vec<Document>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, language, chapter
             FROM texts
             WHERE language = ?1 AND title LIKE '% on %'
             ORDER BY id",
        )?;
        let rows = stmt
            .query_map([query.language()], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let docs = rows
            .into_iter()
            .filter(|(_, title, _, _)| query.matches_title(title))
            .map(|(id, title, language, raw)| {
                let chapter = serde_json::from_str(&raw).unwrap_or_else(|e| {
                    warn!("Unreadable chapter for '{}' (id {}): {}", title, id, e);
                    Value::Null
                });
                Document {
                    id: Some(id),
                    title,
                    language,
                    chapter,
                }
            })
            .collect();
        Ok(docs)
    }
}

// ── Stats ──

pub struct Stats {
    pub total: usize,
    pub in_language: usize,
    pub candidates: usize,
}

pub fn get_stats(conn: &Connection, language: &str) -> Result<Stats> {
    let total: usize = conn.query_row("SELECT COUNT(*) FROM texts", [], |r| r.get(0))?;
    let in_language: usize = conn.query_row(
        "SELECT COUNT(*) FROM texts WHERE language = ?1",
        [language],
        |r| r.get(0),
    )?;
    let candidates: usize = conn.query_row(
        "SELECT COUNT(*) FROM texts WHERE language = ?1 AND title LIKE '% on %'",
        [language],
        |r| r.get(0),
    )?;
    Ok(Stats {
        total,
        in_language,
        candidates,
    })
}
