//! FTS5-based search index using SQLite full-text search

use super::query_string::to_match_expression;
use super::search_index::{SearchContext, SearchHits, SearchIndex, SearchIndexError};
use crate::car_details::{self, CarDetails};
use rusqlite::{params, Connection, OptionalExtension, Transaction};
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;
use tracing::{debug, info};

const SCHEMA_VERSION: i64 = 1;

/// `user_version` of a file whose tables exist but were never fully populated.
const UNPOPULATED_VERSION: i64 = 0;

/// VM instructions between two cancellation checks while a query runs.
const PROGRESS_HANDLER_OPS: i32 = 1_000;

const SCHEMA_SQL: &str = r#"
    CREATE TABLE car_documents (
        id INTEGER PRIMARY KEY,
        car_id TEXT NOT NULL UNIQUE,
        document TEXT NOT NULL
    );
    CREATE VIRTUAL TABLE car_search USING fts5(
        name,
        brand,
        author,
        class,
        country,
        description,
        tags,
        specs,
        year,
        version,
        url,
        download_url,
        notes,
        tokenize = 'unicode61 remove_diacritics 2'
    );
"#;

const INSERT_SEARCH_ROW_SQL: &str = r#"
    INSERT INTO car_search (
        rowid, name, brand, author, class, country, description,
        tags, specs, year, version, url, download_url, notes
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
"#;

/// Whether [`Fts5SearchIndex::open_or_create`] found a usable index on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStatus {
    Existing,
    /// The index is new (or was reset) and holds no documents.
    Created,
}

/// Car search index stored in a single SQLite database.
pub struct Fts5SearchIndex {
    conn: Mutex<Connection>,
    path: PathBuf,
}

fn schema_is_current(conn: &Connection) -> Result<bool, rusqlite::Error> {
    let version: i64 = conn.query_row("PRAGMA user_version", [], |r| r.get(0))?;
    let table_count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('car_documents', 'car_search')",
        [],
        |r| r.get(0),
    )?;
    Ok(version == SCHEMA_VERSION && table_count == 2)
}

fn reset_schema(conn: &mut Connection) -> Result<(), rusqlite::Error> {
    let tx = conn.transaction()?;
    tx.execute_batch(
        r#"
        DROP TABLE IF EXISTS car_search;
        DROP TABLE IF EXISTS car_documents;
    "#,
    )?;
    tx.execute_batch(SCHEMA_SQL)?;
    // Marked current by the first replace_all
    tx.pragma_update(None, "user_version", UNPOPULATED_VERSION)?;
    tx.commit()
}

fn to_sql_int(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn insert_document(
    tx: &Transaction,
    rowid: Option<i64>,
    car_id: &str,
    details: &CarDetails,
) -> Result<(), SearchIndexError> {
    let document = String::from_utf8_lossy(&car_details::serialize(details)?).into_owned();

    let rowid = match rowid {
        Some(rowid) => {
            tx.execute(
                "UPDATE car_documents SET document = ?2 WHERE id = ?1",
                params![rowid, document],
            )?;
            tx.execute("DELETE FROM car_search WHERE rowid = ?1", params![rowid])?;
            rowid
        }
        None => {
            tx.execute(
                "INSERT INTO car_documents (car_id, document) VALUES (?1, ?2)",
                params![car_id, document],
            )?;
            tx.last_insert_rowid()
        }
    };

    let year = if details.year == 0 {
        String::new()
    } else {
        details.year.to_string()
    };
    tx.execute(
        INSERT_SEARCH_ROW_SQL,
        params![
            rowid,
            details.name,
            details.brand,
            details.author,
            details.class,
            details.country,
            details.description,
            details.tags().join(" "),
            details.specs().joined(),
            year,
            details.version,
            details.url,
            details.download_url,
            details.notes,
        ],
    )?;
    Ok(())
}

fn find_rowid(conn: &Connection, car_id: &str) -> Result<Option<i64>, rusqlite::Error> {
    conn.query_row(
        "SELECT id FROM car_documents WHERE car_id = ?1",
        params![car_id],
        |r| r.get(0),
    )
    .optional()
}

fn run_query(
    conn: &Connection,
    term: &str,
    page_size: usize,
    offset: usize,
) -> Result<SearchHits, rusqlite::Error> {
    let limit = to_sql_int(page_size);
    let offset = to_sql_int(offset);

    if term.trim().is_empty() {
        let total: i64 = conn.query_row("SELECT COUNT(*) FROM car_documents", [], |r| r.get(0))?;
        let mut stmt =
            conn.prepare("SELECT car_id FROM car_documents ORDER BY car_id LIMIT ?1 OFFSET ?2")?;
        let ids = stmt
            .query_map(params![limit, offset], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        return Ok(SearchHits {
            total_hits: total as usize,
            ids,
        });
    }

    let Some(expression) = to_match_expression(term) else {
        return Ok(SearchHits::default());
    };
    debug!("FTS5 expression for {:?}: {}", term, expression);

    let total: i64 = conn.query_row(
        "SELECT COUNT(*) FROM car_search WHERE car_search MATCH ?1",
        params![expression],
        |r| r.get(0),
    )?;

    // BM25 scores are negative, more negative = better match.
    let mut stmt = conn.prepare(
        r#"SELECT d.car_id
           FROM (
               SELECT rowid AS id, bm25(car_search) AS score
               FROM car_search
               WHERE car_search MATCH ?1
           ) AS hits
           JOIN car_documents d ON d.id = hits.id
           ORDER BY hits.score, d.car_id
           LIMIT ?2 OFFSET ?3"#,
    )?;
    let ids = stmt
        .query_map(params![expression, limit, offset], |r| r.get(0))?
        .collect::<Result<Vec<String>, _>>()?;

    Ok(SearchHits {
        total_hits: total as usize,
        ids,
    })
}

/// Runs `statements` with a progress handler that aborts them once `ctx` is
/// cancelled or past its deadline.
fn run_interruptible<T>(
    conn: &Connection,
    ctx: &SearchContext,
    statements: impl FnOnce(&Connection) -> Result<T, rusqlite::Error>,
) -> Result<T, SearchIndexError> {
    if ctx.is_done() {
        return Err(SearchIndexError::Cancelled);
    }

    let token = AssertUnwindSafe(ctx.token().clone());
    let deadline = ctx.deadline();
    conn.progress_handler(
        PROGRESS_HANDLER_OPS,
        Some(move || token.is_cancelled() || deadline.is_some_and(|d| Instant::now() >= d)),
    );

    let result = statements(conn);
    conn.progress_handler(0, None::<fn() -> bool>);

    result.map_err(|err| {
        if ctx.is_done() {
            SearchIndexError::Cancelled
        } else {
            SearchIndexError::Sqlite(err)
        }
    })
}

impl Fts5SearchIndex {
    /// Open the index at `db_path`, creating it when missing.
    ///
    /// An existing file whose schema version does not match, or that no
    /// [`SearchIndex::replace_all`] ever completed on, is reset. Callers must
    /// repopulate the index whenever [`IndexStatus::Created`] is returned.
    pub fn open_or_create(db_path: &Path) -> Result<(Self, IndexStatus), SearchIndexError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let existed = db_path.exists();

        let mut conn = Connection::open(db_path)?;

        // Enable WAL mode for better concurrent access
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let status = if existed && schema_is_current(&conn)? {
            IndexStatus::Existing
        } else {
            if existed {
                info!("Search index at {:?} has an outdated schema, resetting", db_path);
            } else {
                info!("Creating car search index at {:?}", db_path);
            }
            reset_schema(&mut conn)?;
            IndexStatus::Created
        };

        Ok((
            Fts5SearchIndex {
                conn: Mutex::new(conn),
                path: db_path.to_path_buf(),
            },
            status,
        ))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, SearchIndexError> {
        self.conn.lock().map_err(|_| SearchIndexError::Poisoned)
    }
}

impl SearchIndex for Fts5SearchIndex {
    fn put(&self, car_id: &str, details: &CarDetails) -> Result<(), SearchIndexError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let rowid = find_rowid(&tx, car_id)?;
        insert_document(&tx, rowid, car_id, details)?;
        tx.commit()?;
        debug!("Indexed car {}", car_id);
        Ok(())
    }

    fn remove(&self, car_id: &str) -> Result<(), SearchIndexError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        if let Some(rowid) = find_rowid(&tx, car_id)? {
            tx.execute("DELETE FROM car_search WHERE rowid = ?1", params![rowid])?;
            tx.execute("DELETE FROM car_documents WHERE id = ?1", params![rowid])?;
            debug!("Removed car {} from search index", car_id);
        }
        tx.commit()?;
        Ok(())
    }

    fn replace_all(&self, documents: &[(&str, &CarDetails)]) -> Result<(), SearchIndexError> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM car_search", [])?;
        tx.execute("DELETE FROM car_documents", [])?;
        for (car_id, details) in documents {
            insert_document(&tx, None, car_id, details)?;
        }
        tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
        tx.commit()?;
        debug!("FTS5 search index rebuilt with {} cars", documents.len());
        Ok(())
    }

    fn query(
        &self,
        term: &str,
        page_size: usize,
        offset: usize,
        ctx: &SearchContext,
    ) -> Result<SearchHits, SearchIndexError> {
        let conn = self.conn()?;
        run_interruptible(&conn, ctx, |conn| run_query(conn, term, page_size, offset))
    }

    fn document(&self, car_id: &str) -> Result<Option<CarDetails>, SearchIndexError> {
        let conn = self.conn()?;
        let document: Option<String> = conn
            .query_row(
                "SELECT document FROM car_documents WHERE car_id = ?1",
                params![car_id],
                |r| r.get(0),
            )
            .optional()?;

        match document {
            Some(document) => Ok(Some(car_details::parse(document.as_bytes())?)),
            None => Ok(None),
        }
    }

    fn len(&self) -> Result<usize, SearchIndexError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM car_documents", [], |r| r.get(0))?;
        Ok(count as usize)
    }

    fn close(self: Box<Self>) -> Result<(), SearchIndexError> {
        let conn = self
            .conn
            .into_inner()
            .map_err(|_| SearchIndexError::Poisoned)?;
        conn.close().map_err(|(_, err)| SearchIndexError::Sqlite(err))?;
        info!("Closed search index at {:?}", self.path);
        Ok(())
    }
}
