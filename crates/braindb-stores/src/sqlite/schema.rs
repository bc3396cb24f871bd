//! SQLite schema for the idea store.
//!
//! Four tables:
//! - `raw_inputs`: submitted text
//! - `ideas`: committed ideas
//! - `edges`: typed links, unique per (from, to, type)
//! - `context_entries`: pins and exclusions
//!
//! Every record table carries an autoincrement `seq` column; listing
//! queries order by it so callers see insertion order.

use rusqlite::Connection;

use braindb_core::error::BrainResult;

/// SQL for raw inputs.
pub const CREATE_RAW_INPUTS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS raw_inputs (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    text TEXT NOT NULL,
    timestamp TEXT NOT NULL,
    processed INTEGER NOT NULL DEFAULT 0,
    processed_at TEXT
)
"#;

/// SQL for ideas.
pub const CREATE_IDEAS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS ideas (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    idea_id TEXT NOT NULL UNIQUE,
    idea_text TEXT NOT NULL,
    idea_type TEXT NOT NULL DEFAULT 'fact',
    source_raw_input_id TEXT,
    confidence INTEGER NOT NULL DEFAULT 0,
    strength INTEGER NOT NULL DEFAULT 0,
    last_recalled TEXT,
    linked INTEGER NOT NULL DEFAULT 0,
    created_at TEXT NOT NULL,
    updated_at TEXT
)
"#;

/// Index for finding ideas extracted from a raw input.
pub const CREATE_IDEAS_SOURCE_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_ideas_source ON ideas(source_raw_input_id)
"#;

/// SQL for edges. Endpoints are not foreign keys; idea deletion removes
/// edges explicitly.
pub const CREATE_EDGES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS edges (
    seq INTEGER PRIMARY KEY AUTOINCREMENT,
    id TEXT NOT NULL UNIQUE,
    from_id TEXT NOT NULL,
    to_id TEXT NOT NULL,
    link_type TEXT NOT NULL,
    weight REAL NOT NULL DEFAULT 1.0,
    created_at TEXT NOT NULL,
    UNIQUE(from_id, to_id, link_type)
)
"#;

/// Index for outgoing traversal.
pub const CREATE_EDGES_FROM_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_from ON edges(from_id)
"#;

/// Index for incoming traversal.
pub const CREATE_EDGES_TO_INDEX: &str = r#"
CREATE INDEX IF NOT EXISTS idx_edges_to ON edges(to_id)
"#;

/// SQL for pins and exclusions. `kind` is `pin` or `exclusion`.
pub const CREATE_CONTEXT_ENTRIES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS context_entries (
    kind TEXT NOT NULL CHECK (kind IN ('pin', 'exclusion')),
    idea_id TEXT NOT NULL,
    PRIMARY KEY (kind, idea_id)
)
"#;

/// Initialize the schema in the given database connection.
///
/// Idempotent.
pub fn init_schema(conn: &Connection) -> BrainResult<()> {
    conn.execute(CREATE_RAW_INPUTS_TABLE, [])?;
    conn.execute(CREATE_IDEAS_TABLE, [])?;
    conn.execute(CREATE_EDGES_TABLE, [])?;
    conn.execute(CREATE_CONTEXT_ENTRIES_TABLE, [])?;

    conn.execute(CREATE_IDEAS_SOURCE_INDEX, [])?;
    conn.execute(CREATE_EDGES_FROM_INDEX, [])?;
    conn.execute(CREATE_EDGES_TO_INDEX, [])?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_names(conn: &Connection) -> Vec<String> {
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_init_schema_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let tables = table_names(&conn);
        for name in ["raw_inputs", "ideas", "edges", "context_entries"] {
            assert!(tables.contains(&name.to_string()), "missing {}", name);
        }
    }

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='ideas'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_edge_triple_unique() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        let insert = "INSERT OR IGNORE INTO edges (id, from_id, to_id, link_type, created_at)
                      VALUES (?1, 'a', 'b', 'supports', '2024-01-01T00:00:00Z')";
        assert_eq!(conn.execute(insert, ["edge_1"]).unwrap(), 1);
        assert_eq!(conn.execute(insert, ["edge_2"]).unwrap(), 0);
    }

    #[test]
    fn test_context_kind_checked() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();

        assert!(conn
            .execute(
                "INSERT INTO context_entries (kind, idea_id) VALUES ('pin', 'a')",
                [],
            )
            .is_ok());
        assert!(conn
            .execute(
                "INSERT INTO context_entries (kind, idea_id) VALUES ('favourite', 'a')",
                [],
            )
            .is_err());
    }
}
