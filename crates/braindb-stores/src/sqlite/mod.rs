//! SQLite-backed idea store.
//!
//! A single connection behind a mutex. Multi-row writes (bulk idea insert,
//! idea deletion with its edges, context replacement) run in a transaction.

pub mod schema;

use std::collections::HashSet;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use braindb_core::config::BrainConfig;
use braindb_core::error::{BrainError, BrainResult};
use braindb_core::traits::{generate_id, IdeaStore, EDGE_PREFIX, IDEA_PREFIX, RAW_INPUT_PREFIX};
use braindb_core::types::{
    ContextSet, Edge, EdgeDraft, Idea, IdeaDraft, IdeaType, LinkType, RawInput,
};

const PIN_KIND: &str = "pin";
const EXCLUSION_KIND: &str = "exclusion";

const IDEA_COLUMNS: &str = "idea_id, idea_text, idea_type, source_raw_input_id, confidence, \
                            strength, last_recalled, linked, created_at, updated_at";

/// Idea store persisted in a SQLite database.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path.
    pub fn new<P: AsRef<Path>>(path: P) -> BrainResult<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path).map_err(|e| {
            BrainError::database_connection(format!(
                "Failed to open database at {}: {}",
                path.display(),
                e
            ))
        })?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> BrainResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BrainError::database_connection(e.to_string()))?;
        schema::init_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open the store at `config.db_path`, creating parent directories.
    pub fn from_config(config: &BrainConfig) -> BrainResult<Self> {
        if let Some(parent) = config.db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        info!(path = %config.db_path.display(), "Opening SQLite idea store");
        Self::new(&config.db_path)
    }

    fn lock(&self) -> BrainResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| BrainError::database(e.to_string()))
    }
}

fn parse_timestamp(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_optional_timestamp(s: Option<String>) -> Option<DateTime<Utc>> {
    s.and_then(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    })
}

fn row_to_raw_input(row: &Row<'_>) -> rusqlite::Result<RawInput> {
    let timestamp: String = row.get(2)?;
    Ok(RawInput {
        id: row.get(0)?,
        text: row.get(1)?,
        timestamp: parse_timestamp(&timestamp),
        processed: row.get(3)?,
        processed_at: parse_optional_timestamp(row.get(4)?),
    })
}

fn row_to_idea(row: &Row<'_>) -> rusqlite::Result<Idea> {
    let idea_type: String = row.get(2)?;
    let created_at: String = row.get(8)?;
    Ok(Idea {
        idea_id: row.get(0)?,
        idea_text: row.get(1)?,
        idea_type: IdeaType::from_str(&idea_type).unwrap_or_default(),
        source_raw_input_id: row.get(3)?,
        confidence: row.get(4)?,
        strength: row.get(5)?,
        last_recalled: parse_optional_timestamp(row.get(6)?),
        linked: row.get(7)?,
        created_at: parse_timestamp(&created_at),
        updated_at: parse_optional_timestamp(row.get(9)?),
    })
}

fn row_to_edge(row: &Row<'_>) -> rusqlite::Result<Edge> {
    let link_type: String = row.get(3)?;
    let link_type = LinkType::from_str(&link_type)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(5)?;
    Ok(Edge {
        id: row.get(0)?,
        from: row.get(1)?,
        to: row.get(2)?,
        link_type,
        weight: row.get(4)?,
        created_at: parse_timestamp(&created_at),
    })
}

fn insert_idea(conn: &Connection, idea: &Idea) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO ideas (idea_id, idea_text, idea_type, source_raw_input_id, confidence,
                            strength, last_recalled, linked, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            idea.idea_id,
            idea.idea_text,
            idea.idea_type.to_string(),
            idea.source_raw_input_id,
            idea.confidence,
            idea.strength,
            idea.last_recalled.map(|dt| dt.to_rfc3339()),
            idea.linked,
            idea.created_at.to_rfc3339(),
            idea.updated_at.map(|dt| dt.to_rfc3339()),
        ],
    )
}

impl IdeaStore for SqliteStore {
    fn save_raw_input(&self, text: &str) -> BrainResult<RawInput> {
        let raw = RawInput::new(generate_id(RAW_INPUT_PREFIX), text);
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO raw_inputs (id, text, timestamp, processed) VALUES (?1, ?2, ?3, 0)",
            params![raw.id, raw.text, raw.timestamp.to_rfc3339()],
        )?;
        debug!(id = %raw.id, "Raw input saved");
        Ok(raw)
    }

    fn get_raw_inputs(&self) -> BrainResult<Vec<RawInput>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, timestamp, processed, processed_at FROM raw_inputs ORDER BY seq",
        )?;
        let rows = stmt.query_map([], row_to_raw_input)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_unprocessed_inputs(&self) -> BrainResult<Vec<RawInput>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, text, timestamp, processed, processed_at FROM raw_inputs
             WHERE processed = 0 ORDER BY seq",
        )?;
        let rows = stmt.query_map([], row_to_raw_input)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn mark_processed(&self, id: &str) -> BrainResult<bool> {
        let conn = self.lock()?;
        let updated = conn.execute(
            "UPDATE raw_inputs SET processed = 1, processed_at = ?1 WHERE id = ?2",
            params![Utc::now().to_rfc3339(), id],
        )?;
        if updated == 0 {
            warn!(id, "Raw input not found");
            return Ok(false);
        }
        debug!(id, "Marked processed");
        Ok(true)
    }

    fn delete_raw_input(&self, id: &str) -> BrainResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM raw_inputs WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn get_ideas(&self) -> BrainResult<Vec<Idea>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM ideas ORDER BY seq", IDEA_COLUMNS))?;
        let rows = stmt.query_map([], row_to_idea)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn get_idea(&self, id: &str) -> BrainResult<Option<Idea>> {
        let conn = self.lock()?;
        let idea = conn
            .query_row(
                &format!("SELECT {} FROM ideas WHERE idea_id = ?1", IDEA_COLUMNS),
                params![id],
                row_to_idea,
            )
            .optional()?;
        Ok(idea)
    }

    fn save_idea(&self, mut idea: Idea) -> BrainResult<Idea> {
        let conn = self.lock()?;
        let existing: Option<String> = conn
            .query_row(
                "SELECT created_at FROM ideas WHERE idea_id = ?1",
                params![idea.idea_id],
                |row| row.get(0),
            )
            .optional()?;

        match existing {
            Some(created_at) => {
                idea.created_at = parse_timestamp(&created_at);
                idea.updated_at = Some(Utc::now());
                conn.execute(
                    "UPDATE ideas SET idea_text = ?2, idea_type = ?3, source_raw_input_id = ?4,
                         confidence = ?5, strength = ?6, last_recalled = ?7, linked = ?8,
                         updated_at = ?9
                     WHERE idea_id = ?1",
                    params![
                        idea.idea_id,
                        idea.idea_text,
                        idea.idea_type.to_string(),
                        idea.source_raw_input_id,
                        idea.confidence,
                        idea.strength,
                        idea.last_recalled.map(|dt| dt.to_rfc3339()),
                        idea.linked,
                        idea.updated_at.map(|dt| dt.to_rfc3339()),
                    ],
                )?;
                debug!(idea_id = %idea.idea_id, "Idea updated");
            }
            None => {
                insert_idea(&conn, &idea)?;
                debug!(idea_id = %idea.idea_id, "Idea saved");
            }
        }
        Ok(idea)
    }

    fn save_ideas(&self, drafts: Vec<IdeaDraft>) -> BrainResult<Vec<Idea>> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let now = Utc::now();
        let mut taken: HashSet<String> = HashSet::new();
        let mut saved = Vec::with_capacity(drafts.len());

        for draft in drafts {
            let id = match &draft.idea_id {
                Some(id) if !taken.contains(id) => {
                    let exists: bool = tx.query_row(
                        "SELECT EXISTS(SELECT 1 FROM ideas WHERE idea_id = ?1)",
                        params![id],
                        |row| row.get(0),
                    )?;
                    if exists {
                        generate_id(IDEA_PREFIX)
                    } else {
                        id.clone()
                    }
                }
                _ => generate_id(IDEA_PREFIX),
            };
            taken.insert(id.clone());

            let idea = draft.into_idea(id, now);
            insert_idea(&tx, &idea)?;
            saved.push(idea);
        }

        tx.commit()?;
        debug!(count = saved.len(), "Saved ideas");
        Ok(saved)
    }

    fn delete_idea(&self, id: &str) -> BrainResult<bool> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let deleted = tx.execute("DELETE FROM ideas WHERE idea_id = ?1", params![id])?;
        if deleted == 0 {
            warn!(id, "Idea not found");
            return Ok(false);
        }
        let edges = tx.execute(
            "DELETE FROM edges WHERE from_id = ?1 OR to_id = ?1",
            params![id],
        )?;
        tx.commit()?;
        debug!(id, edges, "Idea deleted");
        Ok(true)
    }

    fn clear_all_ideas(&self) -> BrainResult<()> {
        let conn = self.lock()?;
        conn.execute_batch("DELETE FROM edges; DELETE FROM ideas;")?;
        Ok(())
    }

    fn get_edges(&self) -> BrainResult<Vec<Edge>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, from_id, to_id, link_type, weight, created_at FROM edges ORDER BY seq",
        )?;
        let rows = stmt.query_map([], row_to_edge)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    fn save_edge(&self, draft: EdgeDraft) -> BrainResult<Option<Edge>> {
        let edge = draft.into_edge(generate_id(EDGE_PREFIX), Utc::now());
        let conn = self.lock()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO edges (id, from_id, to_id, link_type, weight, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                edge.id,
                edge.from,
                edge.to,
                edge.link_type.to_string(),
                edge.weight,
                edge.created_at.to_rfc3339(),
            ],
        )?;

        if inserted == 0 {
            debug!("Edge already exists, skipping");
            return Ok(None);
        }
        debug!(from = %edge.from, to = %edge.to, "Edge saved");
        Ok(Some(edge))
    }

    fn delete_edge(&self, id: &str) -> BrainResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute("DELETE FROM edges WHERE id = ?1", params![id])?;
        Ok(deleted > 0)
    }

    fn get_context(&self) -> BrainResult<ContextSet> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT kind, idea_id FROM context_entries")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut context = ContextSet::default();
        for row in rows {
            let (kind, idea_id) = row?;
            match kind.as_str() {
                PIN_KIND => {
                    context.pins.insert(idea_id);
                }
                EXCLUSION_KIND => {
                    context.exclusions.insert(idea_id);
                }
                other => warn!(kind = other, "Unknown context entry kind"),
            }
        }
        Ok(context)
    }

    fn save_context(&self, context: &ContextSet) -> BrainResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM context_entries", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO context_entries (kind, idea_id) VALUES (?1, ?2)")?;
            for id in &context.pins {
                stmt.execute(params![PIN_KIND, id])?;
            }
            for id in &context.exclusions {
                stmt.execute(params![EXCLUSION_KIND, id])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn clear_all_data(&self) -> BrainResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(
            "DELETE FROM edges;
             DELETE FROM ideas;
             DELETE FROM raw_inputs;
             DELETE FROM context_entries;",
        )?;
        info!("All data cleared");
        Ok(())
    }
}
