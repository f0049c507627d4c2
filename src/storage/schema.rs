//! Database schema definitions
//!
//! This module contains the SQL schema of the six index tables.

/// SQL schema for the index database
pub const SCHEMA_SQL: &str = r#"
-- Every URL seen, crawled or only linked to
CREATE TABLE IF NOT EXISTS url_list (
    id INTEGER PRIMARY KEY,
    url TEXT NOT NULL UNIQUE
);

-- Normalized words, stopwords excluded
CREATE TABLE IF NOT EXISTS word_list (
    id INTEGER PRIMARY KEY,
    word TEXT NOT NULL UNIQUE
);

-- One row per word occurrence on a page
CREATE TABLE IF NOT EXISTS word_location (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word_id INTEGER NOT NULL REFERENCES word_list(id),
    url_id INTEGER NOT NULL REFERENCES url_list(id),
    position INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_word_location_word ON word_location(word_id);
CREATE INDEX IF NOT EXISTS idx_word_location_url ON word_location(url_id);

-- Directed link graph
CREATE TABLE IF NOT EXISTS link_between_url (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    from_url_id INTEGER NOT NULL REFERENCES url_list(id),
    to_url_id INTEGER NOT NULL REFERENCES url_list(id)
);

CREATE INDEX IF NOT EXISTS idx_link_from ON link_between_url(from_url_id);
CREATE INDEX IF NOT EXISTS idx_link_to ON link_between_url(to_url_id);

-- Anchor text index
CREATE TABLE IF NOT EXISTS link_word (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    word_id INTEGER NOT NULL REFERENCES word_list(id),
    link_id INTEGER NOT NULL REFERENCES link_between_url(id)
);

-- Authority scores, replaced wholesale by each ranking run
CREATE TABLE IF NOT EXISTS page_rank (
    url_id INTEGER PRIMARY KEY REFERENCES url_list(id),
    rank REAL NOT NULL
);
"#;

/// Names of all index tables, in creation order
pub const TABLES: &[&str] = &[
    "url_list",
    "word_list",
    "word_location",
    "link_between_url",
    "link_word",
    "page_rank",
];

/// Initializes the database schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
