//! SQLite index implementation
//!
//! The index lives in an in-memory SQLite connection for the whole session.
//! `open` restores it from the snapshot file with the SQLite backup API and
//! `save` writes it back, so individual inserts never touch the disk. Work
//! done after the last `save` is lost on a crash.

use crate::extractor::Element;
use crate::storage::schema::initialize_schema;
use crate::storage::stopwords::is_stopword;
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{LocationCombination, TableCounts};
use rusqlite::backup::Progress;
use rusqlite::{params, params_from_iter, Connection, DatabaseName, OptionalExtension};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// In-memory SQLite index with explicit snapshot lifecycle
pub struct SqliteIndex {
    conn: Connection,

    /// Snapshot file this index was opened from
    snapshot_path: Option<PathBuf>,

    /// Known URL ids by canonical string
    url_ids: HashMap<String, i64>,

    /// Known word ids by normalized word
    word_ids: HashMap<String, i64>,

    next_url_id: i64,
    next_word_id: i64,
}

impl SqliteIndex {
    /// Opens the index backed by a snapshot file
    ///
    /// If the file exists its contents are restored into memory, otherwise an
    /// empty index is created. Nothing is written to `path` until [`save`].
    ///
    /// [`save`]: SqliteIndex::save
    pub fn open(path: &Path) -> StorageResult<Self> {
        let mut conn = Connection::open_in_memory()?;

        if path.exists() {
            tracing::info!("Restoring index snapshot from {}", path.display());
            conn.restore(DatabaseName::Main, path, None::<fn(Progress)>)?;
        } else {
            tracing::info!(
                "No index snapshot at {}, starting with an empty index",
                path.display()
            );
        }

        Self::from_connection(conn, Some(path.to_path_buf()))
    }

    /// Creates an index with no snapshot file
    pub fn in_memory() -> StorageResult<Self> {
        Self::from_connection(Connection::open_in_memory()?, None)
    }

    fn from_connection(conn: Connection, snapshot_path: Option<PathBuf>) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;

        let mut index = Self {
            conn,
            snapshot_path,
            url_ids: HashMap::new(),
            word_ids: HashMap::new(),
            next_url_id: 1,
            next_word_id: 1,
        };
        index.load_id_caches()?;
        Ok(index)
    }

    /// Loads the URL and word dictionaries into memory
    fn load_id_caches(&mut self) -> StorageResult<()> {
        {
            let mut stmt = self.conn.prepare("SELECT id, url FROM url_list")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
            })?;
            for row in rows {
                let (id, url) = row?;
                self.next_url_id = self.next_url_id.max(id + 1);
                self.url_ids.insert(url, id);
            }
        }

        let mut stmt = self.conn.prepare("SELECT id, word FROM word_list")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in rows {
            let (id, word) = row?;
            self.next_word_id = self.next_word_id.max(id + 1);
            self.word_ids.insert(word, id);
        }

        tracing::debug!(
            "Loaded {} URLs and {} words into the id caches",
            self.url_ids.len(),
            self.word_ids.len()
        );
        Ok(())
    }

    /// Path of the snapshot file, if any
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Writes the whole index to its snapshot file
    pub fn save(&self) -> StorageResult<()> {
        let path = self.snapshot_path.as_deref().ok_or_else(|| {
            StorageError::Snapshot("index was not opened from a snapshot file".to_string())
        })?;
        self.save_to(path)
    }

    /// Writes the whole index to the given file, replacing its contents
    pub fn save_to(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        self.conn.backup(DatabaseName::Main, path, None)?;
        tracing::info!("Index snapshot written to {}", path.display());
        Ok(())
    }

    fn count_rows(&self, table: &str) -> StorageResult<u64> {
        // Table names come from the fixed schema list, never from input
        let count: i64 =
            self.conn
                .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }
}

impl IndexStore for SqliteIndex {
    // ===== Page Indexing =====

    fn insert_url(&mut self, url: &str) -> StorageResult<i64> {
        if let Some(&id) = self.url_ids.get(url) {
            return Ok(id);
        }

        let id = self.next_url_id;
        self.conn.execute(
            "INSERT INTO url_list (id, url) VALUES (?1, ?2)",
            params![id, url],
        )?;

        self.next_url_id += 1;
        self.url_ids.insert(url.to_string(), id);
        Ok(id)
    }

    fn insert_links_from_elements(&mut self, elements: &mut [Element]) -> StorageResult<()> {
        let mut new_urls: Vec<(i64, &str)> = Vec::new();
        let mut batch_ids: HashMap<&str, i64> = HashMap::new();
        let mut next_id = self.next_url_id;

        for href in elements.iter().filter_map(|e| e.href.as_deref()) {
            if self.url_ids.contains_key(href) || batch_ids.contains_key(href) {
                continue;
            }
            batch_ids.insert(href, next_id);
            new_urls.push((next_id, href));
            next_id += 1;
        }

        if !new_urls.is_empty() {
            let tx = self.conn.transaction()?;
            {
                let mut stmt = tx.prepare_cached("INSERT INTO url_list (id, url) VALUES (?1, ?2)")?;
                for (id, url) in &new_urls {
                    stmt.execute(params![id, url])?;
                }
            }
            tx.commit()?;
        }

        let assigned: Vec<(String, i64)> = new_urls
            .into_iter()
            .map(|(id, url)| (url.to_string(), id))
            .collect();
        self.next_url_id = next_id;
        self.url_ids.extend(assigned);

        for element in elements.iter_mut() {
            element.link_id = element
                .href
                .as_deref()
                .and_then(|href| self.url_ids.get(href).copied());
        }

        Ok(())
    }

    fn insert_words_from_elements(&mut self, elements: &mut [Element]) -> StorageResult<()> {
        let mut new_words: Vec<(i64, String)> = Vec::new();
        let mut batch_ids: HashMap<String, i64> = HashMap::new();
        let mut next_id = self.next_word_id;
        let mut resolved: Vec<Option<i64>> = Vec::with_capacity(elements.len());

        for element in elements.iter() {
            let word = element.word.to_lowercase();
            if word.is_empty() || is_stopword(&word) {
                resolved.push(None);
                continue;
            }

            let known = self
                .word_ids
                .get(&word)
                .or_else(|| batch_ids.get(&word))
                .copied();
            let id = match known {
                Some(id) => id,
                None => {
                    let id = next_id;
                    next_id += 1;
                    batch_ids.insert(word.clone(), id);
                    new_words.push((id, word));
                    id
                }
            };
            resolved.push(Some(id));
        }

        if !new_words.is_empty() {
            let tx = self.conn.transaction()?;
            {
                let mut stmt =
                    tx.prepare_cached("INSERT INTO word_list (id, word) VALUES (?1, ?2)")?;
                for (id, word) in &new_words {
                    stmt.execute(params![id, word])?;
                }
            }
            tx.commit()?;
        }

        self.next_word_id = next_id;
        self.word_ids.extend(batch_ids);

        for (element, word_id) in elements.iter_mut().zip(resolved) {
            element.word_id = word_id;
        }

        Ok(())
    }

    fn insert_links_between(
        &mut self,
        elements: &mut [Element],
        source_url_id: i64,
    ) -> StorageResult<usize> {
        let mut targets: Vec<i64> = Vec::new();
        for link_id in elements.iter().filter_map(|e| e.link_id) {
            if !targets.contains(&link_id) {
                targets.push(link_id);
            }
        }

        if targets.is_empty() {
            return Ok(0);
        }

        let mut edge_ids: HashMap<i64, i64> = HashMap::with_capacity(targets.len());
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO link_between_url (from_url_id, to_url_id) VALUES (?1, ?2)",
            )?;
            for target in &targets {
                stmt.execute(params![source_url_id, target])?;
                edge_ids.insert(*target, tx.last_insert_rowid());
            }
        }
        tx.commit()?;

        for element in elements.iter_mut() {
            element.edge_id = element.link_id.and_then(|id| edge_ids.get(&id).copied());
        }

        Ok(targets.len())
    }

    fn fill_word_locations(&mut self, elements: &[Element], url_id: i64) -> StorageResult<usize> {
        let mut inserted = 0;
        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO word_location (word_id, url_id, position) VALUES (?1, ?2, ?3)",
            )?;
            for element in elements {
                if let Some(word_id) = element.word_id {
                    stmt.execute(params![word_id, url_id, element.position as i64])?;
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    fn fill_link_words(&mut self, elements: &[Element]) -> StorageResult<usize> {
        let mut inserted = 0;
        let tx = self.conn.transaction()?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO link_word (word_id, link_id) VALUES (?1, ?2)")?;
            for element in elements {
                if let (Some(word_id), Some(edge_id)) = (element.word_id, element.edge_id) {
                    stmt.execute(params![word_id, edge_id])?;
                    inserted += 1;
                }
            }
        }
        tx.commit()?;
        Ok(inserted)
    }

    // ===== Lookups =====

    fn url_id(&self, url: &str) -> Option<i64> {
        self.url_ids.get(url).copied()
    }

    fn url_by_id(&self, url_id: i64) -> StorageResult<String> {
        self.conn
            .query_row(
                "SELECT url FROM url_list WHERE id = ?1",
                params![url_id],
                |row| row.get(0),
            )
            .optional()?
            .ok_or(StorageError::UrlNotFound(url_id))
    }

    fn word_id(&self, word: &str) -> Option<i64> {
        self.word_ids.get(&word.to_lowercase()).copied()
    }

    fn page_words(&self, url_id: i64) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare_cached(
            "SELECT w.word FROM word_location wl
             INNER JOIN word_list w ON w.id = wl.word_id
             WHERE wl.url_id = ?1
             ORDER BY wl.position",
        )?;

        let words = stmt
            .query_map(params![url_id], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(words)
    }

    fn word_location_combinations(
        &self,
        words: &[String],
    ) -> StorageResult<Vec<LocationCombination>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }

        let mut word_ids = Vec::with_capacity(words.len());
        for word in words {
            match self.word_id(word) {
                Some(id) => word_ids.push(id),
                None => return Ok(Vec::new()),
            }
        }

        // Only aliases and placeholders are generated; the words are bound
        let mut columns = String::from("l0.url_id");
        let mut joins = String::from("FROM word_location l0");
        let mut filters = String::from("WHERE l0.word_id = ?1");
        for i in 0..word_ids.len() {
            columns.push_str(&format!(", l{}.position", i));
            if i > 0 {
                joins.push_str(&format!(
                    " INNER JOIN word_location l{i} ON l{i}.url_id = l{prev}.url_id",
                    i = i,
                    prev = i - 1
                ));
                filters.push_str(&format!(" AND l{}.word_id = ?{}", i, i + 1));
            }
        }
        let sql = format!("SELECT {} {} {}", columns, joins, filters);

        let mut stmt = self.conn.prepare(&sql)?;
        let term_count = word_ids.len();
        let combinations = stmt
            .query_map(params_from_iter(word_ids.iter()), |row| {
                let mut positions = Vec::with_capacity(term_count);
                for i in 0..term_count {
                    positions.push(row.get::<_, i64>(i + 1)?);
                }
                Ok(LocationCombination {
                    url_id: row.get(0)?,
                    positions,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(combinations)
    }

    // ===== Link Graph =====

    fn all_url_ids(&self) -> StorageResult<Vec<i64>> {
        let mut stmt = self.conn.prepare("SELECT id FROM url_list ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;
        Ok(ids)
    }

    fn link_edges(&self) -> StorageResult<Vec<(i64, i64)>> {
        let mut stmt = self
            .conn
            .prepare("SELECT from_url_id, to_url_id FROM link_between_url ORDER BY id")?;
        let edges = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(edges)
    }

    // ===== Page Rank =====

    fn replace_page_ranks(&mut self, ranks: &[(i64, f64)]) -> StorageResult<()> {
        let tx = self.conn.transaction()?;
        tx.execute("DELETE FROM page_rank", [])?;
        {
            let mut stmt =
                tx.prepare_cached("INSERT INTO page_rank (url_id, rank) VALUES (?1, ?2)")?;
            for (url_id, rank) in ranks {
                stmt.execute(params![url_id, rank])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn count_page_ranks(&self) -> StorageResult<u64> {
        self.count_rows("page_rank")
    }

    fn page_ranks_for(&self, url_ids: &[i64]) -> StorageResult<HashMap<i64, f64>> {
        let mut stmt = self
            .conn
            .prepare_cached("SELECT rank FROM page_rank WHERE url_id = ?1")?;

        let mut ranks = HashMap::with_capacity(url_ids.len());
        for &url_id in url_ids {
            let rank: Option<f64> = stmt
                .query_row(params![url_id], |row| row.get(0))
                .optional()?;
            if let Some(rank) = rank {
                ranks.insert(url_id, rank);
            }
        }
        Ok(ranks)
    }

    // ===== Statistics =====

    fn table_counts(&self) -> StorageResult<TableCounts> {
        Ok(TableCounts {
            url_list: self.count_rows("url_list")?,
            word_list: self.count_rows("word_list")?,
            word_location: self.count_rows("word_location")?,
            link_between_url: self.count_rows("link_between_url")?,
            link_word: self.count_rows("link_word")?,
            page_rank: self.count_rows("page_rank")?,
        })
    }

    fn count_unique_words(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(DISTINCT word) FROM word_list", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }
}
