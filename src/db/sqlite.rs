/*
 * Copyright 2020 Actyx AG
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */
use super::{select_records, RecordSource};
use crate::record::ProductionRecord;
use anyhow::Result;
use rusqlite::{Connection, OpenFlags, Row};
use std::path::PathBuf;
use tracing::{debug, instrument, trace_span};

/// Record source for Sqlite3, based on the rusqlite crate
///
/// Timestamps must be stored as text in one of the formats understood by rusqlite
/// (`YYYY-MM-DD HH:MM:SS[.SSS]`, optionally with a `T` separator).
pub struct SqliteSource {
    path: PathBuf,
    query: String,
}

impl SqliteSource {
    pub fn new(path: impl Into<PathBuf>, table: &str) -> Self {
        Self {
            path: path.into(),
            query: select_records(table, |column| column.to_owned()),
        }
    }
}

impl RecordSource for SqliteSource {
    fn name(&self) -> &'static str {
        "Sqlite3(rusqlite)"
    }

    #[instrument(skip(self), fields(path = %self.path.display()), level = "debug")]
    fn fetch(&mut self) -> Result<Vec<ProductionRecord>> {
        let flags = OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = trace_span!("connect").in_scope(|| -> Result<_> {
            let conn = Connection::open_with_flags(&self.path, flags)?;
            debug!("new connection");
            Ok(conn)
        })?;

        let records = {
            let mut stmt = conn.prepare(self.query.as_str())?;
            let rows = stmt.query_map([], parse_row)?;
            rows.collect::<rusqlite::Result<Vec<_>>>()?
        };
        conn.close().map_err(|(_, err)| err)?;
        debug!(records = records.len(), "connection closed");
        Ok(records)
    }
}

fn parse_row(row: &Row) -> rusqlite::Result<ProductionRecord> {
    Ok(ProductionRecord {
        id: row.get(0)?,
        ean: row.get(1)?,
        sku: row.get(2)?,
        description: row.get(3)?,
        chassis: row.get(4)?,
        worker: row.get(5)?,
        started_at: row.get(6)?,
        finished_at: row.get(7)?,
        status: row.get(8)?,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::{
        db::{load, LoadOutcome},
        record::tests::at,
    };
    use rusqlite::params;
    use tempfile::TempDir;

    /// create a database file holding the given table, returns the directory guard and path
    pub fn fixture(table: &str, rows: &[[Option<&str>; 9]]) -> (TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("production.sqlite");
        let conn = Connection::open(&path).unwrap();
        conn.execute_batch(&format!(
            "create table {} (id integer primary key, ean text, sku text, descricao text, \
             chassi text, montador text, data_inicio text, data_fim text, status text);",
            table
        ))
        .unwrap();
        for row in rows {
            conn.execute(
                &format!(
                    "insert into {} (id, ean, sku, descricao, chassi, montador, \
                     data_inicio, data_fim, status) values (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                    table
                ),
                params![row[0], row[1], row[2], row[3], row[4], row[5], row[6], row[7], row[8]],
            )
            .unwrap();
        }
        (dir, path)
    }

    #[test_log::test]
    fn sqlite_must_load() {
        let (_dir, path) = fixture(
            "producao",
            &[
                [
                    Some("1"),
                    Some("7890000000011"),
                    Some("X1"),
                    Some("Bicicleta aro 29"),
                    Some("CH-1"),
                    Some("A"),
                    Some("2024-03-18 08:00:00"),
                    Some("2024-03-18 08:10:00"),
                    Some("finalizado"),
                ],
                [
                    Some("2"),
                    None,
                    Some("X2"),
                    None,
                    None,
                    Some("A"),
                    Some("2024-03-18 09:00:00"),
                    Some("2024-03-18 09:15:00"),
                    Some("finalizado"),
                ],
                [
                    Some("3"),
                    None,
                    Some("X1"),
                    None,
                    None,
                    Some("B"),
                    Some("2024-03-18 10:00:00"),
                    None,
                    Some("em montagem"),
                ],
            ],
        );
        let mut source = SqliteSource::new(path, "producao");
        let loaded = load(&mut source);
        assert_eq!(loaded.outcome, LoadOutcome::Rows(3));

        let records = loaded.table.records();
        let ids = records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["3", "2", "1"]);

        assert_eq!(records[2].ean.as_deref(), Some("7890000000011"));
        assert_eq!(records[2].started_at, Some(at(8, 0, 0)));
        assert_eq!(records[2].duration_minutes(), Some(10.0));
        assert_eq!(records[1].duration_minutes(), Some(15.0));
        assert_eq!(records[0].finished_at, None);
        assert_eq!(records[0].duration_minutes(), None);
        assert_eq!(records[0].description, None);
    }

    #[test_log::test]
    fn sqlite_empty_table() {
        let (_dir, path) = fixture("production", &[]);
        let loaded = load(&mut SqliteSource::new(path, "production"));
        assert_eq!(loaded.outcome, LoadOutcome::Empty);
    }

    #[test_log::test]
    fn sqlite_missing_table_is_a_failure() {
        let (_dir, path) = fixture("production", &[]);
        let loaded = load(&mut SqliteSource::new(path, "producao"));
        assert!(loaded.outcome.is_failure());
        assert!(loaded.table.is_empty());
    }

    #[test_log::test]
    fn sqlite_never_creates_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.sqlite");
        let loaded = load(&mut SqliteSource::new(path.clone(), "production"));
        assert!(loaded.outcome.is_failure());
        assert!(!path.exists());
    }
}
