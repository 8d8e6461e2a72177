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
//! Production records and the flat table they are loaded into
//!
//! A [`ProductionRecord`](struct.ProductionRecord.html) is one unit passing through assembly,
//! as tracked by the external production-tracking system. Records are only ever read: each
//! refresh loads a fresh snapshot into a [`ProductionTable`](struct.ProductionTable.html)
//! which is dropped after rendering.
//!
//! The duration of a record is derived from its two timestamps whenever it is asked for, it
//! is never stored alongside them.
use chrono::NaiveDateTime;
use itertools::Itertools;
use std::collections::HashSet;
use tracing::warn;

/// Format used when rendering timestamps into the table view
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One production-tracking entry
#[derive(Clone, Debug, PartialEq)]
pub struct ProductionRecord {
    /// opaque identifier, unique within one load
    pub id: String,
    pub ean: Option<String>,
    pub sku: Option<String>,
    pub description: Option<String>,
    pub chassis: Option<String>,
    /// assembly worker (montador)
    pub worker: Option<String>,
    pub started_at: Option<NaiveDateTime>,
    /// absent while the unit is still in assembly
    pub finished_at: Option<NaiveDateTime>,
    pub status: Option<String>,
}

impl ProductionRecord {
    /// Elapsed time between start and end in minutes
    ///
    /// Computed from microseconds so that sub-second precision stored by the database is
    /// retained; `None` if either timestamp is missing.
    pub fn duration_minutes(&self) -> Option<f64> {
        let start = self.started_at?;
        let end = self.finished_at?;
        let micros = (end - start).num_microseconds()?;
        Some(micros as f64 / 60_000_000.0)
    }

    pub fn is_in_progress(&self) -> bool {
        self.finished_at.is_none()
    }
}

/// Description of one displayed attribute of a production record
///
/// `name` is the column name as known by the production-tracking database, `render` turns
/// the attribute of one record into the text shown in the table view.
pub struct RecordColumn {
    pub name: &'static str,
    pub render: fn(&ProductionRecord) -> String,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

fn timestamp(value: &Option<NaiveDateTime>) -> String {
    value
        .map(|t| t.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_default()
}

/// All attributes of a production record in display order
pub static COLUMNS: &[RecordColumn] = &[
    RecordColumn {
        name: "id",
        render: |r| r.id.clone(),
    },
    RecordColumn {
        name: "ean",
        render: |r| text(&r.ean),
    },
    RecordColumn {
        name: "sku",
        render: |r| text(&r.sku),
    },
    RecordColumn {
        name: "descricao",
        render: |r| text(&r.description),
    },
    RecordColumn {
        name: "chassi",
        render: |r| text(&r.chassis),
    },
    RecordColumn {
        name: "montador",
        render: |r| text(&r.worker),
    },
    RecordColumn {
        name: "data_inicio",
        render: |r| timestamp(&r.started_at),
    },
    RecordColumn {
        name: "data_fim",
        render: |r| timestamp(&r.finished_at),
    },
    RecordColumn {
        name: "status",
        render: |r| text(&r.status),
    },
    RecordColumn {
        name: "tempo_minutos",
        render: |r| {
            r.duration_minutes()
                .map(|d| d.to_string())
                .unwrap_or_default()
        },
    },
];

/// Point-in-time snapshot of production records, most recently started first
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProductionTable {
    records: Vec<ProductionRecord>,
}

impl ProductionTable {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap freshly loaded records, reporting records that break the table invariants
    ///
    /// Offending records are kept: the table shows what the tracking system contains.
    pub fn from_records(records: Vec<ProductionRecord>) -> Self {
        let mut seen = HashSet::with_capacity(records.len());
        for record in &records {
            if !seen.insert(record.id.as_str()) {
                warn!(id = %record.id, "duplicate production record identifier");
            }
            if let (Some(start), Some(end)) = (record.started_at, record.finished_at) {
                if end < start {
                    warn!(id = %record.id, %start, %end, "production record ends before it starts");
                }
            }
        }
        Self { records }
    }

    pub fn records(&self) -> &[ProductionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records whose worker equals the given name exactly (case-sensitive)
    pub fn filter_worker(&self, worker: &str) -> ProductionTable {
        ProductionTable {
            records: self
                .records
                .iter()
                .filter(|r| r.worker.as_deref() == Some(worker))
                .cloned()
                .collect(),
        }
    }

    /// Distinct worker names present in this table, sorted ascending
    pub fn workers(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|r| r.worker.clone())
            .sorted()
            .dedup()
            .collect()
    }
}
