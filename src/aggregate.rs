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
//! Aggregations over a loaded production table and the charts derived from them
//!
//! All aggregates are recomputed from scratch for every refresh. Groups are keyed by the
//! exact text found in the database; records without a value for the grouping attribute do
//! not form a group.
use crate::{
    chart::{ChartSpec, Trace},
    coll::Tally,
    record::{ProductionRecord, ProductionTable},
};
use std::collections::BTreeMap;

pub const BY_SKU_TITLE: &str = "Production by SKU";
pub const BY_WORKER_TITLE: &str = "Production by Worker";
pub const DURATION_TITLE: &str = "Assembly Time (minutes)";

const COUNT_AXIS: &str = "Quantity";
const DURATION_AXIS: &str = "Minutes";

/// Everything the dashboard shows that is derived from the records
#[derive(Clone, Debug, PartialEq)]
pub struct Aggregates {
    pub by_sku: ChartSpec,
    pub by_worker: ChartSpec,
    pub durations: ChartSpec,
    /// workers of the unfiltered table, sorted, for the filter control
    pub worker_options: Vec<String>,
}

impl Aggregates {
    pub fn no_data() -> Self {
        Self {
            by_sku: ChartSpec::no_data(),
            by_worker: ChartSpec::no_data(),
            durations: ChartSpec::no_data(),
            worker_options: vec![],
        }
    }
}

/// Derive all charts and the filter options from one loaded table
///
/// An empty or missing `filter_worker` selects all records. The filter options always
/// describe the full table, independent of the current selection.
pub fn build(table: &ProductionTable, filter_worker: Option<&str>) -> Aggregates {
    if table.is_empty() {
        return Aggregates::no_data();
    }
    let worker_options = table.workers();

    let filtered;
    let records = match filter_worker.filter(|w| !w.is_empty()) {
        Some(worker) => {
            filtered = table.filter_worker(worker);
            filtered.records()
        }
        None => table.records(),
    };

    Aggregates {
        by_sku: count_chart(BY_SKU_TITLE, "sku", &count_by(records, |r| r.sku.as_ref())),
        by_worker: count_chart(
            BY_WORKER_TITLE,
            "montador",
            &count_by(records, |r| r.worker.as_ref()),
        ),
        durations: duration_chart(&durations_by_worker(records)),
        worker_options,
    }
}

/// Number of records per distinct value of the given attribute
pub fn count_by<'a>(
    records: &'a [ProductionRecord],
    key: impl Fn(&'a ProductionRecord) -> Option<&'a String>,
) -> Tally<String> {
    Tally::count(records.iter().filter_map(key).cloned())
}

/// Durations of completed records per worker, in table order
pub fn durations_by_worker(records: &[ProductionRecord]) -> BTreeMap<String, Vec<f64>> {
    let mut groups = BTreeMap::<String, Vec<f64>>::new();
    for record in records {
        if let (Some(worker), Some(minutes)) = (&record.worker, record.duration_minutes()) {
            groups.entry(worker.clone()).or_default().push(minutes);
        }
    }
    groups
}

fn count_chart(title: &str, x_title: &str, counts: &Tally<String>) -> ChartSpec {
    let traces = counts
        .iter()
        .map(|(label, n)| Trace::bar(label.as_str(), *n))
        .collect();
    ChartSpec::new(title, x_title, COUNT_AXIS, traces)
}

fn duration_chart(groups: &BTreeMap<String, Vec<f64>>) -> ChartSpec {
    let traces = groups
        .iter()
        .map(|(worker, minutes)| Trace::boxed(worker.as_str(), minutes.clone()))
        .collect();
    ChartSpec::new(DURATION_TITLE, "montador", DURATION_AXIS, traces)
}
