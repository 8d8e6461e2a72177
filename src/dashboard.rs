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
//! One refresh of the dashboard: load, aggregate, render
//!
//! The dashboard holds no state of its own. Everything the page knows about (the selected
//! worker, how often the refresh button was pressed) comes in with a
//! [`RefreshRequest`](struct.RefreshRequest.html) and goes back out with the
//! [`DashboardView`](struct.DashboardView.html), so a refresh is a function of the request
//! and the current database contents.
//!
//! Refreshes block on the database. The [`RefreshWorker`](struct.RefreshWorker.html) runs
//! them one at a time on a dedicated thread so that the HTTP server never blocks.
use crate::{
    aggregate::{self, Aggregates},
    chart::ChartSpec,
    db::{self, LoadOutcome, RecordSource},
    record::{ProductionTable, COLUMNS},
};
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, instrument};

/// Text shown instead of the table when no records are available
pub const NO_RECORDS: &str = "No records available.";

/// Number of refreshes that may wait for the worker before callers are held back
pub const REFRESH_QUEUE: usize = 8;

/// The UI state a refresh is computed for
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// selected worker; absent or empty means all workers
    #[serde(default)]
    pub worker: Option<String>,
    /// how often the refresh button has been pressed
    #[serde(default)]
    pub refreshes: u64,
}

impl RefreshRequest {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_worker(worker: impl Into<String>) -> Self {
        Self {
            worker: Some(worker.into()),
            refreshes: 0,
        }
    }

    /// the effective worker filter
    pub fn worker(&self) -> Option<&str> {
        self.worker.as_deref().filter(|w| !w.is_empty())
    }
}

/// Rows and columns of the record table, every cell already rendered as text
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TableView {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

impl TableView {
    /// one row per record, one column per entry of the record schema
    pub fn render(table: &ProductionTable) -> Self {
        Self {
            headers: COLUMNS.iter().map(|c| c.name).collect(),
            rows: table
                .records()
                .iter()
                .map(|r| COLUMNS.iter().map(|c| (c.render)(r)).collect())
                .collect(),
        }
    }
}

/// Everything shown on the page after one refresh
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DashboardView {
    pub request: RefreshRequest,
    pub by_sku: ChartSpec,
    pub by_worker: ChartSpec,
    pub durations: ChartSpec,
    /// `None` if no records could be loaded at all
    pub table: Option<TableView>,
    pub worker_options: Vec<String>,
    #[serde(skip)]
    pub outcome: LoadOutcome,
}

/// Run one full refresh against the given source
///
/// The source is read on every call; nothing is cached between refreshes.
#[instrument(skip(source), fields(worker = ?request.worker(), refreshes = request.refreshes))]
pub fn refresh<S: RecordSource + ?Sized>(source: &mut S, request: &RefreshRequest) -> DashboardView {
    let loaded = db::load(source);
    if loaded.table.is_empty() {
        debug!(outcome = %loaded.outcome, "showing placeholders");
        return no_data(request, loaded.outcome);
    }

    let Aggregates {
        by_sku,
        by_worker,
        durations,
        worker_options,
    } = aggregate::build(&loaded.table, request.worker());

    let table = match request.worker() {
        Some(worker) => TableView::render(&loaded.table.filter_worker(worker)),
        None => TableView::render(&loaded.table),
    };

    DashboardView {
        request: request.clone(),
        by_sku,
        by_worker,
        durations,
        table: Some(table),
        worker_options,
        outcome: loaded.outcome,
    }
}

fn no_data(request: &RefreshRequest, outcome: LoadOutcome) -> DashboardView {
    let Aggregates {
        by_sku,
        by_worker,
        durations,
        worker_options,
    } = Aggregates::no_data();
    DashboardView {
        request: request.clone(),
        by_sku,
        by_worker,
        durations,
        table: None,
        worker_options,
        outcome,
    }
}

type Job = (RefreshRequest, oneshot::Sender<DashboardView>);

/// Handle to the thread executing refreshes one after the other
///
/// Cloning the handle shares the same worker and queue.
#[derive(Clone)]
pub struct RefreshWorker {
    jobs: mpsc::Sender<Job>,
}

impl RefreshWorker {
    /// Start the worker thread, which owns the record source until all handles are dropped
    pub fn spawn<S: RecordSource + Send + 'static>(mut source: S) -> Result<Self> {
        let (jobs, mut queue) = mpsc::channel::<Job>(REFRESH_QUEUE);
        std::thread::Builder::new()
            .name("refresh".to_owned())
            .spawn(move || {
                info!(source = source.name(), "refresh worker started");
                // ends once every handle is gone
                while let Some((request, reply)) = queue.blocking_recv() {
                    let view = refresh(&mut source, &request);
                    // the requester may have gone away in the meantime
                    let _ = reply.send(view);
                }
                info!("refresh worker stopped");
            })?;
        Ok(Self { jobs })
    }

    /// Queue a refresh and wait for its result
    pub async fn refresh(&self, request: RefreshRequest) -> Result<DashboardView> {
        let (reply, view) = oneshot::channel();
        self.jobs
            .send((request, reply))
            .await
            .map_err(|_| anyhow!("refresh worker has stopped"))?;
        Ok(view.await?)
    }
}
