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
//! Production dashboard for the shop-floor
//!
//! Assembly lines record every unit they build (item identifiers, the worker who
//! assembled it, start and end of assembly, status) in a SQL database. This crate reads
//! those records and shows them on a small web dashboard: units built per SKU, units built
//! per worker, the distribution of assembly times per worker, and the records themselves.
//!
//! Every page request is one refresh, composed of three steps:
//!
//! ```rust,no_run
//! use production_dashboard::{aggregate, dashboard::RefreshRequest, db, settings::Settings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::load()?;
//! let mut source = db::open(&settings.database)?;
//! let request = RefreshRequest::for_worker("Marcos");
//!
//! let loaded = db::load(&mut source);
//! let charts = aggregate::build(&loaded.table, request.worker());
//! println!("{}: {:?}", loaded.outcome, charts.worker_options);
//! # Ok(())
//! # }
//! ```
//!
//! [`dashboard::refresh`](dashboard/fn.refresh.html) bundles these steps and renders the
//! table view, the [`server`](server/index.html) module serves the result as a web page.
//! The database is only ever read, and nothing is kept between two refreshes.

pub mod aggregate;
pub mod chart;
pub mod coll;
pub mod dashboard;
pub mod db;
pub mod record;
pub mod server;
pub mod settings;
