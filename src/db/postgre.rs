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
use crate::{
    record::ProductionRecord,
    settings::{DatabaseSettings, SslMode},
};
use anyhow::Result;
use native_tls::TlsConnector;
use postgres::{config::SslMode as PgSslMode, Config, Row};
use postgres_native_tls::MakeTlsConnector;
use std::{str::FromStr, time::Duration};
use tracing::{debug, instrument, trace_span};

/// Record source for PostgreSQL, based on the postgres crate
pub struct PostgresSource {
    config: Config,
    query: String,
}

impl PostgresSource {
    pub fn new(settings: &DatabaseSettings) -> Result<Self> {
        let mut config = match &settings.url {
            Some(url) => Config::from_str(url)?,
            None => {
                let mut config = Config::new();
                config
                    .host(&settings.host)
                    .port(settings.port)
                    .dbname(&settings.dbname)
                    .user(&settings.user)
                    .ssl_mode(match settings.sslmode {
                        SslMode::Disable => PgSslMode::Disable,
                        SslMode::Prefer => PgSslMode::Prefer,
                        SslMode::Require => PgSslMode::Require,
                    });
                if let Some(password) = &settings.password {
                    config.password(password);
                }
                config
            }
        };
        if config.get_connect_timeout().is_none() {
            config.connect_timeout(Duration::from_secs(settings.connect_timeout_secs));
        }
        config.application_name("production_dashboard");
        Ok(Self::with_config(config, &settings.table))
    }

    /// Use a ready-made connection configuration, e.g. parsed from a connection string
    pub fn with_config(config: Config, table: &str) -> Self {
        Self {
            config,
            query: select_records(table, |column| format!("cast({} as timestamp)", column)),
        }
    }
}

impl RecordSource for PostgresSource {
    fn name(&self) -> &'static str {
        "PostgreSQL(postgres)"
    }

    #[instrument(skip(self), level = "debug")]
    fn fetch(&mut self) -> Result<Vec<ProductionRecord>> {
        let tls_mode = MakeTlsConnector::new(TlsConnector::new()?);

        let mut conn = trace_span!("connect").in_scope(|| -> Result<_> {
            let ret = self.config.connect(tls_mode)?;
            debug!("new connection");
            Ok(ret)
        })?;

        let rows = conn.query(self.query.as_str(), &[])?;
        let records = rows.iter().map(parse_row).collect::<Result<Vec<_>>>()?;
        conn.close()?;
        debug!(records = records.len(), "connection closed");
        Ok(records)
    }
}

fn parse_row(row: &Row) -> Result<ProductionRecord> {
    Ok(ProductionRecord {
        id: row.try_get(0)?,
        ean: row.try_get(1)?,
        sku: row.try_get(2)?,
        description: row.try_get(3)?,
        chassis: row.try_get(4)?,
        worker: row.try_get(5)?,
        started_at: row.try_get(6)?,
        finished_at: row.try_get(7)?,
        status: row.try_get(8)?,
    })
}
