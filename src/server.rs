//! HTTP surface of the dashboard
//!
//! A single page at `/`. The UI state travels in the query string (`worker` for the
//! selected filter, `refreshes` for the refresh button counter); every request performs a
//! full refresh and renders the page server-side.
use crate::{
    dashboard::{DashboardView, RefreshRequest, RefreshWorker, NO_RECORDS},
    db,
    settings::Settings,
};
use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use derive_more::From;
use std::sync::Arc;
use tera::{Context, Tera};
use tracing::{error, info};

pub const TEMPLATE: &str = "dashboard.html";

#[derive(Clone)]
pub struct AppState {
    worker: RefreshWorker,
    templates: Arc<Tera>,
}

// anyhow::Error does not implement IntoResponse, so we must wrap it
#[derive(Debug, From)]
pub struct ServerError(anyhow::Error);

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        error!("error rendering dashboard: {:#}", self.0);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("error rendering dashboard: {:#}", self.0),
        )
            .into_response()
    }
}

/// Templates of the page, compiled into the binary
pub fn templates() -> Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(TEMPLATE, include_str!("web/dashboard.html"))?;
    Ok(tera)
}

pub fn render_page(tera: &Tera, view: &DashboardView) -> Result<String> {
    let mut context = Context::from_serialize(view)?;
    context.insert("no_records", NO_RECORDS);
    Ok(tera.render(TEMPLATE, &context)?)
}

pub fn router(worker: RefreshWorker) -> Result<Router> {
    let state = AppState {
        worker,
        templates: Arc::new(templates()?),
    };
    Ok(Router::new()
        .route("/", get(dashboard_page))
        .with_state(state))
}

async fn dashboard_page(
    State(state): State<AppState>,
    Query(request): Query<RefreshRequest>,
) -> Result<Html<String>, ServerError> {
    let view = state.worker.refresh(request).await?;
    Ok(Html(render_page(&state.templates, &view)?))
}

/// Run the dashboard until the process is stopped
pub async fn serve(settings: &Settings) -> Result<()> {
    let source = db::open(&settings.database)?;
    let worker = RefreshWorker::spawn(source)?;
    let app = router(worker)?;

    let addr = settings.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("production dashboard listening on {}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
