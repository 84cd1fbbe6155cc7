use std::net::SocketAddr;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::clock::Now;
use crate::controllers::paste;
use crate::error::ApiError;
use crate::pages;
use crate::types::api::{Health, NewPaste, PasteView};
use crate::App;

/// Plain-text usage page served at the root.
const USAGE: &str = include_str!("../../assets/usage.txt");

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::from((app.config.bind, app.config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("listening on {}", listener.local_addr()?);
    if app.clock.test_mode() {
        info!("test mode enabled: honoring {} header", crate::clock::TEST_NOW_HEADER);
    }

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

pub fn router(app: App) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/healthz", get(healthz))
        .route("/api/pastes", post(create_paste))
        .route("/api/pastes/:id", get(read_paste))
        .route("/p/:id", get(view_paste))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {err}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn index() -> &'static str {
    USAGE
}

async fn healthz(State(app): State<App>) -> impl IntoResponse {
    let ok = paste::health(&app).await;
    let status_code = if ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status_code, Json(Health { ok }))
}

async fn create_paste(
    State(app): State<App>,
    Now(now): Now,
    body: Bytes,
) -> crate::ApiResult<impl IntoResponse> {
    let value: serde_json::Value = serde_json::from_slice(&body)?;
    let created = paste::create(&app, NewPaste::try_from(value)?, now).await?;

    let path = format!("/p/{id}", id = created.id);
    Ok((StatusCode::CREATED, [(header::LOCATION, path)], Json(created)))
}

async fn read_paste(
    State(app): State<App>,
    Now(now): Now,
    Path(id): Path<String>,
) -> crate::ApiResult<impl IntoResponse> {
    let record = paste::read(&app, &id, now).await?;
    Ok(Json(PasteView::from(record)))
}

async fn view_paste(State(app): State<App>, Now(now): Now, Path(id): Path<String>) -> Response {
    match paste::read(&app, &id, now).await {
        Ok(record) => match pages::paste(&id, &record) {
            Ok(page) => Html(page).into_response(),
            Err(err) => err.into_response(),
        },
        Err(ApiError::NotFound) => {
            (StatusCode::NOT_FOUND, Html(pages::not_found())).into_response()
        }
        Err(err) => err.into_response(),
    }
}
