// SPDX-License-Identifier: MIT

//! Route handlers for the control plane, exactly matching the wire
//! contract: JSON bodies where the route table says so, plain text
//! everywhere else, filesystem errors mapped to 404/500.

use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chron_storage::{Mailbox, StorageError};
use chron_supervisor::{SupervisorView, TerminateOutcome};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
struct AppState {
    view: Arc<dyn SupervisorView>,
    mailbox: Arc<Mailbox>,
}

/// Build the control-plane router over a [`SupervisorView`] and the
/// shared [`Mailbox`]. Kept separate from the concrete supervisor type
/// per the cyclic-ownership design note.
pub fn app(view: Arc<dyn SupervisorView>, mailbox: Arc<Mailbox>) -> Router {
    let state = AppState { view, mailbox };
    Router::new()
        .route("/", get(list_jobs))
        .route("/job/:name/status", get(job_status))
        .route("/job/:name/logs", get(stream_logs).delete(delete_logs))
        .route(
            "/job/:name/mailbox",
            get(job_mailbox)
                .post(post_job_mailbox)
                .delete(clear_job_mailbox),
        )
        .route("/job/:name/terminate", post(terminate_job))
        .route("/mailbox/messages", get(all_messages).delete(clear_all_messages))
        .route("/mailbox/count", get(mailbox_count))
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.view.list_jobs())
}

async fn job_status(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.view.job_status(&name).await {
        Some(status) => Json(status).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stream_logs(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(path) = state.view.log_path(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::File::open(&path).await {
        Ok(file) => Body::from_stream(ReaderStream::new(file)).into_response(),
        Err(err) => io_error_response(&err),
    }
}

async fn delete_logs(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    let Some(path) = state.view.log_path(&name) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    match tokio::fs::remove_file(&path).await {
        Ok(()) => (StatusCode::OK, "Deleted log file").into_response(),
        Err(err) => io_error_response(&err),
    }
}

async fn job_mailbox(State(state): State<AppState>, Path(name): Path<String>) -> impl IntoResponse {
    Json(state.mailbox.list_by(&name).await)
}

async fn post_job_mailbox(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: String,
) -> Response {
    match state.mailbox.add(&name, &body).await {
        Ok(message) => Json(message).into_response(),
        Err(err) => storage_error_response(&err),
    }
}

async fn clear_job_mailbox(State(state): State<AppState>, Path(name): Path<String>) -> Response {
    match state.mailbox.clear_by(&name).await {
        Ok(removed) => Json(removed).into_response(),
        Err(err) => storage_error_response(&err),
    }
}

async fn terminate_job(State(state): State<AppState>, Path(name): Path<String>) -> impl IntoResponse {
    match state.view.terminate(&name).await {
        Some(TerminateOutcome::Terminated) => "Terminated job",
        _ => "Job not running",
    }
}

async fn all_messages(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.mailbox.list_all().await)
}

async fn clear_all_messages(State(state): State<AppState>) -> Response {
    match state.mailbox.clear_all().await {
        Ok(removed) => Json(removed).into_response(),
        Err(err) => storage_error_response(&err),
    }
}

async fn mailbox_count(State(state): State<AppState>) -> impl IntoResponse {
    state.mailbox.list_all().await.len().to_string()
}

async fn unknown_route() -> impl IntoResponse {
    (StatusCode::BAD_REQUEST, "no such route")
}

fn io_error_response(err: &std::io::Error) -> Response {
    if err.kind() == std::io::ErrorKind::NotFound {
        StatusCode::NOT_FOUND.into_response()
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
    }
}

fn storage_error_response(err: &StorageError) -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
}

#[cfg(test)]
#[path = "routes_tests.rs"]
mod tests;
