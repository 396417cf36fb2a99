//! HTTP request handlers.

use crate::metrics::METRICS;
use crate::middleware::RequestId;
use crate::response::HealthResponse;
use crate::state::AppState;
use crate::upload::{multipart_error, stage_field, TempUpload};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use minter_types::ErrorBody;
use serde_json::Value;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Multipart field carrying the binary payload.
const FILE_FIELD: &str = "file";
/// Optional multipart text field overriding the pin name.
const NAME_FIELD: &str = "name";

/// Pin an uploaded file. `POST /api/pin/file`
pub async fn pin_file(
    State(state): State<Arc<AppState>>,
    req_id: RequestId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    METRICS.pin_file_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let result = match multipart {
        Ok(multipart) => forward_file(&state, &req_id, multipart).await,
        Err(rejection) => Err(crate::Error::BadRequest(rejection.body_text())),
    };
    respond(&req_id, "file", result)
}

async fn forward_file(
    state: &AppState,
    req_id: &RequestId,
    mut multipart: Multipart,
) -> Result<Value, crate::Error> {
    let limit = state.config.max_file_bytes;
    let mut staged: Option<TempUpload> = None;
    let mut name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some(FILE_FIELD) if staged.is_none() => {
                staged = Some(stage_field(field, &state.upload_dir, limit).await?);
            }
            Some(NAME_FIELD) => {
                let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
                name = Some(text).filter(|t| !t.trim().is_empty());
            }
            _ => {}
        }
    }

    let upload = staged.ok_or_else(|| {
        crate::Error::BadRequest(format!("Missing '{FILE_FIELD}' field"))
    })?;
    let pin_name = name.unwrap_or_else(|| upload.file_name.clone());

    info!(
        req_id = %req_id,
        file = %upload.file_name,
        size = upload.size,
        "Forwarding file to pinning service"
    );

    // `upload` is dropped on return, removing the staged file on every path.
    state.pinata.pin_file(&upload, &pin_name).await
}

/// Pin a JSON document. `POST /api/pin/json`
pub async fn pin_json(
    State(state): State<Arc<AppState>>,
    req_id: RequestId,
    body: Result<Json<Value>, JsonRejection>,
) -> Response {
    METRICS.pin_json_total.fetch_add(1, Ordering::Relaxed);
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let result = match body {
        Ok(Json(document)) => forward_json(&state, &req_id, document).await,
        Err(rejection) => Err(crate::Error::BadRequest(rejection.body_text())),
    };
    respond(&req_id, "json", result)
}

async fn forward_json(
    state: &AppState,
    req_id: &RequestId,
    document: Value,
) -> Result<Value, crate::Error> {
    if !document.is_object() {
        return Err(crate::Error::BadRequest(
            "Request body must be a JSON object".into(),
        ));
    }

    let name = document
        .get("name")
        .and_then(Value::as_str)
        .map(str::to_string);

    info!(req_id = %req_id, name = ?name, "Forwarding JSON to pinning service");

    state.pinata.pin_json(document, name.as_deref()).await
}

fn respond(req_id: &RequestId, kind: &'static str, result: Result<Value, crate::Error>) -> Response {
    match result {
        Ok(pinned) => {
            METRICS.pin_success.fetch_add(1, Ordering::Relaxed);
            let cid = pinned.get("IpfsHash").and_then(Value::as_str).unwrap_or("?");
            info!(req_id = %req_id, kind, cid, "Pinned");
            (StatusCode::OK, Json(pinned)).into_response()
        }
        Err(e) => {
            METRICS.pin_error.fetch_add(1, Ordering::Relaxed);
            warn!(req_id = %req_id, kind, error = %e, "Pin failed");
            e.into_response()
        }
    }
}

/// Anything but POST on a pin route.
pub async fn method_not_allowed() -> impl IntoResponse {
    METRICS.rejected_method.fetch_add(1, Ordering::Relaxed);
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        Json(ErrorBody::new("Method not allowed")),
    )
}

/// Prometheus metrics in text exposition format.
pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        METRICS.render(),
    )
}

/// Health check with upstream credential status.
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.pinata.health_check().await;

    Json(HealthResponse {
        status,
        pinning_api: state.pinata.base_url().to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
        requests: state.request_count.load(Ordering::Relaxed),
        max_file_bytes: state.config.max_file_bytes,
    })
}
