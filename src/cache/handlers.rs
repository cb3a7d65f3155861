use axum::{
    Json,
    body::Bytes,
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use super::engine::CacheEngine;
use crate::error::CacheError;
use crate::replication::protocol::{MutationEvent, ORIGIN_HEADER, parse_replicate_payload};

#[derive(Debug, Deserialize)]
pub struct AddParams {
    pub key: Option<String>,
    pub value: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KeyParams {
    pub key: Option<String>,
}

pub async fn handle_add(
    Extension(engine): Extension<Arc<CacheEngine>>,
    Query(params): Query<AddParams>,
) -> Result<StatusCode, CacheError> {
    let key = required("key", params.key)?;
    let value = required("value", params.value)?;
    line_safe("key", &key)?;
    line_safe("value", &value)?;

    engine.add(key, value).await;
    Ok(StatusCode::OK)
}

pub async fn handle_get(
    Extension(engine): Extension<Arc<CacheEngine>>,
    Query(params): Query<KeyParams>,
) -> Result<Response, CacheError> {
    let key = required("key", params.key)?;

    match engine.get(&key) {
        Some(value) => {
            tracing::debug!("Retrieved value for key {} on {}", key, engine.node_id());
            Ok(Json(HashMap::from([(key, value)])).into_response())
        }
        None => Ok((StatusCode::NOT_FOUND, "key not found").into_response()),
    }
}

pub async fn handle_delete(
    Extension(engine): Extension<Arc<CacheEngine>>,
    Query(params): Query<KeyParams>,
) -> Result<StatusCode, CacheError> {
    let key = required("key", params.key)?;

    engine.delete(key).await;
    Ok(StatusCode::OK)
}

/// Applies upserts forwarded by a peer. The body is parsed as raw bytes so that
/// every malformed payload maps to 400, whatever the content type.
pub async fn handle_replicate(
    Extension(engine): Extension<Arc<CacheEngine>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, CacheError> {
    let events = parse_replicate_payload(&body)?;
    for event in &events {
        if let MutationEvent::Upsert { key, value } = event {
            line_safe("key", key)?;
            line_safe("value", value)?;
        }
    }

    let origin = origin_of(&headers);
    let count = events.len();
    for event in events {
        engine.apply_replicated(event, origin.as_deref()).await;
    }

    tracing::info!(
        "Replicated {} entr{} from {} on {}",
        count,
        if count == 1 { "y" } else { "ies" },
        origin.as_deref().unwrap_or("unknown peer"),
        engine.node_id()
    );
    Ok(StatusCode::OK)
}

pub async fn handle_replicate_delete(
    Extension(engine): Extension<Arc<CacheEngine>>,
    headers: HeaderMap,
    Query(params): Query<KeyParams>,
) -> Result<StatusCode, CacheError> {
    let key = required("key", params.key)?;
    let origin = origin_of(&headers);
    engine
        .apply_replicated(MutationEvent::Delete { key }, origin.as_deref())
        .await;
    Ok(StatusCode::OK)
}

pub async fn handle_cache_content(
    Extension(engine): Extension<Arc<CacheEngine>>,
) -> impl IntoResponse {
    let content = engine.render_snapshot();
    tracing::debug!("Retrieved cache content on {}", engine.node_id());
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        content,
    )
}

fn required(name: &'static str, value: Option<String>) -> Result<String, CacheError> {
    match value {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(CacheError::MissingParameter(name)),
    }
}

fn line_safe(name: &'static str, value: &str) -> Result<(), CacheError> {
    if value.contains(['\n', '\r']) {
        return Err(CacheError::InvalidParameter { name });
    }
    Ok(())
}

fn origin_of(headers: &HeaderMap) -> Option<String> {
    headers
        .get(ORIGIN_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}
