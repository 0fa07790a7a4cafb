//! Title resolution endpoints
//!
//! - `GET /titles/:id` resolves and returns the record as JSON
//! - `GET /titles/:id/events` streams progress as SSE, ending with a `record`
//!   or `failed` event
//! - `GET /open/:payload` decodes an `open_<method>_<id>` payload and resolves it
//!
//! `:id` may be any text containing a title id, such as a full IMDb link.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures::stream::Stream;
use marquee_common::events::progress_channel;
use marquee_common::Decorations;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::{ApiError, ApiResult};
use crate::title_id::{OpenRequest, TitleId};
use crate::types::{ErrorKind, TitleRecord};
use crate::AppState;

/// A name paired with its display decoration
#[derive(Debug, Clone, Serialize)]
pub struct Decorated {
    pub name: String,
    pub decoration: String,
}

/// Resolved record plus the derived links and decorations a formatter needs
#[derive(Debug, Clone, Serialize)]
pub struct TitleResponse {
    #[serde(flatten)]
    pub record: TitleRecord,
    pub imdb_url: String,
    pub awards_url: String,
    pub genre_decorations: Vec<Decorated>,
    pub country_decorations: Vec<Decorated>,
}

impl TitleResponse {
    pub fn new(record: TitleRecord, decorations: &Decorations) -> Self {
        let pair = |(name, decoration): (String, String)| Decorated { name, decoration };
        Self {
            imdb_url: record.imdb_url(),
            awards_url: record.awards_url(),
            genre_decorations: record.decorated_genres(decorations).into_iter().map(pair).collect(),
            country_decorations: record
                .decorated_countries(decorations)
                .into_iter()
                .map(pair)
                .collect(),
            record,
        }
    }
}

fn parse_id(raw: &str) -> ApiResult<TitleId> {
    TitleId::find(raw).ok_or_else(|| ApiError::BadRequest(format!("No title id in {:?}", raw)))
}

async fn resolve_response(state: &AppState, id: &TitleId) -> ApiResult<Json<TitleResponse>> {
    let record = state.resolver.resolve(id, None).await?;
    info!(title_id = %id, sources = ?record.sources_used, "Title served");
    Ok(Json(TitleResponse::new(record, &state.decorations)))
}

/// GET /titles/:id
pub async fn get_title(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Json<TitleResponse>> {
    let id = parse_id(&raw)?;
    resolve_response(&state, &id).await
}

/// GET /open/:payload
pub async fn open_title(
    State(state): State<AppState>,
    Path(payload): Path<String>,
) -> ApiResult<Json<TitleResponse>> {
    let request = OpenRequest::parse(&payload)?;
    debug!(method = request.method.as_str(), title_id = %request.id, "Open request");
    resolve_response(&state, &request.id).await
}

fn failure_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "NOT_FOUND",
        ErrorKind::Unreachable | ErrorKind::Malformed => "UPSTREAM_ERROR",
    }
}

/// GET /titles/:id/events
///
/// Events:
/// - `progress`: one per resolution stage
/// - `record`: the resolved title (final)
/// - `failed`: `{code, message}` when resolution fails (final)
pub async fn title_event_stream(
    State(state): State<AppState>,
    Path(raw): Path<String>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let id = parse_id(&raw)?;
    info!(title_id = %id, "New SSE client for title resolution");

    let (tx, mut rx) = progress_channel();
    let resolver = Arc::clone(&state.resolver);
    let task_id = id.clone();
    // The sender lives in the task, so the progress channel closes when resolution ends
    let resolution = tokio::spawn(async move { resolver.resolve(&task_id, Some(&tx)).await });
    let decorations = Arc::clone(&state.decorations);

    let stream = async_stream::stream! {
        while let Some(progress) = rx.recv().await {
            match serde_json::to_string(&progress) {
                Ok(json) => yield Ok(Event::default().event("progress").data(json)),
                Err(e) => warn!("SSE: Failed to serialize progress event: {}", e),
            }
        }

        let (name, payload) = match resolution.await {
            Ok(Ok(record)) => match serde_json::to_value(TitleResponse::new(record, &decorations)) {
                Ok(value) => ("record", value),
                Err(e) => ("failed", json!({"code": "INTERNAL_ERROR", "message": e.to_string()})),
            },
            Ok(Err(e)) => ("failed", json!({"code": failure_code(e.kind), "message": e.to_string()})),
            Err(e) => ("failed", json!({"code": "INTERNAL_ERROR", "message": e.to_string()})),
        };
        debug!(title_id = %id, event = name, "SSE: Resolution finished");
        yield Ok(Event::default().event(name).data(payload.to_string()));
    };

    Ok(Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("heartbeat"),
    ))
}

pub fn title_routes() -> Router<AppState> {
    Router::new()
        .route("/titles/:id", get(get_title))
        .route("/titles/:id/events", get(title_event_stream))
        .route("/open/:payload", get(open_title))
}
