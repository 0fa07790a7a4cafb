//! marquee-resolver library interface
//!
//! Movie and series title resolution across several upstream sources:
//! - [`sources`]: one adapter per upstream API
//! - [`resolver`]: primary-then-fallback orchestration with concurrent enrichment
//! - [`merge`]: field precedence across the fallback sources
//! - [`api`]: HTTP surface over the resolver

pub mod api;
pub mod error;
pub mod merge;
pub mod partial;
pub mod publish;
pub mod resolver;
pub mod sources;
pub mod title_id;
pub mod types;

pub use crate::error::{ApiError, ApiResult};
pub use crate::resolver::Resolver;
pub use crate::title_id::TitleId;
pub use crate::types::{Source, TitleRecord};

use axum::Router;
use chrono::{DateTime, Utc};
use marquee_common::config::TomlConfig;
use marquee_common::Decorations;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::sources::{build_client, TitleSearch};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<Resolver>,
    pub search: Arc<TitleSearch>,
    pub decorations: Arc<Decorations>,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(resolver: Resolver, search: TitleSearch, decorations: Decorations) -> Self {
        Self {
            resolver: Arc::new(resolver),
            search: Arc::new(search),
            decorations: Arc::new(decorations),
            startup_time: Utc::now(),
        }
    }

    /// State wired to the real upstreams, sharing one HTTP client
    pub fn from_config(config: &TomlConfig) -> marquee_common::Result<Self> {
        let client = build_client(&config.upstream)?;
        let search = TitleSearch::new(client.clone(), config.upstream.fallback_url.clone());
        Ok(Self::new(
            Resolver::with_client(client, config),
            search,
            Decorations::with_overrides(&config.decorations),
        ))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::title_routes())
        .merge(api::search_routes())
        .merge(api::health_routes())
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
