//! Resolution orchestrator
//!
//! ```text
//! Init ──ok──────────────────────────────────────────────▶ Done (primary record)
//!   │ any error
//!   ▼
//! FallbackPath ──error──▶ Failed (ResolutionError, source FallbackBase)
//!   │ ok
//!   ▼
//! Enriching: Credits ║ Ratings ║ Aggregator   (join barrier, failures isolated)
//!   │
//!   ▼
//! Merging ──▶ Done
//! ```
//!
//! Every adapter call carries its own timeout; a timed-out call is an
//! `Unreachable` failure like any other. The primary source is called at most
//! once per resolution and is never retried.

use std::sync::Arc;
use std::time::Duration;

use marquee_common::config::TomlConfig;
use marquee_common::events::{ProgressEvent, ProgressSender, ResolveStage};
use reqwest::Client;
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, info, warn};

use crate::merge::{MergeInput, MergePolicy};
use crate::partial::{AggregatorPartial, BasePartial, CreditsPartial, RatingsPartial};
use crate::sources::{
    build_client, AggregatorAdapter, CreditsAdapter, FallbackAdapter, PrimaryAdapter,
    RatingsAdapter, SourceAdapter,
};
use crate::title_id::TitleId;
use crate::types::{AdapterError, ResolutionError, Source, TitleRecord};

/// Default per-adapter timeout
pub const DEFAULT_ADAPTER_TIMEOUT: Duration = Duration::from_secs(5);

pub type PrimarySource = Arc<dyn SourceAdapter<Output = TitleRecord>>;
pub type FallbackSource = Arc<dyn SourceAdapter<Output = BasePartial>>;
pub type CreditsSource = Arc<dyn SourceAdapter<Output = CreditsPartial>>;
pub type RatingsSource = Arc<dyn SourceAdapter<Output = RatingsPartial>>;
pub type AggregatorSource = Arc<dyn SourceAdapter<Output = AggregatorPartial>>;

/// The five upstream sources a resolver consults
pub struct Sources {
    pub primary: PrimarySource,
    pub fallback: FallbackSource,
    pub credits: CreditsSource,
    pub ratings: RatingsSource,
    pub aggregator: AggregatorSource,
}

/// Title resolution engine
///
/// Holds no per-resolution state; one instance serves concurrent callers.
pub struct Resolver {
    sources: Sources,
    policy: MergePolicy,
    timeout: Duration,
}

impl Resolver {
    pub fn new(sources: Sources) -> Self {
        Self {
            sources,
            policy: MergePolicy::default(),
            timeout: DEFAULT_ADAPTER_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: MergePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolver over the real HTTP adapters described by `config`
    pub fn from_config(config: &TomlConfig) -> Result<Self, marquee_common::Error> {
        let client = build_client(&config.upstream)?;
        Ok(Self::with_client(client, config))
    }

    /// Resolver sharing an existing HTTP client (and its connection pool)
    pub fn with_client(client: Client, config: &TomlConfig) -> Self {
        let upstream = &config.upstream;
        let sources = Sources {
            primary: Arc::new(PrimaryAdapter::new(client.clone(), upstream.primary_url.clone())),
            fallback: Arc::new(FallbackAdapter::new(client.clone(), upstream.fallback_url.clone())),
            credits: Arc::new(CreditsAdapter::new(client.clone(), upstream.fallback_url.clone())),
            ratings: Arc::new(RatingsAdapter::new(
                client.clone(),
                upstream.ratings_url.clone(),
                upstream.ratings_api_key.clone(),
            )),
            aggregator: Arc::new(AggregatorAdapter::new(
                client,
                upstream.aggregator_url.clone(),
                upstream.aggregator_image_url.clone(),
                upstream.aggregator_api_key.clone(),
            )),
        };

        Self::new(sources)
            .with_policy(MergePolicy::new(config.regions.clone()))
            .with_timeout(upstream.timeout())
    }

    pub fn policy(&self) -> &MergePolicy {
        &self.policy
    }

    /// Resolve `id` into a title record
    ///
    /// Only a fallback base failure surfaces as an error. Progress events are
    /// fire-and-forget and never affect the outcome.
    pub async fn resolve(
        &self,
        id: &TitleId,
        progress: Option<&ProgressSender>,
    ) -> Result<TitleRecord, ResolutionError> {
        let notify = |stage: ResolveStage, status: &str| {
            if let Some(progress) = progress {
                progress.notify(ProgressEvent::new(id.as_str(), stage, status));
            }
        };

        notify(ResolveStage::Primary, "Looking up title");
        match call(self.sources.primary.as_ref(), id, self.timeout).await {
            Ok(record) => {
                info!(title_id = %id, sources = ?record.sources_used, "Resolved from primary source");
                return Ok(record);
            }
            Err(e) => {
                warn!(title_id = %id, error = %e, "Primary source failed, falling back");
            }
        }

        notify(ResolveStage::Fallback, "Primary source unavailable, trying fallback");
        let base = match call(self.sources.fallback.as_ref(), id, self.timeout).await {
            Ok(base) => base,
            Err(e) => {
                warn!(title_id = %id, error = %e, "Fallback base source failed");
                return Err(e.into());
            }
        };

        notify(ResolveStage::Enriching, "Fetching credits, ratings and metadata");
        let credits = spawn_call(Arc::clone(&self.sources.credits), id.clone(), self.timeout);
        let ratings = spawn_call(Arc::clone(&self.sources.ratings), id.clone(), self.timeout);
        let aggregator = spawn_call(Arc::clone(&self.sources.aggregator), id.clone(), self.timeout);

        let (credits, ratings, aggregator) = tokio::join!(credits, ratings, aggregator);

        let input = MergeInput {
            id: id.clone(),
            base,
            credits: settle(id, Source::Credits, credits),
            ratings: settle(id, Source::Ratings, ratings),
            aggregator: settle(id, Source::Aggregator, aggregator),
        };

        let record = self.policy.merge(input);
        info!(title_id = %id, sources = ?record.sources_used, "Resolved from fallback sources");
        Ok(record)
    }
}

/// One adapter call under the per-adapter timeout
async fn call<A>(adapter: &A, id: &TitleId, limit: Duration) -> Result<A::Output, AdapterError>
where
    A: SourceAdapter + ?Sized,
{
    debug!(title_id = %id, source = %adapter.source(), "Calling source");
    match tokio::time::timeout(limit, adapter.fetch(id)).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::unreachable(
            adapter.source(),
            format!("timed out after {}ms", limit.as_millis()),
        )),
    }
}

fn spawn_call<T: Send + 'static>(
    adapter: Arc<dyn SourceAdapter<Output = T>>,
    id: TitleId,
    limit: Duration,
) -> JoinHandle<Result<T, AdapterError>> {
    tokio::spawn(async move { call(adapter.as_ref(), &id, limit).await })
}

/// Enrichment outcome as a value; every failure is logged and dropped
fn settle<T>(
    id: &TitleId,
    source: Source,
    joined: Result<Result<T, AdapterError>, JoinError>,
) -> Option<T> {
    match joined {
        Ok(Ok(partial)) => {
            debug!(title_id = %id, source = %source, "Enrichment succeeded");
            Some(partial)
        }
        Ok(Err(e)) => {
            warn!(title_id = %id, source = %source, error = %e, "Enrichment failed");
            None
        }
        Err(e) => {
            warn!(title_id = %id, source = %source, error = %e, "Enrichment task aborted");
            None
        }
    }
}

// ============================================================================
// Mock sources for testing
// ============================================================================
