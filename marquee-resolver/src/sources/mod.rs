//! Upstream source adapters
//!
//! Each adapter issues its request(s) to one upstream API, decodes the
//! provider's own JSON shape and hands back a typed partial record or an
//! [`AdapterError`]. Adapters never panic and never retry.
//!
//! # Decoding
//! Decoding is lenient: unknown fields are ignored, and missing, null or
//! mistyped fields become "absent" rather than failing the whole response.
//! Only a body that is not JSON at all, or a missing discriminator, rejects a
//! response.

pub mod aggregator;
pub mod credits;
pub mod fallback;
pub mod primary;
pub mod ratings;
pub mod search;

pub use aggregator::AggregatorAdapter;
pub use credits::CreditsAdapter;
pub use fallback::FallbackAdapter;
pub use primary::PrimaryAdapter;
pub use ratings::RatingsAdapter;
pub use search::TitleSearch;

use async_trait::async_trait;
use chrono::NaiveDate;
use marquee_common::config::UpstreamConfig;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::title_id::TitleId;
use crate::types::{AdapterError, Source};

/// Literal used by several providers for "no value"
pub const NOT_AVAILABLE: &str = "N/A";

/// One upstream source
///
/// Implementations report every failure as an [`AdapterError`] tagged with
/// [`SourceAdapter::source`]; the resolver decides what a failure means.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Partial record this source produces
    type Output: Send + 'static;

    /// Source tag for provenance and error reporting
    fn source(&self) -> Source;

    /// Fetch everything this source knows about `id`
    async fn fetch(&self, id: &TitleId) -> Result<Self::Output, AdapterError>;
}

/// Build the HTTP client shared by every adapter
pub fn build_client(config: &UpstreamConfig) -> Result<Client, marquee_common::Error> {
    Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(|e| marquee_common::Error::Internal(format!("Failed to create HTTP client: {}", e)))
}

/// GET `url` and decode the JSON body
///
/// - transport failure or non-2xx status → `Unreachable`
/// - 404 → `NotFound`
/// - body that does not decode as `T` → `Malformed`
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &Client,
    source: Source,
    url: &str,
    query: &[(&str, &str)],
) -> Result<T, AdapterError> {
    debug!(source = %source, url = %url, "Upstream request");

    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| AdapterError::unreachable(source, format!("request failed: {}", e)))?;

    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Err(AdapterError::not_found(source, format!("{} returned 404", url)));
    }
    if !status.is_success() {
        return Err(AdapterError::unreachable(
            source,
            format!("{} returned {}", url, status),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| AdapterError::unreachable(source, format!("failed to read body: {}", e)))?;

    serde_json::from_slice(&body)
        .map_err(|e| AdapterError::malformed(source, format!("failed to decode body: {}", e)))
}

// ============================================================================
// Lenient decoding helpers
// ============================================================================

/// Field deserializer that turns null or mistyped values into `T::default()`
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// List deserializer that drops elements failing to decode instead of the whole list
pub(crate) fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Array(items) => items,
        _ => return Ok(Vec::new()),
    };
    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}

/// Non-empty, non-sentinel text
pub(crate) fn present(text: &str) -> Option<String> {
    let text = text.trim();
    if text.is_empty() || text == NOT_AVAILABLE {
        None
    } else {
        Some(text.to_string())
    }
}

pub(crate) fn present_opt(text: Option<&str>) -> Option<String> {
    text.and_then(present)
}

/// Non-empty, non-sentinel entries, preserving order
pub(crate) fn present_all<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    items.into_iter().filter_map(present).collect()
}

/// Positive numbers only; zero is a provider's "no value"
pub(crate) fn positive_f64(value: f64) -> Option<f64> {
    (value.is_finite() && value > 0.0).then_some(value)
}

pub(crate) fn positive_u32(value: i64) -> Option<u32> {
    u32::try_from(value).ok().filter(|v| *v > 0)
}

pub(crate) fn positive_u64(value: i64) -> Option<u64> {
    u64::try_from(value).ok().filter(|v| *v > 0)
}

pub(crate) fn positive_i32(value: i64) -> Option<i32> {
    i32::try_from(value).ok().filter(|v| *v > 0)
}

pub(crate) fn positive_i64(value: i64) -> Option<i64> {
    (value > 0).then_some(value)
}

/// Metascore on the 0-100 scale; zero is absent
pub(crate) fn metascore(value: i64) -> Option<u8> {
    u8::try_from(value).ok().filter(|v| (1..=100).contains(v))
}

/// `YYYY-MM-DD` dates
pub(crate) fn iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").ok()
}

/// Plain text of an HTML fragment, entities decoded
pub(crate) fn html_text(fragment: &str) -> Option<String> {
    let fragment = fragment.replace("<br/>", "\n").replace("<br>", "\n");
    let document = scraper::Html::parse_fragment(&fragment);
    let text: String = document.root_element().text().collect();
    present(&text)
}
