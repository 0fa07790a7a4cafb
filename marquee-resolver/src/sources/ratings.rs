//! Ratings-service enrichment source
//!
//! Supplies awards text and a few fill-in fields (release date, season count,
//! country). Every field uses the literal "N/A" for "no value".
//!
//! # API Reference
//! - Endpoint: `{ratings_url}?i={id}&apikey={key}`
//! - Discriminator: `Response` is not `"False"`

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{get_json, lenient, present, SourceAdapter};
use crate::partial::RatingsPartial;
use crate::title_id::TitleId;
use crate::types::{AdapterError, Source};

/// Format of the `Released` field ("16 Jul 2010")
const RELEASED_FORMAT: &str = "%d %b %Y";

pub struct RatingsAdapter {
    client: Client,
    url: String,
    api_key: String,
}

impl RatingsAdapter {
    pub fn new(client: Client, url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for RatingsAdapter {
    type Output = RatingsPartial;

    fn source(&self) -> Source {
        Source::Ratings
    }

    async fn fetch(&self, id: &TitleId) -> Result<RatingsPartial, AdapterError> {
        if self.api_key.is_empty() {
            return Err(AdapterError::unreachable(
                self.source(),
                "no API key configured",
            ));
        }

        let raw: RawFill = get_json(
            &self.client,
            self.source(),
            &self.url,
            &[("i", id.as_str()), ("apikey", self.api_key.as_str())],
        )
        .await?;

        let partial = raw.into_partial()?;
        debug!(title_id = %id, awards = ?partial.awards, "Ratings decoded");
        Ok(partial)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawFill {
    #[serde(default, deserialize_with = "lenient", rename = "Response")]
    response: String,
    #[serde(default, deserialize_with = "lenient", rename = "Error")]
    error: String,
    #[serde(default, deserialize_with = "lenient", rename = "Released")]
    released: String,
    #[serde(default, deserialize_with = "lenient", rename = "Awards")]
    awards: String,
    #[serde(default, deserialize_with = "lenient", rename = "totalSeasons")]
    total_seasons: String,
    #[serde(default, deserialize_with = "lenient", rename = "Country")]
    country: String,
}

impl RawFill {
    pub(crate) fn into_partial(self) -> Result<RatingsPartial, AdapterError> {
        if self.response.eq_ignore_ascii_case("false") {
            let reason = present(&self.error).unwrap_or_else(|| "no result".to_string());
            return Err(AdapterError::not_found(Source::Ratings, reason));
        }

        Ok(RatingsPartial {
            awards: present(&self.awards),
            released: present(&self.released)
                .and_then(|text| NaiveDate::parse_from_str(&text, RELEASED_FORMAT).ok()),
            total_seasons: present(&self.total_seasons)
                .and_then(|text| text.parse::<u32>().ok())
                .filter(|n| *n > 0),
            country: present(&self.country),
        })
    }
}
