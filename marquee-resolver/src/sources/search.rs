//! Free-text title search
//!
//! Search runs against the fallback provider only. Each hit carries a title id
//! that can be fed straight back into a resolution.
//!
//! # API Reference
//! - Endpoint: `{fallback_url}/search/titles?query={text}`

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::fallback::RawImage;
use super::{get_json, lenient, lenient_seq, positive_f64, positive_i32, present};
use crate::title_id::TitleId;
use crate::types::{AdapterError, Source};

/// One search result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub id: TitleId,
    pub title: String,
    pub year: Option<i32>,
    pub poster_url: Option<String>,
    /// Human-readable title type ("Movie", "TV Series", ...)
    pub kind_label: Option<String>,
    pub rating: Option<f64>,
}

pub struct TitleSearch {
    client: Client,
    base_url: String,
}

impl TitleSearch {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Search titles by free text; zero hits is `NotFound`
    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, AdapterError> {
        let url = format!("{}/search/titles", self.base_url);
        let raw: RawSearch =
            get_json(&self.client, Source::FallbackBase, &url, &[("query", query)]).await?;

        let hits = raw.into_hits();
        debug!(query = %query, hits = hits.len(), "Title search complete");

        if hits.is_empty() {
            return Err(AdapterError::not_found(
                Source::FallbackBase,
                format!("no titles match {:?}", query),
            ));
        }
        Ok(hits)
    }
}

/// Human label for a provider title type
pub(crate) fn kind_label(raw_type: &str) -> Option<String> {
    let label = match raw_type.trim() {
        "" => return None,
        "movie" => "Movie",
        "tvSeries" => "TV Series",
        "tvMiniSeries" => "TV Mini Series",
        "tvMovie" => "TV Movie",
        "tvSpecial" => "TV Special",
        "tvEpisode" => "TV Episode",
        "short" => "Short",
        "videoGame" => "Video Game",
        "video" => "Video",
        other => {
            let mut chars = other.chars();
            let first = chars.next()?;
            return Some(first.to_uppercase().chain(chars).collect());
        }
    };
    Some(label.to_string())
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawSearch {
    #[serde(default, deserialize_with = "lenient_seq")]
    titles: Vec<RawHit>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHit {
    #[serde(default, deserialize_with = "lenient")]
    id: String,
    #[serde(default, deserialize_with = "lenient")]
    primary_title: String,
    #[serde(default, deserialize_with = "lenient")]
    start_year: i64,
    #[serde(default, deserialize_with = "lenient")]
    primary_image: Option<RawImage>,
    #[serde(default, deserialize_with = "lenient", rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "lenient")]
    rating: Option<RawHitRating>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHitRating {
    #[serde(default, deserialize_with = "lenient")]
    aggregate_rating: f64,
}

impl RawSearch {
    pub(crate) fn into_hits(self) -> Vec<SearchHit> {
        self.titles
            .into_iter()
            .filter_map(|hit| {
                let id: TitleId = hit.id.parse().ok()?;
                let title = present(&hit.primary_title)?;
                Some(SearchHit {
                    id,
                    title,
                    year: positive_i32(hit.start_year),
                    poster_url: hit.primary_image.as_ref().and_then(|i| present(&i.url)),
                    kind_label: kind_label(&hit.kind),
                    rating: hit.rating.as_ref().and_then(|r| positive_f64(r.aggregate_rating)),
                })
            })
            .collect()
    }
}
