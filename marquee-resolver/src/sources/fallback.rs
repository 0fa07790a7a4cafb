//! Fallback base source
//!
//! Queried only after the primary source fails, and its success is required
//! for the resolution to proceed.
//!
//! # API Reference
//! - Endpoint: `{fallback_url}/titles/{id}`
//! - Discriminator: non-empty `primaryTitle`

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    get_json, iso_date, lenient, lenient_seq, metascore, positive_f64, positive_i32,
    positive_u32, positive_u64, present, present_all, present_opt, SourceAdapter,
};
use crate::partial::BasePartial;
use crate::title_id::TitleId;
use crate::types::{AdapterError, Person, Source, TitleKind};

/// Provider `type` values that denote a series
const SERIES_TYPES: &[&str] = &["tvSeries", "tvMiniSeries"];

pub struct FallbackAdapter {
    client: Client,
    base_url: String,
}

impl FallbackAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for FallbackAdapter {
    type Output = BasePartial;

    fn source(&self) -> Source {
        Source::FallbackBase
    }

    async fn fetch(&self, id: &TitleId) -> Result<BasePartial, AdapterError> {
        let url = format!("{}/titles/{}", self.base_url, id);
        let raw: RawTitle = get_json(&self.client, self.source(), &url, &[]).await?;
        let partial = raw.into_partial()?;

        debug!(
            title_id = %id,
            title = %partial.primary_title,
            kind = ?partial.kind,
            "Fallback base title decoded"
        );
        Ok(partial)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawTitle {
    #[serde(default, deserialize_with = "lenient", rename = "type")]
    kind: String,
    #[serde(default, deserialize_with = "lenient")]
    primary_title: String,
    #[serde(default, deserialize_with = "lenient")]
    start_year: i64,
    #[serde(default, deserialize_with = "lenient")]
    end_year: i64,
    #[serde(default, deserialize_with = "lenient")]
    runtime_seconds: i64,
    #[serde(default, deserialize_with = "lenient")]
    plot: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    genres: Vec<String>,
    #[serde(default, deserialize_with = "lenient")]
    rating: Option<RawRating>,
    #[serde(default, deserialize_with = "lenient")]
    primary_image: Option<RawImage>,
    #[serde(default, deserialize_with = "lenient")]
    release_date: Option<RawDate>,
    #[serde(default, deserialize_with = "lenient")]
    metacritic: Option<RawMetacritic>,
    #[serde(default, deserialize_with = "lenient_seq")]
    directors: Vec<RawName>,
    #[serde(default, deserialize_with = "lenient_seq")]
    writers: Vec<RawName>,
    #[serde(default, deserialize_with = "lenient_seq")]
    stars: Vec<RawName>,
    #[serde(default, deserialize_with = "lenient_seq")]
    interests: Vec<RawNamed>,
    #[serde(default, deserialize_with = "lenient_seq")]
    origin_countries: Vec<RawNamed>,
    #[serde(default, deserialize_with = "lenient_seq")]
    spoken_languages: Vec<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRating {
    #[serde(default, deserialize_with = "lenient")]
    aggregate_rating: f64,
    #[serde(default, deserialize_with = "lenient")]
    vote_count: i64,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawImage {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) url: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetacritic {
    #[serde(default, deserialize_with = "lenient")]
    score: i64,
}

/// Person reference in the provider's name space
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawName {
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) id: String,
    #[serde(default, deserialize_with = "lenient")]
    pub(crate) display_name: String,
}

impl RawName {
    pub(crate) fn to_person(&self) -> Option<Person> {
        let name = present(&self.display_name)?;
        Some(Person::imdb(name, self.id.trim()))
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawNamed {
    #[serde(default, deserialize_with = "lenient")]
    name: String,
}

/// Release dates arrive either as `YYYY-MM-DD` text or as date parts
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawDate {
    Text(String),
    Parts {
        year: i32,
        #[serde(default)]
        month: u32,
        #[serde(default)]
        day: u32,
    },
}

impl RawDate {
    fn to_date(&self) -> Option<NaiveDate> {
        match self {
            RawDate::Text(text) => iso_date(text),
            RawDate::Parts { year, month, day } => NaiveDate::from_ymd_opt(*year, *month, *day),
        }
    }
}

fn people(names: &[RawName]) -> Vec<Person> {
    names.iter().filter_map(RawName::to_person).collect()
}

fn names(named: &[RawNamed]) -> Vec<String> {
    present_all(named.iter().map(|n| n.name.as_str()))
}

pub(crate) fn kind_of(raw_type: &str) -> TitleKind {
    if SERIES_TYPES.contains(&raw_type) {
        TitleKind::Series
    } else {
        TitleKind::Movie
    }
}

impl RawTitle {
    pub(crate) fn into_partial(self) -> Result<BasePartial, AdapterError> {
        let title = present(&self.primary_title).ok_or_else(|| {
            AdapterError::not_found(Source::FallbackBase, "response has no primaryTitle")
        })?;

        let kind = kind_of(&self.kind);
        let mut partial = BasePartial::new(kind, title);

        partial.start_year = positive_i32(self.start_year);
        if kind == TitleKind::Series {
            partial.end_year = positive_i32(self.end_year);
        }
        partial.runtime_seconds = positive_u32(self.runtime_seconds);
        partial.plot = present_opt(self.plot.as_deref());
        partial.genres = present_all(self.genres.iter().map(String::as_str));
        partial.interests = names(&self.interests);
        partial.origin_countries = names(&self.origin_countries);
        partial.spoken_languages = names(&self.spoken_languages);

        if let Some(rating) = &self.rating {
            partial.rating = positive_f64(rating.aggregate_rating);
            if partial.rating.is_some() {
                partial.vote_count = positive_u64(rating.vote_count);
            }
        }
        partial.metascore = self.metacritic.as_ref().and_then(|m| metascore(m.score));
        partial.poster_url = self.primary_image.as_ref().and_then(|i| present(&i.url));
        partial.release_date = self.release_date.as_ref().and_then(RawDate::to_date);

        partial.directors = people(&self.directors);
        partial.writers = people(&self.writers);
        partial.stars = people(&self.stars);

        Ok(partial)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorKind, IdNamespace};
    use serde_json::json;

    fn decode(value: serde_json::Value) -> Result<BasePartial, AdapterError> {
        serde_json::from_value::<RawTitle>(value).unwrap().into_partial()
    }

    #[test]
    fn test_full_movie_response() {
        let partial = decode(json!({
            "id": "tt1375666",
            "type": "movie",
            "primaryTitle": "Inception",
            "startYear": 2010,
            "runtimeSeconds": 8880,
            "plot": "A thief who steals corporate secrets...",
            "genres": ["Action", "Adventure", "Sci-Fi"],
            "rating": {"aggregateRating": 8.8, "voteCount": 2600000},
            "metacritic": {"score": 74, "reviewCount": 42},
            "primaryImage": {"url": "https://m.media-amazon.com/images/M/inception.jpg"},
            "releaseDate": "2010-07-16",
            "directors": [{"id": "nm0634240", "displayName": "Christopher Nolan"}],
            "writers": [{"id": "nm0634240", "displayName": "Christopher Nolan"}],
            "stars": [{"id": "nm0000138", "displayName": "Leonardo DiCaprio"}],
            "interests": [{"name": "Heist"}],
            "originCountries": [{"code": "US", "name": "United States"}, {"code": "GB", "name": "United Kingdom"}],
            "spokenLanguages": [{"code": "eng", "name": "English"}]
        }))
        .unwrap();

        assert_eq!(partial.kind, TitleKind::Movie);
        assert_eq!(partial.primary_title, "Inception");
        assert_eq!(partial.start_year, Some(2010));
        assert_eq!(partial.end_year, None);
        assert_eq!(partial.runtime_seconds, Some(8880));
        assert_eq!(partial.rating, Some(8.8));
        assert_eq!(partial.vote_count, Some(2_600_000));
        assert_eq!(partial.metascore, Some(74));
        assert_eq!(partial.release_date, NaiveDate::from_ymd_opt(2010, 7, 16));
        assert_eq!(partial.origin_countries, vec!["United States", "United Kingdom"]);
        assert_eq!(partial.directors[0].external_id.namespace, IdNamespace::Imdb);
        assert_eq!(partial.directors[0].external_id.id, "nm0634240");
        assert_eq!(partial.interests, vec!["Heist"]);
    }

    #[test]
    fn test_series_keeps_end_year_and_date_parts() {
        let partial = decode(json!({
            "type": "tvSeries",
            "primaryTitle": "Breaking Bad",
            "startYear": 2008,
            "endYear": 2013,
            "releaseDate": {"year": 2008, "month": 1, "day": 20}
        }))
        .unwrap();
        assert_eq!(partial.kind, TitleKind::Series);
        assert_eq!(partial.end_year, Some(2013));
        assert_eq!(partial.release_date, NaiveDate::from_ymd_opt(2008, 1, 20));

        let partial = decode(json!({"type": "tvMiniSeries", "primaryTitle": "Chernobyl"})).unwrap();
        assert_eq!(partial.kind, TitleKind::Series);
    }

    #[test]
    fn test_zero_and_sentinel_values_are_absent() {
        let partial = decode(json!({
            "type": "movie",
            "primaryTitle": "Obscure",
            "startYear": 0,
            "runtimeSeconds": 0,
            "plot": "N/A",
            "rating": {"aggregateRating": 0, "voteCount": 0},
            "metacritic": {"score": 0},
            "primaryImage": {"url": ""},
            "genres": ["N/A"]
        }))
        .unwrap();
        assert_eq!(partial.start_year, None);
        assert_eq!(partial.runtime_seconds, None);
        assert_eq!(partial.plot, None);
        assert_eq!(partial.rating, None);
        assert_eq!(partial.vote_count, None);
        assert_eq!(partial.metascore, None);
        assert_eq!(partial.poster_url, None);
        assert!(partial.genres.is_empty());
    }

    #[test]
    fn test_missing_title_is_not_found() {
        let err = decode(json!({"type": "movie", "startYear": 2010})).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        assert_eq!(err.source, Source::FallbackBase);
    }

    #[test]
    fn test_mistyped_optional_field_does_not_reject() {
        let partial = decode(json!({
            "type": "movie",
            "primaryTitle": "Inception",
            "startYear": "2010",
            "genres": "Action"
        }))
        .unwrap();
        assert_eq!(partial.start_year, None);
        assert!(partial.genres.is_empty());
    }
}
