//! Aggregator enrichment source
//!
//! The aggregator keys titles by its own numeric ids, so a fetch is two
//! requests: an external-id lookup that translates the title id into a
//! movie or tv id, then a detail request with credits, certifications and
//! alternative titles appended. Zero lookup matches abandon the fetch with
//! `NotFound` before the detail request is issued.
//!
//! # API Reference
//! - Lookup: `{aggregator_url}/find/{id}?external_source=imdb_id`
//! - Detail: `{aggregator_url}/{movie|tv}/{native_id}?append_to_response=...`

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    get_json, iso_date, lenient, lenient_seq, positive_i64, positive_u32, present, present_all,
    SourceAdapter,
};
use crate::partial::{AggregatorMedia, AggregatorPartial, AltTitle, CrewCredit, RegionalRating};
use crate::title_id::TitleId;
use crate::types::{AdapterError, Person, Source};

pub struct AggregatorAdapter {
    client: Client,
    base_url: String,
    image_url: String,
    api_key: String,
}

impl AggregatorAdapter {
    pub fn new(
        client: Client,
        base_url: impl Into<String>,
        image_url: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            image_url: image_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    /// Translate a title id into the aggregator's own id space
    async fn lookup(&self, id: &TitleId) -> Result<(AggregatorMedia, u64), AdapterError> {
        let url = format!("{}/find/{}", self.base_url, id);
        let found: RawFind = get_json(
            &self.client,
            self.source(),
            &url,
            &[("api_key", self.api_key.as_str()), ("external_source", "imdb_id")],
        )
        .await?;

        found.first_match().ok_or_else(|| {
            AdapterError::not_found(self.source(), format!("no aggregator match for {}", id))
        })
    }
}

#[async_trait]
impl SourceAdapter for AggregatorAdapter {
    type Output = AggregatorPartial;

    fn source(&self) -> Source {
        Source::Aggregator
    }

    async fn fetch(&self, id: &TitleId) -> Result<AggregatorPartial, AdapterError> {
        if self.api_key.is_empty() {
            return Err(AdapterError::unreachable(
                self.source(),
                "no API key configured",
            ));
        }

        let (media, native_id) = self.lookup(id).await?;
        debug!(title_id = %id, media = media.path(), native_id, "Aggregator lookup matched");

        let url = format!("{}/{}/{}", self.base_url, media.path(), native_id);
        let raw: RawDetail = get_json(
            &self.client,
            self.source(),
            &url,
            &[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", media.appended()),
            ],
        )
        .await?;

        let partial = raw.into_partial(media, native_id, &self.image_url);
        debug!(
            title_id = %id,
            title = ?partial.title,
            alt_titles = partial.alternative_titles.len(),
            crew = partial.crew.len(),
            "Aggregator detail decoded"
        );
        Ok(partial)
    }
}

// ============================================================================
// Wire format: lookup
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawFind {
    #[serde(default, deserialize_with = "lenient_seq")]
    movie_results: Vec<RawId>,
    #[serde(default, deserialize_with = "lenient_seq")]
    tv_results: Vec<RawId>,
}

#[derive(Debug, Default, Deserialize)]
struct RawId {
    #[serde(default, deserialize_with = "lenient")]
    id: u64,
}

impl RawFind {
    /// Movies win over series when both match
    pub(crate) fn first_match(&self) -> Option<(AggregatorMedia, u64)> {
        let movie = self.movie_results.iter().find(|r| r.id > 0);
        let tv = self.tv_results.iter().find(|r| r.id > 0);
        movie
            .map(|r| (AggregatorMedia::Movie, r.id))
            .or_else(|| tv.map(|r| (AggregatorMedia::Tv, r.id)))
    }
}

// ============================================================================
// Wire format: detail
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDetail {
    #[serde(default, deserialize_with = "lenient")]
    title: String,
    #[serde(default, deserialize_with = "lenient")]
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    original_title: String,
    #[serde(default, deserialize_with = "lenient")]
    original_name: String,
    #[serde(default, deserialize_with = "lenient")]
    poster_path: String,
    #[serde(default, deserialize_with = "lenient")]
    tagline: String,
    #[serde(default, deserialize_with = "lenient")]
    release_date: String,
    #[serde(default, deserialize_with = "lenient")]
    first_air_date: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    origin_country: Vec<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    production_countries: Vec<RawNamed>,
    #[serde(default, deserialize_with = "lenient")]
    credits: RawCredits,
    #[serde(default, deserialize_with = "lenient")]
    aggregate_credits: RawAggregateCredits,
    #[serde(default, deserialize_with = "lenient")]
    alternative_titles: RawAltTitles,
    #[serde(default, deserialize_with = "lenient")]
    release_dates: RawReleaseDates,
    #[serde(default, deserialize_with = "lenient")]
    content_ratings: RawContentRatings,
    #[serde(default, deserialize_with = "lenient")]
    number_of_seasons: i64,
    #[serde(default, deserialize_with = "lenient")]
    number_of_episodes: i64,
    #[serde(default, deserialize_with = "lenient_seq")]
    created_by: Vec<RawPerson>,
    #[serde(default, deserialize_with = "lenient")]
    budget: i64,
    #[serde(default, deserialize_with = "lenient")]
    revenue: i64,
    #[serde(default, deserialize_with = "lenient_seq")]
    production_companies: Vec<RawNamed>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNamed {
    #[serde(default, deserialize_with = "lenient")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawPerson {
    #[serde(default, deserialize_with = "lenient")]
    id: u64,
    #[serde(default, deserialize_with = "lenient")]
    name: String,
    #[serde(default, deserialize_with = "lenient")]
    character: String,
    #[serde(default, deserialize_with = "lenient")]
    job: String,
    #[serde(default, deserialize_with = "lenient")]
    department: String,
    /// Series cast: one entry per character played
    #[serde(default, deserialize_with = "lenient_seq")]
    roles: Vec<RawRole>,
    /// Series crew: one entry per job held
    #[serde(default, deserialize_with = "lenient_seq")]
    jobs: Vec<RawJob>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRole {
    #[serde(default, deserialize_with = "lenient")]
    character: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawJob {
    #[serde(default, deserialize_with = "lenient")]
    job: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawCredits {
    #[serde(default, deserialize_with = "lenient_seq")]
    cast: Vec<RawPerson>,
    #[serde(default, deserialize_with = "lenient_seq")]
    crew: Vec<RawPerson>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAggregateCredits {
    #[serde(default, deserialize_with = "lenient_seq")]
    cast: Vec<RawPerson>,
    #[serde(default, deserialize_with = "lenient_seq")]
    crew: Vec<RawPerson>,
}

/// Movies list alternatives under `titles`, series under `results`
#[derive(Debug, Default, Deserialize)]
struct RawAltTitles {
    #[serde(default, deserialize_with = "lenient_seq", alias = "results")]
    titles: Vec<RawAltTitle>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAltTitle {
    #[serde(default, deserialize_with = "lenient")]
    title: String,
    #[serde(default, deserialize_with = "lenient")]
    iso_3166_1: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawReleaseDates {
    #[serde(default, deserialize_with = "lenient_seq")]
    results: Vec<RawRegionReleases>,
}

#[derive(Debug, Default, Deserialize)]
struct RawRegionReleases {
    #[serde(default, deserialize_with = "lenient")]
    iso_3166_1: String,
    #[serde(default, deserialize_with = "lenient_seq")]
    release_dates: Vec<RawCertification>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCertification {
    #[serde(default, deserialize_with = "lenient")]
    certification: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawContentRatings {
    #[serde(default, deserialize_with = "lenient_seq")]
    results: Vec<RawContentRating>,
}

#[derive(Debug, Default, Deserialize)]
struct RawContentRating {
    #[serde(default, deserialize_with = "lenient")]
    iso_3166_1: String,
    #[serde(default, deserialize_with = "lenient")]
    rating: String,
}

impl RawPerson {
    fn to_person(&self, role: Option<String>) -> Option<Person> {
        let name = present(&self.name)?;
        Some(Person::aggregator(name, self.id).with_role(role))
    }

    fn as_cast(&self) -> Option<Person> {
        let character = present(&self.character)
            .or_else(|| self.roles.first().and_then(|r| present(&r.character)));
        self.to_person(character)
    }

    /// One credit per job; series crew lists several jobs per person
    fn as_crew(&self) -> Vec<CrewCredit> {
        let jobs: Vec<String> = if self.jobs.is_empty() {
            present(&self.job).into_iter().collect()
        } else {
            present_all(self.jobs.iter().map(|j| j.job.as_str()))
        };

        jobs.into_iter()
            .filter_map(|job| {
                let person = self.to_person(Some(job.clone()))?;
                Some(CrewCredit {
                    person,
                    job,
                    department: self.department.trim().to_string(),
                })
            })
            .collect()
    }
}

impl RawDetail {
    pub(crate) fn into_partial(
        self,
        media: AggregatorMedia,
        native_id: u64,
        image_url: &str,
    ) -> AggregatorPartial {
        let mut partial = AggregatorPartial::new(media, native_id);
        let is_tv = media == AggregatorMedia::Tv;

        let (title, original, date) = if is_tv {
            (&self.name, &self.original_name, &self.first_air_date)
        } else {
            (&self.title, &self.original_title, &self.release_date)
        };
        partial.title = present(title);
        partial.original_title = present(original);
        partial.release_date = iso_date(date);

        partial.tagline = present(&self.tagline);
        partial.poster_url =
            present(&self.poster_path).map(|path| format!("{}{}", image_url, path));
        partial.origin_countries = present_all(self.origin_country.iter().map(String::as_str));
        partial.production_countries =
            present_all(self.production_countries.iter().map(|c| c.name.as_str()));
        partial.production_companies =
            present_all(self.production_companies.iter().map(|c| c.name.as_str()));

        partial.cast = self.credits.cast.iter().filter_map(RawPerson::as_cast).collect();
        partial.aggregate_cast = self
            .aggregate_credits
            .cast
            .iter()
            .filter_map(RawPerson::as_cast)
            .collect();

        let crew = if is_tv && !self.aggregate_credits.crew.is_empty() {
            &self.aggregate_credits.crew
        } else {
            &self.credits.crew
        };
        partial.crew = crew.iter().flat_map(RawPerson::as_crew).collect();
        partial.created_by = self
            .created_by
            .iter()
            .filter_map(|p| p.to_person(None))
            .collect();

        partial.alternative_titles = self
            .alternative_titles
            .titles
            .iter()
            .filter_map(|alt| {
                let title = present(&alt.title)?;
                let region = alt.iso_3166_1.trim();
                Some(AltTitle::new(title, (!region.is_empty()).then_some(region)))
            })
            .collect();

        partial.content_ratings = if is_tv {
            self.content_ratings
                .results
                .iter()
                .filter_map(|r| regional(&r.iso_3166_1, &r.rating))
                .collect()
        } else {
            self.release_dates
                .results
                .iter()
                .filter_map(|r| {
                    let certification = r
                        .release_dates
                        .iter()
                        .find(|d| !d.certification.trim().is_empty())?;
                    regional(&r.iso_3166_1, &certification.certification)
                })
                .collect()
        };

        if is_tv {
            partial.seasons = positive_u32(self.number_of_seasons);
            partial.episodes = positive_u32(self.number_of_episodes);
        }
        partial.budget = positive_i64(self.budget);
        partial.revenue = positive_i64(self.revenue);

        partial
    }
}

fn regional(region: &str, rating: &str) -> Option<RegionalRating> {
    let region = present(region)?;
    let rating = present(rating)?;
    Some(RegionalRating { region, rating })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IdNamespace;
    use chrono::NaiveDate;
    use serde_json::json;

    const IMAGES: &str = "https://image.tmdb.org/t/p/original";

    #[test]
    fn test_lookup_prefers_movie_results() {
        let found: RawFind = serde_json::from_value(json!({
            "movie_results": [{"id": 27205}],
            "tv_results": [{"id": 1396}]
        }))
        .unwrap();
        assert_eq!(found.first_match(), Some((AggregatorMedia::Movie, 27205)));

        let found: RawFind =
            serde_json::from_value(json!({"movie_results": [], "tv_results": [{"id": 1396}]}))
                .unwrap();
        assert_eq!(found.first_match(), Some((AggregatorMedia::Tv, 1396)));

        let found: RawFind = serde_json::from_value(json!({"person_results": []})).unwrap();
        assert_eq!(found.first_match(), None);
    }

    #[test]
    fn test_movie_detail() {
        let raw: RawDetail = serde_json::from_value(json!({
            "id": 27205,
            "title": "Inception",
            "original_title": "Inception",
            "tagline": "Your mind is the scene of the crime.",
            "poster_path": "/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg",
            "release_date": "2010-07-15",
            "origin_country": ["US"],
            "production_countries": [{"iso_3166_1": "GB", "name": "United Kingdom"}, {"iso_3166_1": "US", "name": "United States of America"}],
            "budget": 160000000,
            "revenue": 839030630,
            "production_companies": [{"name": "Legendary Pictures"}, {"name": "Syncopy"}],
            "credits": {
                "cast": [{"id": 6193, "name": "Leonardo DiCaprio", "character": "Cobb"}],
                "crew": [
                    {"id": 525, "name": "Christopher Nolan", "job": "Director", "department": "Directing"},
                    {"id": 525, "name": "Christopher Nolan", "job": "Screenplay", "department": "Writing"},
                    {"id": 556, "name": "Emma Thomas", "job": "Producer", "department": "Production"}
                ]
            },
            "alternative_titles": {"titles": [
                {"iso_3166_1": "IN", "title": "Inception (Hindi)", "type": ""},
                {"iso_3166_1": "", "title": "Origen"}
            ]},
            "release_dates": {"results": [
                {"iso_3166_1": "US", "release_dates": [{"certification": ""}, {"certification": "PG-13"}]}
            ]}
        }))
        .unwrap();

        let partial = raw.into_partial(AggregatorMedia::Movie, 27205, IMAGES);
        assert_eq!(partial.title.as_deref(), Some("Inception"));
        assert_eq!(partial.tagline.as_deref(), Some("Your mind is the scene of the crime."));
        assert_eq!(
            partial.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg")
        );
        assert_eq!(partial.release_date, NaiveDate::from_ymd_opt(2010, 7, 15));
        assert_eq!(partial.production_countries[0], "United Kingdom");
        assert_eq!(partial.cast[0].role.as_deref(), Some("Cobb"));
        assert_eq!(partial.cast[0].external_id.namespace, IdNamespace::Aggregator);
        assert_eq!(partial.crew.len(), 3);
        assert_eq!(partial.crew[0].job, "Director");
        assert_eq!(partial.crew[1].department, "Writing");
        assert_eq!(partial.alternative_titles[0].region.as_deref(), Some("IN"));
        assert_eq!(partial.alternative_titles[1].region, None);
        assert_eq!(partial.content_ratings[0].rating, "PG-13");
        assert_eq!(partial.budget, Some(160_000_000));
        assert_eq!(partial.seasons, None);
    }

    #[test]
    fn test_tv_detail_uses_names_and_aggregate_credits() {
        let raw: RawDetail = serde_json::from_value(json!({
            "name": "Breaking Bad",
            "original_name": "Breaking Bad",
            "first_air_date": "2008-01-20",
            "number_of_seasons": 5,
            "number_of_episodes": 62,
            "created_by": [{"id": 66633, "name": "Vince Gilligan"}],
            "aggregate_credits": {
                "cast": [{"id": 17419, "name": "Bryan Cranston", "roles": [{"character": "Walter White"}]}],
                "crew": [{"id": 66633, "name": "Vince Gilligan", "department": "Production",
                          "jobs": [{"job": "Executive Producer"}, {"job": "Producer"}]}]
            },
            "alternative_titles": {"results": [{"iso_3166_1": "US", "title": "BB"}]},
            "content_ratings": {"results": [{"iso_3166_1": "US", "rating": "TV-MA"}]}
        }))
        .unwrap();

        let partial = raw.into_partial(AggregatorMedia::Tv, 1396, IMAGES);
        assert_eq!(partial.title.as_deref(), Some("Breaking Bad"));
        assert_eq!(partial.release_date, NaiveDate::from_ymd_opt(2008, 1, 20));
        assert_eq!(partial.seasons, Some(5));
        assert_eq!(partial.episodes, Some(62));
        assert_eq!(partial.created_by[0].name, "Vince Gilligan");
        assert_eq!(partial.aggregate_cast[0].role.as_deref(), Some("Walter White"));
        assert_eq!(partial.crew.len(), 2);
        assert_eq!(partial.crew[1].job, "Producer");
        assert_eq!(partial.alternative_titles[0].title, "BB");
        assert_eq!(partial.content_ratings[0].rating, "TV-MA");
    }

    #[test]
    fn test_zero_money_and_blank_fields_are_absent() {
        let raw: RawDetail = serde_json::from_value(json!({
            "title": "",
            "budget": 0,
            "revenue": 0,
            "poster_path": null,
            "tagline": ""
        }))
        .unwrap();
        let partial = raw.into_partial(AggregatorMedia::Movie, 1, IMAGES);
        assert!(partial.is_empty());
    }
}
