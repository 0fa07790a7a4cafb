//! Partial records produced by the fallback-path adapters
//!
//! Each partial carries only what its source can supply, already normalized:
//! sentinel values ("N/A", zero ratings, empty strings) never reach these
//! types. The merge policy combines them into a [`TitleRecord`].
//!
//! [`TitleRecord`]: crate::types::TitleRecord

use chrono::NaiveDate;
use serde::Serialize;

use crate::types::{Person, TitleKind};

/// Fallback base source: the required half of a fallback resolution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BasePartial {
    pub kind: TitleKind,
    pub primary_title: String,
    pub start_year: Option<i32>,
    pub end_year: Option<i32>,
    pub runtime_seconds: Option<u32>,
    pub plot: Option<String>,
    pub genres: Vec<String>,
    pub interests: Vec<String>,
    pub origin_countries: Vec<String>,
    pub spoken_languages: Vec<String>,
    pub rating: Option<f64>,
    pub vote_count: Option<u64>,
    pub metascore: Option<u8>,
    pub poster_url: Option<String>,
    pub release_date: Option<NaiveDate>,
    pub directors: Vec<Person>,
    pub writers: Vec<Person>,
    pub stars: Vec<Person>,
}

impl BasePartial {
    pub fn new(kind: TitleKind, primary_title: impl Into<String>) -> Self {
        Self {
            kind,
            primary_title: primary_title.into(),
            start_year: None,
            end_year: None,
            runtime_seconds: None,
            plot: None,
            genres: Vec::new(),
            interests: Vec::new(),
            origin_countries: Vec::new(),
            spoken_languages: Vec::new(),
            rating: None,
            vote_count: None,
            metascore: None,
            poster_url: None,
            release_date: None,
            directors: Vec::new(),
            writers: Vec::new(),
            stars: Vec::new(),
        }
    }
}

/// Cast listing and alternate titles from the base provider
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreditsPartial {
    pub cast: Vec<Person>,
    pub akas: Vec<String>,
}

impl CreditsPartial {
    pub fn is_empty(&self) -> bool {
        self.cast.is_empty() && self.akas.is_empty()
    }
}

/// Fill-in fields from the ratings service
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RatingsPartial {
    pub awards: Option<String>,
    pub released: Option<NaiveDate>,
    pub total_seasons: Option<u32>,
    /// Comma-separated country list as reported
    pub country: Option<String>,
}

impl RatingsPartial {
    pub fn is_empty(&self) -> bool {
        self.awards.is_none()
            && self.released.is_none()
            && self.total_seasons.is_none()
            && self.country.is_none()
    }
}

/// Media type the aggregator filed a title under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AggregatorMedia {
    Movie,
    Tv,
}

impl AggregatorMedia {
    pub fn path(&self) -> &'static str {
        match self {
            AggregatorMedia::Movie => "movie",
            AggregatorMedia::Tv => "tv",
        }
    }

    /// `append_to_response` list for the detail request
    pub fn appended(&self) -> &'static str {
        match self {
            AggregatorMedia::Movie => "credits,release_dates,content_ratings,alternative_titles",
            AggregatorMedia::Tv => "aggregate_credits,content_ratings,alternative_titles",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CrewCredit {
    pub person: Person,
    pub job: String,
    pub department: String,
}

/// Alternate title tagged with an ISO 3166-1 region code
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AltTitle {
    pub title: String,
    pub region: Option<String>,
}

impl AltTitle {
    pub fn new(title: impl Into<String>, region: Option<&str>) -> Self {
        Self {
            title: title.into(),
            region: region.map(str::to_string),
        }
    }
}

/// Certification for one region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalRating {
    pub region: String,
    pub rating: String,
}

/// Structured metadata from the aggregator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatorPartial {
    pub media: AggregatorMedia,
    pub native_id: u64,
    pub title: Option<String>,
    pub original_title: Option<String>,
    pub tagline: Option<String>,
    pub poster_url: Option<String>,
    /// `release_date` for movies, `first_air_date` for series
    pub release_date: Option<NaiveDate>,
    pub origin_countries: Vec<String>,
    pub production_countries: Vec<String>,
    /// Per-episode cast for series, film cast for movies
    pub cast: Vec<Person>,
    /// Whole-run cast, series only
    pub aggregate_cast: Vec<Person>,
    pub crew: Vec<CrewCredit>,
    pub created_by: Vec<Person>,
    pub alternative_titles: Vec<AltTitle>,
    pub content_ratings: Vec<RegionalRating>,
    pub seasons: Option<u32>,
    pub episodes: Option<u32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub production_companies: Vec<String>,
}

impl AggregatorPartial {
    pub fn new(media: AggregatorMedia, native_id: u64) -> Self {
        Self {
            media,
            native_id,
            title: None,
            original_title: None,
            tagline: None,
            poster_url: None,
            release_date: None,
            origin_countries: Vec::new(),
            production_countries: Vec::new(),
            cast: Vec::new(),
            aggregate_cast: Vec::new(),
            crew: Vec::new(),
            created_by: Vec::new(),
            alternative_titles: Vec::new(),
            content_ratings: Vec::new(),
            seasons: None,
            episodes: None,
            budget: None,
            revenue: None,
            production_companies: Vec::new(),
        }
    }

    /// Cast list the merge should read: aggregate cast when the series has one
    pub fn effective_cast(&self) -> &[Person] {
        if self.media == AggregatorMedia::Tv && !self.aggregate_cast.is_empty() {
            &self.aggregate_cast
        } else {
            &self.cast
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.original_title.is_none()
            && self.tagline.is_none()
            && self.poster_url.is_none()
            && self.release_date.is_none()
            && self.origin_countries.is_empty()
            && self.production_countries.is_empty()
            && self.cast.is_empty()
            && self.aggregate_cast.is_empty()
            && self.crew.is_empty()
            && self.created_by.is_empty()
            && self.alternative_titles.is_empty()
            && self.content_ratings.is_empty()
            && self.seasons.is_none()
            && self.episodes.is_none()
            && self.budget.is_none()
            && self.revenue.is_none()
            && self.production_companies.is_empty()
    }
}
