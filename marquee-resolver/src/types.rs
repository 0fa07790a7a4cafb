//! Core types for the title resolver
//!
//! Defines the normalized [`TitleRecord`] produced by a resolution, the
//! provenance tags attached to it, and the error taxonomy every source adapter
//! and the resolver surface.

use chrono::NaiveDate;
use marquee_common::Decorations;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::title_id::TitleId;

const IMDB_HOMEPAGE: &str = "https://imdb.com";
const AGGREGATOR_PERSON_URL: &str = "https://www.themoviedb.org/person";

// ============================================================================
// Provenance
// ============================================================================

/// Upstream source that can contribute to a title record
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Source {
    Primary,
    FallbackBase,
    Credits,
    Ratings,
    Aggregator,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Primary => write!(f, "Primary"),
            Source::FallbackBase => write!(f, "FallbackBase"),
            Source::Credits => write!(f, "Credits"),
            Source::Ratings => write!(f, "Ratings"),
            Source::Aggregator => write!(f, "Aggregator"),
        }
    }
}

/// Set of sources that contributed to a record
pub type SourceSet = BTreeSet<Source>;

/// ID space a person identifier belongs to
///
/// The IMDb-style space uses alphanumeric ids (`nm0634240`), the aggregator
/// uses numeric ids. The two are never compared with each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IdNamespace {
    Imdb,
    Aggregator,
}

/// Namespaced person identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExternalId {
    pub namespace: IdNamespace,
    pub id: String,
}

/// A credited person
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub name: String,
    pub external_id: ExternalId,
    /// Character played or job held, when the source reports one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Person {
    pub fn imdb(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            external_id: ExternalId {
                namespace: IdNamespace::Imdb,
                id: id.into(),
            },
            role: None,
        }
    }

    pub fn aggregator(name: impl Into<String>, id: u64) -> Self {
        Self {
            name: name.into(),
            external_id: ExternalId {
                namespace: IdNamespace::Aggregator,
                id: id.to_string(),
            },
            role: None,
        }
    }

    pub fn with_role(mut self, role: Option<String>) -> Self {
        self.role = role;
        self
    }

    /// Profile page for this person in its own namespace
    pub fn profile_url(&self) -> String {
        match self.external_id.namespace {
            IdNamespace::Imdb => format!("{}/name/{}", IMDB_HOMEPAGE, self.external_id.id),
            IdNamespace::Aggregator => format!("{}/{}", AGGREGATOR_PERSON_URL, self.external_id.id),
        }
    }
}

// ============================================================================
// Title Record
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TitleKind {
    Movie,
    Series,
}

/// Calendar release date, optionally tagged with the releasing country
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseDate {
    pub date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonSummary {
    pub seasons: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub episodes: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: i64,
    pub currency: String,
}

impl Money {
    pub fn usd(amount: i64) -> Self {
        Self {
            amount,
            currency: "USD".to_string(),
        }
    }
}

/// Marker preceding the image-server resize parameters in poster URLs
const POSTER_RESIZE_MARKER: &str = "._V1_";

/// Display and download URLs for a poster
///
/// Resizable poster URLs are rewritten to a 2000px display variant and a
/// 3000px download variant; anything else is used as-is for both.
pub fn poster_variants(url: &str) -> (String, String) {
    match url.split_once(POSTER_RESIZE_MARKER) {
        Some((base, _)) => (
            format!("{}{}FMjpg_UX2000_.jpg", base, POSTER_RESIZE_MARKER),
            format!("{}{}FMjpg_UX3000_.jpg", base, POSTER_RESIZE_MARKER),
        ),
        None => (url.to_string(), url.to_string()),
    }
}

/// Normalized description of one movie or series
///
/// Built once per resolution and never mutated afterwards. Every optional field
/// is `None` unless some contributing source reported a real value for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleRecord {
    // === Identity ===
    pub id: TitleId,
    pub kind: TitleKind,
    pub primary_name: String,
    pub original_name: Option<String>,
    pub alternate_name: Option<String>,

    // === Temporal ===
    pub start_year: Option<i32>,
    /// Only set for series that have ended; a series without it is still running
    pub end_year: Option<i32>,
    pub release_date: Option<ReleaseDate>,
    pub runtime_seconds: Option<u32>,
    pub seasons: Option<SeasonSummary>,

    // === Classification ===
    pub genres: Vec<String>,
    pub themes: Vec<String>,
    pub countries: Vec<String>,
    pub languages: Vec<String>,
    pub content_rating: Option<String>,

    // === Reception ===
    /// 0-10 scale
    pub aggregate_rating: Option<f64>,
    pub vote_count: Option<u64>,
    /// 0-100 scale
    pub metascore: Option<u8>,
    pub awards_summary: Option<String>,

    // === Credits ===
    pub directors: Vec<Person>,
    pub writers: Vec<Person>,
    pub stars: Vec<Person>,
    pub producers: Vec<Person>,
    pub top_cast: Vec<Person>,

    // === Media ===
    pub poster_url: Option<String>,
    pub poster_download_url: Option<String>,
    pub trailer_url: Option<String>,
    pub plot_summary: Option<String>,
    pub review_summary: Option<String>,
    pub tagline: Option<String>,

    // === Production ===
    pub production_companies: Vec<String>,
    pub budget: Option<Money>,
    pub revenue: Option<Money>,

    // === Provenance ===
    pub sources_used: SourceSet,
}

impl TitleRecord {
    /// Empty record for `id`, to be filled in by a source or the merge policy
    pub fn new(id: TitleId, kind: TitleKind, primary_name: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            primary_name: primary_name.into(),
            original_name: None,
            alternate_name: None,
            start_year: None,
            end_year: None,
            release_date: None,
            runtime_seconds: None,
            seasons: None,
            genres: Vec::new(),
            themes: Vec::new(),
            countries: Vec::new(),
            languages: Vec::new(),
            content_rating: None,
            aggregate_rating: None,
            vote_count: None,
            metascore: None,
            awards_summary: None,
            directors: Vec::new(),
            writers: Vec::new(),
            stars: Vec::new(),
            producers: Vec::new(),
            top_cast: Vec::new(),
            poster_url: None,
            poster_download_url: None,
            trailer_url: None,
            plot_summary: None,
            review_summary: None,
            tagline: None,
            production_companies: Vec::new(),
            budget: None,
            revenue: None,
            sources_used: SourceSet::new(),
        }
    }

    pub fn is_series(&self) -> bool {
        self.kind == TitleKind::Series
    }

    /// True when the record came from the fallback base source with no enrichment
    pub fn is_base_only(&self) -> bool {
        self.sources_used.len() == 1 && self.sources_used.contains(&Source::FallbackBase)
    }

    pub fn imdb_url(&self) -> String {
        format!("{}/title/{}", IMDB_HOMEPAGE, self.id)
    }

    pub fn awards_url(&self) -> String {
        format!("{}/awards", self.imdb_url())
    }

    /// Genres paired with their decoration
    pub fn decorated_genres(&self, decorations: &Decorations) -> Vec<(String, String)> {
        self.genres
            .iter()
            .map(|g| (g.clone(), decorations.genre_emoji(g).to_string()))
            .collect()
    }

    /// Countries paired with their flag text (empty when unknown)
    pub fn decorated_countries(&self, decorations: &Decorations) -> Vec<(String, String)> {
        self.countries
            .iter()
            .map(|c| (c.clone(), decorations.country_flag(c).to_string()))
            .collect()
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Failure classes an adapter may report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// Network or transport failure, non-success status, or timeout
    Unreachable,
    /// The source answered but has no matching title
    NotFound,
    /// The response failed required-field validation
    Malformed,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Unreachable => write!(f, "unreachable"),
            ErrorKind::NotFound => write!(f, "not found"),
            ErrorKind::Malformed => write!(f, "malformed response"),
        }
    }
}

/// Typed absence reported by a source adapter
///
/// `source` names the adapter, not an underlying cause, so `Error` is
/// implemented by hand rather than derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterError {
    pub kind: ErrorKind,
    pub source: Source,
    pub message: String,
}

impl AdapterError {
    pub fn new(kind: ErrorKind, source: Source, message: impl Into<String>) -> Self {
        Self {
            kind,
            source,
            message: message.into(),
        }
    }

    pub fn unreachable(source: Source, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unreachable, source, message)
    }

    pub fn not_found(source: Source, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, source, message)
    }

    pub fn malformed(source: Source, message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, source, message)
    }
}

impl std::fmt::Display for AdapterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.source, self.kind, self.message)
    }
}

impl std::error::Error for AdapterError {}

/// The only error a resolution surfaces: the fallback base source failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolutionError {
    pub kind: ErrorKind,
    pub source: Source,
}

impl std::fmt::Display for ResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "resolution failed: {} {}", self.source, self.kind)
    }
}

impl std::error::Error for ResolutionError {}

impl From<AdapterError> for ResolutionError {
    fn from(err: AdapterError) -> Self {
        Self {
            kind: err.kind,
            source: err.source,
        }
    }
}
