//! Primary source
//!
//! The primary source returns a complete title page in one response, so this
//! adapter produces a finished [`TitleRecord`] rather than a partial: when it
//! succeeds no merge is needed.
//!
//! # API Reference
//! - Endpoint: `{primary_url}?tt={id}`
//! - Discriminator: `ok == true` and a non-empty `top.titleText.text`

use async_trait::async_trait;
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::{
    get_json, html_text, lenient, lenient_seq, metascore, positive_f64, positive_i32,
    positive_i64, positive_u32, positive_u64, present, present_all, SourceAdapter,
};
use crate::merge::TOP_CAST_LIMIT;
use crate::title_id::TitleId;
use crate::types::{
    poster_variants, AdapterError, Money, Person, ReleaseDate, SeasonSummary, Source, TitleKind,
    TitleRecord,
};

/// `titleType.text` values that denote a series
const SERIES_TYPES: &[&str] = &["TV Series", "TV Mini Series"];

const TOP_CAST_GROUP: &str = "Top Cast";

static RUNTIME_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(?:(\d+)\s*h)?\s*(?:(\d+)\s*m(?:in)?)?\s*$").expect("Invalid runtime pattern")
});

pub struct PrimaryAdapter {
    client: Client,
    url: String,
}

impl PrimaryAdapter {
    pub fn new(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl SourceAdapter for PrimaryAdapter {
    type Output = TitleRecord;

    fn source(&self) -> Source {
        Source::Primary
    }

    async fn fetch(&self, id: &TitleId) -> Result<TitleRecord, AdapterError> {
        let raw: RawPage =
            get_json(&self.client, self.source(), &self.url, &[("tt", id.as_str())]).await?;
        let record = raw.into_record(id.clone())?;

        debug!(
            title_id = %id,
            title = %record.primary_name,
            kind = ?record.kind,
            "Primary title decoded"
        );
        Ok(record)
    }
}

/// Runtime display text ("2h 28m", "45m", "1h") in seconds
pub(crate) fn parse_runtime(text: &str) -> Option<u32> {
    let caps = RUNTIME_PATTERN.captures(text)?;
    let hours: u32 = caps.get(1).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let minutes: u32 = caps.get(2).map_or(Ok(0), |m| m.as_str().parse()).ok()?;
    let seconds = hours.checked_mul(3600)?.checked_add(minutes.checked_mul(60)?)?;
    (seconds > 0).then_some(seconds)
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawPage {
    #[serde(default, deserialize_with = "lenient")]
    ok: bool,
    #[serde(default, deserialize_with = "lenient")]
    short: RawShort,
    #[serde(default, deserialize_with = "lenient")]
    review_summary: Option<RawReviewSummary>,
    #[serde(default, deserialize_with = "lenient")]
    top: RawTop,
    #[serde(default, deserialize_with = "lenient")]
    main: RawMain,
}

#[derive(Debug, Default, Deserialize)]
struct RawText {
    #[serde(default, deserialize_with = "lenient")]
    text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawShort {
    #[serde(default, deserialize_with = "lenient")]
    trailer: RawTrailer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrailer {
    #[serde(default, deserialize_with = "lenient")]
    embed_url: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawReviewSummary {
    #[serde(default, deserialize_with = "lenient")]
    overall: RawReviewOverall,
}

#[derive(Debug, Default, Deserialize)]
struct RawReviewOverall {
    #[serde(default, deserialize_with = "lenient")]
    medium: RawReviewMedium,
}

#[derive(Debug, Default, Deserialize)]
struct RawReviewMedium {
    #[serde(default, deserialize_with = "lenient")]
    value: RawHtml,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHtml {
    #[serde(default, deserialize_with = "lenient")]
    plaid_html: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTop {
    #[serde(default, deserialize_with = "lenient")]
    title_text: RawText,
    #[serde(default, deserialize_with = "lenient")]
    original_title_text: RawText,
    #[serde(default, deserialize_with = "lenient")]
    title_type: RawText,
    #[serde(default, deserialize_with = "lenient")]
    release_year: RawReleaseYear,
    #[serde(default, deserialize_with = "lenient")]
    release_date: RawReleaseDate,
    #[serde(default, deserialize_with = "lenient")]
    runtime: RawRuntime,
    #[serde(default, deserialize_with = "lenient")]
    ratings_summary: RawRatingsSummary,
    #[serde(default, deserialize_with = "lenient")]
    metacritic: Option<RawMetacritic>,
    #[serde(default, deserialize_with = "lenient")]
    genres: RawGenres,
    #[serde(default, deserialize_with = "lenient")]
    interests: RawEdges<RawInterest>,
    #[serde(default, deserialize_with = "lenient")]
    plot: RawPlot,
    #[serde(default, deserialize_with = "lenient")]
    primary_image: RawImage,
    #[serde(default, deserialize_with = "lenient_seq", rename = "directorsPageTitle")]
    directors: Vec<RawCreditGroup>,
    #[serde(default, deserialize_with = "lenient_seq", rename = "principalCreditsV2")]
    principal_credits: Vec<RawCreditGroup>,
    #[serde(default, deserialize_with = "lenient")]
    certificate: RawCertificate,
    #[serde(default, deserialize_with = "lenient")]
    production: RawEdges<RawCompanyNode>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawReleaseYear {
    #[serde(default, deserialize_with = "lenient")]
    year: i64,
    #[serde(default, deserialize_with = "lenient")]
    end_year: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawReleaseDate {
    #[serde(default, deserialize_with = "lenient")]
    day: u32,
    #[serde(default, deserialize_with = "lenient")]
    month: u32,
    #[serde(default, deserialize_with = "lenient")]
    year: i32,
    #[serde(default, deserialize_with = "lenient")]
    country: RawText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRuntime {
    #[serde(default, deserialize_with = "lenient")]
    seconds: i64,
    #[serde(default, deserialize_with = "lenient")]
    displayable_property: RawDisplayable,
}

#[derive(Debug, Default, Deserialize)]
struct RawDisplayable {
    #[serde(default, deserialize_with = "lenient")]
    value: RawPlain,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlain {
    #[serde(default, deserialize_with = "lenient")]
    plain_text: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRatingsSummary {
    #[serde(default, deserialize_with = "lenient")]
    aggregate_rating: f64,
    #[serde(default, deserialize_with = "lenient")]
    vote_count: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawMetacritic {
    #[serde(default, deserialize_with = "lenient")]
    metascore: RawScore,
}

#[derive(Debug, Default, Deserialize)]
struct RawScore {
    #[serde(default, deserialize_with = "lenient")]
    score: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawGenres {
    #[serde(default, deserialize_with = "lenient_seq")]
    genres: Vec<RawText>,
}

#[derive(Debug, Deserialize)]
#[serde(bound = "T: serde::de::DeserializeOwned")]
struct RawEdges<T> {
    #[serde(default, deserialize_with = "lenient_seq")]
    edges: Vec<RawEdge<T>>,
}

impl<T> Default for RawEdges<T> {
    fn default() -> Self {
        Self { edges: Vec::new() }
    }
}

#[derive(Debug, Deserialize)]
struct RawEdge<T> {
    node: T,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawInterest {
    #[serde(default, deserialize_with = "lenient")]
    primary_text: RawText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompanyNode {
    #[serde(default, deserialize_with = "lenient")]
    company: RawCompany,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCompany {
    #[serde(default, deserialize_with = "lenient")]
    company_text: RawText,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPlot {
    #[serde(default, deserialize_with = "lenient")]
    plot_text: RawPlain,
}

#[derive(Debug, Default, Deserialize)]
struct RawImage {
    #[serde(default, deserialize_with = "lenient")]
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawCertificate {
    #[serde(default, deserialize_with = "lenient")]
    rating: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawCreditGroup {
    #[serde(default, deserialize_with = "lenient")]
    grouping: RawText,
    #[serde(default, deserialize_with = "lenient_seq")]
    credits: Vec<RawCredit>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCredit {
    #[serde(default, deserialize_with = "lenient")]
    name: RawCreditName,
    #[serde(default, deserialize_with = "lenient_seq")]
    characters: Vec<RawCharacter>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCreditName {
    #[serde(default, deserialize_with = "lenient")]
    name_text: RawText,
    #[serde(default, deserialize_with = "lenient")]
    id: String,
}

#[derive(Debug, Default, Deserialize)]
struct RawCharacter {
    #[serde(default, deserialize_with = "lenient")]
    name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawMain {
    #[serde(default, deserialize_with = "lenient")]
    prestigious_award_summary: Option<RawAwardSummary>,
    #[serde(default, deserialize_with = "lenient")]
    wins: RawTotal,
    #[serde(default, deserialize_with = "lenient", rename = "nominationsExcludeWins")]
    nominations: RawTotal,
    #[serde(default, deserialize_with = "lenient")]
    spoken_languages: RawLanguages,
    #[serde(default, deserialize_with = "lenient", rename = "countriesDetails")]
    countries: RawCountries,
    #[serde(default, deserialize_with = "lenient")]
    akas: RawEdges<RawText>,
    #[serde(default, deserialize_with = "lenient_seq", rename = "castV2")]
    cast: Vec<RawCreditGroup>,
    #[serde(default, deserialize_with = "lenient")]
    episodes: Option<RawEpisodes>,
    #[serde(default, deserialize_with = "lenient")]
    production_budget: Option<RawBudget>,
    #[serde(default, deserialize_with = "lenient")]
    worldwide_gross: Option<RawGross>,
    #[serde(default, deserialize_with = "lenient")]
    lifetime_gross: Option<RawGross>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAwardSummary {
    #[serde(default, deserialize_with = "lenient")]
    wins: i64,
}

#[derive(Debug, Default, Deserialize)]
struct RawTotal {
    #[serde(default, deserialize_with = "lenient")]
    total: i64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLanguages {
    #[serde(default, deserialize_with = "lenient_seq")]
    spoken_languages: Vec<RawText>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCountries {
    #[serde(default, deserialize_with = "lenient_seq")]
    countries: Vec<RawText>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawEpisodes {
    #[serde(default, deserialize_with = "lenient_seq")]
    seasons: Vec<serde_json::Value>,
    #[serde(default, deserialize_with = "lenient")]
    total_episodes: RawTotal,
}

#[derive(Debug, Default, Deserialize)]
struct RawAmount {
    #[serde(default, deserialize_with = "lenient")]
    amount: i64,
    #[serde(default, deserialize_with = "lenient")]
    currency: String,
}

impl RawAmount {
    fn to_money(&self) -> Option<Money> {
        let amount = positive_i64(self.amount)?;
        let currency = present(&self.currency).unwrap_or_else(|| "USD".to_string());
        Some(Money { amount, currency })
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawBudget {
    #[serde(default, deserialize_with = "lenient")]
    budget: RawAmount,
}

#[derive(Debug, Default, Deserialize)]
struct RawGross {
    #[serde(default, deserialize_with = "lenient")]
    total: RawAmount,
}

// ============================================================================
// Record assembly
// ============================================================================

impl RawCredit {
    fn to_person(&self) -> Option<Person> {
        let name = present(&self.name.name_text.text)?;
        let role = self.characters.first().and_then(|c| present(&c.name));
        Some(Person::imdb(name, self.name.id.trim()).with_role(role))
    }
}

fn group_people<'a>(groups: impl IntoIterator<Item = &'a RawCreditGroup>) -> Vec<Person> {
    groups
        .into_iter()
        .flat_map(|g| g.credits.iter().filter_map(RawCredit::to_person))
        .collect()
}

fn groups_labelled<'a>(
    groups: &'a [RawCreditGroup],
    label: &'a str,
) -> impl Iterator<Item = &'a RawCreditGroup> {
    groups.iter().filter(move |g| g.grouping.text.contains(label))
}

impl RawPage {
    pub(crate) fn into_record(self, id: TitleId) -> Result<TitleRecord, AdapterError> {
        let name = match present(&self.top.title_text.text) {
            Some(name) if self.ok => name,
            _ => {
                return Err(AdapterError::not_found(
                    Source::Primary,
                    "response is not ok or has no title",
                ))
            }
        };

        let top = &self.top;
        let main = &self.main;
        let kind = if SERIES_TYPES.contains(&top.title_type.text.as_str()) {
            TitleKind::Series
        } else {
            TitleKind::Movie
        };

        let mut record = TitleRecord::new(id, kind, name);
        record.sources_used.insert(Source::Primary);

        // Identity
        record.original_name =
            present(&top.original_title_text.text).filter(|o| *o != record.primary_name);
        record.alternate_name = main
            .akas
            .edges
            .first()
            .and_then(|e| present(&e.node.text))
            .filter(|aka| *aka != record.primary_name);

        // Temporal
        record.start_year = positive_i32(top.release_year.year);
        if kind == TitleKind::Series {
            record.end_year = positive_i32(top.release_year.end_year);
        }
        let rd = &top.release_date;
        record.release_date = NaiveDate::from_ymd_opt(rd.year, rd.month, rd.day).map(|date| {
            ReleaseDate {
                date,
                country: present(&rd.country.text),
            }
        });
        record.runtime_seconds = positive_u32(top.runtime.seconds)
            .or_else(|| parse_runtime(&top.runtime.displayable_property.value.plain_text));
        if kind == TitleKind::Series {
            record.seasons = main.episodes.as_ref().and_then(|e| {
                let seasons = u32::try_from(e.seasons.len()).ok().filter(|n| *n > 0)?;
                let episodes = positive_u32(e.total_episodes.total)?;
                Some(SeasonSummary {
                    seasons,
                    episodes: Some(episodes),
                })
            });
        }

        // Classification
        record.genres = present_all(top.genres.genres.iter().map(|g| g.text.as_str()));
        record.themes = top
            .interests
            .edges
            .iter()
            .filter_map(|e| present(&e.node.primary_text.text))
            .filter(|t| !record.genres.contains(t))
            .collect();
        record.countries = present_all(main.countries.countries.iter().map(|c| c.text.as_str()));
        record.languages =
            present_all(main.spoken_languages.spoken_languages.iter().map(|l| l.text.as_str()));
        record.content_rating = present(&top.certificate.rating);

        // Reception
        record.aggregate_rating = positive_f64(top.ratings_summary.aggregate_rating);
        if record.aggregate_rating.is_some() {
            record.vote_count = positive_u64(top.ratings_summary.vote_count);
        }
        record.metascore = top.metacritic.as_ref().and_then(|m| metascore(m.metascore.score));
        record.awards_summary = awards_summary(main);

        // Credits
        self.assign_credits(&mut record);

        // Media
        if let Some(poster) = present(&top.primary_image.url) {
            let (display, download) = poster_variants(&poster);
            record.poster_url = Some(display);
            record.poster_download_url = Some(download);
        }
        record.trailer_url = present(&self.short.trailer.embed_url);
        record.plot_summary = present(&top.plot.plot_text.plain_text);
        record.review_summary = self
            .review_summary
            .as_ref()
            .and_then(|r| html_text(&r.overall.medium.value.plaid_html));

        // Production
        record.production_companies = top
            .production
            .edges
            .iter()
            .filter_map(|e| present(&e.node.company.company_text.text))
            .collect();
        record.budget = main.production_budget.as_ref().and_then(|b| b.budget.to_money());
        record.revenue = main
            .worldwide_gross
            .as_ref()
            .and_then(|g| g.total.to_money())
            .or_else(|| main.lifetime_gross.as_ref().and_then(|g| g.total.to_money()));

        Ok(record)
    }

    fn assign_credits(&self, record: &mut TitleRecord) {
        let principal = &self.top.principal_credits;

        let mut directors = group_people(self.top.directors.first());
        if directors.is_empty() {
            directors = group_people(groups_labelled(principal, "Director"));
        }
        if directors.is_empty() && record.is_series() {
            directors = group_people(groups_labelled(principal, "Creator"));
        }
        record.directors = directors;
        record.writers = group_people(groups_labelled(principal, "Writer"));
        record.stars = group_people(groups_labelled(principal, "Star"));

        let star_names: Vec<&str> = record.stars.iter().map(|s| s.name.as_str()).collect();
        let top_cast: Vec<Person> = self
            .main
            .cast
            .iter()
            .find(|g| g.grouping.text == TOP_CAST_GROUP)
            .map(|g| {
                g.credits
                    .iter()
                    .filter_map(RawCredit::to_person)
                    .filter(|p| !star_names.contains(&p.name.as_str()))
                    .take(TOP_CAST_LIMIT)
                    .collect()
            })
            .unwrap_or_default();
        record.top_cast = top_cast;
    }
}

fn awards_summary(main: &RawMain) -> Option<String> {
    let wins = main.wins.total;
    let nominations = main.nominations.total;
    match &main.prestigious_award_summary {
        Some(prestigious) => Some(format!(
            "Won {} Oscars. {} wins & {} nominations total.",
            prestigious.wins, wins, nominations
        )),
        None if wins > 0 => Some(format!("{} wins & {} nominations total.", wins, nominations)),
        None => None,
    }
}
