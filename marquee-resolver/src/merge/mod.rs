//! Field merge policy
//!
//! A pure function from the fallback base partial plus whatever enrichment
//! partials arrived to one [`TitleRecord`]. Precedence is a fixed order on
//! sources per field group, never on values: a field is taken whole from the
//! first source in its order that has it, and numbers are never blended.
//!
//! | Field group | Precedence |
//! |---|---|
//! | primary / original name | Aggregator > FallbackBase (original: Aggregator only) |
//! | alternate name | see [`names`] |
//! | year, runtime, genres, themes, languages | FallbackBase |
//! | release date | Aggregator > Ratings > FallbackBase |
//! | countries | FallbackBase > Aggregator production countries > Ratings |
//! | seasons (series) | Aggregator > Ratings |
//! | rating, votes, metascore | FallbackBase |
//! | awards | Ratings |
//! | directors, writers, stars | Aggregator > FallbackBase |
//! | producers, tagline, companies, money | Aggregator |
//! | top cast | Aggregator > Credits |
//! | poster | Aggregator > FallbackBase |

mod credits;
mod names;

use marquee_common::config::RegionPreference;

use crate::partial::{AggregatorPartial, BasePartial, CreditsPartial, RatingsPartial};
use crate::title_id::TitleId;
use crate::types::{
    poster_variants, Money, ReleaseDate, SeasonSummary, Source, TitleKind, TitleRecord,
};

/// Display limit for the top-cast listing
pub const TOP_CAST_LIMIT: usize = 30;

/// Number of leading cast members counted as stars
pub const STAR_LIMIT: usize = 4;

pub const PRODUCER_LIMIT: usize = 5;

/// Precedence rules and display limits
#[derive(Debug, Clone, PartialEq)]
pub struct MergePolicy {
    pub regions: RegionPreference,
    pub top_cast_limit: usize,
    pub star_limit: usize,
    pub producer_limit: usize,
}

impl Default for MergePolicy {
    fn default() -> Self {
        Self {
            regions: RegionPreference::default(),
            top_cast_limit: TOP_CAST_LIMIT,
            star_limit: STAR_LIMIT,
            producer_limit: PRODUCER_LIMIT,
        }
    }
}

/// Everything a fallback resolution collected
///
/// A failed enrichment source is `None`.
#[derive(Debug, Clone)]
pub struct MergeInput {
    pub id: TitleId,
    pub base: BasePartial,
    pub credits: Option<CreditsPartial>,
    pub ratings: Option<RatingsPartial>,
    pub aggregator: Option<AggregatorPartial>,
}

impl MergeInput {
    pub fn base_only(id: TitleId, base: BasePartial) -> Self {
        Self {
            id,
            base,
            credits: None,
            ratings: None,
            aggregator: None,
        }
    }
}

/// Order-preserving de-duplication
fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(&item) {
            out.push(item);
        }
    }
    out
}

impl MergePolicy {
    pub fn new(regions: RegionPreference) -> Self {
        Self {
            regions,
            ..Self::default()
        }
    }

    /// Combine partials into a title record
    pub fn merge(&self, input: MergeInput) -> TitleRecord {
        let MergeInput {
            id,
            base,
            credits,
            ratings,
            aggregator,
        } = input;

        // An enrichment that answered with nothing did not contribute
        let credits = credits.filter(|c| !c.is_empty());
        let ratings = ratings.filter(|r| !r.is_empty());
        let aggregator = aggregator.filter(|a| !a.is_empty());
        let (credits, ratings, aggregator) = (credits.as_ref(), ratings.as_ref(), aggregator.as_ref());

        let is_series = base.kind == TitleKind::Series;
        let mut record = TitleRecord::new(id, base.kind, names::primary_name(&base, aggregator));

        record.sources_used.insert(Source::FallbackBase);
        if credits.is_some() {
            record.sources_used.insert(Source::Credits);
        }
        if ratings.is_some() {
            record.sources_used.insert(Source::Ratings);
        }
        if aggregator.is_some() {
            record.sources_used.insert(Source::Aggregator);
        }

        // Identity
        record.original_name = names::original_name(&record.primary_name, aggregator);
        record.alternate_name = names::alternate_name(
            &record.primary_name,
            &base.origin_countries,
            aggregator,
            credits,
            &self.regions,
        );

        // Temporal
        record.start_year = base.start_year;
        if is_series {
            record.end_year = base.end_year;
            record.seasons = self.seasons(ratings, aggregator);
        }
        record.runtime_seconds = base.runtime_seconds;
        record.release_date = self.release_date(&base, ratings, aggregator);

        // Classification
        record.genres = dedup(base.genres.iter().cloned());
        record.themes = dedup(
            base.interests
                .iter()
                .filter(|t| !record.genres.contains(t))
                .cloned(),
        );
        record.countries = self.countries(&base, ratings, aggregator);
        record.languages = base.spoken_languages.clone();
        record.content_rating = aggregator.and_then(|a| {
            a.content_ratings
                .iter()
                .find(|r| r.region == self.regions.home_region)
                .or_else(|| a.content_ratings.first())
                .map(|r| r.rating.clone())
        });

        // Reception
        record.aggregate_rating = base.rating;
        record.vote_count = base.vote_count;
        record.metascore = base.metascore;
        record.awards_summary = ratings.and_then(|r| r.awards.clone());

        // Credits
        let lists = credits::merge_credits(self, &base, credits, aggregator);
        record.directors = lists.directors;
        record.writers = lists.writers;
        record.stars = lists.stars;
        record.producers = lists.producers;
        record.top_cast = lists.top_cast;

        // Media
        let poster = aggregator
            .and_then(|a| a.poster_url.clone())
            .or_else(|| base.poster_url.clone());
        if let Some(poster) = poster {
            let (display, download) = poster_variants(&poster);
            record.poster_url = Some(display);
            record.poster_download_url = Some(download);
        }
        record.plot_summary = base.plot.clone();
        record.tagline = aggregator.and_then(|a| a.tagline.clone());

        // Production
        if let Some(agg) = aggregator {
            record.production_companies = agg.production_companies.clone();
            record.budget = agg.budget.map(Money::usd);
            record.revenue = agg.revenue.map(Money::usd);
        }

        record
    }

    fn release_date(
        &self,
        base: &BasePartial,
        ratings: Option<&RatingsPartial>,
        aggregator: Option<&AggregatorPartial>,
    ) -> Option<ReleaseDate> {
        let date = aggregator
            .and_then(|a| a.release_date)
            .or_else(|| ratings.and_then(|r| r.released))
            .or(base.release_date)?;

        let country = aggregator
            .and_then(|a| a.production_countries.first().cloned())
            .or_else(|| base.origin_countries.first().cloned())
            .or_else(|| ratings.and_then(|r| split_countries(r.country.as_deref()).into_iter().next()));

        Some(ReleaseDate { date, country })
    }

    fn countries(
        &self,
        base: &BasePartial,
        ratings: Option<&RatingsPartial>,
        aggregator: Option<&AggregatorPartial>,
    ) -> Vec<String> {
        if !base.origin_countries.is_empty() {
            return base.origin_countries.clone();
        }
        if let Some(agg) = aggregator.filter(|a| !a.production_countries.is_empty()) {
            return agg.production_countries.clone();
        }
        split_countries(ratings.and_then(|r| r.country.as_deref()))
    }

    fn seasons(
        &self,
        ratings: Option<&RatingsPartial>,
        aggregator: Option<&AggregatorPartial>,
    ) -> Option<SeasonSummary> {
        aggregator
            .and_then(|a| {
                a.seasons.map(|seasons| SeasonSummary {
                    seasons,
                    episodes: a.episodes,
                })
            })
            .or_else(|| {
                ratings.and_then(|r| r.total_seasons).map(|seasons| SeasonSummary {
                    seasons,
                    episodes: None,
                })
            })
    }
}

/// Ratings-service country text ("United States, United Kingdom")
fn split_countries(text: Option<&str>) -> Vec<String> {
    text.map(|t| {
        t.split(", ")
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partial::{AggregatorMedia, AltTitle, CrewCredit};
    use crate::types::{IdNamespace, Person};
    use chrono::NaiveDate;

    fn id() -> TitleId {
        "tt1375666".parse().unwrap()
    }

    fn inception_base() -> BasePartial {
        let mut base = BasePartial::new(TitleKind::Movie, "Inception");
        base.start_year = Some(2010);
        base.runtime_seconds = Some(8880);
        base.genres = vec!["Action".into(), "Sci-Fi".into(), "Action".into()];
        base.interests = vec!["Heist".into(), "Sci-Fi".into()];
        base.origin_countries = vec!["United States".into(), "United Kingdom".into()];
        base.spoken_languages = vec!["English".into()];
        base.rating = Some(8.8);
        base.vote_count = Some(2_600_000);
        base.metascore = Some(74);
        base.release_date = NaiveDate::from_ymd_opt(2010, 7, 16);
        base.poster_url = Some("https://m.media-amazon.com/images/M/MV5B._V1_.jpg".into());
        base.directors = vec![Person::imdb("Christopher Nolan", "nm0634240")];
        base
    }

    fn inception_aggregator() -> AggregatorPartial {
        let mut agg = AggregatorPartial::new(AggregatorMedia::Movie, 27205);
        agg.title = Some("Inception".into());
        agg.original_title = Some("Inception".into());
        agg.tagline = Some("Your mind is the scene of the crime.".into());
        agg.release_date = NaiveDate::from_ymd_opt(2010, 7, 15);
        agg.production_countries = vec!["United Kingdom".into(), "United States of America".into()];
        agg.crew = vec![CrewCredit {
            person: Person::aggregator("Christopher Nolan", 525),
            job: "Director".into(),
            department: "Directing".into(),
        }];
        agg.budget = Some(160_000_000);
        agg
    }

    #[test]
    fn test_inception_scenario() {
        let ratings = RatingsPartial {
            awards: Some("Won 4 Oscars. 159 wins & 220 nominations total".into()),
            ..Default::default()
        };
        let credits = CreditsPartial {
            cast: vec![Person::imdb("Tom Hardy", "nm0362766")],
            akas: vec![],
        };

        let record = MergePolicy::default().merge(MergeInput {
            id: id(),
            base: inception_base(),
            credits: Some(credits),
            ratings: Some(ratings),
            aggregator: Some(inception_aggregator()),
        });

        assert_eq!(record.kind, TitleKind::Movie);
        assert_eq!(record.primary_name, "Inception");
        assert_eq!(record.start_year, Some(2010));
        assert_eq!(record.directors.len(), 1);
        assert_eq!(record.directors[0].name, "Christopher Nolan");
        assert_eq!(record.directors[0].external_id.namespace, IdNamespace::Aggregator);
        assert_eq!(record.aggregate_rating, Some(8.8));
        assert_eq!(
            record.sources_used.iter().copied().collect::<Vec<_>>(),
            vec![Source::FallbackBase, Source::Credits, Source::Ratings, Source::Aggregator]
        );
    }

    #[test]
    fn test_aggregator_original_name_wins() {
        let mut agg = inception_aggregator();
        agg.original_title = Some("Origine".into());
        let record = MergePolicy::default().merge(MergeInput {
            aggregator: Some(agg),
            ..MergeInput::base_only(id(), inception_base())
        });
        assert_eq!(record.original_name.as_deref(), Some("Origine"));
    }

    #[test]
    fn test_base_only_record() {
        let record = MergePolicy::default().merge(MergeInput::base_only(id(), inception_base()));

        assert!(record.is_base_only());
        assert_eq!(record.original_name, None);
        assert_eq!(record.awards_summary, None);
        assert_eq!(record.tagline, None);
        assert_eq!(record.directors[0].external_id.namespace, IdNamespace::Imdb);
        assert_eq!(
            record.release_date,
            Some(ReleaseDate {
                date: NaiveDate::from_ymd_opt(2010, 7, 16).unwrap(),
                country: Some("United States".into()),
            })
        );
        assert_eq!(
            record.poster_download_url.as_deref(),
            Some("https://m.media-amazon.com/images/M/MV5B._V1_FMjpg_UX3000_.jpg")
        );
    }

    #[test]
    fn test_empty_enrichment_not_counted() {
        let record = MergePolicy::default().merge(MergeInput {
            credits: Some(CreditsPartial::default()),
            ratings: Some(RatingsPartial::default()),
            aggregator: Some(AggregatorPartial::new(AggregatorMedia::Movie, 1)),
            ..MergeInput::base_only(id(), inception_base())
        });
        assert!(record.is_base_only());
    }

    #[test]
    fn test_genres_deduplicated_and_themes_exclude_genres() {
        let record = MergePolicy::default().merge(MergeInput::base_only(id(), inception_base()));
        assert_eq!(record.genres, vec!["Action", "Sci-Fi"]);
        assert_eq!(record.themes, vec!["Heist"]);
    }

    #[test]
    fn test_release_date_precedence() {
        let ratings = RatingsPartial {
            released: NaiveDate::from_ymd_opt(2010, 7, 20),
            country: Some("Canada, France".into()),
            ..Default::default()
        };

        let record = MergePolicy::default().merge(MergeInput {
            ratings: Some(ratings.clone()),
            aggregator: Some(inception_aggregator()),
            ..MergeInput::base_only(id(), inception_base())
        });
        let date = record.release_date.unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2010, 7, 15).unwrap());
        assert_eq!(date.country.as_deref(), Some("United Kingdom"));

        let mut base = inception_base();
        base.origin_countries.clear();
        let record = MergePolicy::default().merge(MergeInput {
            ratings: Some(ratings),
            ..MergeInput::base_only(id(), base)
        });
        let date = record.release_date.unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2010, 7, 20).unwrap());
        assert_eq!(date.country.as_deref(), Some("Canada"));
        assert_eq!(record.countries, vec!["Canada", "France"]);
    }

    #[test]
    fn test_countries_fall_back_to_production_countries() {
        let mut base = inception_base();
        base.origin_countries.clear();
        let record = MergePolicy::default().merge(MergeInput {
            aggregator: Some(inception_aggregator()),
            ..MergeInput::base_only(id(), base)
        });
        assert_eq!(record.countries, vec!["United Kingdom", "United States of America"]);
    }

    #[test]
    fn test_series_seasons_precedence() {
        let mut base = inception_base();
        base.kind = TitleKind::Series;
        base.end_year = Some(2013);
        let ratings = RatingsPartial {
            total_seasons: Some(5),
            ..Default::default()
        };

        let record = MergePolicy::default().merge(MergeInput {
            ratings: Some(ratings.clone()),
            ..MergeInput::base_only(id(), base.clone())
        });
        assert_eq!(record.seasons, Some(SeasonSummary { seasons: 5, episodes: None }));
        assert_eq!(record.end_year, Some(2013));

        let mut agg = AggregatorPartial::new(AggregatorMedia::Tv, 1396);
        agg.seasons = Some(6);
        agg.episodes = Some(62);
        let record = MergePolicy::default().merge(MergeInput {
            ratings: Some(ratings),
            aggregator: Some(agg),
            ..MergeInput::base_only(id(), base)
        });
        assert_eq!(record.seasons, Some(SeasonSummary { seasons: 6, episodes: Some(62) }));
    }

    #[test]
    fn test_movie_never_has_end_year_or_seasons() {
        let mut base = inception_base();
        base.end_year = Some(2012);
        let ratings = RatingsPartial {
            total_seasons: Some(3),
            ..Default::default()
        };
        let record = MergePolicy::default().merge(MergeInput {
            ratings: Some(ratings),
            ..MergeInput::base_only(id(), base)
        });
        assert_eq!(record.end_year, None);
        assert_eq!(record.seasons, None);
    }

    #[test]
    fn test_aka_falls_back_to_base_list() {
        let mut agg = inception_aggregator();
        agg.alternative_titles = vec![AltTitle::new("Inception", Some("FR"))];
        let credits = CreditsPartial {
            cast: vec![],
            akas: vec!["Alt Name".into()],
        };
        let record = MergePolicy::default().merge(MergeInput {
            credits: Some(credits),
            aggregator: Some(agg),
            ..MergeInput::base_only(id(), inception_base())
        });
        assert_eq!(record.alternate_name.as_deref(), Some("Alt Name"));
    }

    #[test]
    fn test_aggregator_poster_and_money() {
        let mut agg = inception_aggregator();
        agg.poster_url = Some("https://image.tmdb.org/t/p/original/abc.jpg".into());
        agg.content_ratings = vec![
            crate::partial::RegionalRating { region: "DE".into(), rating: "12".into() },
            crate::partial::RegionalRating { region: "US".into(), rating: "PG-13".into() },
        ];
        let record = MergePolicy::default().merge(MergeInput {
            aggregator: Some(agg),
            ..MergeInput::base_only(id(), inception_base())
        });
        assert_eq!(
            record.poster_url.as_deref(),
            Some("https://image.tmdb.org/t/p/original/abc.jpg")
        );
        assert_eq!(record.poster_url, record.poster_download_url);
        assert_eq!(record.budget, Some(Money::usd(160_000_000)));
        assert_eq!(record.revenue, None);
        assert_eq!(record.content_rating.as_deref(), Some("PG-13"));
        assert_eq!(record.tagline.as_deref(), Some("Your mind is the scene of the crime."));
    }

    #[test]
    fn test_merge_is_deterministic() {
        let input = MergeInput {
            aggregator: Some(inception_aggregator()),
            ..MergeInput::base_only(id(), inception_base())
        };
        let policy = MergePolicy::default();
        assert_eq!(policy.merge(input.clone()), policy.merge(input));
    }
}
