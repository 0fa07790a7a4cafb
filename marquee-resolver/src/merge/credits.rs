//! Credit precedence for fallback-path records
//!
//! The aggregator's structured roles (job titles, departments) win when they
//! yield anyone for a role; the base source's flat lists fill the gaps. Top
//! cast never repeats a lead star.

use std::collections::HashSet;

use super::MergePolicy;
use crate::partial::{AggregatorPartial, BasePartial, CreditsPartial, CrewCredit};
use crate::types::{ExternalId, Person, TitleKind};

const DIRECTOR_JOB: &str = "Director";
const PRODUCER_JOB: &str = "Producer";
const EXECUTIVE_PRODUCER_JOB: &str = "Executive Producer";
const WRITING_DEPARTMENT: &str = "Writing";

#[derive(Debug, Default)]
pub(super) struct CreditLists {
    pub directors: Vec<Person>,
    pub writers: Vec<Person>,
    pub stars: Vec<Person>,
    pub producers: Vec<Person>,
    pub top_cast: Vec<Person>,
}

/// First occurrence of each person, order preserved
fn unique(people: impl IntoIterator<Item = Person>) -> Vec<Person> {
    let mut seen: HashSet<ExternalId> = HashSet::new();
    people
        .into_iter()
        .filter(|p| seen.insert(p.external_id.clone()))
        .collect()
}

fn crew_where<'a>(
    crew: &'a [CrewCredit],
    keep: impl Fn(&CrewCredit) -> bool + 'a,
) -> impl Iterator<Item = Person> + 'a {
    crew.iter().filter(move |c| keep(*c)).map(|c| c.person.clone())
}

fn or_fallback(preferred: Vec<Person>, fallback: &[Person]) -> Vec<Person> {
    if preferred.is_empty() {
        fallback.to_vec()
    } else {
        preferred
    }
}

pub(super) fn merge_credits(
    policy: &MergePolicy,
    base: &BasePartial,
    credits: Option<&CreditsPartial>,
    aggregator: Option<&AggregatorPartial>,
) -> CreditLists {
    let is_series = base.kind == TitleKind::Series;
    let mut lists = CreditLists::default();

    if let Some(agg) = aggregator {
        lists.directors = if is_series {
            unique(agg.created_by.iter().cloned())
        } else {
            unique(crew_where(&agg.crew, |c| c.job == DIRECTOR_JOB))
        };

        lists.producers = unique(crew_where(&agg.crew, move |c| {
            c.job == PRODUCER_JOB || (is_series && c.job == EXECUTIVE_PRODUCER_JOB)
        }));
        lists.producers.truncate(policy.producer_limit);

        lists.writers = unique(crew_where(&agg.crew, |c| c.department == WRITING_DEPARTMENT));

        let cast = agg.effective_cast();
        lists.stars = cast.iter().take(policy.star_limit).cloned().collect();
        lists.top_cast = cast.iter().skip(policy.star_limit).cloned().collect();
    }

    lists.directors = or_fallback(lists.directors, &base.directors);
    lists.writers = or_fallback(lists.writers, &base.writers);
    lists.stars = or_fallback(lists.stars, &base.stars);

    if lists.top_cast.is_empty() {
        if let Some(credits) = credits {
            lists.top_cast = credits.cast.clone();
        }
    }

    let star_names: HashSet<&str> = lists.stars.iter().map(|s| s.name.as_str()).collect();
    let top_cast: Vec<Person> = lists
        .top_cast
        .iter()
        .filter(|p| !star_names.contains(p.name.as_str()))
        .take(policy.top_cast_limit)
        .cloned()
        .collect();
    lists.top_cast = top_cast;

    lists
}
