//! Name resolution for fallback-path records
//!
//! Aggregator names win over the base source's. The alternate ("AKA") name
//! walks a fixed chain because no single source reliably supplies a display
//! alternate a reader would recognize:
//!
//! 1. an aggregator alternate tagged with the target region that differs from
//!    the primary name
//! 2. any aggregator alternate that differs from the primary name
//! 3. the first entry of the base provider's AKA list
//!
//! The result is dropped when it equals the primary name.

use marquee_common::config::RegionPreference;

use crate::partial::{AggregatorPartial, BasePartial, CreditsPartial};

pub(super) fn primary_name(base: &BasePartial, aggregator: Option<&AggregatorPartial>) -> String {
    aggregator
        .and_then(|a| a.title.clone())
        .unwrap_or_else(|| base.primary_title.clone())
}

pub(super) fn original_name(
    primary: &str,
    aggregator: Option<&AggregatorPartial>,
) -> Option<String> {
    aggregator
        .and_then(|a| a.original_title.clone())
        .filter(|original| original != primary)
}

pub(super) fn alternate_name(
    primary: &str,
    origin_countries: &[String],
    aggregator: Option<&AggregatorPartial>,
    credits: Option<&CreditsPartial>,
    regions: &RegionPreference,
) -> Option<String> {
    let from_aggregator = aggregator.and_then(|a| {
        let target = regions.target_region(origin_countries);
        let differs = |title: &str| title != primary;

        a.alternative_titles
            .iter()
            .find(|alt| alt.region.as_deref() == Some(target) && differs(&alt.title))
            .or_else(|| a.alternative_titles.iter().find(|alt| differs(&alt.title)))
            .map(|alt| alt.title.clone())
    });

    from_aggregator
        .or_else(|| credits.and_then(|c| c.akas.first().cloned()))
        .filter(|aka| aka != primary)
}
