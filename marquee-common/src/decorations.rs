//! Decoration tables for presentation
//!
//! Static mappings from canonical names to display decorations:
//! genre → emoji (or "-"), country → flag text (or empty). Built once from the
//! built-in defaults plus any configured additions, then shared read-only.

use crate::config::DecorationOverrides;
use std::collections::BTreeMap;

/// Decoration used for genres with no entry in the table
pub const GENRE_PLACEHOLDER: &str = "-";

const DEFAULT_GENRES: &[(&str, &str)] = &[
    ("Action", "💥"),
    ("Adventure", "🗺️"),
    ("Sci-Fi", "🚀"),
    ("Comedy", "🤣"),
    ("Drama", "🎭"),
    ("Romance", "🌹"),
    ("Thriller", "🔪"),
    ("Horror", "👻"),
    ("Fantasy", "✨"),
    ("Mystery", "❓"),
    ("Crime", "-"),
    ("Animation", "-"),
    ("War", "-"),
    ("History", "-"),
    ("Music", "🎶"),
];

const DEFAULT_COUNTRIES: &[(&str, &str)] = &[
    ("United States", "🇺🇸 US"),
    ("USA", "🇺🇸 US"),
    ("US", "🇺🇸 US"),
    ("United Kingdom", "🇬🇧 UK"),
    ("UK", "🇬🇧 UK"),
    ("GB", "🇬🇧 UK"),
    ("India", "🇮🇳 IN"),
    ("IN", "🇮🇳 IN"),
    ("France", "🇫🇷 FR"),
    ("FR", "🇫🇷 FR"),
    ("Japan", "🇯🇵 JP"),
    ("JP", "🇯🇵 JP"),
    ("Canada", "🇨🇦 CA"),
    ("CA", "🇨🇦 CA"),
    ("Germany", "🇩🇪 DE"),
    ("DE", "🇩🇪 DE"),
    ("Australia", "🇦🇺 AU"),
    ("AU", "🇦🇺 AU"),
    ("Korea", "🇰🇷 KR"),
    ("South Korea", "🇰🇷 KR"),
    ("KR", "🇰🇷 KR"),
    ("China", "🇨🇳 CN"),
    ("CN", "🇨🇳 CN"),
    ("Russia", "🇷🇺 RU"),
    ("RU", "🇷🇺 RU"),
    ("Italy", "🇮🇹 IT"),
    ("IT", "🇮🇹 IT"),
    ("Spain", "🇪🇸 ES"),
    ("ES", "🇪🇸 ES"),
    ("Brazil", "🇧🇷 BR"),
    ("BR", "🇧🇷 BR"),
];

/// Immutable genre and country decoration tables
#[derive(Debug, Clone, PartialEq)]
pub struct Decorations {
    genres: BTreeMap<String, String>,
    countries: BTreeMap<String, String>,
}

impl Default for Decorations {
    fn default() -> Self {
        Self {
            genres: to_map(DEFAULT_GENRES),
            countries: to_map(DEFAULT_COUNTRIES),
        }
    }
}

fn to_map(entries: &[(&str, &str)]) -> BTreeMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Decorations {
    /// Built-in tables with configured entries layered on top
    pub fn with_overrides(overrides: &DecorationOverrides) -> Self {
        let mut decorations = Self::default();
        decorations
            .genres
            .extend(overrides.genres.iter().map(|(k, v)| (k.clone(), v.clone())));
        decorations
            .countries
            .extend(overrides.countries.iter().map(|(k, v)| (k.clone(), v.clone())));
        decorations
    }

    /// Emoji for a genre, or [`GENRE_PLACEHOLDER`]
    pub fn genre_emoji(&self, genre: &str) -> &str {
        self.genres
            .get(genre)
            .map(String::as_str)
            .unwrap_or(GENRE_PLACEHOLDER)
    }

    /// Flag text for a country name or code, or "" when unknown
    ///
    /// Exact matches win; otherwise the first table key (in key order) contained
    /// in `country` is used, so "Republic of Korea" still resolves.
    pub fn country_flag(&self, country: &str) -> &str {
        if let Some(flag) = self.countries.get(country) {
            return flag;
        }

        self.countries
            .iter()
            .find(|(name, _)| country.contains(name.as_str()))
            .map(|(_, flag)| flag.as_str())
            .unwrap_or("")
    }
}
