//! Credits enrichment source
//!
//! Pulls the cast listing and the alternate-title (AKA) list from the base
//! provider. The two requests form one best-effort unit: the adapter fails only
//! when both fail, otherwise it returns whatever half it got.
//!
//! # API Reference
//! - `{fallback_url}/titles/{id}/credits`
//! - `{fallback_url}/titles/{id}/akas`

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use super::fallback::RawName;
use super::{get_json, lenient, lenient_seq, present, SourceAdapter};
use crate::partial::CreditsPartial;
use crate::title_id::TitleId;
use crate::types::{AdapterError, Person, Source};

pub struct CreditsAdapter {
    client: Client,
    base_url: String,
}

impl CreditsAdapter {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SourceAdapter for CreditsAdapter {
    type Output = CreditsPartial;

    fn source(&self) -> Source {
        Source::Credits
    }

    async fn fetch(&self, id: &TitleId) -> Result<CreditsPartial, AdapterError> {
        let credits_url = format!("{}/titles/{}/credits", self.base_url, id);
        let akas_url = format!("{}/titles/{}/akas", self.base_url, id);

        let credits: Result<RawCredits, _> =
            get_json(&self.client, self.source(), &credits_url, &[]).await;
        let akas: Result<RawAkas, _> = get_json(&self.client, self.source(), &akas_url, &[]).await;

        let partial = match (credits, akas) {
            (Err(credits_err), Err(akas_err)) => {
                debug!(title_id = %id, error = %akas_err, "AKA request failed");
                return Err(credits_err);
            }
            (credits, akas) => {
                if let Err(e) = &credits {
                    debug!(title_id = %id, error = %e, "Credits request failed, keeping AKAs");
                }
                if let Err(e) = &akas {
                    debug!(title_id = %id, error = %e, "AKA request failed, keeping credits");
                }
                CreditsPartial {
                    cast: credits.map(RawCredits::into_cast).unwrap_or_default(),
                    akas: akas.map(RawAkas::into_titles).unwrap_or_default(),
                }
            }
        };

        debug!(
            title_id = %id,
            cast = partial.cast.len(),
            akas = partial.akas.len(),
            "Credits decoded"
        );
        Ok(partial)
    }
}

// ============================================================================
// Wire format
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawCredits {
    #[serde(default, deserialize_with = "lenient_seq", alias = "credits")]
    cast: Vec<RawCastEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct RawCastEntry {
    #[serde(default, deserialize_with = "lenient")]
    name: RawName,
    #[serde(default, deserialize_with = "lenient_seq")]
    characters: Vec<RawCharacter>,
}

/// Characters arrive either as bare strings or as `{ "name": ... }`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCharacter {
    Plain(String),
    Named { name: String },
}

impl RawCharacter {
    fn name(&self) -> &str {
        match self {
            RawCharacter::Plain(name) | RawCharacter::Named { name } => name,
        }
    }
}

impl RawCredits {
    pub(crate) fn into_cast(self) -> Vec<Person> {
        self.cast
            .iter()
            .filter_map(|entry| {
                let role = entry.characters.first().and_then(|c| present(c.name()));
                entry.name.to_person().map(|p| p.with_role(role))
            })
            .collect()
    }
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawAkas {
    #[serde(default, deserialize_with = "lenient_seq", alias = "akas")]
    titles: Vec<RawAka>,
}

#[derive(Debug, Default, Deserialize)]
struct RawAka {
    #[serde(default, deserialize_with = "lenient", alias = "text")]
    title: String,
}

impl RawAkas {
    pub(crate) fn into_titles(self) -> Vec<String> {
        self.titles.iter().filter_map(|aka| present(&aka.title)).collect()
    }
}
