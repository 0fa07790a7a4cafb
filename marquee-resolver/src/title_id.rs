//! Title identifiers and callback payload dispatch
//!
//! Identifiers are validated once at the boundary. Everything past this module
//! handles a [`TitleId`] and never re-checks the raw text.

use marquee_common::Error;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

static TITLE_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"tt\d+").expect("Invalid title id pattern"));

/// IMDb-style title identifier (`tt` followed by digits)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TitleId(String);

impl TitleId {
    /// First identifier appearing anywhere in `text`
    ///
    /// Accepts links (`https://imdb.com/title/tt1375666/`) and callback payloads.
    pub fn find(text: &str) -> Option<Self> {
        TITLE_ID_PATTERN
            .find(text)
            .map(|m| TitleId(m.as_str().to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TitleId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let valid = s.len() > 2 && s.starts_with("tt") && s[2..].bytes().all(|b| b.is_ascii_digit());
        if valid {
            Ok(TitleId(s.to_string()))
        } else {
            Err(Error::InvalidInput(format!("Not a title id: {:?}", s)))
        }
    }
}

impl fmt::Display for TitleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for TitleId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TitleId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Callback dispatch
// ============================================================================

/// Search method a result was produced by
///
/// Both methods resolve through the same pipeline; the tag only survives so
/// that payloads minted by either search keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMethod {
    Imdb,
    Omdb,
}

impl SearchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMethod::Imdb => "imdb",
            SearchMethod::Omdb => "omdb",
        }
    }
}

impl FromStr for SearchMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imdb" => Ok(SearchMethod::Imdb),
            "omdb" => Ok(SearchMethod::Omdb),
            other => Err(Error::InvalidInput(format!("Unknown search method: {}", other))),
        }
    }
}

/// Decoded `open_<method>_<id>` payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpenRequest {
    pub method: SearchMethod,
    pub id: TitleId,
}

impl OpenRequest {
    const PREFIX: &'static str = "open_";

    pub fn parse(payload: &str) -> Result<Self, Error> {
        let rest = payload
            .strip_prefix(Self::PREFIX)
            .ok_or_else(|| Error::InvalidInput(format!("Not an open payload: {}", payload)))?;

        let (method, id) = rest
            .split_once('_')
            .ok_or_else(|| Error::InvalidInput(format!("Missing title id: {}", payload)))?;

        Ok(Self {
            method: method.parse()?,
            id: id.parse()?,
        })
    }

    /// Encode back into the payload format
    pub fn payload(&self) -> String {
        format!("{}{}_{}", Self::PREFIX, self.method.as_str(), self.id)
    }
}
