//! Rich-document publisher boundary
//!
//! A publisher accepts a title and a tree of simple blocks and hands back a
//! URL. Publishing is best-effort: a failure is logged and the caller carries
//! on without a link.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::TitleRecord;

/// One element of a published document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Block {
    Heading { text: String },
    Paragraph { children: Vec<Block> },
    Text { text: String },
    Link { href: String, text: String },
    Image { src: String },
    Quote { text: String },
}

impl Block {
    pub fn heading(text: impl Into<String>) -> Self {
        Block::Heading { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Block::Text { text: text.into() }
    }

    pub fn paragraph(children: Vec<Block>) -> Self {
        Block::Paragraph { children }
    }

    pub fn link(href: impl Into<String>, text: impl Into<String>) -> Self {
        Block::Link {
            href: href.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Publisher unavailable: {0}")]
    Unavailable(String),

    #[error("Publisher rejected document: {0}")]
    Rejected(String),
}

#[async_trait]
pub trait DocumentPublisher: Send + Sync {
    /// Publish a document and return its URL
    async fn publish(&self, title: &str, blocks: &[Block]) -> Result<String, PublishError>;
}

/// Publish, logging and discarding any failure
pub async fn publish_best_effort(
    publisher: &dyn DocumentPublisher,
    title: &str,
    blocks: &[Block],
) -> Option<String> {
    match publisher.publish(title, blocks).await {
        Ok(url) => {
            debug!(title = %title, url = %url, "Published document");
            Some(url)
        }
        Err(e) => {
            warn!(title = %title, error = %e, "Document publish failed");
            None
        }
    }
}

/// Long-form page for a resolved title
///
/// Poster, plot, review summary, then the full cast list. Fields the record
/// lacks are skipped.
pub fn title_document(record: &TitleRecord) -> Vec<Block> {
    let mut blocks = Vec::new();

    if let Some(poster) = &record.poster_url {
        blocks.push(Block::Image { src: poster.clone() });
    }
    if let Some(tagline) = &record.tagline {
        blocks.push(Block::Quote { text: tagline.clone() });
    }
    if let Some(plot) = &record.plot_summary {
        blocks.push(Block::heading("Plot"));
        blocks.push(Block::paragraph(vec![Block::text(plot.clone())]));
    }
    if let Some(review) = &record.review_summary {
        blocks.push(Block::heading("Reviews"));
        blocks.push(Block::paragraph(vec![Block::text(review.clone())]));
    }

    let cast: Vec<_> = record.stars.iter().chain(record.top_cast.iter()).collect();
    if !cast.is_empty() {
        blocks.push(Block::heading("Cast"));
        for person in cast {
            let mut line = vec![Block::link(person.profile_url(), person.name.clone())];
            if let Some(role) = &person.role {
                line.push(Block::text(format!(" as {}", role)));
            }
            blocks.push(Block::paragraph(line));
        }
    }

    blocks
}
