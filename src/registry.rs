//! The fixed, ordered list of feeds the reader can switch between.
//!
//! The registry is built once at startup from configuration and never
//! changes afterwards. Every descriptor is validated eagerly: a registry
//! that exists is non-empty, every name is non-blank, and every URL is an
//! absolute http(s) URL.

use crate::util::{validate_feed_url, UrlValidationError};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Feed registry is empty")]
    Empty,

    #[error("Feed #{index} has an empty name")]
    EmptyName { index: usize },

    #[error("Feed #{index} ({name}) has an invalid URL: {source}")]
    InvalidUrl {
        index: usize,
        name: String,
        #[source]
        source: UrlValidationError,
    },
}

/// Raw `{name, url}` pair as it appears in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FeedSource {
    pub name: String,
    pub url: String,
}

impl FeedSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// A validated feed: display name plus the URL to fetch it from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedDescriptor {
    name: String,
    url: Url,
}

impl FeedDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl fmt::Display for FeedDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <{}>", self.name, self.url)
    }
}

/// Immutable, non-empty list of feed descriptors indexed by position.
///
/// Cloning is O(1); all clones share the same descriptors.
#[derive(Debug, Clone)]
pub struct FeedRegistry {
    feeds: Arc<[FeedDescriptor]>,
}

impl FeedRegistry {
    /// Validate `sources` and build the registry.
    ///
    /// Fails on the first invalid descriptor, reporting its position.
    pub fn new(sources: impl IntoIterator<Item = FeedSource>) -> Result<Self, RegistryError> {
        let feeds = sources
            .into_iter()
            .enumerate()
            .map(|(index, source)| {
                let name = source.name.trim();
                if name.is_empty() {
                    return Err(RegistryError::EmptyName { index });
                }
                let url =
                    validate_feed_url(&source.url).map_err(|source| RegistryError::InvalidUrl {
                        index,
                        name: name.to_string(),
                        source,
                    })?;
                Ok(FeedDescriptor {
                    name: name.to_string(),
                    url,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        if feeds.is_empty() {
            return Err(RegistryError::Empty);
        }

        tracing::debug!(count = feeds.len(), "Feed registry built");
        Ok(Self {
            feeds: feeds.into(),
        })
    }

    /// The registry shipped with the binary, used when the config names no feeds.
    pub fn default_sources() -> Vec<FeedSource> {
        vec![
            FeedSource::new("Udacity Blog", "http://blog.udacity.com/feed"),
            FeedSource::new("CSS Tricks", "http://feeds.feedburner.com/CssTricks"),
            FeedSource::new("HTML5 Rocks", "http://feeds.feedburner.com/html5rocks"),
            FeedSource::new(
                "Linear Digressions",
                "http://feeds.feedburner.com/udacity-linear-digressions",
            ),
        ]
    }

    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&FeedDescriptor> {
        self.feeds.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeedDescriptor> {
        self.feeds.iter()
    }
}
