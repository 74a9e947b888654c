use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub mod local;
pub mod reddit;

use crate::{Result, ScribeError};

/// Source post a short is made from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Platform-specific identifier
    pub id: String,

    /// Post title
    pub title: String,

    /// Post body text
    pub body: String,

    /// Where the post was fetched from
    pub url: String,

    /// Author name if known
    pub author: Option<String>,

    /// Creation time if known
    pub created_at: Option<DateTime<Utc>>,

    /// Platform name
    pub platform: String,
}

impl Post {
    /// Text read out in the short: the title as its own sentence, then the body
    pub fn script_text(&self) -> String {
        format!("{}.\n{}\n", self.title.trim(), self.body.trim())
    }
}

/// Trait for fetching posts from different platforms
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch a post from a URL, a community name or a path
    async fn fetch_post(&self, locator: &str) -> Result<Post>;

    /// Check if this source handles the given locator
    fn supports(&self, locator: &str) -> bool;

    /// Get the name of this platform
    fn platform_name(&self) -> &'static str;
}

/// Registry for managing multiple post sources
pub struct SourceRegistry {
    sources: Vec<Box<dyn PostSource>>,
}

impl SourceRegistry {
    /// Create a new registry with the default sources
    pub fn new(user_agent: &str) -> Result<Self> {
        let mut registry = Self {
            sources: Vec::new(),
        };

        registry.register(Box::new(reddit::RedditSource::new(user_agent)?));

        Ok(registry)
    }

    /// Register a new source
    pub fn register(&mut self, source: Box<dyn PostSource>) {
        self.sources.push(source);
    }

    /// Find a source that supports the given locator
    pub fn find_source(&self, locator: &str) -> Option<&dyn PostSource> {
        self.sources
            .iter()
            .find(|source| source.supports(locator))
            .map(|boxed| boxed.as_ref())
    }

    /// List all supported platforms
    pub fn list_platforms(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .map(|source| source.platform_name())
            .collect()
    }

    /// Check if input is a local file path
    pub fn is_local_file(&self, input: &str) -> bool {
        if input.starts_with("http://") || input.starts_with("https://") {
            return false;
        }

        let path = Path::new(input);
        path.exists() || path.extension().is_some() || input.starts_with("./")
    }

    /// Fetch a post using the appropriate source
    pub async fn fetch_post(&self, locator: &str) -> Result<Post> {
        if self.is_local_file(locator) {
            return local::LocalSource::new().fetch_post(locator).await;
        }

        let source = self
            .find_source(locator)
            .ok_or_else(|| ScribeError::UnsupportedSource(locator.to_string()))?;

        tracing::info!("Fetching post from {}", source.platform_name());
        source.fetch_post(locator).await
    }
}
