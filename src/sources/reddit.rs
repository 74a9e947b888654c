use anyhow::Context;
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{Post, PostSource};
use crate::Result;

const REDDIT_BASE_URL: &str = "https://www.reddit.com";

/// Listings only ever look at the monthly top posts
const TOP_TIME_FILTER: &str = "month";

const LISTING_LIMIT: usize = 25;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: RedditPost,
}

#[derive(Debug, Deserialize)]
struct RedditPost {
    id: String,
    title: String,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    permalink: String,
    author: Option<String>,
    created_utc: Option<f64>,
    is_self: Option<bool>,
    over_18: Option<bool>,
}

impl RedditPost {
    /// Self post with text and no NSFW flag
    fn is_story(&self) -> bool {
        self.is_self.unwrap_or(true) && !self.over_18.unwrap_or(false) && !self.selftext.trim().is_empty()
    }

    fn into_post(self) -> Post {
        Post {
            url: format!("{}{}", REDDIT_BASE_URL, self.permalink),
            created_at: self
                .created_utc
                .and_then(|secs| Utc.timestamp_opt(secs as i64, 0).single()),
            id: self.id,
            title: self.title,
            body: self.selftext,
            author: self.author,
            platform: "Reddit".to_string(),
        }
    }
}

/// Reddit post source using the public JSON endpoints
pub struct RedditSource {
    client: Client,
}

impl RedditSource {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { client })
    }

    /// Whether the locator points at a single post rather than a subreddit
    fn is_post_url(locator: &str) -> bool {
        locator.contains("/comments/")
    }

    /// Subreddit name from `r/name`, `/r/name` or a subreddit URL
    fn subreddit_name(locator: &str) -> Option<String> {
        let path = match Url::parse(locator) {
            Ok(url) => url.path().to_string(),
            Err(_) => locator.to_string(),
        };

        let mut segments = path.split('/').filter(|s| !s.is_empty());
        match (segments.next(), segments.next()) {
            (Some("r"), Some(name)) => Some(name.to_string()),
            _ => None,
        }
    }

    async fn get_json(&self, url: &str) -> Result<String> {
        tracing::debug!("Requesting {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to request {}", url))?;

        if !response.status().is_success() {
            anyhow::bail!("Reddit request failed: HTTP {}", response.status());
        }

        Ok(response.text().await?)
    }

    async fn fetch_single(&self, post_url: &str) -> Result<Post> {
        let url = post_json_url(post_url)?;
        let body = self.get_json(url.as_str()).await?;
        parse_post_page(&body)
    }

    async fn fetch_top(&self, subreddit: &str) -> Result<Post> {
        let url = top_listing_url(subreddit)?;
        let body = self.get_json(url.as_str()).await?;
        pick_story(&body).with_context(|| format!("No usable story in r/{}", subreddit))
    }
}

/// JSON endpoint of a post page: `.json` on the last path segment, share
/// parameters replaced by `raw_json=1` so text comes back unescaped
fn post_json_url(post_url: &str) -> Result<Url> {
    let mut url = Url::parse(&crate::utils::validate_and_normalize_url(post_url)?)?;

    let path = format!("{}.json", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.set_fragment(None);
    url.set_query(None);
    url.query_pairs_mut().append_pair("raw_json", "1");

    Ok(url)
}

/// Monthly top listing of a subreddit
fn top_listing_url(subreddit: &str) -> Result<Url> {
    let limit = LISTING_LIMIT.to_string();
    let url = Url::parse_with_params(
        &format!("{}/r/{}/top.json", REDDIT_BASE_URL, subreddit),
        &[("t", TOP_TIME_FILTER), ("limit", limit.as_str()), ("raw_json", "1")],
    )?;
    Ok(url)
}

/// Parse a post page (`<post url>.json`): a post listing followed by comments
fn parse_post_page(body: &str) -> Result<Post> {
    let listings: Vec<Listing> = serde_json::from_str(body).context("Failed to parse Reddit post")?;

    listings
        .into_iter()
        .next()
        .and_then(|listing| listing.data.children.into_iter().next())
        .map(|child| child.data.into_post())
        .ok_or_else(|| anyhow::anyhow!("Reddit response contained no post"))
}

/// First story-like post of a subreddit listing
fn pick_story(body: &str) -> Result<Post> {
    let listing: Listing = serde_json::from_str(body).context("Failed to parse Reddit listing")?;

    listing
        .data
        .children
        .into_iter()
        .map(|child| child.data)
        .find(RedditPost::is_story)
        .map(RedditPost::into_post)
        .ok_or_else(|| anyhow::anyhow!("Listing contained no self posts with text"))
}

#[async_trait]
impl PostSource for RedditSource {
    async fn fetch_post(&self, locator: &str) -> Result<Post> {
        let post = if Self::is_post_url(locator) {
            self.fetch_single(locator).await?
        } else {
            let subreddit = Self::subreddit_name(locator)
                .ok_or_else(|| anyhow::anyhow!("Not a subreddit or post: {}", locator))?;
            self.fetch_top(&subreddit).await?
        };

        tracing::info!("Fetched post '{}' ({})", post.title, post.url);
        Ok(post)
    }

    fn supports(&self, locator: &str) -> bool {
        let lower = locator.to_lowercase();
        lower.contains("reddit.com/") || lower.starts_with("r/") || lower.starts_with("/r/")
    }

    fn platform_name(&self) -> &'static str {
        "Reddit"
    }
}
