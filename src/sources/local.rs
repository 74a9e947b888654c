use async_trait::async_trait;
use std::path::Path;
use tokio::fs;

use super::{Post, PostSource};
use crate::utils::sanitize_filename;
use crate::Result;

/// Plain-text file used as a post: the file name is the title, the content the body
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    /// Check if the file exists and is not empty
    async fn validate_file(&self, path: &Path) -> Result<()> {
        crate::utils::check_file_accessible(path)?;

        match fs::metadata(path).await {
            Ok(metadata) if metadata.len() == 0 => {
                anyhow::bail!("File is empty: {}", path.display());
            }
            Ok(_) => Ok(()),
            Err(e) => {
                anyhow::bail!("Cannot access file {}: {}", path.display(), e);
            }
        }
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostSource for LocalSource {
    async fn fetch_post(&self, locator: &str) -> Result<Post> {
        let path = Path::new(locator);
        self.validate_file(path).await?;

        let body = fs::read_to_string(path).await?;
        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Local Post")
            .replace(['_', '-'], " ");

        let absolute_path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());

        Ok(Post {
            id: sanitize_filename(&title).replace(' ', "_"),
            title,
            body,
            url: format!("file://{}", absolute_path.display()),
            author: None,
            created_at: None,
            platform: self.platform_name().to_string(),
        })
    }

    fn supports(&self, _locator: &str) -> bool {
        // Local files are handled separately in the SourceRegistry
        false
    }

    fn platform_name(&self) -> &'static str {
        "Local File"
    }
}
