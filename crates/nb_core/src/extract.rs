use async_trait::async_trait;

use crate::types::ExtractedArticle;
use crate::Result;

#[async_trait]
pub trait ArticleExtractor: Send + Sync {
    /// Download `url` and pull out its title and main text.
    async fn extract(&self, url: &str) -> Result<ExtractedArticle>;
}
