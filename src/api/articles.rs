use reqwest::Method;

use super::client::{ApiClient, ApiError};
use super::types::{Article, ArticleFilterConditions, ArticleQuery, ArticleStatus};

impl ApiClient {
    // ========================================================================
    // Article Operations
    // ========================================================================

    pub async fn get_articles(&self) -> Result<Vec<Article>, ApiError> {
        self.get_json("articles", &[]).await
    }

    /// Create an article. Returns the stored copy with its server-assigned id.
    ///
    /// # Arguments
    ///
    /// * `article` - The article to store; its `id` is ignored by the server
    ///
    /// # Errors
    ///
    /// Not retried on server errors, only on 429/503, so a 5xx surfaces as
    /// `ApiError::HttpStatus` and the caller decides whether to resend.
    pub async fn create_article(&self, article: &Article) -> Result<Article, ApiError> {
        let created: Article = self
            .send_json(Method::POST, "articles", &[], article)
            .await?;
        tracing::info!(id = ?created.id, title = %created.title, status = %created.status, "Article created");
        Ok(created)
    }

    /// Replace an existing article. `article.id` selects which one.
    ///
    /// # Errors
    ///
    /// `ApiError::HttpStatus` if the server rejects the update, plus the
    /// usual transport and decode errors.
    pub async fn update_article(&self, article: &Article) -> Result<Article, ApiError> {
        let updated: Article = self.send_json(Method::PUT, "articles", &[], article).await?;
        tracing::info!(id = ?updated.id, status = %updated.status, "Article updated");
        Ok(updated)
    }

    /// Permanently delete an article.
    pub async fn delete_article(&self, article_id: i64) -> Result<(), ApiError> {
        let id = article_id.to_string();
        self.delete("articles", &[("articleId", id.as_str())])
            .await?;
        tracing::info!(id = article_id, "Article deleted");
        Ok(())
    }

    pub async fn get_article_filter_conditions(&self) -> Result<ArticleFilterConditions, ApiError> {
        self.get_json("articles/filter-conditions", &[]).await
    }

    pub async fn get_articles_by_status(
        &self,
        status: ArticleStatus,
    ) -> Result<Vec<Article>, ApiError> {
        self.get_json("articles/by-status", &[("status", status.as_wire())])
            .await
    }

    /// Server-side filtering. All four parameters are always sent.
    pub async fn get_articles_by_conditions(
        &self,
        query: &ArticleQuery,
    ) -> Result<Vec<Article>, ApiError> {
        let status = query.status.map(|s| s.as_wire()).unwrap_or_default();
        self.get_json(
            "articles/by-conditions",
            &[
                ("status", status),
                ("selectedDate", query.date.as_deref().unwrap_or_default()),
                ("selectedCategory", query.category.as_deref().unwrap_or_default()),
                ("selectedTag", query.tag.as_deref().unwrap_or_default()),
            ],
        )
        .await
    }

    /// Move an article into (`to_bin = true`) or out of the recycle bin.
    pub async fn move_to_recycle_bin(
        &self,
        to_bin: bool,
        article: &Article,
    ) -> Result<Article, ApiError> {
        let flag = if to_bin { "true" } else { "false" };
        self.send_json(
            Method::PUT,
            "articles/recycle-bin",
            &[("beDelete", flag)],
            article,
        )
        .await
    }
}
