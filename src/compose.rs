//! Turning editor input into an [`Article`] ready to be created.

use thiserror::Error;

use crate::api::{Article, ArticleStatus, Resource};
use crate::category::CategoryRecord;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComposeError {
    #[error("Article title is empty")]
    MissingTitle,

    #[error("No category selected")]
    MissingCategory,

    #[error("Unknown category '{0}'")]
    UnknownCategory(String),

    #[error("Category '{0}' has sub-categories; articles must be filed under a leaf category")]
    NotLeafCategory(String),
}

/// Everything the editor collects before an article is sent.
#[derive(Debug, Clone, Default)]
pub struct ComposeForm {
    pub title: String,
    /// URL alias of the chosen category.
    pub category: String,
    pub tags: Vec<String>,
    pub abstracts: Option<String>,
    pub content: String,
    /// Images uploaded while editing. Only those still referenced by
    /// `content` end up on the article.
    pub content_images: Vec<Resource>,
    pub accessories: Vec<Resource>,
}

/// Validates a [`ComposeForm`] against the known categories.
pub struct ArticleComposer<'a> {
    categories: &'a [CategoryRecord],
    author: Option<String>,
}

impl<'a> ArticleComposer<'a> {
    pub fn new(categories: &'a [CategoryRecord], author: Option<String>) -> Self {
        Self { categories, author }
    }

    pub fn save_as_draft(&self, form: &ComposeForm) -> Result<Article, ComposeError> {
        self.build(form, ArticleStatus::Draft)
    }

    /// Submit for publication. `release` publishes immediately, otherwise
    /// the article waits for review.
    pub fn submit(&self, form: &ComposeForm, release: bool) -> Result<Article, ComposeError> {
        let status = if release {
            ArticleStatus::Published
        } else {
            ArticleStatus::PendingReview
        };
        self.build(form, status)
    }

    fn build(&self, form: &ComposeForm, status: ArticleStatus) -> Result<Article, ComposeError> {
        if form.title.trim().is_empty() {
            return Err(ComposeError::MissingTitle);
        }

        let alias = form.category.trim();
        if alias.is_empty() {
            return Err(ComposeError::MissingCategory);
        }

        let category = self
            .categories
            .iter()
            .find(|c| c.url_alias == alias)
            .ok_or_else(|| ComposeError::UnknownCategory(alias.to_string()))?;
        if !category.is_leaf {
            return Err(ComposeError::NotLeafCategory(alias.to_string()));
        }

        let images: Vec<Resource> = form
            .content_images
            .iter()
            .filter(|img| form.content.contains(img.location.as_str()))
            .cloned()
            .collect();
        let dropped = form.content_images.len() - images.len();
        if dropped > 0 {
            tracing::debug!(dropped, "Skipping uploaded images no longer in content");
        }

        Ok(Article {
            id: None,
            title: form.title.clone(),
            author: self.author.clone(),
            abstracts: form
                .abstracts
                .as_ref()
                .filter(|a| !a.trim().is_empty())
                .cloned(),
            content: form.content.clone(),
            category: Some(category.clone()),
            tags: form.tags.clone(),
            images,
            accessories: form.accessories.clone(),
            status,
            in_recycle_bin: false,
        })
    }
}
