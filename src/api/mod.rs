//! Client for the blog's admin REST API.
//!
//! - `client` - transport: auth headers, timeouts, retries, size limits
//! - `articles`, `categories`, `resources`, `tags` - endpoint groups as
//!   `impl ApiClient` blocks
//! - `types` - wire types shared by the endpoints

mod articles;
mod categories;
mod client;
mod resources;
mod tags;
mod types;

pub use client::{ApiClient, ApiError};
pub use types::{
    Article, ArticleFilterConditions, ArticleQuery, ArticleStatus, Resource,
    ResourceFilterConditions, Tag,
};
