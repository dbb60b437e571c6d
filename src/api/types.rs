use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::CategoryRecord;

// ============================================================================
// Tags
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    #[serde(default)]
    pub article_count: i64,
}

// ============================================================================
// Resources
// ============================================================================

/// An uploaded media file (content image or downloadable accessory).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    #[serde(default)]
    pub original_filename: String,
    /// Server-relative path. Identifies the resource for deletion and is the
    /// string embedded in article content when the resource is an image.
    pub location: String,
    #[serde(rename = "type", default)]
    pub resource_type: String,
    #[serde(default)]
    pub upload_date: String,
    #[serde(default)]
    pub size: u64,
    /// Whether any article currently references this resource.
    #[serde(rename = "beReference", default)]
    pub referenced: bool,
}

/// Values offered by the resource screen's filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceFilterConditions {
    pub dates: Vec<String>,
    pub types: Vec<String>,
}

// ============================================================================
// Articles
// ============================================================================

/// Publication state. The API speaks these as fixed Chinese labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArticleStatus {
    #[serde(rename = "草稿")]
    Draft,
    #[serde(rename = "待审核")]
    PendingReview,
    #[serde(rename = "已发布")]
    Published,
}

impl ArticleStatus {
    /// The label the API expects in query strings and bodies.
    pub fn as_wire(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "草稿",
            ArticleStatus::PendingReview => "待审核",
            ArticleStatus::Published => "已发布",
        }
    }
}

impl fmt::Display for ArticleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArticleStatus::Draft => "draft",
            ArticleStatus::PendingReview => "pending",
            ArticleStatus::Published => "published",
        };
        f.write_str(name)
    }
}

impl FromStr for ArticleStatus {
    type Err = String;

    /// Accepts the English names used on the command line as well as the wire labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "draft" | "草稿" => Ok(ArticleStatus::Draft),
            "pending" | "待审核" => Ok(ArticleStatus::PendingReview),
            "published" | "已发布" => Ok(ArticleStatus::Published),
            other => Err(format!(
                "unknown article status '{other}' (expected draft, pending or published)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    /// Assigned by the server; `None` for articles not yet created.
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub abstracts: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub category: Option<CategoryRecord>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub images: Vec<Resource>,
    #[serde(default)]
    pub accessories: Vec<Resource>,
    pub status: ArticleStatus,
    /// Set while the article sits in the recycle bin.
    #[serde(rename = "beDelete", default)]
    pub in_recycle_bin: bool,
}

/// Values offered by the article list's filter dropdowns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleFilterConditions {
    pub dates: Vec<String>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
}

/// Server-side article filter. Unset fields are sent as empty strings.
#[derive(Debug, Clone, Default)]
pub struct ArticleQuery {
    pub status: Option<ArticleStatus>,
    pub date: Option<String>,
    pub category: Option<String>,
    pub tag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_wire_labels() {
        let json = serde_json::to_string(&ArticleStatus::PendingReview).unwrap();
        assert_eq!(json, "\"待审核\"");

        let status: ArticleStatus = serde_json::from_str("\"已发布\"").unwrap();
        assert_eq!(status, ArticleStatus::Published);
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("draft".parse::<ArticleStatus>(), Ok(ArticleStatus::Draft));
        assert_eq!("草稿".parse::<ArticleStatus>(), Ok(ArticleStatus::Draft));
        assert!("archived".parse::<ArticleStatus>().is_err());
    }

    #[test]
    fn test_resource_api_names() {
        let json = r#"{
            "originalFilename": "cover.png",
            "location": "upload/2024/01/cover.png",
            "type": "image",
            "uploadDate": "2024-01-05",
            "size": 2048,
            "beReference": true
        }"#;
        let resource: Resource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.original_filename, "cover.png");
        assert_eq!(resource.resource_type, "image");
        assert!(resource.referenced);
    }

    #[test]
    fn test_upload_response_with_location_only() {
        let resource: Resource = serde_json::from_str(r#"{"location":"upload/a.png"}"#).unwrap();
        assert_eq!(resource.location, "upload/a.png");
        assert!(!resource.referenced);
    }

    #[test]
    fn test_article_round_trip_names() {
        let article = Article {
            id: None,
            title: "Hello".to_string(),
            author: Some("editor".to_string()),
            abstracts: None,
            content: "<p>Hi</p>".to_string(),
            category: None,
            tags: vec!["rust".to_string()],
            images: Vec::new(),
            accessories: Vec::new(),
            status: ArticleStatus::Draft,
            in_recycle_bin: false,
        };
        let value = serde_json::to_value(&article).unwrap();
        assert_eq!(value["beDelete"], false);
        assert_eq!(value["status"], "草稿");

        let back: Article = serde_json::from_value(value).unwrap();
        assert_eq!(back, article);
    }
}
