use serde::{Deserialize, Serialize};

/// One node of the blog taxonomy, exactly as the API returns it.
///
/// Records arrive as a flat list. Hierarchy is expressed by `node_level`
/// (0 = root) and `parent_url_alias`, which names a record one level up.
/// Field names on the wire follow the API, so a cached list round-trips
/// byte-for-byte through serde.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRecord {
    /// Unique identifier, also used in article URLs.
    pub url_alias: String,
    pub title: String,
    /// Only leaf categories may hold articles.
    #[serde(rename = "beLeaf")]
    pub is_leaf: bool,
    pub node_level: u32,
    #[serde(rename = "parentNodeUrlAlias", default)]
    pub parent_url_alias: Option<String>,
    /// Display order among siblings. Carried through, never applied by the builder.
    #[serde(default)]
    pub sequence: i64,
    #[serde(rename = "childrenCount", default)]
    pub child_count: i64,
    #[serde(default)]
    pub article_count: i64,
    #[serde(default)]
    pub custom_page: Option<serde_json::Value>,
}

impl CategoryRecord {
    /// Convenience constructor used by tests and the CLI's JSON fixtures.
    pub fn new(
        url_alias: impl Into<String>,
        title: impl Into<String>,
        node_level: u32,
        parent_url_alias: Option<&str>,
        is_leaf: bool,
    ) -> Self {
        Self {
            url_alias: url_alias.into(),
            title: title.into(),
            is_leaf,
            node_level,
            parent_url_alias: parent_url_alias.map(str::to_owned),
            sequence: 0,
            child_count: 0,
            article_count: 0,
            custom_page: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.node_level == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_api_field_names() {
        let json = r#"{
            "urlAlias": "rust",
            "title": "Rust",
            "beLeaf": true,
            "nodeLevel": 1,
            "parentNodeUrlAlias": "programming",
            "sequence": 3,
            "childrenCount": 0,
            "articleCount": 12,
            "customPage": null
        }"#;

        let record: CategoryRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.url_alias, "rust");
        assert!(record.is_leaf);
        assert_eq!(record.node_level, 1);
        assert_eq!(record.parent_url_alias.as_deref(), Some("programming"));
        assert_eq!(record.sequence, 3);
        assert_eq!(record.article_count, 12);
        assert!(record.custom_page.is_none());
    }

    #[test]
    fn test_missing_optional_fields_default() {
        let json = r#"{"urlAlias":"root","title":"Root","beLeaf":false,"nodeLevel":0}"#;
        let record: CategoryRecord = serde_json::from_str(json).unwrap();
        assert!(record.is_root());
        assert_eq!(record.parent_url_alias, None);
        assert_eq!(record.child_count, 0);
    }

    #[test]
    fn test_serialize_keeps_wire_names() {
        let mut record = CategoryRecord::new("life", "Life", 0, None, false);
        record.custom_page = Some(serde_json::json!({ "template": "about" }));

        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["beLeaf"], false);
        assert_eq!(value["parentNodeUrlAlias"], serde_json::Value::Null);
        assert_eq!(value["childrenCount"], 0);
        assert_eq!(value["customPage"]["template"], "about");

        let back: CategoryRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
