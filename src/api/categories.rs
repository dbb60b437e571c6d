use super::client::{ApiClient, ApiError};
use crate::category::CategoryRecord;

impl ApiClient {
    /// Fetch every category as a flat list. Order is whatever the server sends.
    ///
    /// Feed the result to [`build_forest`](crate::category::build_forest)
    /// for the nested view.
    ///
    /// # Errors
    ///
    /// Any transport error after retries, or `ApiError::Decode` if the body
    /// is not a list of category records.
    pub async fn get_categories(&self) -> Result<Vec<CategoryRecord>, ApiError> {
        let records: Vec<CategoryRecord> = self.get_json("categories/nodes", &[]).await?;
        tracing::debug!(count = records.len(), "Fetched categories");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::ApiClient;
    use crate::config::Config;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_get_categories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/categories/nodes"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[
                    {"urlAlias":"tech","title":"Tech","beLeaf":false,"nodeLevel":0,"parentNodeUrlAlias":null,"sequence":0,"childrenCount":1,"articleCount":0,"customPage":null},
                    {"urlAlias":"rust","title":"Rust","beLeaf":true,"nodeLevel":1,"parentNodeUrlAlias":"tech","sequence":0,"childrenCount":0,"articleCount":4,"customPage":null}
                ]"#,
            ))
            .mount(&server)
            .await;

        let config = Config {
            api_base_url: server.uri(),
            ..Config::default()
        };
        let client = ApiClient::new(&config).unwrap();
        let records = client.get_categories().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[1].parent_url_alias.as_deref(), Some("tech"));
        assert_eq!(records[1].article_count, 4);
    }
}
