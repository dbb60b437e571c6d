use super::client::{ApiClient, ApiError};
use super::types::Tag;

impl ApiClient {
    pub async fn get_tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.get_json("tags", &[]).await
    }
}
