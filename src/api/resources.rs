use std::path::Path;

use reqwest::multipart::{Form, Part};

use super::client::{ApiClient, ApiError};
use super::types::{Resource, ResourceFilterConditions};

impl ApiClient {
    // ========================================================================
    // Resource Operations
    // ========================================================================

    pub async fn get_resources(&self) -> Result<Vec<Resource>, ApiError> {
        self.get_json("resources", &[]).await
    }

    /// Delete a resource by its server location.
    ///
    /// The server answers with the remaining resources, which saves the
    /// caller a refetch.
    ///
    /// # Arguments
    ///
    /// * `location` - Server-relative path, as in [`Resource::location`]
    ///
    /// # Errors
    ///
    /// `ApiError::HttpStatus` if the server refuses the deletion, or
    /// `ApiError::Decode` if the remaining list cannot be read.
    pub async fn delete_resource(&self, location: &str) -> Result<Vec<Resource>, ApiError> {
        let body = self.delete("resources", &[("filePath", location)]).await?;
        tracing::info!(location = %location, "Resource deleted");
        serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub async fn get_resource_filter_conditions(
        &self,
    ) -> Result<ResourceFilterConditions, ApiError> {
        self.get_json("resources/filter-conditions", &[]).await
    }

    pub async fn get_resources_by_conditions(
        &self,
        date: Option<&str>,
        resource_type: Option<&str>,
    ) -> Result<Vec<Resource>, ApiError> {
        self.get_json(
            "resources/by-conditions",
            &[
                ("date", date.unwrap_or_default()),
                ("type", resource_type.unwrap_or_default()),
            ],
        )
        .await
    }

    /// Upload a file as multipart field `file`. The response carries the
    /// resource's `location`, which article content then references.
    ///
    /// # Arguments
    ///
    /// * `file_name` - Path or name of the file; only the final component is sent
    /// * `bytes` - File contents
    ///
    /// # Errors
    ///
    /// Uploads are POSTs, so they are only retried on 429/503.
    pub async fn upload_resource(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Resource, ApiError> {
        let file_name = Path::new(file_name)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_owned();
        let size = bytes.len();

        let resource: Resource = self
            .post_multipart("upload", || {
                Form::new().part(
                    "file",
                    Part::bytes(bytes.clone()).file_name(file_name.clone()),
                )
            })
            .await?;

        tracing::info!(file = %file_name, size = size, location = %resource.location, "Resource uploaded");
        Ok(resource)
    }
}
