use crate::domain::catalog::StoredImage;
use crate::error::Result;
use crate::services::api_client::{ApiClient, ApiRequest, MultipartForm};
use crate::services::envelope::{expect_success, read_data_or_default};
use crate::services::product_service::ImageUpload;

#[derive(Clone, Debug)]
pub struct ImageService {
    api: ApiClient,
}

impl ImageService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self) -> Result<Vec<StoredImage>> {
        let response = self.api.fetch("/products/s3-images", ApiRequest::get()).await?;
        read_data_or_default(response, "Failed to load images").await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self, image), fields(file_name = %image.file_name, size = image.data.len()), err(level = "warn"))]
    pub async fn upload(&self, image: ImageUpload) -> Result<()> {
        let form = MultipartForm::new().file("image", image.file_name, image.content_type, image.data);
        let response = self.api.fetch("/products/upload-image", ApiRequest::post().multipart(form)).await?;
        expect_success(response, "Failed to upload image").await
    }

    /// Deletes by object key. Keys contain `/`, so the key is percent-encoded
    /// as a single path segment.
    ///
    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, key: &str) -> Result<()> {
        let response = self.api.fetch(&image_path(key), ApiRequest::delete()).await?;
        expect_success(response, "Failed to delete image").await
    }
}

fn image_path(key: &str) -> String {
    format!("/products/s3-images/{}", urlencoding::encode(key))
}
