use crate::domain::catalog::{Product, ProductDraft};
use crate::error::Result;
use crate::services::api_client::{ApiClient, ApiRequest, MultipartForm};
use crate::services::envelope::{decode_or_default, expect_success, read_body, read_data, read_saved};
use crate::services::{LIST_LIMIT, with_query};
use bytes::Bytes;
use serde_json::Value;

/// An image attached to the product form.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Clone, Debug)]
pub struct ProductService {
    api: ApiClient,
}

impl ProductService {
    #[must_use]
    pub const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn list(&self, search: Option<&str>) -> Result<Vec<Product>> {
        let path = with_query("/products", &[("search", search), ("limit", Some(LIST_LIMIT))]);
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        let mut body = read_body(response, "Failed to load products").await?;
        let products = body.pointer_mut("/data/products").map(Value::take).unwrap_or_default();
        decode_or_default(products, "Failed to load products")
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn get(&self, id: &str) -> Result<Product> {
        let path = format!("/products/{}", urlencoding::encode(id));
        let response = self.api.fetch(&path, ApiRequest::get()).await?;
        read_data(response, "Failed to load product").await
    }

    /// Creates the product, or updates it when `id` is given. Sent as a
    /// multipart form so images can ride along. Any 2xx is a success; the
    /// product is returned only when the API echoes it back.
    ///
    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self, draft, cover_image, images), fields(images = images.len()), err(level = "warn"))]
    pub async fn save(
        &self,
        id: Option<&str>,
        draft: &ProductDraft,
        cover_image: Option<ImageUpload>,
        images: Vec<ImageUpload>,
    ) -> Result<Option<Product>> {
        let form = product_form(draft, cover_image, images)?;
        let (path, request, fallback) = match id {
            Some(id) => (format!("/products/{}", urlencoding::encode(id)), ApiRequest::put(), "Failed to update product"),
            None => ("/products".to_string(), ApiRequest::post(), "Failed to create product"),
        };
        let response = self.api.fetch(&path, request.multipart(form)).await?;
        read_saved(response, fallback).await
    }

    /// # Errors
    /// Returns the upstream failure, or `Transport` if the API is unreachable.
    #[tracing::instrument(skip(self), err(level = "warn"))]
    pub async fn delete(&self, id: &str) -> Result<()> {
        let path = format!("/products/{}", urlencoding::encode(id));
        let response = self.api.fetch(&path, ApiRequest::delete()).await?;
        expect_success(response, "Failed to delete product").await
    }
}

fn product_form(draft: &ProductDraft, cover_image: Option<ImageUpload>, images: Vec<ImageUpload>) -> Result<MultipartForm> {
    let mut form = MultipartForm::new()
        .text("name", &draft.name)
        .text("description", &draft.description)
        .text("price", &draft.price)
        .text("stockUnit", &draft.stock_unit)
        .text("discountPercentage", &draft.discount_percentage)
        .text("categoryId", &draft.category_id)
        .text("brandId", &draft.brand_id)
        .text("tags", serde_json::to_string(&draft.tag_list())?);

    if let Some(cover) = cover_image {
        form = form.file("coverImage", cover.file_name, cover.content_type, cover.data);
    }
    for image in images {
        form = form.file("images", image.file_name, image.content_type, image.data);
    }
    Ok(form)
}
