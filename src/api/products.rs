use crate::api::{AppState, saved};
use crate::api::brands::SearchQuery;
use crate::api::middleware::AdminSession;
use crate::domain::catalog::{Product, ProductDraft};
use crate::error::{AppError, Result};
use crate::services::product_service::ImageUpload;
use axum::{
    Json,
    extract::{
        Multipart, Path, Query, State,
        multipart::{Field, MultipartError},
    },
    http::StatusCode,
    response::Response,
};
use serde_json::{Map, Value};

/// A parsed product form: text fields plus the uploaded images.
#[derive(Debug)]
pub struct ProductForm {
    pub draft: ProductDraft,
    pub cover_image: Option<ImageUpload>,
    pub images: Vec<ImageUpload>,
}

pub async fn list_products(
    State(state): State<AppState>,
    _session: AdminSession,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<Product>>> {
    Ok(Json(state.product_service.list(query.search.as_deref()).await?))
}

pub async fn get_product(State(state): State<AppState>, _session: AdminSession, Path(id): Path<String>) -> Result<Json<Product>> {
    Ok(Json(state.product_service.get(&id).await?))
}

pub async fn create_product(
    State(state): State<AppState>,
    _session: AdminSession,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    let product = state.product_service.save(None, &form.draft, form.cover_image, form.images).await?;
    Ok(saved(StatusCode::CREATED, product))
}

pub async fn update_product(
    State(state): State<AppState>,
    _session: AdminSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Response> {
    let form = read_product_form(multipart).await?;
    let product = state.product_service.save(Some(&id), &form.draft, form.cover_image, form.images).await?;
    Ok(saved(StatusCode::OK, product))
}

pub async fn delete_product(State(state): State<AppState>, _session: AdminSession, Path(id): Path<String>) -> Result<StatusCode> {
    state.product_service.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn read_product_form(mut multipart: Multipart) -> Result<ProductForm> {
    let mut fields = Map::new();
    let mut cover_image = None;
    let mut images = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(invalid_form)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "coverImage" => cover_image = read_upload(field).await?,
            "images" => images.extend(read_upload(field).await?),
            _ => {
                let text = field.text().await.map_err(invalid_form)?;
                fields.insert(name, Value::String(text));
            }
        }
    }

    let draft = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::Validation(format!("Invalid product form: {e}")))?;
    Ok(ProductForm { draft, cover_image, images })
}

/// Reads a file part; an empty file input is skipped.
pub(crate) async fn read_upload(field: Field<'_>) -> Result<Option<ImageUpload>> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field.content_type().map(str::to_string);
    let data = field.bytes().await.map_err(invalid_form)?;

    if data.is_empty() {
        return Ok(None);
    }
    Ok(Some(ImageUpload { file_name, content_type, data }))
}

pub(crate) fn invalid_form(e: MultipartError) -> AppError {
    AppError::Validation(e.body_text())
}
