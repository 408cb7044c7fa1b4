use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use mongodb::bson::{doc, to_document};
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::models::product::{CreateProduct, ProductQuery, UpdateProduct};
use crate::multipart::FormData;
use crate::response;
use crate::state::AppState;

const IMAGE_FOLDER: &str = "products";

pub async fn list_products(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (products, total) = db::find_page(&state.products(), query.filter(), &pagination).await?;
    Ok(response::paginated("Products retrieved successfully", products, &pagination, total))
}

pub async fn list_offers(
    State(state): State<AppState>,
    ApiQuery(mut query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.has_offer = Some(true);
    let pagination = query.pagination();
    let (products, total) = db::find_page(&state.products(), query.filter(), &pagination).await?;
    Ok(response::paginated(
        "Products with offers retrieved successfully",
        products,
        &pagination,
        total,
    ))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    ApiQuery(mut query): ApiQuery<ProductQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.category_id = Some(category_id);
    let pagination = query.pagination();
    let (products, total) = db::find_page(&state.products(), query.filter(), &pagination).await?;
    Ok(response::paginated("Products retrieved successfully", products, &pagination, total))
}

pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    Ok(response::ok("Product retrieved successfully", product))
}

pub async fn create_product(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = CreateProduct::from_form(&form)?;
    body.validate()?;

    let uploaded = match form.image {
        Some(image) => Some(state.cdn.upload(image, IMAGE_FOLDER).await?),
        None => None,
    };

    let product = body.into_product(uploaded);
    state.products().insert_one(&product).await?;
    Ok(response::created("Product created successfully", product))
}

pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = UpdateProduct::from_form(&form)?;
    body.validate()?;

    let existing = state
        .products()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    // A replacement image retires the old CDN asset first.
    let uploaded = match form.image {
        Some(image) => {
            if !existing.image_url.is_empty() {
                state.cdn.delete(&existing.image_url).await;
            }
            Some(state.cdn.upload(image, IMAGE_FOLDER).await?)
        }
        None => None,
    };

    let mut set = to_document(&body).map_err(anyhow::Error::from)?;
    if let Some(url) = uploaded {
        set.insert("imageUrl", url);
    }
    if !set.is_empty() {
        state.products().update_one(doc! {"id": &id}, doc! {"$set": set}).await?;
    }

    let product = state
        .products()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;
    Ok(response::ok("Product updated successfully", product))
}

pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let product = state
        .products()
        .find_one_and_delete(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if !product.image_url.is_empty() {
        state.cdn.delete(&product.image_url).await;
    }
    Ok(response::message_only("Product deleted successfully"))
}
