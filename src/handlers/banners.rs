use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use mongodb::bson::{doc, to_document};
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::models::banner::{BannerQuery, CreateBanner, UpdateBanner};
use crate::multipart::FormData;
use crate::response;
use crate::state::AppState;

const IMAGE_FOLDER: &str = "banners";

pub async fn list_banners(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BannerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (banners, total) = db::find_page(&state.banners(), query.filter(), &pagination).await?;
    Ok(response::paginated("Banners retrieved successfully", banners, &pagination, total))
}

pub async fn list_active(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let banners = db::find_all(&state.banners(), doc! {"isActive": true}).await?;
    Ok(response::ok("Active banners retrieved successfully", banners))
}

pub async fn get_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let banner = state
        .banners()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;
    Ok(response::ok("Banner retrieved successfully", banner))
}

pub async fn create_banner(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = CreateBanner::from_form(&form)?;
    body.validate()?;

    let uploaded = match form.image {
        Some(image) => Some(state.cdn.upload(image, IMAGE_FOLDER).await?),
        None => None,
    };

    let banner = body.into_banner(uploaded);
    state.banners().insert_one(&banner).await?;
    Ok(response::created("Banner created successfully", banner))
}

pub async fn update_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = UpdateBanner::from_form(&form)?;
    body.validate()?;

    let existing = state
        .banners()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    let mut set = to_document(&body).map_err(anyhow::Error::from)?;
    if let Some(image) = form.image {
        if !existing.image_url.is_empty() {
            state.cdn.delete(&existing.image_url).await;
        }
        let url = state.cdn.upload(image, IMAGE_FOLDER).await?;
        set.insert("imageUrl", url);
    }

    if !set.is_empty() {
        state.banners().update_one(doc! {"id": &id}, doc! {"$set": set}).await?;
    }

    let banner = state
        .banners()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;
    Ok(response::ok("Banner updated successfully", banner))
}

pub async fn delete_banner(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let banner = state
        .banners()
        .find_one_and_delete(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Banner not found".to_string()))?;

    if !banner.image_url.is_empty() {
        state.cdn.delete(&banner.image_url).await;
    }
    Ok(response::message_only("Banner deleted successfully"))
}
