use axum::extract::{Multipart, Path, State};
use axum::response::IntoResponse;
use mongodb::bson::{doc, to_document};
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::ApiQuery;
use crate::models::category::{CategoryQuery, CreateCategory, UpdateCategory};
use crate::multipart::FormData;
use crate::response;
use crate::state::AppState;
use crate::util::{is_valid_slug, slugify};

const IMAGE_FOLDER: &str = "categories";

pub async fn list_categories(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CategoryQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (categories, total) =
        db::find_page(&state.categories(), query.filter(), &pagination).await?;
    Ok(response::paginated("Categories retrieved successfully", categories, &pagination, total))
}

pub async fn list_active(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let categories = db::find_all(&state.categories(), doc! {"isActive": true}).await?;
    Ok(response::ok("Active categories retrieved successfully", categories))
}

pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(response::ok("Category retrieved successfully", category))
}

pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    if !is_valid_slug(&slug) {
        return Err(ApiError::BadRequest("Invalid slug format".to_string()));
    }
    let category = state
        .categories()
        .find_one(doc! {"slug": &slug})
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(response::ok("Category retrieved successfully", category))
}

pub async fn create_category(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = CreateCategory::from_form(&form)?;
    body.validate()?;

    let slug = slugify(&body.name);
    if state.categories().find_one(doc! {"slug": &slug}).await?.is_some() {
        return Err(ApiError::Conflict("Category with this name already exists".to_string()));
    }

    let uploaded = match form.image {
        Some(image) => Some(state.cdn.upload(image, IMAGE_FOLDER).await?),
        None => None,
    };

    let category = body.into_category(uploaded);
    state.categories().insert_one(&category).await?;
    Ok(response::created("Category created successfully", category))
}

pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = FormData::read(multipart).await?;
    let body = UpdateCategory::from_form(&form)?;
    body.validate()?;

    let existing = state
        .categories()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    let mut set = to_document(&body).map_err(anyhow::Error::from)?;

    // Renaming a category re-derives its slug, which must stay unique.
    if let Some(name) = &body.name {
        let slug = slugify(name);
        if slug != existing.slug {
            let clash = state
                .categories()
                .find_one(doc! {"slug": &slug, "id": {"$ne": &id}})
                .await?;
            if clash.is_some() {
                return Err(ApiError::Conflict(
                    "Category with this name already exists".to_string(),
                ));
            }
            set.insert("slug", slug);
        }
    }

    if let Some(image) = form.image {
        if !existing.image_url.is_empty() {
            state.cdn.delete(&existing.image_url).await;
        }
        let url = state.cdn.upload(image, IMAGE_FOLDER).await?;
        set.insert("imageUrl", url);
    }

    if !set.is_empty() {
        state.categories().update_one(doc! {"id": &id}, doc! {"$set": set}).await?;
    }

    let category = state
        .categories()
        .find_one(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;
    Ok(response::ok("Category updated successfully", category))
}

pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let category = state
        .categories()
        .find_one_and_delete(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Category not found".to_string()))?;

    if !category.image_url.is_empty() {
        state.cdn.delete(&category.image_url).await;
    }
    Ok(response::message_only("Category deleted successfully"))
}
