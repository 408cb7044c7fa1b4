use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use mongodb::bson::{doc, to_document};
use serde_json::json;
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::flash_sale::{
    CreateFlashSale, FlashSale, FlashSaleQuery, IncrementStock, UpdateFlashSale,
};
use crate::response;
use crate::state::AppState;
use crate::util::timestamp;

pub async fn list_flash_sales(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<FlashSaleQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (sales, total) = db::find_page(&state.flash_sales(), query.filter(), &pagination).await?;
    Ok(response::paginated("Flash sales retrieved successfully", sales, &pagination, total))
}

/// Sales that are both flagged active and inside their time window right now.
pub async fn list_active(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = timestamp(&Utc::now());
    let filter = doc! {
        "isActive": true,
        "startTime": {"$lte": now.clone()},
        "endTime": {"$gte": now},
    };
    let sales = db::find_all(&state.flash_sales(), filter).await?;
    Ok(response::ok("Active flash sales retrieved successfully", sales))
}

/// The running sale for one product, if any; `data` is null otherwise.
pub async fn get_by_product(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state
        .flash_sales()
        .find_one(doc! {"productId": &product_id, "isActive": true})
        .await?;
    Ok(response::ok("Flash sale retrieved successfully", sale))
}

pub async fn get_flash_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = find_sale(&state, &id).await?;
    Ok(response::ok("Flash sale retrieved successfully", sale))
}

/// Liveness probe for one sale. A missing sale reports inactive rather than
/// erroring so storefront pages can poll it blindly.
pub async fn is_active(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let sale = state.flash_sales().find_one(doc! {"id": &id}).await?;
    let live = sale.map(|s| s.is_live(Utc::now())).unwrap_or(false);
    Ok(response::ok("Flash sale status retrieved successfully", json!({"isActive": live})))
}

pub async fn create_flash_sale(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateFlashSale>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    if body.end_time <= body.start_time {
        return Err(ApiError::BadRequest("End time must be after start time".to_string()));
    }

    // One concurrent sale per product.
    let now = timestamp(&Utc::now());
    let clash = state
        .flash_sales()
        .find_one(doc! {
            "productId": &body.product_id,
            "isActive": true,
            "endTime": {"$gte": now},
        })
        .await?;
    if clash.is_some() {
        return Err(ApiError::Conflict(
            "An active flash sale already exists for this product".to_string(),
        ));
    }

    let sale = body.into_flash_sale();
    state.flash_sales().insert_one(&sale).await?;
    Ok(response::created("Flash sale created successfully", sale))
}

pub async fn update_flash_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateFlashSale>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let existing = find_sale(&state, &id).await?;

    let start = body.start_time.unwrap_or(existing.start_time);
    let end = body.end_time.unwrap_or(existing.end_time);
    if end <= start {
        return Err(ApiError::BadRequest("End time must be after start time".to_string()));
    }

    let current = body.current_stock.unwrap_or(existing.current_stock);
    let max = body.max_stock.unwrap_or(existing.max_stock);
    if current > max {
        let message = if body.current_stock.is_some() {
            "Current stock cannot exceed max stock"
        } else {
            "Max stock cannot be less than current stock"
        };
        return Err(ApiError::BadRequest(message.to_string()));
    }

    let set = to_document(&body).map_err(anyhow::Error::from)?;
    if !set.is_empty() {
        state.flash_sales().update_one(doc! {"id": &id}, doc! {"$set": set}).await?;
    }

    let sale = find_sale(&state, &id).await?;
    Ok(response::ok("Flash sale updated successfully", sale))
}

pub async fn delete_flash_sale(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .flash_sales()
        .find_one_and_delete(doc! {"id": &id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Flash sale not found".to_string()))?;
    Ok(response::message_only("Flash sale deleted successfully"))
}

/// Record units sold against the sale's stock ceiling. Body is optional;
/// quantity defaults to 1.
pub async fn increment_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Option<ApiJson<IncrementStock>>,
) -> Result<impl IntoResponse, ApiError> {
    let quantity = body.and_then(|ApiJson(b)| b.quantity).unwrap_or(1);
    if quantity < 1 {
        return Err(ApiError::BadRequest("Quantity must be at least 1".to_string()));
    }

    let existing = find_sale(&state, &id).await?;
    if !existing.can_increment(quantity) {
        return Err(ApiError::BadRequest("Flash sale stock limit reached".to_string()));
    }

    state
        .flash_sales()
        .update_one(doc! {"id": &id}, doc! {"$inc": {"currentStock": quantity}})
        .await?;

    let sale = find_sale(&state, &id).await?;
    Ok(response::ok("Flash sale stock updated successfully", sale))
}

/// Sweep that flips off every active sale whose window has already closed.
pub async fn deactivate_expired(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let now = timestamp(&Utc::now());
    let result = state
        .flash_sales()
        .update_many(
            doc! {"isActive": true, "endTime": {"$lt": now}},
            doc! {"$set": {"isActive": false}},
        )
        .await?;

    tracing::info!(count = result.modified_count, "deactivated expired flash sales");
    Ok(response::ok(
        "Expired flash sales deactivated successfully",
        json!({"count": result.modified_count}),
    ))
}

async fn find_sale(state: &AppState, id: &str) -> Result<FlashSale, ApiError> {
    state
        .flash_sales()
        .find_one(doc! {"id": id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Flash sale not found".to_string()))
}
