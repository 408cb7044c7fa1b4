use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use mongodb::bson::{doc, to_document};
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::coupon::{
    CouponQuery, CouponState, CouponValidity, CreateCoupon, UpdateCoupon, ValidateCoupon,
};
use crate::response;
use crate::state::AppState;
use crate::util::timestamp;

pub async fn list_coupons(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<CouponQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (coupons, total) = db::find_page(&state.coupons(), query.filter(), &pagination).await?;
    Ok(response::paginated("Coupons retrieved successfully", coupons, &pagination, total))
}

/// Active coupons whose validity window contains the current time.
pub async fn list_active(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let now = timestamp(&Utc::now());
    let filter = doc! {
        "isActive": true,
        "validFrom": {"$lte": now.clone()},
        "validTo": {"$gte": now},
    };
    let coupons = db::find_all(&state.coupons(), filter).await?;
    Ok(response::ok("Active coupons retrieved successfully", coupons))
}

pub async fn validate_coupon(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<ValidateCoupon>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let code = body.code.to_uppercase();
    let coupon = state
        .coupons()
        .find_one(doc! {"code": &code})
        .await?
        .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;

    match coupon.state_at(Utc::now()) {
        CouponState::Inactive => Err(ApiError::BadRequest("Coupon is not active".to_string())),
        CouponState::NotYetValid => {
            Err(ApiError::BadRequest("Coupon is not valid yet".to_string()))
        }
        CouponState::Expired => Err(ApiError::BadRequest("Coupon has expired".to_string())),
        CouponState::Valid => Ok(response::ok(
            "Coupon is valid",
            CouponValidity {
                valid: true,
                code: coupon.code,
                discount_amount: coupon.discount_amount,
            },
        )),
    }
}

pub async fn get_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let coupon = state
        .coupons()
        .find_one(doc! {"code": code.to_uppercase()})
        .await?
        .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;
    Ok(response::ok("Coupon retrieved successfully", coupon))
}

pub async fn create_coupon(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateCoupon>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    if body.valid_to <= body.valid_from {
        return Err(ApiError::BadRequest(
            "Valid to date must be after valid from date".to_string(),
        ));
    }

    let code = body.code.to_uppercase();
    if state.coupons().find_one(doc! {"code": &code}).await?.is_some() {
        return Err(ApiError::Conflict("Coupon code already exists".to_string()));
    }

    let coupon = body.into_coupon();
    state.coupons().insert_one(&coupon).await?;
    Ok(response::created("Coupon created successfully", coupon))
}

pub async fn update_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
    ApiJson(body): ApiJson<UpdateCoupon>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;

    let code = code.to_uppercase();
    let existing = state
        .coupons()
        .find_one(doc! {"code": &code})
        .await?
        .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;

    let valid_from = body.valid_from.unwrap_or(existing.valid_from);
    let valid_to = body.valid_to.unwrap_or(existing.valid_to);
    if valid_to <= valid_from {
        return Err(ApiError::BadRequest(
            "Valid to date must be after valid from date".to_string(),
        ));
    }

    let mut set = to_document(&body).map_err(anyhow::Error::from)?;
    if let Some(new_code) = &body.code {
        let new_code = new_code.to_uppercase();
        if new_code != code
            && state.coupons().find_one(doc! {"code": &new_code}).await?.is_some()
        {
            return Err(ApiError::Conflict("Coupon code already exists".to_string()));
        }
        set.insert("code", new_code);
    }

    if !set.is_empty() {
        state.coupons().update_one(doc! {"code": &code}, doc! {"$set": set}).await?;
    }

    let lookup = body.code.map(|c| c.to_uppercase()).unwrap_or(code);
    let coupon = state
        .coupons()
        .find_one(doc! {"code": &lookup})
        .await?
        .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;
    Ok(response::ok("Coupon updated successfully", coupon))
}

pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .coupons()
        .find_one_and_delete(doc! {"code": code.to_uppercase()})
        .await?
        .ok_or_else(|| ApiError::NotFound("Coupon not found".to_string()))?;
    Ok(response::message_only("Coupon deleted successfully"))
}
