use std::str::FromStr;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::{doc, to_bson, Document};
use serde_json::json;
use validator::Validate;

use crate::db;
use crate::error::ApiError;
use crate::extract::{ApiJson, ApiQuery};
use crate::models::order::{
    CreateOrder, Order, OrderQuery, OrderStats, OrderStatus, StatusEntry, TrackingInfo,
    UpdateOrderStatus,
};
use crate::response;
use crate::state::AppState;

pub async fn create_order(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateOrder>,
) -> Result<impl IntoResponse, ApiError> {
    body.validate()?;
    body.check_items()?;

    let order = body.into_order();
    state.orders().insert_one(&order).await?;
    tracing::info!(order = %order.id, total = order.total_amount, "order placed");
    Ok(response::created("Order created successfully", order))
}

pub async fn track_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = find_order(&state, &id).await?;
    Ok(response::ok("Order tracking info retrieved successfully", TrackingInfo::from(order)))
}

pub async fn list_orders(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let pagination = query.pagination();
    let (orders, total) = db::find_page(&state.orders(), query.filter(), &pagination).await?;
    Ok(response::paginated("Orders retrieved successfully", orders, &pagination, total))
}

pub async fn list_by_status(
    State(state): State<AppState>,
    Path(status): Path<String>,
    ApiQuery(mut query): ApiQuery<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.status = Some(OrderStatus::from_str(&status)?);
    let pagination = query.pagination();
    let (orders, total) = db::find_page(&state.orders(), query.filter(), &pagination).await?;
    Ok(response::paginated("Orders retrieved successfully", orders, &pagination, total))
}

pub async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiQuery(mut query): ApiQuery<OrderQuery>,
) -> Result<impl IntoResponse, ApiError> {
    query.user_id = Some(user_id);
    let pagination = query.pagination();
    let (orders, total) = db::find_page(&state.orders(), query.filter(), &pagination).await?;
    Ok(response::paginated("Orders retrieved successfully", orders, &pagination, total))
}

pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = find_order(&state, &id).await?;
    Ok(response::ok("Order retrieved successfully", order))
}

pub async fn get_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let order = find_order(&state, &id).await?;
    Ok(response::ok(
        "Order status retrieved successfully",
        json!({
            "id": order.id,
            "status": order.status,
            "statusHistory": order.status_history,
        }),
    ))
}

pub async fn update_order_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<UpdateOrderStatus>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = StatusEntry {
        status: body.status,
        note: body.note.filter(|n| !n.is_empty()),
        location: body.location.filter(|l| !l.is_empty()),
        timestamp: Utc::now(),
    };
    let entry = to_bson(&entry).map_err(anyhow::Error::from)?;

    let result = state
        .orders()
        .update_one(
            doc! {"id": &id},
            doc! {
                "$set": {"status": body.status.as_str()},
                "$push": {"statusHistory": entry},
            },
        )
        .await?;
    if result.matched_count == 0 {
        return Err(ApiError::NotFound("Order not found".to_string()));
    }

    let order = find_order(&state, &id).await?;
    tracing::info!(order = %id, status = %order.status, "order status updated");
    Ok(response::ok("Order status updated successfully", order))
}

/// Dashboard counters: per-status totals plus revenue over all non-cancelled
/// orders.
pub async fn order_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let orders = state.orders();
    let count = |status: OrderStatus| orders.count_documents(doc! {"status": status.as_str()});

    let (total, pending, confirmed, processing, shipped, delivered, cancelled) = tokio::try_join!(
        orders.count_documents(doc! {}),
        count(OrderStatus::Pending),
        count(OrderStatus::Confirmed),
        count(OrderStatus::Processing),
        count(OrderStatus::Shipped),
        count(OrderStatus::Delivered),
        count(OrderStatus::Cancelled),
    )?;

    let pipeline = vec![
        doc! {"$match": {"status": {"$ne": OrderStatus::Cancelled.as_str()}}},
        doc! {"$group": {"_id": null, "total": {"$sum": "$totalAmount"}}},
    ];
    let revenue: Vec<Document> = orders.aggregate(pipeline).await?.try_collect().await?;
    let total_revenue = revenue
        .first()
        .and_then(|d| d.get("total"))
        .and_then(|v| v.as_f64().or_else(|| v.as_i64().map(|n| n as f64)))
        .unwrap_or(0.0);

    let stats = OrderStats {
        total_orders: total,
        pending_orders: pending,
        confirmed_orders: confirmed,
        processing_orders: processing,
        shipped_orders: shipped,
        delivered_orders: delivered,
        cancelled_orders: cancelled,
        total_revenue,
    };
    Ok(response::ok("Order statistics retrieved successfully", stats))
}

async fn find_order(state: &AppState, id: &str) -> Result<Order, ApiError> {
    state
        .orders()
        .find_one(doc! {"id": id})
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))
}
