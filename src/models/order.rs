use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::response::{Pagination, SortOrder};
use crate::util::generate_id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Processing,
    Sent,
    OnTheWay,
    OutForDelivery,
    Shipped,
    Delivered,
    Received,
    Reached,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 11] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Sent,
        OrderStatus::OnTheWay,
        OrderStatus::OutForDelivery,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Received,
        OrderStatus::Reached,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Sent => "sent",
            OrderStatus::OnTheWay => "on_the_way",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Received => "received",
            OrderStatus::Reached => "reached",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| {
                let valid: Vec<&str> = Self::ALL.iter().map(OrderStatus::as_str).collect();
                ApiError::BadRequest(format!(
                    "Invalid status. Must be one of: {}",
                    valid.join(", ")
                ))
            })
    }
}

/// Line item snapshotted from the product at order time.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct OrderItem {
    #[serde(rename = "productId")]
    pub product_id: String,
    pub name: String,
    #[validate(range(min = 0.0))]
    pub price: f64,
    #[validate(range(min = 1))]
    pub quantity: i64,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Append-only status audit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusEntry {
    pub status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(with = "crate::util::rfc3339")]
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub name: String,
    pub phone: String,
    pub district: String,
    pub city: String,
    pub address: String,
    pub description: String,
    pub items: Vec<OrderItem>,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    pub status: OrderStatus,
    #[serde(rename = "statusHistory", default)]
    pub status_history: Vec<StatusEntry>,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrder {
    pub user_id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(length(min = 1))]
    pub name: String,
    #[serde(deserialize_with = "string_or_number")]
    pub phone: String,
    #[validate(length(min = 1))]
    pub district: String,
    #[validate(length(min = 1))]
    pub city: String,
    #[validate(length(min = 1))]
    pub address: String,
    pub description: String,
    pub items: Vec<OrderItem>,
    #[serde(rename = "totalAmount")]
    #[validate(range(min = 0.0))]
    pub total_amount: f64,
}

impl CreateOrder {
    /// Item-level checks the derive cannot express: at least one item, each
    /// item well-formed.
    pub fn check_items(&self) -> Result<(), ApiError> {
        if self.items.is_empty() {
            return Err(ApiError::BadRequest("Order must have at least one item".to_string()));
        }
        for item in &self.items {
            item.validate()?;
        }
        Ok(())
    }

    pub fn into_order(self) -> Order {
        let created_at = Utc::now();
        Order {
            id: generate_id("order"),
            user_id: self.user_id,
            first_name: self.first_name,
            last_name: self.last_name,
            name: self.name,
            phone: self.phone,
            district: self.district,
            city: self.city,
            address: self.address,
            description: self.description,
            items: self.items,
            total_amount: self.total_amount,
            status: OrderStatus::Pending,
            status_history: vec![StatusEntry {
                status: OrderStatus::Pending,
                note: None,
                location: None,
                timestamp: created_at,
            }],
            created_at,
        }
    }
}

/// Clients send phone numbers either quoted or bare; both are stored as text.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Value {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Value::deserialize(deserializer)? {
        Value::Text(s) => s,
        Value::Int(n) => n.to_string(),
        Value::Float(n) => n.to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatus {
    pub status: OrderStatus,
    pub note: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OrderQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub status: Option<OrderStatus>,
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
}

impl OrderQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit, self.sort_by.clone(), self.order)
    }

    /// Date bounds are compared as RFC 3339 strings, the same representation
    /// `created_at` is stored in.
    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(user_id) = &self.user_id {
            filter.insert("user_id", user_id);
        }
        if self.start_date.is_some() || self.end_date.is_some() {
            let mut range = Document::new();
            if let Some(start) = &self.start_date {
                range.insert("$gte", start);
            }
            if let Some(end) = &self.end_date {
                range.insert("$lte", end);
            }
            filter.insert("created_at", range);
        }
        filter
    }
}

/// Public tracking projection; deliberately excludes address and contact
/// details.
#[derive(Debug, Serialize)]
pub struct TrackingInfo {
    #[serde(rename = "orderId")]
    pub order_id: String,
    pub status: OrderStatus,
    #[serde(rename = "statusHistory")]
    pub status_history: Vec<StatusEntry>,
    #[serde(rename = "customerName")]
    pub customer_name: String,
    #[serde(rename = "totalAmount")]
    pub total_amount: f64,
    #[serde(rename = "createdAt", with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

impl From<Order> for TrackingInfo {
    fn from(order: Order) -> Self {
        Self {
            order_id: order.id,
            status: order.status,
            status_history: order.status_history,
            customer_name: order.name,
            total_amount: order.total_amount,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Default, Serialize)]
pub struct OrderStats {
    #[serde(rename = "totalOrders")]
    pub total_orders: u64,
    #[serde(rename = "pendingOrders")]
    pub pending_orders: u64,
    #[serde(rename = "confirmedOrders")]
    pub confirmed_orders: u64,
    #[serde(rename = "processingOrders")]
    pub processing_orders: u64,
    #[serde(rename = "shippedOrders")]
    pub shipped_orders: u64,
    #[serde(rename = "deliveredOrders")]
    pub delivered_orders: u64,
    #[serde(rename = "cancelledOrders")]
    pub cancelled_orders: u64,
    #[serde(rename = "totalRevenue")]
    pub total_revenue: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    fn sample_create() -> CreateOrder {
        serde_json::from_value(serde_json::json!({
            "name": "Asha",
            "phone": 9841234567i64,
            "district": "Kathmandu",
            "city": "Kathmandu",
            "address": "Street 5",
            "description": "Leave at door",
            "items": [{
                "productId": "prod_1_a",
                "name": "Lamp",
                "price": 25.0,
                "quantity": 2,
                "imageUrl": "https://cdn/x/lamp.jpg"
            }],
            "totalAmount": 50.0
        }))
        .unwrap()
    }

    #[test]
    fn status_round_trips_through_strings() {
        for status in OrderStatus::ALL {
            assert_eq!(OrderStatus::from_str(status.as_str()).unwrap(), status);
        }
        assert!(OrderStatus::from_str("teleported").is_err());
        assert_eq!(
            serde_json::to_value(OrderStatus::OnTheWay).unwrap(),
            serde_json::json!("on_the_way")
        );
    }

    #[test]
    fn new_order_seeds_pending_history() {
        let order = sample_create().into_order();
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.status_history.len(), 1);
        assert_eq!(order.status_history[0].status, OrderStatus::Pending);
        assert_eq!(order.phone, "9841234567");
        assert!(order.id.starts_with("order_"));
    }

    #[test]
    fn empty_items_rejected() {
        let mut create = sample_create();
        create.items.clear();
        assert!(create.check_items().is_err());
    }

    #[test]
    fn zero_quantity_item_rejected() {
        let mut create = sample_create();
        create.items[0].quantity = 0;
        assert!(create.check_items().is_err());
    }

    #[test]
    fn filter_combines_status_and_date_range() {
        let q = OrderQuery {
            status: Some(OrderStatus::Shipped),
            start_date: Some("2026-01-01".into()),
            ..Default::default()
        };
        assert_eq!(
            q.filter(),
            doc! {"status": "shipped", "created_at": {"$gte": "2026-01-01"}}
        );
    }

    #[test]
    fn tracking_info_drops_contact_details() {
        let order = sample_create().into_order();
        let tracking = serde_json::to_value(TrackingInfo::from(order)).unwrap();
        assert!(tracking.get("address").is_none());
        assert!(tracking.get("phone").is_none());
        assert_eq!(tracking["customerName"], "Asha");
    }
}
