use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::response::{Pagination, SortOrder};
use crate::util::generate_id;

/// Time-boxed discounted offer on one product with a bounded stock counter.
/// `current_stock` counts units sold and may never exceed `max_stock`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashSale {
    pub id: String,
    #[serde(rename = "productId")]
    pub product_id: String,
    #[serde(rename = "flashPrice")]
    pub flash_price: f64,
    #[serde(rename = "currentStock")]
    pub current_stock: i64,
    #[serde(rename = "maxStock")]
    pub max_stock: i64,
    #[serde(rename = "startTime", with = "crate::util::rfc3339")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime", with = "crate::util::rfc3339")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

impl FlashSale {
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && now >= self.start_time && now <= self.end_time
    }

    /// Stock ceiling check; there is no cross-writer atomicity here, the
    /// document store's per-document write is the only guarantee.
    pub fn can_increment(&self, quantity: i64) -> bool {
        self.current_stock + quantity <= self.max_stock
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFlashSale {
    #[serde(rename = "productId")]
    #[validate(length(min = 1))]
    pub product_id: String,
    #[serde(rename = "flashPrice")]
    #[validate(range(min = 0.0))]
    pub flash_price: f64,
    #[serde(rename = "maxStock")]
    #[validate(range(min = 0))]
    pub max_stock: i64,
    #[serde(rename = "startTime", with = "crate::util::rfc3339")]
    pub start_time: DateTime<Utc>,
    #[serde(rename = "endTime", with = "crate::util::rfc3339")]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl CreateFlashSale {
    pub fn into_flash_sale(self) -> FlashSale {
        FlashSale {
            id: generate_id("flash"),
            product_id: self.product_id,
            flash_price: self.flash_price,
            current_stock: 0,
            max_stock: self.max_stock,
            start_time: self.start_time,
            end_time: self.end_time,
            is_active: self.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateFlashSale {
    #[serde(rename = "productId", skip_serializing_if = "Option::is_none")]
    pub product_id: Option<String>,
    #[serde(rename = "flashPrice", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub flash_price: Option<f64>,
    #[serde(rename = "currentStock", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub current_stock: Option<i64>,
    #[serde(rename = "maxStock", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub max_stock: Option<i64>,
    #[serde(
        rename = "startTime",
        with = "crate::util::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        rename = "endTime",
        with = "crate::util::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct IncrementStock {
    pub quantity: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FlashSaleQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl FlashSaleQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit, self.sort_by.clone(), self.order)
    }

    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        if let Some(product_id) = &self.product_id {
            filter.insert("productId", product_id);
        }
        if let Some(is_active) = self.is_active {
            filter.insert("isActive", is_active);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sale(current: i64, max: i64) -> FlashSale {
        let now = Utc::now();
        FlashSale {
            id: generate_id("flash"),
            product_id: "prod_1_a".into(),
            flash_price: 9.99,
            current_stock: current,
            max_stock: max,
            start_time: now - Duration::hours(1),
            end_time: now + Duration::hours(1),
            is_active: true,
            created_at: now,
        }
    }

    #[test]
    fn stock_bound_is_inclusive() {
        let sale = sale(8, 10);
        assert!(sale.can_increment(2));
        assert!(!sale.can_increment(3));
        assert!(sale.can_increment(0));
    }

    #[test]
    fn live_window_requires_active_flag_and_time_range() {
        let now = Utc::now();
        let mut s = sale(0, 10);
        assert!(s.is_live(now));

        s.is_active = false;
        assert!(!s.is_live(now));

        s.is_active = true;
        s.start_time = now + Duration::minutes(5);
        assert!(!s.is_live(now));

        s.start_time = now - Duration::hours(2);
        s.end_time = now - Duration::hours(1);
        assert!(!s.is_live(now));
    }

    #[test]
    fn create_starts_with_zero_sold() {
        let create: CreateFlashSale = serde_json::from_value(serde_json::json!({
            "productId": "prod_1_a",
            "flashPrice": 9.99,
            "maxStock": 100,
            "startTime": "2026-01-01T00:00:00Z",
            "endTime": "2026-01-02T00:00:00Z"
        }))
        .unwrap();
        let sale = create.into_flash_sale();
        assert_eq!(sale.current_stock, 0);
        assert!(sale.is_active);
        assert!(sale.id.starts_with("flash_"));
    }
}
