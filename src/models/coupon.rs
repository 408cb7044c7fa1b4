use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::response::{Pagination, SortOrder};

/// Discount code keyed by its uppercased `code`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Coupon {
    pub code: String,
    #[serde(rename = "discountAmount")]
    pub discount_amount: f64,
    #[serde(rename = "validFrom", with = "crate::util::rfc3339")]
    pub valid_from: DateTime<Utc>,
    #[serde(rename = "validTo", with = "crate::util::rfc3339")]
    pub valid_to: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

/// Where a coupon stands relative to its validity window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CouponState {
    Inactive,
    NotYetValid,
    Expired,
    Valid,
}

impl Coupon {
    pub fn state_at(&self, now: DateTime<Utc>) -> CouponState {
        if !self.is_active {
            CouponState::Inactive
        } else if now < self.valid_from {
            CouponState::NotYetValid
        } else if now > self.valid_to {
            CouponState::Expired
        } else {
            CouponState::Valid
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCoupon {
    #[validate(length(min = 3, max = 50))]
    pub code: String,
    #[serde(rename = "discountAmount")]
    #[validate(range(min = 0.0))]
    pub discount_amount: f64,
    #[serde(rename = "validFrom", with = "crate::util::rfc3339")]
    pub valid_from: DateTime<Utc>,
    #[serde(rename = "validTo", with = "crate::util::rfc3339")]
    pub valid_to: DateTime<Utc>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl CreateCoupon {
    pub fn into_coupon(self) -> Coupon {
        Coupon {
            code: self.code.to_uppercase(),
            discount_amount: self.discount_amount,
            valid_from: self.valid_from,
            valid_to: self.valid_to,
            is_active: self.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
pub struct UpdateCoupon {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 50))]
    pub code: Option<String>,
    #[serde(rename = "discountAmount", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub discount_amount: Option<f64>,
    #[serde(
        rename = "validFrom",
        with = "crate::util::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_from: Option<DateTime<Utc>>,
    #[serde(
        rename = "validTo",
        with = "crate::util::rfc3339::option",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub valid_to: Option<DateTime<Utc>>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ValidateCoupon {
    #[validate(length(min = 1))]
    pub code: String,
}

/// Validation endpoint payload.
#[derive(Debug, Serialize)]
pub struct CouponValidity {
    pub valid: bool,
    pub code: String,
    #[serde(rename = "discountAmount")]
    pub discount_amount: f64,
}

#[derive(Debug, Default, Deserialize)]
pub struct CouponQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl CouponQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit, self.sort_by.clone(), self.order)
    }

    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
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

    fn coupon(from_offset: i64, to_offset: i64, active: bool) -> Coupon {
        let now = Utc::now();
        Coupon {
            code: "SAVE10".into(),
            discount_amount: 10.0,
            valid_from: now + Duration::hours(from_offset),
            valid_to: now + Duration::hours(to_offset),
            is_active: active,
            created_at: now,
        }
    }

    #[test]
    fn window_membership() {
        let now = Utc::now();
        assert_eq!(coupon(-1, 1, true).state_at(now), CouponState::Valid);
        assert_eq!(coupon(1, 2, true).state_at(now), CouponState::NotYetValid);
        assert_eq!(coupon(-2, -1, true).state_at(now), CouponState::Expired);
        assert_eq!(coupon(-1, 1, false).state_at(now), CouponState::Inactive);
    }

    #[test]
    fn code_is_uppercased_on_create() {
        let create: CreateCoupon = serde_json::from_value(serde_json::json!({
            "code": "save10",
            "discountAmount": 10.0,
            "validFrom": "2026-01-01T00:00:00Z",
            "validTo": "2026-02-01T00:00:00Z"
        }))
        .unwrap();
        let coupon = create.into_coupon();
        assert_eq!(coupon.code, "SAVE10");
        assert!(coupon.is_active);
    }

    #[test]
    fn update_serializes_present_fields_only() {
        let update = UpdateCoupon { discount_amount: Some(15.0), ..Default::default() };
        let set = mongodb::bson::to_document(&update).unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains_key("discountAmount"));
    }
}
