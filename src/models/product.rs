use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::multipart::FormData;
use crate::response::{Pagination, SortOrder};
use crate::util::generate_id;

/// Catalog product. Prices are tiered: the strike-through `beforePrice`,
/// the selling `afterPrice`, and an optional legacy `price`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: Option<f64>,
    #[serde(rename = "beforePrice")]
    pub before_price: f64,
    #[serde(rename = "afterPrice")]
    pub after_price: f64,
    #[serde(rename = "discountPrice")]
    pub discount_price: f64,
    #[serde(rename = "hasOffer")]
    pub has_offer: bool,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    pub stock: Option<i64>,
    pub category_id: Option<String>,
    #[serde(rename = "sectionId")]
    pub section_id: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Validate)]
pub struct CreateProduct {
    #[validate(length(min = 3, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0.0))]
    pub before_price: f64,
    #[validate(range(min = 0.0))]
    pub after_price: f64,
    #[validate(range(min = 0.0))]
    pub discount_price: f64,
    pub has_offer: bool,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub category_id: Option<String>,
    pub section_id: String,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateProduct {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            name: form.text("name")?,
            description: form.text_opt("description"),
            price: form.f64_opt("price")?,
            before_price: form.f64("beforePrice")?,
            after_price: form.f64("afterPrice")?,
            discount_price: form.f64("discountPrice")?,
            has_offer: form.bool("hasOffer")?,
            stock: form.i64_opt("stock")?,
            category_id: form.text_opt("category_id"),
            section_id: form.text("sectionId")?,
            image_url: form.text_opt("imageUrl"),
            is_active: form.bool_opt("isActive")?,
        })
    }

    pub fn into_product(self, uploaded_url: Option<String>) -> Product {
        Product {
            id: generate_id("prod"),
            name: self.name,
            description: self.description,
            price: self.price,
            before_price: self.before_price,
            after_price: self.after_price,
            discount_price: self.discount_price,
            has_offer: self.has_offer,
            image_url: uploaded_url.or(self.image_url).unwrap_or_default(),
            stock: self.stock,
            category_id: self.category_id,
            section_id: self.section_id,
            is_active: self.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

/// Partial update; only present fields land in the `$set` document, so the
/// serialized wire names must match the stored field names exactly.
#[derive(Debug, Default, Serialize, Validate)]
pub struct UpdateProduct {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 200))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub price: Option<f64>,
    #[serde(rename = "beforePrice", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub before_price: Option<f64>,
    #[serde(rename = "afterPrice", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub after_price: Option<f64>,
    #[serde(rename = "discountPrice", skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0))]
    pub discount_price: Option<f64>,
    #[serde(rename = "hasOffer", skip_serializing_if = "Option::is_none")]
    pub has_offer: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(rename = "sectionId", skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateProduct {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            name: form.text_opt("name"),
            description: form.text_opt("description"),
            price: form.f64_opt("price")?,
            before_price: form.f64_opt("beforePrice")?,
            after_price: form.f64_opt("afterPrice")?,
            discount_price: form.f64_opt("discountPrice")?,
            has_offer: form.bool_opt("hasOffer")?,
            stock: form.i64_opt("stock")?,
            category_id: form.text_opt("category_id"),
            section_id: form.text_opt("sectionId"),
            is_active: form.bool_opt("isActive")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ProductQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub search: Option<String>,
    #[serde(rename = "categoryId")]
    pub category_id: Option<String>,
    #[serde(rename = "sectionId")]
    pub section_id: Option<String>,
    #[serde(rename = "hasOffer")]
    pub has_offer: Option<bool>,
    #[serde(rename = "minPrice")]
    pub min_price: Option<f64>,
    #[serde(rename = "maxPrice")]
    pub max_price: Option<f64>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl ProductQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit, self.sort_by.clone(), self.order)
    }

    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        if let Some(search) = &self.search {
            filter.insert("$text", doc! {"$search": search});
        }
        if let Some(category_id) = &self.category_id {
            filter.insert("category_id", category_id);
        }
        if let Some(section_id) = &self.section_id {
            filter.insert("sectionId", section_id);
        }
        if let Some(has_offer) = self.has_offer {
            filter.insert("hasOffer", has_offer);
        }
        if let Some(is_active) = self.is_active {
            filter.insert("isActive", is_active);
        }
        if self.min_price.is_some() || self.max_price.is_some() {
            let mut range = Document::new();
            if let Some(min) = self.min_price {
                range.insert("$gte", min);
            }
            if let Some(max) = self.max_price {
                range.insert("$lte", max);
            }
            filter.insert("afterPrice", range);
        }
        filter
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_includes_only_present_params() {
        let q = ProductQuery {
            has_offer: Some(true),
            min_price: Some(10.0),
            max_price: Some(50.0),
            ..Default::default()
        };
        assert_eq!(
            q.filter(),
            doc! {"hasOffer": true, "afterPrice": {"$gte": 10.0, "$lte": 50.0}}
        );
        assert_eq!(ProductQuery::default().filter(), Document::new());
    }

    #[test]
    fn create_from_form_applies_defaults() {
        let form = FormData::from_pairs(&[
            ("name", "Solar Lamp"),
            ("beforePrice", "30"),
            ("afterPrice", "25"),
            ("discountPrice", "5"),
            ("hasOffer", "true"),
            ("sectionId", "featured"),
        ]);
        let create = CreateProduct::from_form(&form).unwrap();
        create.validate().unwrap();
        let product = create.into_product(Some("https://cdn/x/lamp.jpg".into()));
        assert!(product.id.starts_with("prod_"));
        assert!(product.is_active);
        assert_eq!(product.image_url, "https://cdn/x/lamp.jpg");
        assert_eq!(product.stock, None);
    }

    #[test]
    fn short_name_fails_validation() {
        let form = FormData::from_pairs(&[
            ("name", "ab"),
            ("beforePrice", "30"),
            ("afterPrice", "25"),
            ("discountPrice", "5"),
            ("hasOffer", "false"),
            ("sectionId", "featured"),
        ]);
        let create = CreateProduct::from_form(&form).unwrap();
        assert!(create.validate().is_err());
    }

    #[test]
    fn update_serializes_only_present_fields() {
        let update = UpdateProduct { name: Some("New name".into()), ..Default::default() };
        let set = mongodb::bson::to_document(&update).unwrap();
        assert_eq!(set, doc! {"name": "New name"});
    }
}
