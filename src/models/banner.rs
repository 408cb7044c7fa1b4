use chrono::{DateTime, Utc};
use mongodb::bson::Document;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::multipart::FormData;
use crate::response::{Pagination, SortOrder};
use crate::util::generate_id;

/// Pure content record for the storefront carousel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Banner {
    pub id: String,
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Validate)]
pub struct CreateBanner {
    #[validate(length(min = 3, max = 200))]
    pub title: String,
    pub subtitle: Option<String>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateBanner {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            title: form.text("title")?,
            subtitle: form.text_opt("subtitle"),
            image_url: form.text_opt("imageUrl"),
            is_active: form.bool_opt("isActive")?,
        })
    }

    pub fn into_banner(self, uploaded_url: Option<String>) -> Banner {
        Banner {
            id: generate_id("banner"),
            title: self.title,
            subtitle: self.subtitle,
            image_url: uploaded_url.or(self.image_url).unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Validate)]
pub struct UpdateBanner {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 3, max = 200))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateBanner {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            title: form.text_opt("title"),
            subtitle: form.text_opt("subtitle"),
            is_active: form.bool_opt("isActive")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct BannerQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl BannerQuery {
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

    #[test]
    fn create_banner_defaults() {
        let form = FormData::from_pairs(&[("title", "Summer Sale")]);
        let banner = CreateBanner::from_form(&form).unwrap().into_banner(None);
        assert!(banner.id.starts_with("banner_"));
        assert_eq!(banner.subtitle, None);
        assert!(banner.is_active);
        assert_eq!(banner.image_url, "");
    }

    #[test]
    fn title_bounds_enforced() {
        let form = FormData::from_pairs(&[("title", "ab")]);
        let create = CreateBanner::from_form(&form).unwrap();
        assert!(create.validate().is_err());
    }
}
