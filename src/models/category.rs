use chrono::{DateTime, Utc};
use mongodb::bson::{doc, Document};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::error::ApiError;
use crate::multipart::FormData;
use crate::response::{Pagination, SortOrder};
use crate::util::{generate_id, slugify};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    #[serde(rename = "imageUrl", default)]
    pub image_url: String,
    #[serde(rename = "isActive")]
    pub is_active: bool,
    #[serde(with = "crate::util::rfc3339")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Validate)]
pub struct CreateCategory {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

impl CreateCategory {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            name: form.text("name")?,
            description: form.text("description")?,
            image_url: form.text_opt("imageUrl"),
            is_active: form.bool_opt("isActive")?,
        })
    }

    /// The slug is always derived from the name; callers must reject
    /// duplicates before inserting.
    pub fn into_category(self, uploaded_url: Option<String>) -> Category {
        let slug = slugify(&self.name);
        Category {
            id: generate_id("cat"),
            name: self.name,
            slug,
            description: self.description,
            image_url: uploaded_url.or(self.image_url).unwrap_or_default(),
            is_active: self.is_active.unwrap_or(true),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Default, Serialize, Validate)]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateCategory {
    pub fn from_form(form: &FormData) -> Result<Self, ApiError> {
        Ok(Self {
            name: form.text_opt("name"),
            description: form.text_opt("description"),
            is_active: form.bool_opt("isActive")?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub page: Option<u64>,
    pub limit: Option<i64>,
    #[serde(rename = "sortBy")]
    pub sort_by: Option<String>,
    pub order: Option<SortOrder>,
    pub search: Option<String>,
    #[serde(rename = "isActive")]
    pub is_active: Option<bool>,
}

impl CategoryQuery {
    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.limit, self.sort_by.clone(), self.order)
    }

    pub fn filter(&self) -> Document {
        let mut filter = Document::new();
        if let Some(search) = &self.search {
            filter.insert("name", doc! {"$regex": search, "$options": "i"});
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

    #[test]
    fn slug_derived_from_name() {
        let form = FormData::from_pairs(&[("name", "Home & Garden"), ("description", "Things")]);
        let category = CreateCategory::from_form(&form).unwrap().into_category(None);
        assert_eq!(category.slug, "home-garden");
        assert!(category.id.starts_with("cat_"));
        assert!(category.is_active);
    }

    #[test]
    fn search_filter_is_case_insensitive_regex() {
        let q = CategoryQuery { search: Some("gar".into()), ..Default::default() };
        assert_eq!(q.filter(), doc! {"name": {"$regex": "gar", "$options": "i"}});
    }
}
