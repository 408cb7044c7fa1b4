//! Multipart form handling for the image-bearing admin endpoints.
//!
//! The admin client submits `multipart/form-data`: plain text fields plus an
//! optional `image` file part. Fields arrive as strings, so each request
//! type parses them explicitly through the typed getters here.

use std::collections::HashMap;

use axum::body::Bytes;
use axum::extract::Multipart;

use crate::error::ApiError;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;
const ALLOWED_EXTENSIONS: [&str; 5] = ["jpeg", "jpg", "png", "gif", "webp"];

#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Bytes,
    pub filename: String,
}

#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    pub image: Option<UploadedImage>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();
        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name() {
                Some(filename) if name == "image" => {
                    let filename = filename.to_string();
                    check_image_name(&filename)?;
                    let bytes = field.bytes().await?;
                    if bytes.len() > MAX_IMAGE_BYTES {
                        return Err(ApiError::BadRequest(
                            "Image exceeds the 5MB size limit".to_string(),
                        ));
                    }
                    form.image = Some(UploadedImage { bytes, filename });
                }
                _ => {
                    form.fields.insert(name, field.text().await?);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&self, key: &str) -> Result<String, ApiError> {
        self.text_opt(key)
            .ok_or_else(|| ApiError::BadRequest(format!("{} is required", key)))
    }

    /// Empty strings count as absent, matching how the admin form submits
    /// untouched optional fields.
    pub fn text_opt(&self, key: &str) -> Option<String> {
        self.fields
            .get(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    pub fn f64(&self, key: &str) -> Result<f64, ApiError> {
        self.parse(key, self.text(key)?)
    }

    pub fn f64_opt(&self, key: &str) -> Result<Option<f64>, ApiError> {
        self.text_opt(key).map(|v| self.parse(key, v)).transpose()
    }

    pub fn i64_opt(&self, key: &str) -> Result<Option<i64>, ApiError> {
        self.text_opt(key).map(|v| self.parse(key, v)).transpose()
    }

    pub fn bool(&self, key: &str) -> Result<bool, ApiError> {
        self.parse(key, self.text(key)?)
    }

    pub fn bool_opt(&self, key: &str) -> Result<Option<bool>, ApiError> {
        self.text_opt(key).map(|v| self.parse(key, v)).transpose()
    }

    fn parse<T: std::str::FromStr>(&self, key: &str, value: String) -> Result<T, ApiError> {
        value
            .parse::<T>()
            .map_err(|_| ApiError::BadRequest(format!("{} has an invalid value", key)))
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        FormData {
            fields: pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            image: None,
        }
    }
}

fn check_image_name(filename: &str) -> Result<(), ApiError> {
    let extension = filename.rsplit('.').next().unwrap_or_default().to_lowercase();
    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        Ok(())
    } else {
        Err(ApiError::BadRequest(
            "Only image files are allowed (jpeg, jpg, png, gif, webp)".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_getters_parse_and_reject() {
        let form = FormData::from_pairs(&[
            ("name", "  Phone  "),
            ("beforePrice", "199.5"),
            ("stock", "12"),
            ("hasOffer", "true"),
            ("description", ""),
        ]);
        assert_eq!(form.text("name").unwrap(), "Phone");
        assert_eq!(form.f64("beforePrice").unwrap(), 199.5);
        assert_eq!(form.i64_opt("stock").unwrap(), Some(12));
        assert!(form.bool("hasOffer").unwrap());
        assert_eq!(form.text_opt("description"), None);
        assert!(form.text("missing").is_err());
        assert!(form.f64("name").is_err());
    }

    #[test]
    fn image_extension_allowlist() {
        assert!(check_image_name("photo.WEBP").is_ok());
        assert!(check_image_name("photo.jpg").is_ok());
        assert!(check_image_name("payload.exe").is_err());
        assert!(check_image_name("noextension").is_err());
    }
}
