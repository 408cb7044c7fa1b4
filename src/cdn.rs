//! Cloudinary-backed image storage.
//!
//! Uploads go straight to the CDN and only the public URL is persisted.
//! When no credentials are configured the client returns placeholder URLs,
//! which keeps development and tests off the network.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinaryConfig;
use crate::error::ApiError;
use crate::multipart::UploadedImage;

const PLACEHOLDER_URL: &str = "https://example.com/placeholder.jpg";

#[derive(Clone)]
pub struct Cdn {
    http: reqwest::Client,
    config: Option<Arc<CloudinaryConfig>>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: String,
}

impl Cdn {
    pub fn new(config: Option<CloudinaryConfig>) -> Self {
        Self { http: reqwest::Client::new(), config: config.map(Arc::new) }
    }

    /// Upload an image into `<folder>/<subfolder>` and return its public URL.
    pub async fn upload(&self, image: UploadedImage, subfolder: &str) -> Result<String, ApiError> {
        let Some(config) = &self.config else {
            return Ok(PLACEHOLDER_URL.to_string());
        };

        let folder = format!("{}/{}", config.folder, subfolder);
        let timestamp = unix_timestamp();
        let signature = sign(
            &[("folder", folder.as_str()), ("timestamp", timestamp.as_str())],
            &config.api_secret,
        );

        let part = reqwest::multipart::Part::bytes(image.bytes.to_vec())
            .file_name(image.filename.clone());
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", config.api_key.clone())
            .text("timestamp", timestamp)
            .text("folder", folder)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let url = format!("https://api.cloudinary.com/v1_1/{}/image/upload", config.cloud_name);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .context("CDN upload request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            tracing::error!(%status, "CDN rejected image upload");
            return Err(ApiError::BadRequest("Error uploading image".to_string()));
        }

        let body: UploadResponse =
            response.json().await.context("CDN upload response was not JSON")?;
        Ok(body.secure_url)
    }

    /// Best-effort delete by URL; failures are logged and swallowed so a
    /// stale CDN asset never blocks a document write.
    pub async fn delete(&self, image_url: &str) {
        let Some(config) = &self.config else { return };
        let Some(public_id) = public_id_from_url(image_url) else {
            tracing::warn!(url = %image_url, "could not derive CDN public id");
            return;
        };

        let timestamp = unix_timestamp();
        let signature = sign(
            &[("public_id", public_id.as_str()), ("timestamp", timestamp.as_str())],
            &config.api_secret,
        );
        let url = format!("https://api.cloudinary.com/v1_1/{}/image/destroy", config.cloud_name);
        let result = self
            .http
            .post(&url)
            .form(&[
                ("public_id", public_id.as_str()),
                ("timestamp", timestamp.as_str()),
                ("api_key", config.api_key.as_str()),
                ("signature", signature.as_str()),
                ("signature_algorithm", "sha256"),
            ])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                tracing::warn!(status = %response.status(), public_id, "CDN image delete failed")
            }
            Err(e) => tracing::warn!(error = %e, public_id, "CDN image delete failed"),
        }
    }
}

/// `<folder>/<name>` from the last two URL segments, extension stripped.
pub fn public_id_from_url(url: &str) -> Option<String> {
    let mut segments = url.rsplit('/');
    let filename = segments.next().filter(|s| !s.is_empty())?;
    let folder = segments.next().filter(|s| !s.is_empty())?;
    let name = filename.split('.').next().filter(|s| !s.is_empty())?;
    Some(format!("{}/{}", folder, name))
}

fn unix_timestamp() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
        .to_string()
}

/// Cloudinary request signature: parameters sorted by name, joined as a
/// query string, secret appended, SHA-256 hex digest.
fn sign(params: &[(&str, &str)], secret: &str) -> String {
    let mut sorted: Vec<_> = params.to_vec();
    sorted.sort_by_key(|(k, _)| *k);
    let joined = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(joined.as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_id_uses_last_two_segments() {
        assert_eq!(
            public_id_from_url("https://res.cloudinary.com/demo/image/upload/v1/shop/products/abc123.jpg"),
            Some("products/abc123".to_string())
        );
        assert_eq!(public_id_from_url("https://cdn/x/banner.png"), Some("x/banner".to_string()));
        assert_eq!(public_id_from_url(""), None);
        assert_eq!(public_id_from_url("single"), None);
    }

    #[test]
    fn signature_is_order_independent_and_secret_bound() {
        let a = sign(&[("timestamp", "100"), ("folder", "shop")], "s3cret");
        let b = sign(&[("folder", "shop"), ("timestamp", "100")], "s3cret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, sign(&[("folder", "shop"), ("timestamp", "100")], "other"));
    }

    #[tokio::test]
    async fn disabled_cdn_returns_placeholder() {
        let cdn = Cdn::new(None);
        let image = UploadedImage {
            bytes: axum::body::Bytes::from_static(b"fake"),
            filename: "a.png".to_string(),
        };
        assert_eq!(cdn.upload(image, "products").await.unwrap(), PLACEHOLDER_URL);
    }
}
