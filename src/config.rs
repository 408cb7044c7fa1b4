//! Environment-driven configuration.

use anyhow::{Context, Result};
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongodb_uri: String,
    pub mongodb_db: String,
    pub jwt_admin_secret: String,
    pub jwt_expire_days: i64,
    pub cloudinary: Option<CloudinaryConfig>,
    pub admin_seed: Option<AdminSeed>,
}

#[derive(Debug, Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub folder: String,
}

/// Initial admin account created on startup when none exists yet.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub email: String,
    pub password: String,
    pub name: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse::<u16>()
            .context("invalid PORT")?;

        let mongodb_uri = env::var("MONGODB_URI").context("MONGODB_URI is required")?;
        let mongodb_db = env::var("MONGODB_DB").unwrap_or_else(|_| "storefront".to_string());

        let jwt_admin_secret =
            env::var("JWT_ADMIN_SECRET").context("JWT_ADMIN_SECRET is required")?;
        let jwt_expire_days = env::var("JWT_EXPIRE_DAYS")
            .unwrap_or_else(|_| "7".to_string())
            .parse::<i64>()
            .context("invalid JWT_EXPIRE_DAYS")?;

        // Image uploads are disabled (placeholder URLs) when the CDN
        // credentials are absent, which keeps local development and tests
        // off the network.
        let cloudinary = match (
            env::var("CLOUDINARY_CLOUD_NAME"),
            env::var("CLOUDINARY_API_KEY"),
            env::var("CLOUDINARY_API_SECRET"),
        ) {
            (Ok(cloud_name), Ok(api_key), Ok(api_secret)) => Some(CloudinaryConfig {
                cloud_name,
                api_key,
                api_secret,
                folder: env::var("CLOUDINARY_FOLDER").unwrap_or_else(|_| "storefront".to_string()),
            }),
            _ => {
                tracing::warn!("Cloudinary credentials missing, image uploads disabled");
                None
            }
        };

        let admin_seed = match (env::var("ADMIN_EMAIL"), env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                email,
                password,
                name: env::var("ADMIN_NAME").unwrap_or_else(|_| "Admin User".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            host,
            port,
            mongodb_uri,
            mongodb_db,
            jwt_admin_secret,
            jwt_expire_days,
            cloudinary,
            admin_seed,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
