//! Storefront API
//!
//! Headless storefront backend: product catalog, categories, orders with a
//! status audit trail, promotional banners, coupon codes, and flash sales,
//! served over a uniform JSON envelope. Admin write routes sit behind JWT
//! bearer auth; product, category, and banner images are pushed to a
//! Cloudinary-backed CDN.

pub mod auth;
pub mod cdn;
pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod multipart;
pub mod response;
pub mod routes;
pub mod state;
pub mod util;
