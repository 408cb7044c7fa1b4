pub mod banners;
pub mod categories;
pub mod coupons;
pub mod flash_sales;
pub mod orders;
pub mod products;
