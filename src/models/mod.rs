pub mod admin;
pub mod banner;
pub mod category;
pub mod coupon;
pub mod flash_sale;
pub mod order;
pub mod product;
