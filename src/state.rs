use std::sync::Arc;

use mongodb::{Collection, Database};

use crate::cdn::Cdn;
use crate::config::AppConfig;
use crate::db;
use crate::models::admin::Admin;
use crate::models::banner::Banner;
use crate::models::category::Category;
use crate::models::coupon::Coupon;
use crate::models::flash_sale::FlashSale;
use crate::models::order::Order;
use crate::models::product::Product;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub config: Arc<AppConfig>,
    pub cdn: Cdn,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, cdn: Cdn) -> Self {
        Self { db, config: Arc::new(config), cdn }
    }

    pub fn products(&self) -> Collection<Product> {
        self.db.collection(db::PRODUCTS)
    }

    pub fn categories(&self) -> Collection<Category> {
        self.db.collection(db::CATEGORIES)
    }

    pub fn orders(&self) -> Collection<Order> {
        self.db.collection(db::ORDERS)
    }

    pub fn banners(&self) -> Collection<Banner> {
        self.db.collection(db::BANNERS)
    }

    pub fn coupons(&self) -> Collection<Coupon> {
        self.db.collection(db::COUPONS)
    }

    pub fn flash_sales(&self) -> Collection<FlashSale> {
        self.db.collection(db::FLASH_SALES)
    }

    pub fn admins(&self) -> Collection<Admin> {
        self.db.collection(db::ADMINS)
    }
}
