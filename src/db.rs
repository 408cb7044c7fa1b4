//! MongoDB connection and shared query plumbing.

use std::time::Duration;

use futures::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::de::DeserializeOwned;

use crate::config::AppConfig;
use crate::response::Pagination;

pub const PRODUCTS: &str = "products";
pub const CATEGORIES: &str = "categories";
pub const ORDERS: &str = "orders";
pub const BANNERS: &str = "banners";
pub const COUPONS: &str = "coupons";
pub const FLASH_SALES: &str = "flash_sales";
pub const ADMINS: &str = "admins";

/// Connect and verify the connection with a ping.
pub async fn connect(config: &AppConfig) -> mongodb::error::Result<Database> {
    tracing::info!(db = %config.mongodb_db, "connecting to MongoDB");

    let mut options = ClientOptions::parse(&config.mongodb_uri).await?;
    options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
    options.max_pool_size = Some(20);
    options.min_pool_size = Some(2);
    options.connect_timeout = Some(Duration::from_secs(10));
    options.server_selection_timeout = Some(Duration::from_secs(30));

    let client = Client::with_options(options)?;
    let db = client.database(&config.mongodb_db);
    db.run_command(doc! {"ping": 1}).await?;

    tracing::info!("connected to MongoDB");
    Ok(db)
}

/// Unique and lookup indexes the write paths rely on.
pub async fn ensure_indexes(db: &Database) -> mongodb::error::Result<()> {
    let unique = IndexOptions::builder().unique(true).build();

    db.collection::<Document>(CATEGORIES)
        .create_index(
            IndexModel::builder().keys(doc! {"slug": 1}).options(unique.clone()).build(),
        )
        .await?;
    db.collection::<Document>(COUPONS)
        .create_index(
            IndexModel::builder().keys(doc! {"code": 1}).options(unique.clone()).build(),
        )
        .await?;
    db.collection::<Document>(ADMINS)
        .create_index(IndexModel::builder().keys(doc! {"email": 1}).options(unique).build())
        .await?;
    db.collection::<Document>(PRODUCTS)
        .create_index(
            IndexModel::builder().keys(doc! {"name": "text", "description": "text"}).build(),
        )
        .await?;

    Ok(())
}

/// One page of a filtered collection plus the total match count.
pub async fn find_page<T>(
    coll: &Collection<T>,
    filter: Document,
    pagination: &Pagination,
) -> mongodb::error::Result<(Vec<T>, u64)>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    let total = coll.count_documents(filter.clone()).await?;
    let items = coll
        .find(filter)
        .sort(pagination.sort())
        .skip(pagination.skip())
        .limit(pagination.limit)
        .await?
        .try_collect()
        .await?;
    Ok((items, total))
}

/// All documents matching a filter, newest first.
pub async fn find_all<T>(coll: &Collection<T>, filter: Document) -> mongodb::error::Result<Vec<T>>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    coll.find(filter).sort(doc! {"created_at": -1}).await?.try_collect().await
}
