//! Router assembly. Public routes are open; write routes for catalog and
//! fulfillment are merged in behind the admin bearer-token middleware.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth;
use crate::handlers::{banners, categories, coupons, flash_sales, orders, products};
use crate::state::AppState;

// Multipart bodies carry a 5 MiB image plus text fields.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/auth/login", post(auth::login))
        .nest("/products", product_routes(state.clone()))
        .nest("/categories", category_routes(state.clone()))
        .nest("/orders", order_routes(state.clone()))
        .nest("/banners", banner_routes(state.clone()))
        .nest("/coupons", coupon_routes(state.clone()))
        .nest("/flash-sales", flash_sale_routes(state.clone()));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1", api)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "healthy", "service": env!("CARGO_PKG_NAME")}))
}

fn product_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(products::list_products))
        .route("/offers", get(products::list_offers))
        .route("/category/:categoryId", get(products::list_by_category))
        .route("/:id", get(products::get_product));

    let admin = Router::new()
        .route("/", post(products::create_product))
        .route("/:id", put(products::update_product).delete(products::delete_product))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}

fn category_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(categories::list_categories))
        .route("/active", get(categories::list_active))
        .route("/slug/:slug", get(categories::get_by_slug))
        .route("/:id", get(categories::get_category));

    let admin = Router::new()
        .route("/", post(categories::create_category))
        .route("/:id", put(categories::update_category).delete(categories::delete_category))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}

fn order_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", post(orders::create_order))
        .route("/track/:id", get(orders::track_order));

    let admin = Router::new()
        .route("/", get(orders::list_orders))
        .route("/stats", get(orders::order_stats))
        .route("/status/:status", get(orders::list_by_status))
        .route("/user/:userId", get(orders::list_by_user))
        .route("/:id", get(orders::get_order))
        .route("/:id/status", get(orders::get_order_status).put(orders::update_order_status))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}

fn banner_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(banners::list_banners))
        .route("/active", get(banners::list_active))
        .route("/:id", get(banners::get_banner));

    let admin = Router::new()
        .route("/", post(banners::create_banner))
        .route("/:id", put(banners::update_banner).delete(banners::delete_banner))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}

fn coupon_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/active", get(coupons::list_active))
        .route("/validate", post(coupons::validate_coupon));

    let admin = Router::new()
        .route("/", get(coupons::list_coupons).post(coupons::create_coupon))
        .route(
            "/:code",
            get(coupons::get_coupon).put(coupons::update_coupon).delete(coupons::delete_coupon),
        )
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}

fn flash_sale_routes(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route("/", get(flash_sales::list_flash_sales))
        .route("/active", get(flash_sales::list_active))
        .route("/product/:productId", get(flash_sales::get_by_product))
        .route("/:id", get(flash_sales::get_flash_sale))
        .route("/:id/is-active", get(flash_sales::is_active));

    let admin = Router::new()
        .route("/", post(flash_sales::create_flash_sale))
        .route("/deactivate-expired", post(flash_sales::deactivate_expired))
        .route(
            "/:id",
            put(flash_sales::update_flash_sale).delete(flash_sales::delete_flash_sale),
        )
        .route("/:id/increment-stock", post(flash_sales::increment_stock))
        .route_layer(middleware::from_fn_with_state(state, auth::require_admin));

    public.merge(admin)
}
