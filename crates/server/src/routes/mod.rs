//! HTTP route handlers for the marketplace API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check
//! GET  /health/ready                 - Readiness check (pings the database)
//!
//! # Auth
//! POST /api/auth/register            - Register (buyer or seller)
//! POST /api/auth/login               - Login, returns access + refresh tokens
//! POST /api/auth/refresh             - Rotate a refresh token
//! POST /api/auth/logout              - Revoke a refresh token family
//!
//! # Stores
//! GET    /api/stores                 - List stores
//! POST   /api/stores                 - Create store (seller)
//! GET    /api/stores/mine            - Caller's stores
//! GET    /api/stores/slug/{slug}     - Store by slug
//! GET    /api/stores/{id}            - Store by ID
//! PUT    /api/stores/{id}            - Update (owner)
//! DELETE /api/stores/{id}            - Delete (owner)
//! GET    /api/stores/{id}/products   - Store's products
//! GET    /api/stores/{id}/orders     - Store's orders (owner)
//!
//! # Catalog
//! GET    /api/products               - List products (filter: store_id, search)
//! POST   /api/products               - Create product (store owner)
//! GET    /api/products/{id}          - Product detail with variants + rating
//! PUT    /api/products/{id}          - Update (store owner)
//! DELETE /api/products/{id}          - Delete (store owner)
//! POST   /api/products/{id}/variants - Add variant (store owner)
//! PUT    /api/variants/{id}          - Update variant (store owner)
//! DELETE /api/variants/{id}          - Delete variant (store owner)
//!
//! # Cart
//! GET    /api/cart                   - Caller's cart
//! DELETE /api/cart                   - Empty the cart
//! POST   /api/cart/lines             - Add variant (merges quantity)
//! PUT    /api/cart/lines/{id}        - Set quantity (0 removes)
//! DELETE /api/cart/lines/{id}        - Remove line
//!
//! # Checkout
//! POST /api/checkout/preview         - Per-store totals without placing
//! POST /api/checkout                 - Place one order per store
//!
//! # Orders
//! GET  /api/orders                   - Caller's orders
//! GET  /api/orders/{id}              - Order detail (buyer, store owner)
//! POST /api/orders/{id}/cancel       - Cancel an unshipped order (buyer)
//! POST /api/orders/{id}/status       - Advance fulfillment (store owner)
//! GET  /api/orders/{id}/payment      - Payment for an order
//! POST /api/orders/{id}/payment/capture - Capture, moving the order to paid
//!
//! # Promotions
//! GET    /api/promotions/preview     - Discount a code would produce
//! GET    /api/promotions             - List (admin, or owner with store_id)
//! POST   /api/promotions             - Create
//! GET    /api/promotions/{id}        - Detail
//! PUT    /api/promotions/{id}        - Update
//! DELETE /api/promotions/{id}        - Delete
//!
//! # Reviews
//! GET    /api/products/{id}/reviews  - List a product's reviews
//! POST   /api/products/{id}/reviews  - Review a delivered purchase
//! GET    /api/products/{id}/rating   - Aggregate rating
//! PUT    /api/reviews/{id}           - Update own review
//! DELETE /api/reviews/{id}           - Delete own review
//!
//! # Notifications
//! GET  /api/notifications            - List, unread first
//! POST /api/notifications/{id}/read  - Mark one read
//! POST /api/notifications/read-all   - Mark all read
//!
//! # Chat
//! POST /api/chat/rooms               - Open a room with a store
//! GET  /api/chat/rooms               - Caller's rooms
//! GET  /api/chat/rooms/{id}/messages - Room history, oldest first
//! POST /api/chat/rooms/{id}/messages - Post a message
//! ```

pub mod auth;
pub mod cart;
pub mod chat;
pub mod checkout;
pub mod notifications;
pub mod orders;
pub mod payments;
pub mod products;
pub mod promotions;
pub mod reviews;
pub mod stores;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use crate::state::AppState;

/// Page size clamp for list endpoints.
const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Common pagination query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct Pagination {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl Pagination {
    /// Requested page size, clamped to `1..=100`.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    /// Requested offset, never negative.
    #[must_use]
    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}

/// Create the store routes router.
pub fn store_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(stores::list).post(stores::create))
        .route("/mine", get(stores::mine))
        .route("/slug/{slug}", get(stores::show_by_slug))
        .route(
            "/{id}",
            get(stores::show).put(stores::update).delete(stores::delete),
        )
        .route("/{id}/products", get(products::list_for_store))
        .route("/{id}/orders", get(orders::list_for_store))
}

/// Create the product and variant routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/{id}/variants", post(products::create_variant))
        .route(
            "/{id}/reviews",
            get(reviews::list).post(reviews::create),
        )
        .route("/{id}/rating", get(reviews::rating))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show).delete(cart::clear))
        .route("/lines", post(cart::add_line))
        .route(
            "/lines/{id}",
            put(cart::set_quantity).delete(cart::remove_line),
        )
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place))
        .route("/preview", post(checkout::preview))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list))
        .route("/{id}", get(orders::show))
        .route("/{id}/cancel", post(orders::cancel))
        .route("/{id}/status", post(orders::set_status))
        .route("/{id}/payment", get(payments::show))
        .route("/{id}/payment/capture", post(payments::capture))
}

/// Create the promotion routes router.
pub fn promotion_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(promotions::list).post(promotions::create))
        .route("/preview", get(promotions::preview))
        .route(
            "/{id}",
            get(promotions::show)
                .put(promotions::update)
                .delete(promotions::delete),
        )
}

/// Create the notification routes router.
pub fn notification_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(notifications::list))
        .route("/{id}/read", post(notifications::mark_read))
        .route("/read-all", post(notifications::mark_all_read))
}

/// Create the chat routes router.
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/rooms", get(chat::list_rooms).post(chat::open_room))
        .route(
            "/rooms/{id}/messages",
            get(chat::list_messages).post(chat::post_message),
        )
}

/// Assemble the `/api` router, minus the auth endpoints.
///
/// Auth routes are nested separately so they can carry the stricter rate
/// limiter.
pub fn routes_without_auth() -> Router<AppState> {
    Router::new()
        .nest("/api/stores", store_routes())
        .nest("/api/products", product_routes())
        .route(
            "/api/variants/{id}",
            put(products::update_variant).delete(products::delete_variant),
        )
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/promotions", promotion_routes())
        .route(
            "/api/reviews/{id}",
            put(reviews::update).delete(reviews::delete),
        )
        .nest("/api/notifications", notification_routes())
        .nest("/api/chat", chat_routes())
}
