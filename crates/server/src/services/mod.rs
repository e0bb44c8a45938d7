//! Business logic services.
//!
//! Services sit between the route handlers and the repositories: auth owns
//! credentials and token rotation, checkout owns the order-placement
//! transaction, pricing is the pure discount math, and catalog fronts hot
//! reads with a cache.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod pricing;

pub use auth::AuthService;
pub use catalog::CatalogService;
pub use checkout::CheckoutService;
