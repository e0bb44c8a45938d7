//! Domain models backing the marketplace API.
//!
//! These are the row-level structs the repositories in [`crate::db`] return.
//! Shared value types (IDs, money, statuses) live in `bazaar-core`.

pub mod cart;
pub mod chat;
pub mod notification;
pub mod order;
pub mod payment;
pub mod product;
pub mod promotion;
pub mod review;
pub mod store;
pub mod token;
pub mod user;

pub use cart::{Cart, CartLineDetail, CartView};
pub use chat::{ChatMessage, ChatRoom};
pub use notification::Notification;
pub use order::{Order, OrderLine, OrderWithLines};
pub use payment::Payment;
pub use product::{Product, ProductVariant, ProductWithVariants};
pub use promotion::Promotion;
pub use review::{ProductRating, Review};
pub use store::Store;
pub use token::RefreshTokenRecord;
pub use user::User;
