//! Demo data seeding for local development.
//!
//! Creates a buyer, a seller with one store, a product with two variants,
//! and a marketplace-wide promotion code. Safe to run only against an empty
//! database; reruns fail on the unique email and slug constraints.

use rust_decimal::Decimal;

use bazaar_core::{Email, Money, PromotionKind, UserRole};

use bazaar_server::db::promotions::PromotionInput;
use bazaar_server::db::stores::StoreInput;
use bazaar_server::db::products::{ProductInput, VariantInput};
use bazaar_server::db::{ProductRepository, PromotionRepository, StoreRepository, UserRepository};
use bazaar_server::services::auth::hash_password;

use super::CommandError;

const DEMO_PASSWORD: &str = "demo-password";

/// Populate the database with demo data.
///
/// # Errors
///
/// Returns `CommandError::Repository` if any insert fails, including reruns
/// against an already-seeded database.
pub async fn run() -> Result<(), CommandError> {
    let pool = super::connect().await?;
    let password_hash = hash_password(DEMO_PASSWORD)?;

    let users = UserRepository::new(&pool);
    let buyer = users
        .create(
            &Email::parse("buyer@example.com")?,
            &password_hash,
            "Demo Buyer",
            UserRole::Buyer,
        )
        .await?;
    let seller = users
        .create(
            &Email::parse("seller@example.com")?,
            &password_hash,
            "Demo Seller",
            UserRole::Seller,
        )
        .await?;

    let store = StoreRepository::new(&pool)
        .create(
            seller.id,
            &StoreInput {
                slug: "demo-goods".to_owned(),
                name: "Demo Goods".to_owned(),
                description: "Seeded development store".to_owned(),
                shipping_fee: Money::from_cents(499),
            },
        )
        .await?;

    let products = ProductRepository::new(&pool);
    let product = products
        .create(
            store.id,
            &ProductInput {
                title: "Demo Mug".to_owned(),
                description: "A mug for demos".to_owned(),
                active: true,
            },
        )
        .await?;
    products
        .create_variant(
            product.id,
            &VariantInput {
                sku: "MUG-S".to_owned(),
                title: "Small".to_owned(),
                price: Money::from_cents(1299),
                stock: 50,
            },
        )
        .await?;
    products
        .create_variant(
            product.id,
            &VariantInput {
                sku: "MUG-L".to_owned(),
                title: "Large".to_owned(),
                price: Money::from_cents(1599),
                stock: 30,
            },
        )
        .await?;

    PromotionRepository::new(&pool)
        .create(&PromotionInput {
            store_id: None,
            code: "WELCOME10".to_owned(),
            kind: PromotionKind::Percentage,
            value: Decimal::from(10),
            max_discount: Some(Money::from_cents(2000)),
            min_subtotal: None,
            starts_at: None,
            ends_at: None,
            usage_limit: None,
            active: true,
        })
        .await?;

    tracing::info!(
        "Seeded: buyer {} / seller {} (password \"{DEMO_PASSWORD}\"), store {}, product {}, code WELCOME10",
        buyer.email,
        seller.email,
        store.slug,
        product.title
    );

    Ok(())
}
