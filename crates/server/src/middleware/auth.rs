//! Authentication extractors.
//!
//! Handlers take `RequireAuth` (or `OptionalAuth`) to get the verified
//! bearer-token claims without touching the database.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Response},
};

use bazaar_core::{UserId, UserRole};

use crate::error::AppError;
use crate::services::auth::{self, AuthError};
use crate::state::AppState;

/// The verified identity behind a request.
#[derive(Debug, Clone, Copy)]
pub struct AuthContext {
    /// Authenticated user.
    pub user_id: UserId,
    /// Role claimed by the access token.
    pub role: UserRole,
}

impl AuthContext {
    /// Whether the caller may manage stores and products.
    #[must_use]
    pub fn is_seller(&self) -> bool {
        matches!(self.role, UserRole::Seller | UserRole::Admin)
    }

    /// Whether the caller is an admin.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self.role, UserRole::Admin)
    }
}

/// Extractor that requires a valid bearer access token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(ctx): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, user {}!", ctx.user_id)
/// }
/// ```
pub struct RequireAuth(pub AuthContext);

/// Error returned when authentication is required but missing or invalid.
pub struct AuthRejection(AuthError);

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        AppError::Auth(self.0).into_response()
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        let token = bearer_token(parts).ok_or(AuthRejection(AuthError::InvalidToken))?;

        let claims = auth::jwt::verify(state.jwt_keys(), token).map_err(AuthRejection)?;

        Ok(Self(AuthContext {
            user_id: claims.sub,
            role: claims.role,
        }))
    }
}

/// Extractor that optionally reads the bearer access token.
///
/// Unlike `RequireAuth`, this does not reject the request when the token is
/// missing or invalid.
pub struct OptionalAuth(pub Option<AuthContext>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);

        let context = bearer_token(parts)
            .and_then(|token| auth::jwt::verify(state.jwt_keys(), token).ok())
            .map(|claims| AuthContext {
                user_id: claims.sub,
                role: claims.role,
            });

        Ok(Self(context))
    }
}

/// Pull the token out of an `Authorization: Bearer ...` header.
fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
