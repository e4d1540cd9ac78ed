//! Authentication extractor
//!
//! Verifies the bearer JWT and exposes the caller's id and role. Handlers
//! enforce the minimum role with [`AuthUser::require`].

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use kingdom_common::AppError;
use kingdom_core::{Snowflake, UserRole};

use crate::response::ApiError;
use crate::state::AppState;

/// Authenticated caller extracted from the access token
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: Snowflake,
    pub role: UserRole,
}

impl AuthUser {
    pub fn new(user_id: Snowflake, role: UserRole) -> Self {
        Self { user_id, role }
    }

    /// Reject callers below `required`
    pub fn require(&self, required: UserRole) -> Result<(), ApiError> {
        if self.role.satisfies(required) {
            Ok(())
        } else {
            tracing::warn!(
                user_id = %self.user_id,
                role = %self.role,
                required = %required,
                "Insufficient role"
            );
            Err(AppError::InsufficientPermissions.into())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    AppState: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::MissingAuth)?;

        let app_state = AppState::from_ref(state);
        let claims = app_state
            .jwt_service()
            .validate_access_token(bearer.token())
            .map_err(|e| {
                tracing::warn!(error = %e, "Invalid access token");
                ApiError::from(e)
            })?;

        let user_id = claims.user_id()?;
        Ok(AuthUser::new(user_id, claims.role))
    }
}
