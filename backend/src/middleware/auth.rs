use aide::OperationIo;
use axum::{
    extract::{FromRequestParts, Request},
    http::request::Parts,
    middleware::Next,
    response::Response,
};

use crate::types::AppError;

/// Header carrying the principal ID resolved by the upstream authorizer
///
/// Token verification happens before requests reach this service; the value
/// is trusted as-is.
pub const PRINCIPAL_ID_HEADER: &str = "x-principal-id";

/// Caller identity placed in request extensions by [`principal_middleware`]
#[derive(Debug, Clone, OperationIo)]
pub struct AuthenticatedUser {
    /// Owner ID used for every ownership check
    pub user_id: String,
}

/// Axum extractor for the authenticated user
///
/// Only available on routes behind [`principal_middleware`]:
/// ```ignore
/// async fn protected_handler(
///     user: AuthenticatedUser,
/// ) -> Result<impl IntoResponse, AppError> {
///     Ok(user.user_id)
/// }
/// ```
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Self>()
            .cloned()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

/// Principal extraction middleware
///
/// Reads [`PRINCIPAL_ID_HEADER`] and adds an [`AuthenticatedUser`] to the
/// request extensions.
///
/// # Errors
///
/// - `AppError` - Missing or blank principal with 401 status code
pub async fn principal_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user_id = request
        .headers()
        .get(PRINCIPAL_ID_HEADER)
        .and_then(|header| header.to_str().ok())
        .map(str::trim)
        .filter(|principal| !principal.is_empty())
        .map(ToString::to_string)
        .ok_or_else(|| AppError::unauthorized("Missing authenticated principal"))?;

    request
        .extensions_mut()
        .insert(AuthenticatedUser { user_id });

    Ok(next.run(request).await)
}
