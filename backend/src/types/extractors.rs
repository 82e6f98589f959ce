//! Custom extractors for request validation

use aide::operation::OperationInput;
use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    Json,
};
use schemars::JsonSchema;
use validator::Validate;

use crate::types::error::AppError;

/// JSON extractor that validates the payload and rejects with [`AppError`]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: serde::de::DeserializeOwned + Validate + JsonSchema,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|err| match err {
                JsonRejection::MissingJsonContentType(_) => {
                    AppError::bad_request("Missing Content-Type: application/json header")
                }
                _ => AppError::bad_request("Invalid JSON payload"),
            })?;

        payload.validate().map_err(|errors| {
            let message = errors
                .field_errors()
                .values()
                .find_map(|field_errors| {
                    field_errors
                        .first()
                        .and_then(|error| error.message.as_ref().map(ToString::to_string))
                })
                .unwrap_or_else(|| "Request validation failed".to_string());
            AppError::bad_request(message)
        })?;

        Ok(Self(payload))
    }
}

impl<T> OperationInput for ValidatedJson<T>
where
    T: JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        Json::<T>::operation_input(ctx, operation);
    }
}
