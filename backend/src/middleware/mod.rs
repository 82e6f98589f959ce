pub mod auth;

pub use auth::{principal_middleware, AuthenticatedUser, PRINCIPAL_ID_HEADER};
