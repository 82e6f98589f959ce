mod environment;
mod error;
mod extractors;

pub use environment::{Environment, StorageConfig};
pub use error::{ApiErrorResponse, AppError};
pub use extractors::ValidatedJson;
