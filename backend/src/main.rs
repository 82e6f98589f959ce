use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoDbClient;
use aws_sdk_s3::Client as S3Client;

use backend::{server, todos::TodoService, types::Environment};
use backend_storage::{attachment::AttachmentStorage, todo::TodoStorage};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON for deployed stages, human-readable locally
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let storage_config = environment.storage_config()?;

    let dynamodb_client = Arc::new(DynamoDbClient::new(&environment.aws_config().await));
    let todo_storage = Arc::new(TodoStorage::new(
        dynamodb_client,
        storage_config.todos_table,
        storage_config.todos_by_user_index,
    ));

    let s3_client = Arc::new(S3Client::from_conf(environment.s3_client_config().await));
    let attachment_storage = Arc::new(AttachmentStorage::new(
        s3_client,
        storage_config.attachments_bucket,
        storage_config.upload_url_expiry_secs,
    ));

    let todo_service = Arc::new(TodoService::new(todo_storage, attachment_storage));

    server::start(environment, todo_service).await
}
