use crate::config::SERVICE_NAME;
use crate::error::AppError;
use db_pool::{create_pool, migrate, DbConfig};
use sqlx::migrate::Migrator;
use sqlx::{Pool, Postgres};

/// Schema for `chat_rooms` and `messages`.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Connect with the shared pool settings and bring the schema up to date.
pub async fn init_pool(database_url: &str) -> Result<Pool<Postgres>, AppError> {
    let config = DbConfig::for_service(SERVICE_NAME, database_url);
    config.log_config();

    let pool = create_pool(config)
        .await
        .map_err(|e| AppError::StartServer(format!("db connect: {e}")))?;
    migrate(&pool, &MIGRATOR)
        .await
        .map_err(|e| AppError::StartServer(format!("db migrate: {e}")))?;
    Ok(pool)
}
