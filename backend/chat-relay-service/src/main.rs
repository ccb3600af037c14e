use actix_web::{web, App, HttpServer};
use chat_relay_service::{
    config::{self, StoreBackend},
    db, error, logging,
    middleware::Logging,
    routes,
    services::{
        ConversationStore, HttpModerationGateway, InMemoryConversationStore, ModerationGateway,
        PassThroughGateway, PgConversationStore,
    },
    state::AppState,
};
use std::sync::Arc;

#[actix_web::main]
async fn main() -> Result<(), error::AppError> {
    let cfg = Arc::new(config::Config::from_env()?);
    logging::init_tracing(cfg.log_json);

    let store: Arc<dyn ConversationStore> = match &cfg.store {
        StoreBackend::Postgres { database_url } => {
            let pool = db::init_pool(database_url).await?;
            Arc::new(PgConversationStore::new(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; conversations are lost on restart");
            Arc::new(InMemoryConversationStore::new())
        }
    };

    let gateway: Arc<dyn ModerationGateway> = match &cfg.moderation.url {
        Some(url) => {
            tracing::info!(%url, timeout = ?cfg.moderation.timeout, "moderation enabled");
            Arc::new(HttpModerationGateway::new(url.clone(), cfg.moderation.timeout)?)
        }
        None => {
            tracing::warn!("MODERATION_URL not set; messages pass through unmoderated");
            Arc::new(PassThroughGateway)
        }
    };

    let state = AppState::new(cfg.clone(), store, gateway);

    let bind_addr = format!("0.0.0.0:{}", cfg.port);
    tracing::info!(%bind_addr, "starting {}", config::SERVICE_NAME);

    HttpServer::new(move || {
        let cors = actix_cors::Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(cors)
            .wrap(Logging)
            .app_data(web::Data::new(state.clone()))
            .configure(routes::configure)
    })
    .bind(&bind_addr)
    .map_err(|e| error::AppError::StartServer(format!("bind {bind_addr}: {e}")))?
    .run()
    .await
    .map_err(|e| error::AppError::StartServer(format!("run server: {e}")))
}
