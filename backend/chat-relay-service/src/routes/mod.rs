pub mod chat;
pub mod wsroute;

use crate::metrics::metrics_handler;
use actix_web::web;

/// Every route the service exposes; shared by `main` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(chat::get_room)
        .service(chat::get_history)
        .service(wsroute::ws_handler)
        .route("/health", web::get().to(|| async { "OK" }))
        .route("/metrics", web::get().to(metrics_handler));
}
