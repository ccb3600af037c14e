use crate::state::AppState;
use crate::websocket::ChatSession;
use actix_web::{get, web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;

/// Upgrade to a chat WebSocket. Participants identify themselves in their
/// first ENTER frame, not at handshake time.
#[get("/ws/chat")]
pub async fn ws_handler(
    req: HttpRequest,
    stream: web::Payload,
    state: web::Data<AppState>,
) -> Result<HttpResponse, Error> {
    let session = ChatSession::new(state.router.clone(), &state.config.websocket);
    ws::start(session, &req, stream)
}
