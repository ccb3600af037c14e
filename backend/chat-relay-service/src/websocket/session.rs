use super::router::{MessageRouter, RouterError};
use super::SessionHandle;
use crate::config::WebSocketConfig;
use actix::{Actor, ActorContext, ActorFutureExt, AsyncContext, StreamHandler, WrapFuture};
use actix_web_actors::ws;
use std::time::{Duration, Instant};
use tokio::sync::mpsc::UnboundedReceiver;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// One actor per WebSocket connection.
///
/// Inbound text frames are handed to the [`MessageRouter`] one at a time:
/// `ctx.wait` suspends the mailbox until the transition finishes, so frames
/// from a single client are never reordered. Frames addressed to this client
/// by other connections arrive through the [`SessionHandle`] channel.
pub struct ChatSession {
    handle: SessionHandle,
    outbound: Option<UnboundedReceiver<String>>,
    router: MessageRouter,
    heartbeat_interval: Duration,
    client_timeout: Duration,
    hb: Instant,
}

impl ChatSession {
    pub fn new(router: MessageRouter, config: &WebSocketConfig) -> Self {
        let (handle, outbound) = SessionHandle::new();
        Self {
            handle,
            outbound: Some(outbound),
            router,
            heartbeat_interval: config.heartbeat_interval,
            client_timeout: config.client_timeout,
            hb: Instant::now(),
        }
    }

    fn hb(&self, ctx: &mut ws::WebsocketContext<Self>) {
        let client_timeout = self.client_timeout;
        ctx.run_interval(self.heartbeat_interval, move |act, ctx| {
            if Instant::now().duration_since(act.hb) > client_timeout {
                tracing::warn!(
                    connection_id = %act.handle.connection_id(),
                    "WebSocket heartbeat failed, disconnecting"
                );
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }

    fn dispatch(&mut self, frame: String, ctx: &mut ws::WebsocketContext<Self>) {
        let router = self.router.clone();
        let handle = self.handle.clone();
        let transition = async move { router.handle_text(&handle, &frame).await };

        ctx.wait(transition.into_actor(self).map(|result, act, _ctx| {
            match result {
                Ok(()) | Err(RouterError::MalformedEnvelope(_)) => {}
                Err(err) => tracing::error!(
                    connection_id = %act.handle.connection_id(),
                    error = %err,
                    "failed to handle envelope"
                ),
            }
        }));
    }
}

impl Actor for ChatSession {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        tracing::info!(
            connection_id = %self.handle.connection_id(),
            "WebSocket session started"
        );

        self.hb(ctx);
        if let Some(outbound) = self.outbound.take() {
            ctx.add_stream(UnboundedReceiverStream::new(outbound));
        }
    }

    fn stopped(&mut self, _ctx: &mut Self::Context) {
        let connection_id = self.handle.connection_id();
        tracing::info!(connection_id = %connection_id, "WebSocket session stopped");

        let router = self.router.clone();
        actix::spawn(async move {
            if let Err(e) = router.handle_disconnect(connection_id).await {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "failed to clean up closed connection"
                );
            }
        });
    }
}

/// Frames queued for this client by the router.
impl StreamHandler<String> for ChatSession {
    fn handle(&mut self, frame: String, ctx: &mut Self::Context) {
        ctx.text(frame);
    }

    // The actor holds a sender itself, so the channel only ends on shutdown.
    fn finished(&mut self, _ctx: &mut Self::Context) {}
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for ChatSession {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.hb = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.hb = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.hb = Instant::now();
                self.dispatch(text.to_string(), ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                tracing::warn!(
                    connection_id = %self.handle.connection_id(),
                    "Binary WebSocket messages not supported"
                );
            }
            Ok(ws::Message::Close(reason)) => {
                tracing::info!(
                    connection_id = %self.handle.connection_id(),
                    ?reason,
                    "WebSocket close message received"
                );
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) => {
                tracing::warn!(
                    connection_id = %self.handle.connection_id(),
                    "fragmented WebSocket messages not supported"
                );
            }
            Ok(ws::Message::Nop) => {}
            Err(e) => {
                tracing::warn!(
                    connection_id = %self.handle.connection_id(),
                    error = %e,
                    "WebSocket protocol error"
                );
                ctx.stop();
            }
        }
    }
}
