use actix::prelude::*;
use actix_web_actors::ws;
use crate::actors::ws_server::{Connect, Disconnect, ResultUpdate, WsServer};

/// One browser tab listening for stored results.
pub struct LiveUpdateSocket {
    server_addr: Addr<WsServer>,
}

impl LiveUpdateSocket {
    pub fn new(server_addr: Addr<WsServer>) -> Self {
        Self { server_addr }
    }
}

impl Actor for LiveUpdateSocket {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        let addr = ctx.address().recipient();
        self.server_addr.do_send(Connect { addr });
    }

    fn stopping(&mut self, ctx: &mut Self::Context) -> Running {
        let addr = ctx.address().recipient();
        self.server_addr.do_send(Disconnect { addr });
        Running::Stop
    }
}

impl StreamHandler<Result<ws::Message, ws::ProtocolError>> for LiveUpdateSocket {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => ctx.pong(&msg),
            Ok(ws::Message::Close(reason)) => {
                ctx.close(reason);
                ctx.stop();
            }
            Err(e) => log::warn!(
                "A dashboard lost its live-update connection: {:?}. \
                 Results still show after a page refresh.",
                e
            ),
            _ => (),
        }
    }
}

impl Handler<ResultUpdate> for LiveUpdateSocket {
    type Result = ();

    fn handle(&mut self, msg: ResultUpdate, ctx: &mut Self::Context) {
        match serde_json::to_string(&msg) {
            Ok(text) => ctx.text(text),
            Err(e) => log::error!("Could not serialize the update for `{}`: {}", msg.function, e),
        }
    }
}
