use actix::prelude::*;
use serde::Serialize;
use std::collections::HashSet;

/// Pushed to every open dashboard when a result gets stored.
#[derive(Message, Serialize, Clone, Debug, PartialEq)]
#[rtype(result = "()")]
pub struct ResultUpdate {
    pub function: String,
    pub result: String,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Connect {
    pub addr: Recipient<ResultUpdate>,
}

#[derive(Message)]
#[rtype(result = "()")]
pub struct Disconnect {
    pub addr: Recipient<ResultUpdate>,
}

pub struct WsServer {
    sessions: HashSet<Recipient<ResultUpdate>>,
}

impl WsServer {
    pub fn new() -> Self {
        WsServer {
            sessions: HashSet::new(),
        }
    }
}

impl Actor for WsServer {
    type Context = Context<Self>;
}

impl Handler<Connect> for WsServer {
    type Result = ();

    fn handle(&mut self, msg: Connect, _: &mut Context<Self>) {
        self.sessions.insert(msg.addr);
        log::debug!("Dashboard connected ({} open).", self.sessions.len());
    }
}

impl Handler<Disconnect> for WsServer {
    type Result = ();

    fn handle(&mut self, msg: Disconnect, _: &mut Context<Self>) {
        self.sessions.remove(&msg.addr);
    }
}

impl Handler<ResultUpdate> for WsServer {
    type Result = ();

    fn handle(&mut self, msg: ResultUpdate, _: &mut Context<Self>) {
        for addr in &self.sessions {
            addr.do_send(msg.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct Collector {
        seen: Arc<Mutex<Vec<ResultUpdate>>>,
    }

    impl Actor for Collector {
        type Context = Context<Self>;
    }

    impl Handler<ResultUpdate> for Collector {
        type Result = ();

        fn handle(&mut self, msg: ResultUpdate, _: &mut Context<Self>) {
            self.seen.lock().unwrap().push(msg);
        }
    }

    #[actix_rt::test]
    async fn test_broadcast_reaches_connected_sessions() {
        let server = WsServer::new().start();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let collector = Collector { seen: seen.clone() }.start();

        server.send(Connect { addr: collector.clone().recipient() }).await.unwrap();

        let update = ResultUpdate {
            function: "greet".to_string(),
            result: r#"{"greeting":"hello"}"#.to_string(),
        };
        server.send(update.clone()).await.unwrap();
        actix_rt::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(*seen.lock().unwrap(), vec![update.clone()]);

        server.send(Disconnect { addr: collector.recipient() }).await.unwrap();
        server.send(update.clone()).await.unwrap();
        actix_rt::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(seen.lock().unwrap().len(), 1);
    }
}
