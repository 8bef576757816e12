use crate::actors::health::{GetSystemHealth, HealthActor};
use crate::actors::live_updates::LiveUpdateSocket;
use crate::actors::workbench::{Discover, Execute, GetSnapshot, SetParameterValue, WorkbenchActor};
use crate::actors::ws_server::WsServer;
use crate::static_assets::{self, EMBEDDED_FILES};
use crate::templates;
use actix::Addr;
use actix_web::{web, Error, HttpRequest, HttpResponse, Responder};
use actix_web_actors::ws;
use serde::Deserialize;
use std::collections::HashMap;

/// Origin the workbench forwards invocations to, shown on the dashboard.
#[derive(Clone, Debug)]
pub struct BackendOrigin(pub String);

#[derive(Deserialize, Debug)]
pub struct InputChange {
    pub parameter: String,
    pub value: String,
}

/// Optional body of an execute call: the form values shown when it was issued.
#[derive(Deserialize, Debug, Default)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub inputs: HashMap<String, String>,
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(dashboard))
        .route("/health", web::get().to(health_check))
        .route("/ws", web::get().to(live_updates))
        .route("/api/state", web::get().to(state))
        .route("/api/discover", web::post().to(discover))
        .route("/api/functions/{name}/inputs", web::post().to(set_input))
        .route("/api/functions/{name}/execute", web::post().to(execute))
        .route(
            &format!("{}/{{file}}", static_assets::STATIC_PREFIX),
            web::get().to(static_asset),
        );
}

fn mailbox_error(e: actix::MailboxError) -> HttpResponse {
    log::error!("The workbench actor did not answer: {}. The server might be shutting down.", e);
    HttpResponse::InternalServerError().finish()
}

pub async fn dashboard(
    workbench: web::Data<Addr<WorkbenchActor>>,
    origin: web::Data<BackendOrigin>,
) -> HttpResponse {
    let snapshot = match workbench.send(GetSnapshot).await {
        Ok(snapshot) => snapshot,
        Err(e) => return mailbox_error(e),
    };
    match templates::render_dashboard(&snapshot, &origin.0) {
        Ok(html) => HttpResponse::Ok().content_type("text/html").body(html),
        Err(e) => {
            log::error!("Failed to render the dashboard: {}", e);
            HttpResponse::InternalServerError()
                .content_type("text/html")
                .body(templates::render_production_error())
        }
    }
}

pub async fn state(workbench: web::Data<Addr<WorkbenchActor>>) -> HttpResponse {
    match workbench.send(GetSnapshot).await {
        Ok(snapshot) => HttpResponse::Ok().json(snapshot),
        Err(e) => mailbox_error(e),
    }
}

pub async fn discover(workbench: web::Data<Addr<WorkbenchActor>>) -> HttpResponse {
    match workbench.send(Discover).await {
        Ok(Ok(count)) => HttpResponse::Ok().json(serde_json::json!({ "functions": count })),
        Ok(Err(e)) => HttpResponse::BadGateway()
            .content_type("application/json")
            .body(e.to_json()),
        Err(e) => mailbox_error(e),
    }
}

pub async fn set_input(
    name: web::Path<String>,
    change: web::Json<InputChange>,
    workbench: web::Data<Addr<WorkbenchActor>>,
) -> HttpResponse {
    let change = change.into_inner();
    let msg = SetParameterValue {
        function: name.into_inner(),
        parameter: change.parameter,
        value: change.value,
    };
    match workbench.send(msg).await {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => mailbox_error(e),
    }
}

pub async fn execute(
    name: web::Path<String>,
    body: Option<web::Json<ExecuteRequest>>,
    workbench: web::Data<Addr<WorkbenchActor>>,
) -> HttpResponse {
    let request = body.map(web::Json::into_inner).unwrap_or_default();
    let msg = Execute {
        function: name.into_inner(),
        inputs: request.inputs,
    };
    match workbench.send(msg).await {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => mailbox_error(e),
    }
}

pub async fn health_check(health_actor: web::Data<Addr<HealthActor>>) -> impl Responder {
    match health_actor.send(GetSystemHealth).await {
        Ok(health) => HttpResponse::Ok().json(health),
        Err(e) => {
            log::error!(
                "Could not retrieve system health: {}. \
                 The health check actor might be experiencing issues.",
                e
            );
            HttpResponse::InternalServerError().finish()
        }
    }
}

pub async fn live_updates(
    req: HttpRequest,
    stream: web::Payload,
    srv: web::Data<Addr<WsServer>>,
) -> Result<HttpResponse, Error> {
    ws::start(LiveUpdateSocket::new(srv.get_ref().clone()), &req, stream)
}

pub async fn static_asset(file: web::Path<String>) -> HttpResponse {
    match EMBEDDED_FILES.get(file.as_str()) {
        Some(embedded) => HttpResponse::Ok()
            .content_type(embedded.content_type)
            .insert_header(("Cache-Control", "public, max-age=31536000, immutable"))
            .body(embedded.content),
        None => HttpResponse::NotFound().finish(),
    }
}
