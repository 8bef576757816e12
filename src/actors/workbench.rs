use actix::prelude::*;
use serde::Serialize;
use std::collections::HashMap;
use std::time::Instant;

use crate::actors::health::{HealthActor, ReportRequest};
use crate::actors::ws_server::ResultUpdate;
use crate::client::BackendClient;
use crate::config::Config;
use crate::descriptor::{substitute_path, FunctionDescriptor};
use crate::errors::{log_error, RequestKind, WorkbenchError};
use crate::state::{FunctionList, InputState, RequestSequencer, ResultState};

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    Uninitialized,
    Discovering,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WorkbenchOptions {
    pub encode_parameters: bool,
    pub latest_response_only: bool,
    pub discover_on_start: bool,
}

impl Default for WorkbenchOptions {
    fn default() -> Self {
        Self {
            encode_parameters: true,
            latest_response_only: true,
            discover_on_start: true,
        }
    }
}

impl From<&Config> for WorkbenchOptions {
    fn from(config: &Config) -> Self {
        Self {
            encode_parameters: config.encode_parameters(),
            latest_response_only: config.latest_response_only(),
            discover_on_start: true,
        }
    }
}

/// Owns the function list, the collected inputs and the stored results.
///
/// Requests run as futures spawned on the actor context, so keystrokes and
/// other invocations keep being handled while a request is in flight.
pub struct WorkbenchActor {
    client: BackendClient,
    options: WorkbenchOptions,
    status: DiscoveryStatus,
    functions: FunctionList,
    inputs: InputState,
    results: ResultState,
    sequencer: RequestSequencer,
    health: Option<Addr<HealthActor>>,
    updates: Option<Recipient<ResultUpdate>>,
}

impl WorkbenchActor {
    pub fn new(client: BackendClient, options: WorkbenchOptions) -> Self {
        Self {
            client,
            options,
            status: DiscoveryStatus::Uninitialized,
            functions: FunctionList::default(),
            inputs: InputState::default(),
            results: ResultState::default(),
            sequencer: RequestSequencer::default(),
            health: None,
            updates: None,
        }
    }

    pub fn with_health(mut self, health: Addr<HealthActor>) -> Self {
        self.health = Some(health);
        self
    }

    pub fn with_updates(mut self, updates: Recipient<ResultUpdate>) -> Self {
        self.updates = Some(updates);
        self
    }

    fn report_latency(&self, kind: RequestKind, started: Instant, success: bool) {
        if let Some(health) = &self.health {
            health.do_send(ReportRequest {
                kind,
                latency_ms: started.elapsed().as_secs_f64() * 1000.0,
                success,
            });
        }
    }

    fn discovery(&mut self) -> ResponseActFuture<Self, Result<usize, WorkbenchError>> {
        self.status = DiscoveryStatus::Discovering;
        let client = self.client.clone();
        let started = Instant::now();

        Box::pin(async move { client.discover().await }.into_actor(self).map(
            move |res, act, _ctx| {
                act.status = DiscoveryStatus::Ready;
                act.report_latency(RequestKind::Discovery, started, res.is_ok());
                match res {
                    Ok(functions) => {
                        act.functions = std::mem::take(&mut act.functions).replace(functions);
                        log::info!("Discovered {} functions.", act.functions.len());
                        Ok(act.functions.len())
                    }
                    Err(e) => {
                        log_error(&e);
                        Err(e)
                    }
                }
            },
        ))
    }

    fn apply_result(
        &mut self,
        function: &str,
        sequence: u64,
        value: &serde_json::Value,
    ) -> Outcome {
        if self.options.latest_response_only && !self.sequencer.is_latest(function, sequence) {
            log::debug!(
                "Dropping response #{} of `{}`, a newer request was issued.",
                sequence,
                function
            );
            return Outcome::Stale;
        }

        let serialized = match serde_json::to_string(value) {
            Ok(serialized) => serialized,
            Err(e) => {
                log_error(&WorkbenchError::invocation(function, e.to_string()));
                return Outcome::Failed;
            }
        };

        self.results = std::mem::take(&mut self.results).store(function, serialized.clone());
        log::debug!(
            "Stored the result of `{}` ({} functions have results).",
            function,
            self.results.len()
        );
        if let Some(updates) = &self.updates {
            updates.do_send(ResultUpdate {
                function: function.to_string(),
                result: serialized,
            });
        }
        Outcome::Applied
    }

    fn report(&self, function: &str, outcome: Outcome) -> ExecutionReport {
        ExecutionReport {
            function: function.to_string(),
            outcome,
            result: self.results.get(function).map(str::to_string),
        }
    }
}

impl Actor for WorkbenchActor {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        if self.options.discover_on_start {
            ctx.spawn(self.discovery().map(|_, _, _| ()));
        }
    }
}

// --- Messages ---

/// Re-runs discovery. A failure keeps the current list.
#[derive(Message)]
#[rtype(result = "Result<usize, WorkbenchError>")]
pub struct Discover;

#[derive(Message)]
#[rtype(result = "()")]
pub struct SetParameterValue {
    pub function: String,
    pub parameter: String,
    pub value: String,
}

#[derive(Message)]
#[rtype(result = "ExecutionReport")]
pub struct Execute {
    pub function: String,
    /// Form values as the page showed them when "Run" was clicked. They are
    /// stored before substitution, so keystrokes still in flight cannot leave
    /// the request with older values.
    pub inputs: HashMap<String, String>,
}

#[derive(Message)]
#[rtype(result = "Snapshot")]
pub struct GetSnapshot;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Applied,
    /// A newer request of the same function was issued meanwhile.
    Stale,
    Failed,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ExecutionReport {
    pub function: String,
    pub outcome: Outcome,
    /// What is stored for the function after this invocation settled.
    pub result: Option<String>,
}

#[derive(Serialize, Clone, Debug)]
pub struct Snapshot {
    pub status: DiscoveryStatus,
    pub functions: Vec<FunctionDescriptor>,
    pub inputs: InputState,
    pub results: ResultState,
}

// --- Handlers ---

impl Handler<Discover> for WorkbenchActor {
    type Result = ResponseActFuture<Self, Result<usize, WorkbenchError>>;

    fn handle(&mut self, _msg: Discover, _ctx: &mut Context<Self>) -> Self::Result {
        self.discovery()
    }
}

impl Handler<SetParameterValue> for WorkbenchActor {
    type Result = ();

    fn handle(&mut self, msg: SetParameterValue, _ctx: &mut Context<Self>) {
        self.inputs = std::mem::take(&mut self.inputs).set_parameter_value(
            &msg.function,
            &msg.parameter,
            msg.value,
        );
    }
}

impl Handler<Execute> for WorkbenchActor {
    type Result = ResponseActFuture<Self, ExecutionReport>;

    fn handle(&mut self, msg: Execute, _ctx: &mut Context<Self>) -> Self::Result {
        let function = msg.function;
        for (parameter, value) in msg.inputs {
            self.inputs =
                std::mem::take(&mut self.inputs).set_parameter_value(&function, &parameter, value);
        }

        let Some(descriptor) = self.functions.get(&function) else {
            let error = WorkbenchError::invocation(&function, "no such function was discovered");
            log_error(&error);
            return Box::pin(actix::fut::ready(self.report(&function, Outcome::Failed)));
        };

        let substituted = substitute_path(
            descriptor,
            self.inputs.values_for(&function),
            self.options.encode_parameters,
        );
        if !substituted.missing.is_empty() {
            log::warn!(
                "Executing `{}` without a value for: {}",
                function,
                substituted.missing.join(", ")
            );
        }

        let sequence = self.sequencer.next(&function);
        let client = self.client.clone();
        let started = Instant::now();
        let request_function = function.clone();
        let request = async move { client.invoke(&request_function, &substituted.path).await };

        Box::pin(request.into_actor(self).map(move |res, act, _ctx| {
            act.report_latency(RequestKind::Invocation, started, res.is_ok());
            let outcome = match res {
                Ok(value) => act.apply_result(&function, sequence, &value),
                Err(e) => {
                    log_error(&e);
                    Outcome::Failed
                }
            };
            act.report(&function, outcome)
        }))
    }
}

impl Handler<GetSnapshot> for WorkbenchActor {
    type Result = MessageResult<GetSnapshot>;

    fn handle(&mut self, _msg: GetSnapshot, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(Snapshot {
            status: self.status,
            functions: self.functions.iter().cloned().collect(),
            inputs: self.inputs.clone(),
            results: self.results.clone(),
        })
    }
}
