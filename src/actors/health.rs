use actix::prelude::*;
use serde::Serialize;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::errors::RequestKind;

const RETENTION: Duration = Duration::from_secs(300);

// --- Messages ---

#[derive(Message)]
#[rtype(result = "()")]
pub struct ReportRequest {
    pub kind: RequestKind,
    pub latency_ms: f64,
    pub success: bool,
}

#[derive(Message)]
#[rtype(result = "SystemHealth")]
pub struct GetSystemHealth;

// --- Data Structures ---

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct RequestMetrics {
    pub count: usize,
    pub failures: usize,
    pub p95_ms: f64,
    pub mean_ms: f64,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq)]
pub struct TimeWindowMetrics {
    pub discovery: RequestMetrics,
    pub invocation: RequestMetrics,
}

#[derive(Serialize, Clone, Debug)]
pub struct SystemHealth {
    pub thirty_seconds: TimeWindowMetrics,
    pub one_minute: TimeWindowMetrics,
    pub five_minutes: TimeWindowMetrics,
}

struct MetricDataPoint {
    timestamp: Instant,
    value: f64,
    success: bool,
}

// --- Actor ---

/// Keeps the latency of the outbound requests for the `/health` endpoint.
pub struct HealthActor {
    discovery_data: VecDeque<MetricDataPoint>,
    invocation_data: VecDeque<MetricDataPoint>,
}

impl HealthActor {
    pub fn new() -> Self {
        Self {
            discovery_data: VecDeque::new(),
            invocation_data: VecDeque::new(),
        }
    }
}

impl Actor for HealthActor {
    type Context = Context<Self>;
}

// --- Handlers ---

impl Handler<ReportRequest> for HealthActor {
    type Result = ();

    fn handle(&mut self, msg: ReportRequest, _ctx: &mut Context<Self>) {
        let now = Instant::now();
        let data = match msg.kind {
            RequestKind::Discovery => &mut self.discovery_data,
            RequestKind::Invocation => &mut self.invocation_data,
        };
        data.push_back(MetricDataPoint {
            timestamp: now,
            value: msg.latency_ms,
            success: msg.success,
        });
        while data
            .front()
            .is_some_and(|dp| now.duration_since(dp.timestamp) >= RETENTION)
        {
            data.pop_front();
        }
    }
}

impl Handler<GetSystemHealth> for HealthActor {
    type Result = MessageResult<GetSystemHealth>;

    fn handle(&mut self, _msg: GetSystemHealth, _ctx: &mut Context<Self>) -> Self::Result {
        MessageResult(SystemHealth {
            thirty_seconds: self.calculate_window_metrics(Duration::from_secs(30)),
            one_minute: self.calculate_window_metrics(Duration::from_secs(60)),
            five_minutes: self.calculate_window_metrics(RETENTION),
        })
    }
}

impl HealthActor {
    fn calculate_window_metrics(&self, window: Duration) -> TimeWindowMetrics {
        let now = Instant::now();

        let calculate_metrics_for = |data: &VecDeque<MetricDataPoint>| -> RequestMetrics {
            let in_window: Vec<&MetricDataPoint> = data
                .iter()
                .filter(|dp| now.duration_since(dp.timestamp) < window)
                .collect();

            if in_window.is_empty() {
                return RequestMetrics::default();
            }

            let failures = in_window.iter().filter(|dp| !dp.success).count();
            let mut values: Vec<f64> = in_window.iter().map(|dp| dp.value).collect();
            values.sort_by(|a, b| a.total_cmp(b));

            let p95_index = (values.len() as f64 * 0.95).floor() as usize;
            let p95 = values[p95_index.min(values.len() - 1)];
            let mean = values.iter().sum::<f64>() / values.len() as f64;

            RequestMetrics {
                count: values.len(),
                failures,
                p95_ms: p95,
                mean_ms: mean,
            }
        };

        TimeWindowMetrics {
            discovery: calculate_metrics_for(&self.discovery_data),
            invocation: calculate_metrics_for(&self.invocation_data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix::Actor;
    use actix_rt::time;

    #[actix_rt::test]
    async fn test_health_actor_metrics() {
        let addr = HealthActor::new().start();

        let report = |kind, latency_ms, success| ReportRequest { kind, latency_ms, success };
        addr.do_send(report(RequestKind::Discovery, 10.0, true));
        addr.do_send(report(RequestKind::Invocation, 4.0, true));
        addr.do_send(report(RequestKind::Invocation, 8.0, false));

        // Wait for the messages to be processed
        time::sleep(Duration::from_millis(100)).await;

        let health = addr.send(GetSystemHealth).await.unwrap();

        let metrics = health.thirty_seconds;
        assert_eq!(metrics.discovery.count, 1);
        assert_eq!(metrics.discovery.mean_ms, 10.0);
        assert_eq!(metrics.invocation.count, 2);
        assert_eq!(metrics.invocation.failures, 1);
        assert_eq!(metrics.invocation.mean_ms, 6.0);
        assert_eq!(metrics.invocation.p95_ms, 8.0);
        assert_eq!(health.five_minutes, metrics);
    }

    #[actix_rt::test]
    async fn test_health_actor_empty() {
        let addr = HealthActor::new().start();
        let health = addr.send(GetSystemHealth).await.unwrap();
        assert_eq!(health.one_minute, TimeWindowMetrics::default());
    }
}
