use crate::descriptor::{FunctionDescriptor, StepEntry};
use crate::errors::WorkbenchError;
use serde_json::Value;

/// Talks to the backend that exposes the steps. Every request is a plain GET
/// against `base_origin`.
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    base_origin: String,
    discovery_path: String,
}

impl BackendClient {
    pub fn new(base_origin: &str, discovery_path: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_origin: base_origin.trim_end_matches('/').to_string(),
            discovery_path: discovery_path.to_string(),
        }
    }

    pub fn base_origin(&self) -> &str {
        &self.base_origin
    }

    pub fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.base_origin, path)
    }

    pub async fn discover(&self) -> Result<Vec<FunctionDescriptor>, WorkbenchError> {
        let url = self.url_for(&self.discovery_path);
        log::debug!("Discovering functions from {}", url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| WorkbenchError::discovery(e.to_string()).with_url(&url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WorkbenchError::discovery("backend answered with an error status")
                .with_url(&url)
                .with_status(status.as_u16()));
        }

        let entries: Vec<StepEntry> = response.json().await.map_err(|e| {
            WorkbenchError::discovery(format!("unexpected response body: {}", e)).with_url(&url)
        })?;

        Ok(entries.into_iter().map(FunctionDescriptor::from).collect())
    }

    pub async fn invoke(&self, function: &str, path: &str) -> Result<Value, WorkbenchError> {
        let url = self.url_for(path);
        log::debug!("Executing `{}` via {}", function, url);

        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| WorkbenchError::invocation(function, e.to_string()).with_url(&url))?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                WorkbenchError::invocation(function, "backend answered with an error status")
                    .with_url(&url)
                    .with_status(status.as_u16()),
            );
        }

        response.json::<Value>().await.map_err(|e| {
            WorkbenchError::invocation(function, format!("response is not JSON: {}", e))
                .with_url(&url)
        })
    }
}
