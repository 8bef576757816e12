//! One-shot command line counterparts of the dashboard.

use anyhow::{anyhow, Context};
use colored::*;

use crate::client::BackendClient;
use crate::config::Config;
use crate::descriptor::{substitute_path, FunctionDescriptor};
use crate::state::InputState;

/// Parses `name=value`. Only the first `=` splits, so values may contain `=`.
pub fn parse_param(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(format!("expected NAME=VALUE, got `{}`", s)),
    }
}

fn client_for(config: &Config) -> BackendClient {
    BackendClient::new(config.base_origin(), config.discovery_path())
}

pub fn describe(function: &FunctionDescriptor) -> String {
    let params = function.distinct_parameters();
    if params.is_empty() {
        format!("{}  {}", function.name, function.path_template)
    } else {
        format!("{}  {}  ({})", function.name, function.path_template, params.join(", "))
    }
}

pub async fn list(config: &Config) -> anyhow::Result<()> {
    let functions = client_for(config)
        .discover()
        .await
        .context("could not list the backend functions")?;

    if functions.is_empty() {
        println!("{}", "No functions available.".yellow());
    }
    for function in &functions {
        println!("{}", describe(function));
    }
    Ok(())
}

/// Discovers, fills the path template of `function` from `params` and
/// returns the canonical JSON text of the response.
pub async fn run(
    config: &Config,
    function: &str,
    params: &[(String, String)],
    encode: bool,
) -> anyhow::Result<String> {
    let client = client_for(config);
    let functions = client
        .discover()
        .await
        .context("could not discover the backend functions")?;
    let descriptor = functions
        .iter()
        .find(|f| f.name == function)
        .ok_or_else(|| anyhow!("no function named `{}` was discovered", function))?;

    let inputs = params
        .iter()
        .fold(InputState::default(), |inputs, (name, value)| {
            inputs.set_parameter_value(function, name, value.as_str())
        });
    let substituted = substitute_path(descriptor, inputs.values_for(function), encode);
    if !substituted.missing.is_empty() {
        log::warn!(
            "Executing `{}` without a value for: {}",
            function,
            substituted.missing.join(", ")
        );
    }

    let value = client.invoke(function, &substituted.path).await?;
    Ok(serde_json::to_string(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::{fake_backend, origin};

    fn config_for(srv: &actix_test::TestServer) -> Config {
        Config {
            base_origin: Some(origin(srv)),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("id=42"), Ok(("id".to_string(), "42".to_string())));
        assert_eq!(parse_param("q=a=b"), Ok(("q".to_string(), "a=b".to_string())));
        assert_eq!(parse_param("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_param("novalue").is_err());
        assert!(parse_param("=x").is_err());
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&FunctionDescriptor::new("add", "/api/add/{a}/{b}")),
            "add  /api/add/{a}/{b}  (a, b)"
        );
        assert_eq!(describe(&FunctionDescriptor::new("ping", "/api/ping")), "ping  /api/ping");
    }

    #[actix_rt::test]
    async fn test_run() {
        let srv = fake_backend();
        let params = vec![("a".to_string(), "2".to_string()), ("b".to_string(), "40".to_string())];
        let output = run(&config_for(&srv), "add", &params, true).await.unwrap();
        assert_eq!(output, "42");
    }

    #[actix_rt::test]
    async fn test_run_unknown_function() {
        let srv = fake_backend();
        let error = run(&config_for(&srv), "nope", &[], true).await.unwrap_err();
        assert!(error.to_string().contains("nope"));
    }

    #[actix_rt::test]
    async fn test_run_failed_invocation() {
        let srv = fake_backend();
        let error = run(&config_for(&srv), "broken", &[], true).await.unwrap_err();
        assert!(error.to_string().contains("status 500"));
    }

    #[actix_rt::test]
    async fn test_list() {
        let srv = fake_backend();
        assert!(list(&config_for(&srv)).await.is_ok());
    }
}
