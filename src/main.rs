use actix::prelude::*;
use actix_web::{web, App, HttpServer};
use std::path::PathBuf;

mod actors;
mod client;
mod commands;
mod config;
mod descriptor;
mod errors;
mod logger;
mod routing;
mod state;
mod static_assets;
mod templates;

use actors::health::HealthActor;
use actors::workbench::{WorkbenchActor, WorkbenchOptions};
use actors::ws_server::WsServer;
use client::BackendClient;
use config::Config;

use clap::Parser;

#[derive(Parser)]
#[command(name = "workbench")]
#[command(about = "A dashboard for discovering and running FlowForge steps.", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
    /// Configuration file, `config.yaml` in the working directory by default
    #[clap(long, global = true)]
    config: Option<PathBuf>,
    /// Origin of the backend exposing the steps
    #[clap(long, global = true)]
    base_origin: Option<String>,
    #[clap(long, short, global = true, action)]
    verbose: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Runs the dashboard web server
    Serve {
        #[clap(long)]
        port: Option<u16>,
    },
    /// Lists the functions the backend exposes
    List,
    /// Runs one function and prints its JSON response
    Run {
        function: String,
        #[clap(short = 'p', long = "param", value_parser = commands::parse_param)]
        params: Vec<(String, String)>,
        /// Insert the values verbatim instead of URL-encoding them
        #[clap(long, action)]
        raw: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => config::CONFIG.clone(),
    };
    if let Some(base_origin) = &cli.base_origin {
        config.base_origin = Some(base_origin.clone());
    }
    if let Some(Commands::Serve { port: Some(port) }) = &cli.command {
        config.port = Some(*port);
    }
    Ok(config)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let filter = logger::resolve_filter(
        cli.verbose,
        config.log_level.as_deref(),
        std::env::var("RUST_LOG").ok(),
    );
    logger::init_logger(&filter);

    match cli.command {
        Some(Commands::Serve { .. }) | None => run_server(config).await,
        Some(Commands::List) => commands::list(&config).await,
        Some(Commands::Run { function, params, raw }) => {
            let encode = config.encode_parameters() && !raw;
            let output = commands::run(&config, &function, &params, encode).await?;
            println!("{}", output);
            Ok(())
        }
    }
}

async fn run_server(config: Config) -> anyhow::Result<()> {
    let host = config.server_address().to_string();
    let port = config.port();
    let client = BackendClient::new(config.base_origin(), config.discovery_path());
    let backend = client.base_origin().to_string();

    let health_actor_addr = HealthActor::new().start();
    let ws_server_addr = WsServer::new().start();

    let workbench_addr = WorkbenchActor::new(client, WorkbenchOptions::from(&config))
        .with_health(health_actor_addr.clone())
        .with_updates(ws_server_addr.clone().recipient())
        .start();

    // All state sits behind one actor, so a handful of workers is plenty.
    let workers = (num_cpus::get() / 2).max(1);
    log::debug!("Starting {} web workers.", workers);

    let origin = routing::BackendOrigin(backend.clone());
    let server = HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Compress::default())
            .app_data(web::Data::new(workbench_addr.clone()))
            .app_data(web::Data::new(health_actor_addr.clone()))
            .app_data(web::Data::new(ws_server_addr.clone()))
            .app_data(web::Data::new(origin.clone()))
            .configure(routing::configure)
    })
    .workers(workers)
    .keep_alive(std::time::Duration::from_secs(30))
    .bind((host.as_str(), port))
    .map_err(|e| {
        if e.kind() == std::io::ErrorKind::AddrInUse {
            anyhow::anyhow!(
                "port {} is already in use. \
                 Stop the other application or pick another port with --port.",
                port
            )
        } else {
            anyhow::Error::new(e)
        }
    })?;

    logger::print_banner(&host, port, &backend);

    server.run().await?;
    Ok(())
}
