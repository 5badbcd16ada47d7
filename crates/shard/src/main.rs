mod core_modules;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use shard_core::kernel::constants;
use shard_core::utils::{random_name, WordType};
use shard_core::{Server, ServerBuilder, ServerConfig, TcpRuntime};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use crate::core_modules::{HeartbeatModule, IdentityModule};

/// Shard: a game server assembled from modules
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Server config file (.json, .yaml, .yml or .toml)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Game mode this server runs
    #[arg(long, env = "SHARD_GAME")]
    game: Option<String>,

    /// Display name of this server instance; a random one is generated when omitted
    #[arg(long, env = "SHARD_NAME")]
    name: Option<String>,

    /// Server UUID; a random one is generated when omitted
    #[arg(long, env = "SHARD_UUID")]
    uuid: Option<Uuid>,

    /// Host to bind to
    #[arg(long, env = "SHARD_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Print the resolved module load order and exit without starting
    #[arg(long)]
    check: bool,
}

fn init_logging() {
    // Route `log` records from dependencies into tracing
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("Failed to bridge log records: {}", e);
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install tracing subscriber: {}", e);
    }
}

fn build_server(args: &CliArgs) -> shard_core::Result<Server> {
    let config = args.config.as_deref().map(ServerConfig::load).transpose()?;
    let mut builder = match &config {
        Some(config) => ServerBuilder::from_config(config),
        None => Server::builder().port(constants::DEFAULT_PORT),
    };
    if let Some(host) = &args.host {
        builder = builder.host(host);
    }
    if let Some(port) = args.port {
        builder = builder.port(port);
    }

    // Flags win over the config file
    let game = args
        .game
        .clone()
        .or_else(|| config.as_ref().map(|c| c.game.clone()))
        .unwrap_or_default();
    let name = args
        .name
        .clone()
        .or_else(|| config.as_ref().map(|c| c.name.clone()))
        .unwrap_or_else(|| random_name(&[WordType::Animal, WordType::Color, WordType::Adjective]));
    let uuid = args
        .uuid
        .or_else(|| config.as_ref().and_then(|c| c.uuid))
        .unwrap_or_else(Uuid::new_v4);

    builder
        .game(game.clone())
        .name(name.clone())
        .uuid(uuid)
        .entry(IdentityModule::new(game, name, uuid).entry())
        .module(HeartbeatModule::default())
        .build()
}

fn print_load_order(server: &Server) -> shard_core::Result<()> {
    let order = server.resolve_load_order()?;
    let registry = server.registry();
    println!("Load order for {} ({}):", server.name(), server.game());
    for (index, module_type) in order.iter().enumerate() {
        let name = registry
            .get(*module_type)
            .map(|entry| entry.name().to_string())
            .unwrap_or_else(|| module_type.short_name());
        println!("  {}. {}", index + 1, name);
    }
    Ok(())
}

async fn run(args: CliArgs) -> shard_core::Result<()> {
    let server = build_server(&args)?;

    if args.check {
        return print_load_order(&server);
    }

    let runtime = TcpRuntime::new();
    let started = server.start(&runtime).await;
    // Modules loaded before a failure still get stopped
    let stopped = server.shutdown().await;
    started?;
    stopped
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    init_logging();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
