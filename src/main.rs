use clap::{Parser, Subcommand};
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use tokio::sync::Notify;

mod app;
mod config;
mod error;
mod handler;
mod http;
mod logger;
mod migrations;
mod routing;
mod server;

#[derive(Parser)]
#[command(name = "devserver")]
#[command(about = "Local development server with auth route rewriting and static assets", long_about = None)]
struct Cli {
    /// Server configuration file (extension optional)
    #[arg(short, long, default_value = "config")]
    config: String,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the development server (default)
    Serve,
    /// Print the resolved migration environment
    Migrations {
        /// Migration configuration file (extension optional)
        #[arg(short, long, default_value = "migrations")]
        file: String,

        /// Environment name; the configured default when omitted
        #[arg(short, long)]
        env: Option<String>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(&cli.config),
        Command::Migrations { file, env } => show_migrations(&file, env.as_deref()),
    }
}

fn show_migrations(file: &str, env: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = migrations::MigrationsConfig::load_from(file)?;
    let name = env.unwrap_or(&cfg.default_environment);
    let environment = cfg.environment(Some(name))?;

    println!("# environment: {name}");
    println!("# migrations: {}", cfg.paths.migrations);
    if let Some(seeds) = &cfg.paths.seeds {
        println!("# seeds: {seeds}");
    }
    println!("# table: {}", cfg.default_migration_table);
    println!("# version order: {}", cfg.version_order);
    println!("# dsn: {}", environment.dsn());
    print!("{}", environment.render()?);
    Ok(())
}

fn serve(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let cfg = config::Config::load_from(config_path)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let router = routing::Router::from_config(&cfg.root)?;
    let entry = Arc::new(app::UpstreamEntryPoint::new(&cfg.app)?);
    let listener = server::create_listener(addr)?;

    logger::log_server_start(&addr, &cfg);
    logger::log_debug(&format!(
        "Resolved document root: {}",
        router.document_root().display()
    ));

    let shutdown = Arc::new(Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    let state = Arc::new(config::AppState::new(cfg, router, entry));
    let active_connections = Arc::new(AtomicUsize::new(0));

    // Connections are served with spawn_local
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            shutdown,
        ))
        .await;

    logger::log_server_stop();
    Ok(())
}
