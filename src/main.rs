use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use notes_service::{api, config::Config, db};

#[derive(Parser)]
#[command(name = "notes-service")]
#[command(about = "HTTP CRUD service for notes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve(ServeArgs),
}

#[derive(Args, Default)]
struct ServeArgs {
    /// Host to bind (overrides NOTES_HOST)
    #[arg(long)]
    host: Option<String>,

    /// Port for the HTTP API (overrides NOTES_PORT)
    #[arg(short, long)]
    port: Option<u16>,

    /// SQLite database file (overrides NOTES_DB_PATH)
    #[arg(long, conflicts_with = "memory")]
    db: Option<PathBuf>,

    /// Keep notes in memory only
    #[arg(long)]
    memory: bool,
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG")
            .unwrap_or_else(|_| "notes_service=debug,tower_http=debug".into()),
    );

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let args = match cli.command {
        Some(Commands::Serve(args)) => args,
        None => ServeArgs::default(),
    };

    serve(args).await
}

async fn serve(args: ServeArgs) -> anyhow::Result<()> {
    let mut config = Config::from_env();
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(path) = args.db {
        config.db_path = Some(path);
    }

    let db = if args.memory {
        db::Database::open_memory()?
    } else {
        match &config.db_path {
            Some(path) => db::Database::open(path.clone())
                .with_context(|| format!("Failed to open database at {}", path.display()))?,
            None => db::Database::open_default()?,
        }
    };
    db.init_schema()?;

    let app = api::create_router_with_config(db.clone(), config.api());

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("Starting server on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    db.close()
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
