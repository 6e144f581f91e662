use std::path::PathBuf;

use anyhow::Context;
use api::backend::Backend;
use api::routes::router;
use api::settings::Settings;
use api::state::AppState;
use clap::{Parser, Subcommand};
use tracing::info;

mod cli;
mod notify;

#[derive(Parser)]
#[command(name = "hostclip", about = "Share text and images between devices", version)]
struct Cli {
    /// Path to TOML config file (defaults to ./hostclip.toml if present)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve,
    /// Create a session, print its QR code and wait for content
    Share {
        #[arg(long)]
        server: Option<String>,
        /// Seconds between polls
        #[arg(long)]
        interval: Option<u64>,
        /// Unsaved local text; kept if different text arrives
        #[arg(long)]
        draft: Option<String>,
    },
    /// Poll an existing session and ring the bell when content arrives
    Watch {
        session_id: String,
        #[arg(long)]
        server: Option<String>,
        #[arg(long)]
        interval: Option<u64>,
        #[arg(long)]
        draft: Option<String>,
    },
    /// Print the current contents of a session
    Show {
        session_id: String,
        #[arg(long)]
        server: Option<String>,
    },
    /// Save text and/or images to a session
    Push {
        session_id: String,
        #[arg(long)]
        text: Option<String>,
        /// PNG or JPEG file, up to 2 MiB; repeat for several
        #[arg(long = "image")]
        images: Vec<PathBuf>,
        #[arg(long)]
        server: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hostclip=info,api=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::new(cli.config.as_deref()).context("failed to load configuration")?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(settings).await,
        Commands::Share {
            server,
            interval,
            draft,
        } => {
            let target = cli::Target::new(&settings, server, interval);
            cli::share(target, draft).await
        }
        Commands::Watch {
            session_id,
            server,
            interval,
            draft,
        } => {
            let target = cli::Target::new(&settings, server, interval);
            cli::watch(target, &session_id, draft).await
        }
        Commands::Show { session_id, server } => {
            let target = cli::Target::new(&settings, server, None);
            cli::show(target, &session_id).await
        }
        Commands::Push {
            session_id,
            text,
            images,
            server,
        } => {
            let target = cli::Target::new(&settings, server, None);
            cli::push(target, &session_id, text.as_deref(), &images).await
        }
    }
}

async fn serve(settings: Settings) -> anyhow::Result<()> {
    let backend = Backend::from_settings(&settings);
    info!(backend = backend.name(), "storage backend selected");

    let state = AppState::new(backend, &settings.server);
    let app = router(state);

    let addr = settings.server.address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on {}", addr);
    info!("Session links use {}", settings.server.public_url);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}
