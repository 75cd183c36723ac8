//! Strata Server
//!
//! Serves the version control JSON API over HTTP, with optional
//! persistence to a state file between runs.

use anyhow::Result;
use bytes::Bytes;
use clap::{Parser, Subcommand};
use http_body_util::Full;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::path::PathBuf;
use strata_http::{ApiHandler, Config};
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Strata Server Configuration
#[derive(Parser, Debug)]
#[command(name = "stratad")]
#[command(author = "Strata Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Version control engine server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the server
    Start {
        /// Listen address (e.g., 0.0.0.0:8080)
        #[arg(short, long, default_value = "0.0.0.0:8080")]
        addr: String,

        /// JSON state file; omit to keep state in memory only
        #[arg(short, long)]
        state_file: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long)]
        debug: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            addr,
            state_file,
            debug,
        } => {
            // Initialize tracing
            let env_filter = if debug {
                tracing_subscriber::EnvFilter::new("debug")
            } else {
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive(tracing::Level::INFO.into())
            };

            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer())
                .with(env_filter)
                .init();

            info!("Starting Strata server on {}", addr);
            match &state_file {
                Some(path) => info!("State file: {}", path.display()),
                None => info!("State kept in memory only"),
            }

            let config = Config {
                state_path: state_file,
                ..Config::default()
            };
            let handler = ApiHandler::with_config(config)?;

            let addr: SocketAddr = addr.parse()?;
            let listener = TcpListener::bind(addr).await?;

            info!("Server listening on {}", addr);

            loop {
                let (stream, _) = listener.accept().await?;
                let handler = handler.clone();
                let io = TokioIo::new(stream);

                tokio::spawn(async move {
                    if let Err(e) = http1::Builder::new()
                        .serve_connection(
                            io,
                            service_fn(move |req| handle_request(req, handler.clone())),
                        )
                        .await
                    {
                        error!("Error serving connection: {:?}", e);
                    }
                });
            }
        }
    }
}

/// Handle incoming HTTP request
async fn handle_request(
    req: Request<hyper::body::Incoming>,
    handler: ApiHandler,
) -> Result<Response<Full<Bytes>>, hyper::Error> {
    let response = match handler.handle(req).await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request error: {}", e);
            Response::builder()
                .status(500)
                .header("Content-Type", "application/json")
                .body(Full::new(Bytes::from(
                    serde_json::json!({
                        "success": false,
                        "message": format!("Internal server error: {}", e),
                    })
                    .to_string(),
                )))
                .unwrap()
        }
    };

    Ok(response)
}
