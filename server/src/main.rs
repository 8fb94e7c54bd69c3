use anyhow::Result;
use axum::Router;
use clap::Parser;
use server::{build_app, ServerOptions};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path
    #[arg(long, default_value = "cache")]
    index: PathBuf,
    /// Corpus used by POST /index/rebuild
    #[arg(long, default_value = "data/movies.json")]
    data: PathBuf,
    /// Stopword list applied to queries
    #[arg(long, default_value = "data/stopwords.txt")]
    stopwords: PathBuf,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let app: Router = build_app(ServerOptions {
        index_dir: args.index,
        corpus: args.data,
        stopwords: args.stopwords,
        admin_token: std::env::var("ADMIN_TOKEN").ok(),
        cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").ok(),
    })?;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
