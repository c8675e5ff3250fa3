use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use server::Config;

#[derive(Parser)]
#[command(name = "vidox")]
#[command(about = "Web front-end for downloading media via yt-dlp", long_about = None)]
struct Cli {
    /// Port to listen on
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Database file path
    #[arg(short, long, default_value = "vidox.db")]
    database: String,

    /// Directory for runtime data (extraction workspaces live underneath)
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Cookies file passed to the extraction tool
    #[arg(long)]
    cookies: Option<PathBuf>,

    /// Per-download timeout in seconds
    #[arg(long, default_value = "600")]
    extraction_timeout: u64,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let database_url = format!("sqlite:{}?mode=rwc", cli.database);

    let mut config = Config::new(database_url, cli.data_dir);
    config.cookies_file = cli.cookies;
    config.extraction_timeout_secs = cli.extraction_timeout;

    server::run_server(addr, config).await
}
