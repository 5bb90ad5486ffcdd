use clap::Parser;
use std::path::PathBuf;

use streamgrab::Config;

#[derive(Parser)]
#[command(name = "streamgrab")]
#[command(about = "Web front-end for fetching online video and audio with yt-dlp", long_about = None)]
struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(short, long, env = "STREAMGRAB_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to, e.g. 127.0.0.1:5000
    #[arg(short, long)]
    listen: Option<String>,

    /// Path to the yt-dlp binary
    #[arg(long)]
    ytdlp: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "streamgrab=info,tower_http=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(listen) = cli.listen {
        config.server.listen = listen;
    }
    if let Some(path) = cli.ytdlp {
        config.engine.ytdlp_path = Some(path);
    }

    streamgrab::run(config).await
}
