use clap::Parser;
use parley::core::config::{self, CliOverrides, ParleyConfig, ReplyRendering};
use parley::tui;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "parley", about = "Terminal client for a remote chat assistant")]
struct Args {
    /// Chat endpoint URL (POST target)
    #[arg(short, long)]
    endpoint: Option<String>,

    /// Seconds to wait for a reply before giving up
    #[arg(short, long)]
    timeout: Option<u64>,

    /// How model replies are interpreted when drawn
    #[arg(short, long, value_enum)]
    render: Option<ReplyRendering>,

    /// Where to write the log (the terminal belongs to the UI)
    #[arg(long, default_value = "parley.log")]
    log_file: PathBuf,
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = config::load_config().unwrap_or_else(|e| {
        log::warn!("{}; falling back to defaults", e);
        ParleyConfig::default()
    });
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            endpoint: args.endpoint,
            timeout_secs: args.timeout,
            reply_rendering: args.render,
        },
    );

    log::info!(
        "Parley starting up: endpoint={}, timeout={}s, rendering={:?}",
        resolved.endpoint,
        resolved.request_timeout.as_secs(),
        resolved.reply_rendering
    );

    tui::run(resolved)
}
