use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::time::Duration;

use quickbrief::client::AnalyzeClientConfig;
use quickbrief::output::OutputConfig;
use quickbrief::telemetry;

mod cmd;

#[derive(Parser)]
#[command(name = "quickbrief", about = "Summarize an earnings call transcript through the QuickBrief backend")]
struct Cli {
    /// Backend base URL (overrides QUICKBRIEF_BASE_URL)
    #[arg(global = true, long)]
    base_url: Option<String>,
    /// Client-side request timeout in seconds (overrides QUICKBRIEF_TIMEOUT_SECS)
    #[arg(global = true, long)]
    timeout_secs: Option<u64>,
    /// Emit JSON envelopes to stdout; logs go to stderr
    #[arg(global = true, long, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    Analyze(cmd::analyze::AnalyzeCmd),
    Interactive(cmd::interactive::InteractiveCmd),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    telemetry::config::set_json_mode(cli.json);

    // initialize logging/tracing (stderr). Respect RUST_LOG and QUICKBRIEF_LOG_FORMAT
    telemetry::config::init_tracing();

    let mut client = AnalyzeClientConfig::from_env();
    if let Some(base) = cli.base_url {
        client.base_url = base;
    }
    if let Some(secs) = cli.timeout_secs.filter(|s| *s > 0) {
        client.timeout = Some(Duration::from_secs(secs));
    }
    let app = cmd::AppCtx {
        client,
        output: OutputConfig::from_env().with_json_flag(telemetry::config::json_mode()),
    };

    match cli.command {
        Commands::Analyze(args) => cmd::analyze::run(&app, args).await?,
        Commands::Interactive(args) => cmd::interactive::run(&app, args).await?,
    }

    Ok(())
}
