use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "plume", version, about = "Target-seeking social automation CLI")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Config file (defaults to ./plume.yaml, then ~/.plume/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// WebDriver endpoint to drive the browser through
    #[arg(long, global = true, default_value = "http://localhost:4444")]
    driver_url: String,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        platform: String,
        #[arg(long, default_value = "default")]
        session: String,
        #[arg(long)]
        username: String,
        /// Password; falls back to the PLUME_PASSWORD environment variable
        #[arg(long)]
        password: Option<String>,
    },
    /// Discover posts for a search and comment until the target is met
    AutoComment {
        #[arg(long)]
        platform: String,
        #[arg(long, default_value = "default")]
        session: String,
        #[arg(long, conflicts_with = "keywords")]
        hashtag: Option<String>,
        #[arg(long)]
        keywords: Option<String>,
        /// Number of successful comments to stop at
        #[arg(long, default_value_t = 5)]
        count: usize,
        /// Generate comment text with the configured AI service
        #[arg(long, conflicts_with = "text")]
        ai: bool,
        /// Fixed comment text to post on every item
        #[arg(long)]
        text: Option<String>,
        /// Also like each post after commenting
        #[arg(long)]
        like: bool,
        /// Scroll/pagination budget per discovery refill
        #[arg(long)]
        max_pages: Option<usize>,
    },
    /// Report whether a stored session exists and show its metadata
    CheckSession {
        #[arg(long)]
        platform: String,
        #[arg(long, default_value = "default")]
        session: String,
    },
    /// Delete a stored session
    Logout {
        #[arg(long)]
        platform: String,
        #[arg(long, default_value = "default")]
        session: String,
    },
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so stdout stays a machine-readable JSON result.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();

    let outcome = commands::run(args).await;
    match outcome {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            let ok = value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false);
            if !ok {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {e:#}");
            println!("{}", serde_json::json!({ "ok": false, "error": e.to_string() }));
            std::process::exit(1);
        }
    }
}
