use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use logistics_insight::Config;

mod cli;

/// Logistics Insight: interpret natural-language delivery analytics questions
#[derive(Parser, Debug)]
#[command(name = "logistics-insight")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify a question and extract its analysis parameters
    Interpret {
        /// The question, e.g. "Why were deliveries delayed in Mumbai last week?"
        query: String,
    },

    /// List the supported question types with an example each
    Examples,

    /// Resolve a time expression against the available data window
    ParseTime {
        /// Time expression, e.g. "Q3 2025" or "last 2 weeks"
        expr: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.json_logs);

    let config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    match args.command {
        Command::Interpret { query } => cli::run_interpret(&config, &query, args.json),
        Command::Examples => cli::run_examples(args.json),
        Command::ParseTime { expr } => cli::run_parse_time(&config, &expr, args.json),
    }
}

fn init_logging(json_logs: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
