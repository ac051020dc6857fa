//! quizflow CLI — take, resume and review quizzes from the terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

const DEFAULT_LOG_FILTER: &str = "quizflow_core=warn,quizflow_client=warn";

#[derive(Parser)]
#[command(name = "quizflow", version, about = "Interactive quiz sessions with autosave")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a quiz: generate one, resume a saved one, or play a local file
    Take(commands::take::TakeArgs),

    /// List past and in-progress quizzes
    History {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Review a finished quiz
    Review {
        /// Results JSON written by `take --save`
        #[arg(long, conflicts_with = "quiz_id")]
        file: Option<PathBuf>,

        /// Completed quiz id from the backend history
        #[arg(long)]
        quiz_id: Option<String>,

        /// Output format: text, markdown, html
        #[arg(long, default_value = "text")]
        format: String,

        /// Write to this file instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate local quiz files
    Validate {
        /// Path to a quiz JSON file or a directory of them
        #[arg(long)]
        file: PathBuf,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Take(args) => commands::take::execute(args).await,
        Commands::History { config } => commands::history::execute(config).await,
        Commands::Review {
            file,
            quiz_id,
            format,
            output,
            config,
        } => commands::review::execute(file, quiz_id, format, output, config).await,
        Commands::Validate { file } => commands::validate::execute(file),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
