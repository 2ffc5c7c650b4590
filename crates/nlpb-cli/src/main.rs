mod analysis;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use nlpb_core::AppConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "nlpb-cli")]
#[command(about = "Multilingual text analytics over a fixed corpus")]
struct Cli {
    /// Dataset CSV to use instead of `NLPB_DATASET_PATH`
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show how the dataset normalizes, without contacting any model
    Inspect {
        /// Number of normalized records to print
        #[arg(long, default_value_t = 5)]
        sample: usize,
    },
    /// Build the vector index if the store is empty
    Index,
    /// Find the corpus texts closest to a prompt
    Search {
        prompt: String,

        /// Number of hits (defaults to `NLPB_DEFAULT_TOP_K`)
        #[arg(long)]
        top_k: Option<usize>,
    },
    /// Classify a prompt against the corpus categories or explicit labels
    Classify {
        prompt: String,

        /// Comma-separated candidate labels
        #[arg(long, value_delimiter = ',')]
        labels: Option<Vec<String>>,
    },
    /// Score the sentiment of a prompt
    Sentiment { prompt: String },
    /// Run search, classification and sentiment together
    Analyze {
        prompt: String,

        #[arg(long)]
        top_k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("nlpb-cli: pass --help to list commands");
        return Ok(());
    };

    match command {
        // Dataset settings only, so this runs without any model URL configured.
        Commands::Inspect { sample } => {
            let mut config = nlpb_core::load_dataset_config()?;
            if let Some(dataset) = cli.dataset {
                config.dataset_path = dataset;
            }
            init_tracing(&config.log_level)?;
            analysis::run_inspect(&config, sample)?;
        }
        Commands::Index => analysis::run_index(&app_config(cli.dataset)?).await?,
        Commands::Search { prompt, top_k } => {
            analysis::run_search(&app_config(cli.dataset)?, &prompt, top_k).await?;
        }
        Commands::Classify { prompt, labels } => {
            analysis::run_classify(&app_config(cli.dataset)?, &prompt, labels).await?;
        }
        Commands::Sentiment { prompt } => {
            analysis::run_sentiment(&app_config(cli.dataset)?, &prompt).await?;
        }
        Commands::Analyze { prompt, top_k } => {
            analysis::run_analyze(&app_config(cli.dataset)?, &prompt, top_k).await?;
        }
    }

    Ok(())
}

/// Full configuration with the `--dataset` override applied; installs logging.
fn app_config(dataset: Option<PathBuf>) -> anyhow::Result<AppConfig> {
    let mut config = nlpb_core::load_app_config()?;
    if let Some(dataset) = dataset {
        config.dataset_path = dataset;
    }
    init_tracing(&config.log_level)?;
    Ok(config)
}

/// Logs go to stderr so stdout stays valid JSON.
fn init_tracing(log_level: &str) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(log_level))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests;
