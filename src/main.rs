use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use plotline::config::Config;
use plotline::{dataset, explorer, pipeline};

/// Plotline: discover categories in movie plot summaries.
///
/// Clusters plot descriptions by their wording with TF-IDF and k-means, then
/// explains each cluster by its strongest terms.
#[derive(Parser)]
#[command(name = "plotline", version, about)]
struct Cli {
    /// CSV with `title` and `description` columns (overrides PLOTLINE_DATA)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cluster every plot once and write the results
    Cluster {
        /// Number of categories (default: 15)
        #[arg(long)]
        k: Option<usize>,

        /// Directory for CSV, JSON and SVG output (default: output)
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Random seed for k-means (default: 42)
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Sweep k and chart inertia to help choose the number of categories
    Optimize {
        /// Largest k to try (default: 30)
        #[arg(long)]
        max_k: Option<usize>,

        /// Directory for the elbow chart (default: output)
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },

    /// Explore categories and classify new plots in an interactive prompt
    Explore {
        /// Starting number of categories, 5-25 (default: 15)
        #[arg(long)]
        k: Option<usize>,
    },

    /// Serve the explorer as a JSON API
    #[cfg(feature = "web")]
    Serve {
        /// Port to listen on (default: 3000)
        #[arg(long, default_value = "3000")]
        port: u16,

        /// Address to bind (default: 127.0.0.1)
        #[arg(long, default_value = "127.0.0.1")]
        bind: String,

        /// Default number of categories, 5-25 (default: 15)
        #[arg(long)]
        k: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("plotline=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(data) = cli.data {
        config.data_path = data;
    }

    match cli.command {
        Commands::Cluster { k, output_dir, seed } => {
            if let Some(k) = k {
                config.k = k;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            config.require_dataset()?;

            info!(k = config.k, data = %config.data_path.display(), "Starting batch clustering");
            pipeline::batch::run(&config)?;
            println!("{}", "Done.".green().bold());
        }

        Commands::Optimize { max_k, output_dir } => {
            if let Some(max_k) = max_k {
                config.max_k = max_k;
            }
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            config.require_dataset()?;

            pipeline::optimize::run(&config)?;
        }

        Commands::Explore { k } => {
            let k = k.unwrap_or(config.k);
            Config::require_explorer_k(k)?;
            config.require_dataset()?;

            let documents = dataset::load_documents(&config.data_path)?;
            let mut repl = explorer::Explorer::new(documents, config.cluster_settings(), k)?;
            let stdin = std::io::stdin();
            repl.run(stdin.lock())?;
        }

        #[cfg(feature = "web")]
        Commands::Serve { port, bind, k } => {
            let k = k.unwrap_or(config.k);
            Config::require_explorer_k(k)?;
            config.require_dataset()?;

            let documents = dataset::load_documents(&config.data_path)?;
            println!("Loaded {} titles.", documents.len());
            let state = plotline::web::AppState::new(documents, config.cluster_settings(), k);
            plotline::web::run_server(state, port, &bind).await?;
        }
    }

    Ok(())
}
