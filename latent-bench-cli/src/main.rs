use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use latent_bench::workflow::{benchmark_pred_exp, PredictConfig, WorkflowResult};

#[derive(Parser)]
#[command(
    name = "latent-bench",
    about = "Compare learned latent spaces with prediction benchmarks",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict every target from every latent key and compare the scores
    #[command(about = "Run the prediction benchmark (outputs: predict_<dataset>.tsv/.png)")]
    Predict {
        /// Dataset name used in the input and output file names
        #[arg(long)]
        dataset: Option<String>,

        /// Directory holding latent_vecs_*.npz and latent_meta_*.tsv
        #[arg(long)]
        datadir: Option<PathBuf>,

        /// Destination directory
        #[arg(long)]
        outdir: Option<PathBuf>,

        /// TOML file with default settings; flags override it
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Metadata columns to predict (all columns by default)
        #[arg(long, value_delimiter = ',')]
        targets: Option<Vec<String>>,

        /// Metadata columns balanced across the search splits
        #[arg(long, value_delimiter = ',')]
        stratify: Option<Vec<String>>,

        #[arg(long)]
        n_splits: Option<usize>,

        #[arg(long)]
        test_size: Option<f64>,

        #[arg(long)]
        seed: Option<u64>,

        /// Annotate each bar with its one-sample t-test stars
        #[arg(long)]
        one_sample_stars: bool,

        /// Draw brackets with stars over significant pairs
        #[arg(long)]
        pairwise_stars: bool,

        /// Write the pairwise t-tests even without stars
        #[arg(long)]
        report_t: bool,

        /// Skip the PNG figure
        #[arg(long)]
        no_figure: bool,
    },
}

fn predict_config(command: Commands) -> WorkflowResult<PredictConfig> {
    let Commands::Predict {
        dataset,
        datadir,
        outdir,
        config,
        targets,
        stratify,
        n_splits,
        test_size,
        seed,
        one_sample_stars,
        pairwise_stars,
        report_t,
        no_figure,
    } = command;

    let mut cfg = match config {
        Some(path) => PredictConfig::from_file(&path)?,
        None => PredictConfig::default(),
    };
    if let Some(dataset) = dataset {
        cfg.dataset = dataset;
    }
    if let Some(datadir) = datadir {
        cfg.datadir = datadir;
    }
    if let Some(outdir) = outdir {
        cfg.outdir = outdir;
    }
    if targets.is_some() {
        cfg.targets = targets;
    }
    if stratify.is_some() {
        cfg.stratify = stratify;
    }
    cfg.n_splits = n_splits.unwrap_or(cfg.n_splits);
    cfg.test_size = test_size.unwrap_or(cfg.test_size);
    cfg.seed = seed.unwrap_or(cfg.seed);
    cfg.one_sample_stars |= one_sample_stars;
    cfg.pairwise_stars |= pairwise_stars;
    cfg.report_t |= report_t;
    if no_figure {
        cfg.figure = false;
    }
    Ok(cfg)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let result = predict_config(cli.command).and_then(|config| benchmark_pred_exp(&config));
    match result {
        Ok(report) => {
            log::info!("scores: {}", report.predict_path.display());
            log::info!("search summaries: {}", report.cv_path.display());
            if let Some(path) = &report.pairwise_path {
                log::info!("pairwise statistics: {}", path.display());
            }
        }
        Err(e) => {
            log::error!("{}", e);
            process::exit(1);
        }
    }
}
