//! promptgrade CLI, the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

use promptgrade_core::model::{Difficulty, Mode};

mod commands;

#[derive(Parser)]
#[command(name = "promptgrade", version, about = "Prompt-writing practice grader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Grade one submission against an exercise
    Evaluate {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Exercise id
        #[arg(long)]
        exercise: String,

        /// Submission text (reads stdin when neither --text nor --file is given)
        #[arg(long, conflicts_with = "file")]
        text: Option<String>,

        /// Read the submission from a file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Grading mode: run or submit
        #[arg(long, default_value = "run")]
        mode: Mode,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a file of submissions and write a report
    Batch {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Submissions file (.toml or .json)
        #[arg(long)]
        submissions: PathBuf,

        /// Max concurrent evaluations
        #[arg(long, default_value = "4")]
        parallelism: usize,

        /// Output directory
        #[arg(long, default_value = "./promptgrade-results")]
        output: PathBuf,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Compare two grading reports
    Compare {
        /// Baseline report JSON
        #[arg(long)]
        baseline: PathBuf,

        /// Current report JSON
        #[arg(long)]
        current: PathBuf,

        /// Regression threshold in score points
        #[arg(long, default_value = "5")]
        threshold: u32,

        /// Exit code 1 if regressions found
        #[arg(long)]
        fail_on_regression: bool,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Validate exercise catalogs
    Validate {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,
    },

    /// List exercises
    List {
        /// Path to a catalog file or directory
        #[arg(long)]
        catalog: PathBuf,

        /// Filter by category ("All" matches everything)
        #[arg(long)]
        category: Option<String>,

        /// Filter by technique ("All" matches everything)
        #[arg(long)]
        technique: Option<String>,

        /// Filter by difficulty: easy, medium, hard
        #[arg(long)]
        difficulty: Option<Difficulty>,

        /// Print the available categories and techniques instead
        #[arg(long)]
        options: bool,
    },

    /// Create starter config and example catalog
    Init,
}

#[tokio::main]
async fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("promptgrade=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            catalog,
            exercise,
            text,
            file,
            mode,
            format,
            config,
        } => commands::evaluate::execute(catalog, exercise, text, file, mode, format, config),
        Commands::Batch {
            catalog,
            submissions,
            parallelism,
            output,
            config,
        } => commands::batch::execute(catalog, submissions, parallelism, output, config).await,
        Commands::Compare {
            baseline,
            current,
            threshold,
            fail_on_regression,
            format,
        } => commands::compare::execute(baseline, current, threshold, fail_on_regression, format),
        Commands::Validate { catalog } => commands::validate::execute(catalog),
        Commands::List {
            catalog,
            category,
            technique,
            difficulty,
            options,
        } => commands::list::execute(catalog, category, technique, difficulty, options),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
