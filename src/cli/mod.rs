//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::io::DEFAULT_ARTIFACT_PATH;

#[derive(Debug, Parser)]
#[command(
    name = "brentcast",
    version,
    about = "Brent crude price modelling from world oil production",
    long_about = "Fetches EIA world crude production and IPEADATA Brent FOB prices, \
trains a seasonal random-forest price model on a trailing window, and serves \
interactive forecasts. Running with no subcommand opens the TUI."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch both series, train the model and write the artifact
    Train(TrainArgs),
    /// One-shot prediction from a saved model artifact
    Predict(PredictArgs),
    /// Interactive forecast explorer (default when no subcommand is given)
    Tui(TuiArgs),
}

#[derive(Debug, Parser)]
pub struct TrainArgs {
    /// Where to write the model artifact
    #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,

    /// Trailing training window, in years back from the newest joined month
    #[arg(long, default_value_t = 3)]
    pub window_years: i32,

    /// Fraction of the window held out (chronological tail) for evaluation
    #[arg(long, default_value_t = 0.2)]
    pub test_fraction: f64,

    /// Number of trees in the forest
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Seed for bootstrap sampling
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Months of forward outlook printed after training
    #[arg(long, default_value_t = 12)]
    pub horizon: usize,

    /// Fail the run when held-out R^2 falls below this threshold
    #[arg(long)]
    pub min_r2: Option<f64>,

    /// Also write the joined observation table as CSV
    #[arg(long, value_name = "PATH")]
    pub export: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct PredictArgs {
    /// Month to predict, as YYYY-MM
    #[arg(long)]
    pub month: String,

    /// Assumed world production in thousand barrels per day
    #[arg(long)]
    pub production: f64,

    /// Model artifact to load
    #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,
}

#[derive(Debug, Parser)]
pub struct TuiArgs {
    /// Model artifact to load
    #[arg(long, default_value = DEFAULT_ARTIFACT_PATH)]
    pub artifact: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn train_defaults() {
        let cli = Cli::parse_from(["brentcast", "train"]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        assert_eq!(args.window_years, 3);
        assert_eq!(args.trees, 100);
        assert_eq!(args.seed, 42);
        assert_eq!(args.horizon, 12);
        assert!(args.min_r2.is_none());
        assert_eq!(args.artifact, PathBuf::from(DEFAULT_ARTIFACT_PATH));
    }

    #[test]
    fn predict_args_parse() {
        let cli = Cli::parse_from([
            "brentcast",
            "predict",
            "--month",
            "2025-06",
            "--production",
            "123000",
        ]);
        let Command::Predict(args) = cli.command else {
            panic!("expected predict");
        };
        assert_eq!(args.month, "2025-06");
        assert_eq!(args.production, 123_000.0);
    }

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
