//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments
//! - runs the training pipeline (fetch, join, train, evaluate)
//! - prints reports and the forward outlook
//! - writes the model artifact and optional exports
//! - serves one-shot predictions from a saved artifact

use clap::Parser;

use crate::cli::{Command, PredictArgs, TrainArgs};
use crate::domain::{ForestParams, Month, TrainConfig};
use crate::error::AppError;
use crate::serve::PredictService;

pub mod pipeline;

/// Entry point for the `brentcast` binary.
pub fn run() -> Result<(), AppError> {
    // We want `brentcast` and `brentcast --artifact m.json` to behave like
    // `brentcast tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing. This preserves a clean clap structure while
    // retaining the requested UX.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Train(args) => handle_train(args),
        Command::Predict(args) => handle_predict(args),
        Command::Tui(args) => crate::tui::run(args),
    }
}

fn handle_train(args: TrainArgs) -> Result<(), AppError> {
    let config = train_config_from_args(&args);
    let run = pipeline::run_training(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.ingest, &run.output, &config)
    );
    println!("{}", crate::report::format_forecast_table(&run.outlook));

    if let Some(path) = &config.export {
        crate::io::export::write_observations_csv(path, &run.observations)?;
        println!("Wrote observations CSV: {}", path.display());
    }

    crate::io::write_artifact(&config.artifact, &run.output)?;
    println!("Wrote model artifact: {}", config.artifact.display());

    Ok(())
}

fn handle_predict(args: PredictArgs) -> Result<(), AppError> {
    let month: Month = args.month.parse()?;
    let service = PredictService::load(&args.artifact)?;
    let view = service.forecast_from(month, args.production)?;

    println!("{}", crate::report::format_point(&view.point));
    println!("{}", crate::report::format_forecast_table(&view.forward));

    Ok(())
}

pub fn train_config_from_args(args: &TrainArgs) -> TrainConfig {
    TrainConfig {
        window_years: args.window_years,
        test_fraction: args.test_fraction,
        horizon: args.horizon,
        min_r2: args.min_r2,
        params: ForestParams {
            trees: args.trees,
            seed: args.seed,
            ..ForestParams::default()
        },
        artifact: args.artifact.clone(),
        export: args.export.clone(),
    }
}

/// Rewrite argv so `brentcast` defaults to `brentcast tui`.
///
/// Rules:
/// - `brentcast`                     -> `brentcast tui`
/// - `brentcast --artifact m.json`   -> `brentcast tui --artifact m.json`
/// - `brentcast --help/--version/-h` -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "train" | "predict" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_defaults_to_tui() {
        assert_eq!(rewrite_args(argv(&["brentcast"])), argv(&["brentcast", "tui"]));
    }

    #[test]
    fn leading_flag_routes_to_tui() {
        assert_eq!(
            rewrite_args(argv(&["brentcast", "--artifact", "m.json"])),
            argv(&["brentcast", "tui", "--artifact", "m.json"]),
        );
    }

    #[test]
    fn subcommands_and_help_pass_through() {
        for first in ["train", "predict", "tui", "--help", "-h", "-V", "--version", "help"] {
            let before = argv(&["brentcast", first]);
            assert_eq!(rewrite_args(before.clone()), before);
        }
    }

    #[test]
    fn config_carries_cli_overrides() {
        let cli = crate::cli::Cli::parse_from([
            "brentcast", "train", "--trees", "25", "--seed", "7", "--window-years", "5",
        ]);
        let Command::Train(args) = cli.command else {
            panic!("expected train");
        };
        let config = train_config_from_args(&args);
        assert_eq!(config.params.trees, 25);
        assert_eq!(config.params.seed, 7);
        assert_eq!(config.window_years, 5);
    }
}
