//! candidate-ranker: weighted multi-dimension candidate ranking

use candidate_ranker::cli::{self, Cli, Commands, ConfigAction, WeightAction, REQUEST_EXTENSIONS};
use candidate_ranker::config::{Config, OutputFormat};
use candidate_ranker::error::{RankerError, Result};
use candidate_ranker::input::manager::InputManager;
use candidate_ranker::output::formatter::{resolve_save_path, save_report_to_file, ReportGenerator};
use candidate_ranker::output::report::{ComparisonReport, RankingReport, ReportMetadata};
use candidate_ranker::ranking::dimension::DimensionKey;
use candidate_ranker::ranking::engine::{RankingEngine, RankingRequest};
use candidate_ranker::ranking::weights::{WeightNormalizer, WeightVector};
use clap::Parser;
use log::{error, info};
use std::path::Path;
use std::process;
use std::time::Instant;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    // Load configuration
    let config = match Config::load(Some(&config_path)) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    // Execute command
    if let Err(e) = run_command(cli.command, config, &config_path).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, mut config: Config, config_path: &Path) -> Result<()> {
    match command {
        Commands::Rank { input, output, save, detailed } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let started = Instant::now();

            let mut input_manager = InputManager::new();
            let request = load_request(&mut input_manager, &input).await?;

            let engine = RankingEngine::new(config.ranking.clone());
            let outcome = engine.run(request)?;
            info!(
                "Ranked {} candidate(s), {} eliminated",
                outcome.ranked.len(),
                outcome.eliminated.count
            );

            let report = RankingReport::new(outcome, ReportMetadata::new(&input, started.elapsed()));
            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                detailed || config.output.detailed,
                true,
                true,
            );
            let rendered = generator.generate_ranking(&report, format)?;
            let target = save.map(|path| resolve_save_path(&path, format, &report.metadata.input_file, "ranking"));
            emit(&rendered, target.as_deref())?;
        }

        Commands::Compare { input, first, second, output, save } => {
            let format = resolve_format(output.as_deref(), &config)?;
            let started = Instant::now();

            let mut input_manager = InputManager::new();
            let request = load_request(&mut input_manager, &input).await?;

            let engine = RankingEngine::new(config.ranking.clone());
            let outcome = engine.compare(request, &first, &second)?;

            let report = ComparisonReport::new(outcome, ReportMetadata::new(&input, started.elapsed()));
            let generator = ReportGenerator::with_options(
                config.output.color_output && save.is_none(),
                config.output.detailed,
                true,
                true,
            );
            let rendered = generator.generate_comparison(&report, format)?;
            let target = save.map(|path| resolve_save_path(&path, format, &report.metadata.input_file, "comparison"));
            emit(&rendered, target.as_deref())?;
        }

        Commands::Weights { action } => match action {
            WeightAction::Show => {
                print_weights(&config.ranking.weights);
            }

            WeightAction::Adjust { dimension, value, save } => {
                let dimension: DimensionKey = dimension.parse()?;
                if value > 100 {
                    return Err(RankerError::InvalidInput(format!(
                        "Weight must be between 0 and 100, got {}",
                        value
                    )));
                }
                let adjusted = WeightNormalizer::adjust(&config.ranking.weights, dimension, value);
                print_weights(&adjusted);
                if save {
                    config.ranking.weights = adjusted;
                    config.save_to(config_path)?;
                    println!("✅ Weights saved to {}", config_path.display());
                }
            }

            WeightAction::Normalize { values, save } => {
                let raw = cli::parse_weight_pairs(&values).map_err(RankerError::InvalidInput)?;
                let rescaled = WeightVector::rescale(&raw)?;
                print_weights(&rescaled);
                if save {
                    config.ranking.weights = rescaled;
                    config.save_to(config_path)?;
                    println!("✅ Weights saved to {}", config_path.display());
                }
            }
        },

        Commands::Config { action } => match action {
            Some(ConfigAction::Show) | None => {
                println!("⚙️  Current Configuration\n");
                let content = toml::to_string_pretty(&config)
                    .map_err(|e| RankerError::Configuration(format!("Failed to serialize config: {}", e)))?;
                println!("{}", content);
            }

            Some(ConfigAction::Path) => {
                println!("{}", config_path.display());
            }

            Some(ConfigAction::Reset) => {
                println!("🔄 Resetting configuration to defaults...");
                Config::default().save_to(config_path)?;
                println!("✅ Configuration reset successfully!");
            }

            Some(ConfigAction::Set { key, value }) => {
                config.set(&key, &value)?;
                config.save_to(config_path)?;
                println!("🔧 Set {} = {}", key, value);
                if key.starts_with("weights.") {
                    print_weights(&config.ranking.weights);
                }
            }
        },
    }

    Ok(())
}

async fn load_request(input_manager: &mut InputManager, input: &Path) -> Result<RankingRequest> {
    cli::validate_file_extension(input, &REQUEST_EXTENSIONS)
        .map_err(|e| RankerError::InvalidInput(format!("Request file: {}", e)))?;
    info!("Loading ranking request from {}", input.display());
    input_manager.load_request(input).await
}

fn resolve_format(flag: Option<&str>, config: &Config) -> Result<OutputFormat> {
    match flag {
        Some(format) => format.parse(),
        None => Ok(config.output.format),
    }
}

fn emit(rendered: &str, save: Option<&Path>) -> Result<()> {
    match save {
        Some(path) => {
            save_report_to_file(rendered, path)?;
            println!("💾 Saved report to {}", path.display());
        }
        None => println!("{}", rendered),
    }
    Ok(())
}

fn print_weights(weights: &WeightVector) {
    for key in DimensionKey::ALL {
        println!("  {:<12} {:>3}%", key.label(), weights.get(key));
    }
    println!("  {:<12} {:>3}%", "Total", weights.total());
}
