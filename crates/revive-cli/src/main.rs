//! Revive CLI - restore old photos from the terminal

mod prompt;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use revive_core::api::{self, HealthStatus};
use revive_core::commands::restore::{self, RestoreOptions};
use revive_core::config::Config;
use revive_core::image::{DEFAULT_MODEL_ID, IMAGE_MODELS};
use tracing::warn;

use crate::prompt::TerminalCredentialPrompt;

#[derive(Parser)]
#[command(name = "revive")]
#[command(author, version, about = "Old photo restoration with Gemini", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Quiet mode (minimal output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Restore a photo
    Restore {
        /// Photo to restore
        input: PathBuf,
        /// Restoration strength, 0-100 (clamped)
        #[arg(short, long, allow_negative_numbers = true)]
        strength: Option<i64>,
        /// Output file (defaults to restored_image.png next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Model ID
        #[arg(short, long)]
        model: Option<String>,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Run health check
    Doctor,

    /// List known image models
    Models,
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
    /// Reset to defaults
    Reset,
    /// Show config file path
    Path,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("revive=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Restore {
            input,
            strength,
            output,
            model,
        } => {
            let options = RestoreOptions {
                output,
                strength,
                model,
            };
            cmd_restore(input, options, cli.format, cli.quiet).await
        }

        Commands::Config { action } => cmd_config(action, cli.quiet),

        Commands::Doctor => cmd_doctor(cli.format, cli.quiet).await,

        Commands::Models => cmd_models(cli.format),
    }
}

async fn cmd_restore(
    input: PathBuf,
    options: RestoreOptions,
    format: OutputFormat,
    quiet: bool,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    if !quiet && format == OutputFormat::Text {
        println!("Restoring {}...", input.display());
    }

    match restore::restore_file(&config, TerminalCredentialPrompt, &input, options).await {
        Ok(outcome) => {
            match format {
                OutputFormat::Json => {
                    let value = serde_json::json!({
                        "output": outcome.output_path.display().to_string(),
                        "status": outcome.status,
                        "size_bytes": outcome.size_bytes,
                        "time_ms": outcome.generation_time_ms,
                    });
                    println!("{}", serde_json::to_string_pretty(&value)?);
                }
                OutputFormat::Text if !quiet => {
                    println!("{}", outcome.status);
                    println!(
                        "Saved {} ({} bytes, {}ms)",
                        outcome.output_path.display(),
                        outcome.size_bytes,
                        outcome.generation_time_ms
                    );
                }
                OutputFormat::Text => println!("{}", outcome.output_path.display()),
            }
            Ok(())
        }
        Err(failure) => {
            let e = failure.error;
            warn!(code = e.code(), "Restore failed");
            eprintln!("{}", failure.status);
            if let Some(hint) = e.suggestion() {
                eprintln!("Hint: {}", hint);
            }
            Err(anyhow::anyhow!("[{}] {}", e.code(), e))
        }
    }
}

fn cmd_config(action: ConfigAction, quiet: bool) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key)?;
            println!("{}", value);
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            if !quiet {
                println!("Set {} = {}", key, value);
            }
        }
        ConfigAction::List => {
            let config = Config::load()?;
            for (key, value) in config.list()? {
                println!("{} = {}", key, value);
            }
        }
        ConfigAction::Reset => {
            Config::reset()?;
            if !quiet {
                println!("Configuration reset to defaults.");
            }
        }
        ConfigAction::Path => {
            let path = Config::config_path()?;
            println!("{}", path.display());
        }
    }
    Ok(())
}

async fn cmd_doctor(format: OutputFormat, quiet: bool) -> anyhow::Result<()> {
    let report = api::doctor().await?;

    if format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !quiet {
        let info = api::get_system_info();
        println!("Revive Health Check (v{})", info.version);
        println!("===================");
        println!();
    }

    for check in &report.checks {
        let tag = match check.status {
            HealthStatus::Ok => "[OK]",
            HealthStatus::Warning => "[!!]",
            HealthStatus::Error => "[XX]",
        };
        match &check.message {
            Some(message) => println!("{} {}: {}", tag, check.name, message),
            None => println!("{} {}", tag, check.name),
        }
    }

    if !quiet {
        println!();
        match report.overall_status {
            HealthStatus::Ok => println!("All checks passed."),
            HealthStatus::Warning => println!("Some checks need attention."),
            HealthStatus::Error => println!("Some checks failed."),
        }
    }

    Ok(())
}

fn cmd_models(format: OutputFormat) -> anyhow::Result<()> {
    if format == OutputFormat::Json {
        let models: Vec<_> = IMAGE_MODELS
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "description": m.description,
                    "restores_photos": m.image_to_image,
                    "default": m.id == DEFAULT_MODEL_ID,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    for model in IMAGE_MODELS {
        let marker = if model.id == DEFAULT_MODEL_ID { "*" } else { " " };
        let capability = if model.image_to_image { "" } else { " (no photo input)" };
        println!("{} {:<32} {}{}", marker, model.id, model.name, capability);
    }
    Ok(())
}
