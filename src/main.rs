use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tokio::runtime::Runtime;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use archwright::cli::Output;
use archwright::cli::commands::{self, feedback::FeedbackOptions, recommend::RecommendOptions};
use archwright::config::{Config, ConfigLoader};
use archwright::templates::{TemplateConfig, TemplateKind};
use archwright::types::{ArchitectureType, CloudProvider, DatabaseType};

/// Parse `key=value` preference adjustments
fn parse_preference(s: &str) -> Result<(String, f64), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid preference '{}'. Expected key=value", s))?;
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("Invalid preference value '{}' for '{}'", value, key))?;
    if !value.is_finite() {
        return Err(format!("Preference value for '{}' must be a finite number", key));
    }
    Ok((key.trim().to_lowercase(), value))
}

fn parse_provider(s: &str) -> Result<CloudProvider, String> {
    s.parse().map_err(|e: archwright::ArchError| e.to_string())
}

fn parse_architecture(s: &str) -> Result<ArchitectureType, String> {
    s.parse().map_err(|e: archwright::ArchError| e.to_string())
}

fn parse_database(s: &str) -> Result<DatabaseType, String> {
    s.parse().map_err(|e: archwright::ArchError| e.to_string())
}

fn parse_kind(s: &str) -> Result<TemplateKind, String> {
    s.parse().map_err(|e: archwright::ArchError| e.to_string())
}

#[derive(Parser)]
#[command(name = "archwright")]
#[command(
    version,
    about = "LLM-driven cloud architecture recommendations for AWS and Azure"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, short, help = "Load configuration from this file only")]
    config: Option<PathBuf>,

    #[arg(long)]
    verbose: bool,

    #[arg(long, short)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend cloud architectures for a requirements description
    Recommend {
        #[arg(help = "Natural-language requirements")]
        query: String,
        #[arg(long, help = "Monthly budget in USD")]
        budget: Option<f64>,
        #[arg(long = "cloud", value_parser = parse_provider, help = "Target provider (aws, azure); repeatable")]
        providers: Vec<CloudProvider>,
        #[arg(long, value_parser = parse_architecture, help = "microservices, monolith, serverless")]
        architecture: Option<ArchitectureType>,
        #[arg(long, help = "Generate React and Java templates for the selected option")]
        templates: bool,
        #[arg(long, short, help = "Directory to write generated templates into")]
        output: Option<PathBuf>,
        #[arg(long = "no-fallback", help = "Fail instead of using catalog-only results")]
        no_fallback: bool,
        #[arg(long, help = "LLM provider (gemini, openai)")]
        llm: Option<String>,
        #[arg(long, help = "Model to use")]
        model: Option<String>,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Rate a recommendation
    Feedback {
        #[arg(help = "Recommendation id (e.g. rec-1)")]
        recommendation_id: String,
        #[arg(long, short, help = "Rating from 1 to 5")]
        rating: f64,
        #[arg(long, short, help = "Free-text comment")]
        text: Option<String>,
        #[arg(long, help = "Session the recommendation came from")]
        session: Option<String>,
        #[arg(long = "cloud", value_parser = parse_provider, help = "Provider of the rated option")]
        provider: Option<CloudProvider>,
        #[arg(long, help = "Architecture style of the rated option")]
        architecture: Option<String>,
        #[arg(long = "pref", value_parser = parse_preference, help = "Preference adjustment key=value (cost=1.0); repeatable")]
        preferences: Vec<(String, f64)>,
    },

    /// Summarize recorded feedback and learned weights
    Learning {
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json"
        )]
        format: String,
    },

    /// Generate a starter project
    Template {
        #[arg(value_parser = parse_kind, help = "Template kind: react, java")]
        kind: TemplateKind,
        #[arg(long, short, help = "Application name")]
        name: String,
        #[arg(long = "cloud", default_value = "aws", help = "Target provider (aws, azure)")]
        provider: String,
        #[arg(long, short, help = "Output directory")]
        output: PathBuf,
        #[arg(long, value_parser = parse_database, help = "Database for Java services")]
        database: Option<DatabaseType>,
        #[arg(long, help = "Java package name")]
        package: Option<String>,
        #[arg(long, help = "API endpoint the frontend calls")]
        api_endpoint: Option<String>,
        #[arg(long = "no-auth")]
        no_auth: bool,
        #[arg(long = "no-pwa")]
        no_pwa: bool,
        #[arg(long = "no-typescript")]
        no_typescript: bool,
        #[arg(long = "no-cache")]
        no_cache: bool,
        #[arg(long = "no-security")]
        no_security: bool,
        #[arg(long = "no-monitoring")]
        no_monitoring: bool,
    },

    /// Start the HTTP API
    Serve {
        #[arg(long, help = "Bind address")]
        host: Option<String>,
        #[arg(long, short, help = "Port")]
        port: Option<u16>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current configuration (merged from all sources)
    Show {
        #[arg(short = 'g', long, help = "Show global config file only")]
        global: bool,
        #[arg(
            short = 'f',
            long,
            default_value = "text",
            help = "Output format: text, json, yaml"
        )]
        format: String,
    },
    /// Show configuration file paths
    Path,
    /// Initialize configuration
    Init {
        #[arg(long, short, help = "Initialize global config")]
        global: bool,
        #[arg(long, help = "Overwrite existing config")]
        force: bool,
    },
}

/// Set up panic handler for graceful error reporting
fn setup_panic_handler() {
    let default_hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |panic_info| {
        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };

        eprintln!("\n\x1b[1;31m━━━ PANIC ━━━\x1b[0m");
        eprintln!("\x1b[31mArchwright encountered an unexpected error:\x1b[0m");
        eprintln!("  {}", message);

        if let Some(location) = panic_info.location() {
            eprintln!(
                "\x1b[90mLocation: {}:{}:{}\x1b[0m",
                location.file(),
                location.line(),
                location.column()
            );
        }
        eprintln!();

        // Backtrace when RUST_BACKTRACE=1
        default_hook(panic_info);
    }));
}

fn main() -> ExitCode {
    setup_panic_handler();

    match run_cli() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\x1b[31mError:\x1b[0m {}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<&Path>) -> archwright::Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let out = Output::new(cli.quiet);

    match cli.command {
        Commands::Recommend {
            query,
            budget,
            providers,
            architecture,
            templates,
            output,
            no_fallback,
            llm,
            model,
            format,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            commands::apply_llm_overrides(&mut config, llm, model);
            let options = RecommendOptions {
                query,
                budget,
                providers,
                architecture,
                templates: templates || output.is_some(),
                output,
                allow_fallback: !no_fallback,
                json: format == "json",
            };
            let rt = Runtime::new()?;
            rt.block_on(commands::recommend::run(&config, options, &out))?;
        }
        Commands::Feedback {
            recommendation_id,
            rating,
            text,
            session,
            provider,
            architecture,
            preferences,
        } => {
            let config = load_config(cli.config.as_deref())?;
            commands::feedback::run(
                &config,
                FeedbackOptions {
                    recommendation_id,
                    rating,
                    text,
                    session_id: session,
                    provider,
                    architecture,
                    preferences,
                },
                &out,
            )?;
        }
        Commands::Learning { format } => {
            let config = load_config(cli.config.as_deref())?;
            commands::learning::run(&config, format == "json", &out)?;
        }
        Commands::Template {
            kind,
            name,
            provider,
            output,
            database,
            package,
            api_endpoint,
            no_auth,
            no_pwa,
            no_typescript,
            no_cache,
            no_security,
            no_monitoring,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut template = TemplateConfig::new(name, provider, kind);
            template.authentication = !no_auth;
            template.pwa = !no_pwa;
            template.typescript = !no_typescript;
            template.cache = !no_cache;
            template.security = !no_security;
            template.monitoring = !no_monitoring;
            if let Some(database) = database {
                template.database = database;
            }
            if let Some(package) = package {
                template.package_name = package;
            }
            if let Some(endpoint) = api_endpoint {
                template.api_endpoint = endpoint;
            }
            commands::template::run(&config, &template, &output, &out)?;
        }
        Commands::Serve { host, port } => {
            let mut config = load_config(cli.config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            let rt = Runtime::new()?;
            rt.block_on(commands::serve::run(&config, &out))?;
        }
        Commands::Config { action } => match action {
            ConfigAction::Show { global, format } => {
                commands::config::show(global, &format, &out)?;
            }
            ConfigAction::Path => {
                commands::config::path()?;
            }
            ConfigAction::Init { global, force } => {
                commands::config::init(global, force, &out)?;
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_preference() {
        assert_eq!(parse_preference("Cost=1.5").unwrap(), ("cost".to_string(), 1.5));
        assert!(parse_preference("cost").is_err());
        assert!(parse_preference("cost=high").is_err());
        assert!(parse_preference("cost=NaN").is_err());
        assert!(parse_preference("cost=inf").is_err());
    }

    #[test]
    fn test_cli_parses_recommend() {
        let cli = Cli::try_parse_from([
            "archwright",
            "recommend",
            "an online shop with a cache",
            "--cloud",
            "azure",
            "--budget",
            "150",
        ])
        .unwrap();
        match cli.command {
            Commands::Recommend {
                providers, budget, ..
            } => {
                assert_eq!(providers, vec![CloudProvider::Azure]);
                assert_eq!(budget, Some(150.0));
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_kind() {
        let result = Cli::try_parse_from(["archwright", "template", "cobol", "-n", "x", "-o", "out"]);
        assert!(result.is_err());
    }
}
