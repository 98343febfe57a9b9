use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod analyze;
mod config;
mod report;
mod state;

use config::{init_config_at, load_config_from, resolve_config_path};

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("EXTRACTO_BUILD_SHA"), ")");

#[derive(Parser, Debug)]
#[command(
    name = "extracto",
    version,
    long_version = LONG_VERSION,
    about = "Categorize bank statements and summarize sales, costs and margin"
)]
struct Cli {
    /// Config file (default: ~/.extracto/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (overrides RUST_LOG and the config level)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement, apply corrections and print the review
    Analyze(analyze::AnalyzeArgs),

    /// List the category rules in the order they are tried
    Rules {
        /// Show which rule decides this concept instead
        #[arg(long)]
        explain: Option<String>,

        /// Amount used with --explain
        #[arg(long, default_value_t = -1.0, allow_hyphen_values = true)]
        amount: f64,
    },

    /// Configuration file commands
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config file unless one exists
    Init,
    /// Print the effective configuration
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config.as_deref())?;
    let cfg = load_config_from(&config_path)?;
    init_logging(&cfg.log.level, cli.verbose);
    tracing::debug!("config: {}", config_path.display());

    match cli.command {
        Command::Analyze(args) => analyze::run(args, &cfg)?,

        Command::Rules { explain, amount } => {
            let rules = cfg.rule_set()?;
            match explain {
                Some(concept) => match rules.explain(&concept, amount) {
                    Some(m) => println!(
                        "{} ({}) via {}",
                        m.category.label(),
                        m.category.token(),
                        m.pattern.map_or("positive amount".to_string(), |p| format!("'{p}'"))
                    ),
                    None => println!("no rule matches; needs a manual category"),
                },
                None => print!("{}", report::render_rules(&rules)),
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                init_config_at(&config_path)?;
            }
            ConfigCommand::Show => {
                println!("# {}", config_path.display());
                print!(
                    "{}",
                    toml::to_string_pretty(&cfg).context("serialize config")?
                );
            }
        },
    }

    Ok(())
}

/// RUST_LOG wins over the config level; `-v` forces debug.
fn init_logging(level: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
