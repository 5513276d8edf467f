use advisory_pin::{
    config::Config,
    manifest::apply_pin,
    model::Severity,
    output::{print_report, OutputFormat, Report},
    resolver,
    source::{AdvisorySource, FileAdvisorySource, GithubAdvisorySource},
    workflow::{branch_name, repo_slug},
    Error,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Exit codes for the calling driver
mod exit_codes {
    pub const SUCCESS: u8 = 0;
    pub const ERROR: u8 = 1;
    pub const NO_CANDIDATE: u8 = 2;
}

#[derive(Parser)]
#[command(name = "advisory-pin")]
#[command(
    author,
    version,
    about = "Pick a security advisory for an ecosystem and pin the affected package"
)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select an advisory and print the resolved pin
    Select {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Pin a package to a version in a checkout's requirements.txt
    Pin {
        /// Checkout to search for a requirements manifest
        #[arg(long)]
        repo_root: PathBuf,

        /// Package name
        #[arg(long)]
        package: String,

        /// Version to pin
        #[arg(long = "pin-version")]
        version: String,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Select an advisory and pin it in a checkout
    Run {
        #[command(flatten)]
        resolve: ResolveArgs,

        /// Checkout to search for a requirements manifest
        #[arg(long)]
        repo_root: PathBuf,

        /// Clone URL of the target repository, reported as owner/repo
        #[arg(long)]
        repo_url: Option<String>,

        /// Prefix for the generated branch name
        #[arg(long)]
        branch_prefix: Option<String>,

        /// Output format (table, json)
        #[arg(short, long)]
        format: Option<String>,
    },

    /// Show or create config file
    Config {
        /// Generate default config file
        #[arg(long)]
        init: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },
}

#[derive(Args)]
struct ResolveArgs {
    /// Package ecosystem to query (e.g. pip)
    #[arg(short, long)]
    ecosystem: Option<String>,

    /// Advisory severity (low, medium, high, critical)
    #[arg(short, long)]
    severity: Option<String>,

    /// Number of leading advisories to draw the start index from
    #[arg(long)]
    window: Option<usize>,

    /// Read advisories from a JSON file instead of the GitHub API
    #[arg(long)]
    advisories: Option<PathBuf>,

    /// GitHub token for the advisory API
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

impl ResolveArgs {
    fn apply(&self, config: &mut Config) -> Result<()> {
        if let Some(ecosystem) = &self.ecosystem {
            config.ecosystem = ecosystem.clone();
        }
        if let Some(severity) = &self.severity {
            config.severity = Severity::from_str(severity).map_err(|e| anyhow::anyhow!(e))?;
        }
        if let Some(window) = self.window {
            config.sample_window = window;
        }
        if self.token.is_some() {
            config.token = self.token.clone();
        }
        Ok(())
    }

    fn source(&self, config: &Config) -> Result<Box<dyn AdvisorySource>> {
        let source: Box<dyn AdvisorySource> = match &self.advisories {
            Some(path) => Box::new(FileAdvisorySource::new(path)),
            None => Box::new(GithubAdvisorySource::from_config(config)?),
        };
        Ok(source)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            match e.downcast_ref::<Error>() {
                Some(Error::NoCandidateFound { .. }) => ExitCode::from(exit_codes::NO_CANDIDATE),
                _ => ExitCode::from(exit_codes::ERROR),
            }
        }
    }
}

async fn run() -> Result<u8> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_level.to_string()),
        ))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);
    let mut config = Config::load_from(&config_path)?;

    match cli.command {
        Commands::Select { resolve, format } => {
            resolve.apply(&mut config)?;
            let format = parse_format(format, &config)?;

            let selection = resolve_pin(&resolve, &config, format).await?;
            let report = Report {
                selection: Some(selection),
                ..Report::default()
            };
            print_report(&report, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Pin {
            repo_root,
            package,
            version,
            format,
        } => {
            let format = parse_format(format, &config)?;
            let outcome = apply_pin(&repo_root, &package, &version)
                .with_context(|| format!("Failed to pin {} in {}", package, repo_root.display()))?;

            let report = Report {
                pin: Some(outcome),
                ..Report::default()
            };
            print_report(&report, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Run {
            resolve,
            repo_root,
            repo_url,
            branch_prefix,
            format,
        } => {
            resolve.apply(&mut config)?;
            let format = parse_format(format, &config)?;

            let repository = repo_url
                .as_deref()
                .map(repo_slug)
                .transpose()?
                .map(|(owner, repo)| format!("{}/{}", owner, repo));

            let selection = resolve_pin(&resolve, &config, format).await?;
            let outcome = apply_pin(&repo_root, &selection.package_name, &selection.version)?;

            let report = Report {
                selection: Some(selection),
                pin: Some(outcome),
                repository,
                branch: branch_prefix.map(|prefix| branch_name(&prefix, &chrono::Local::now())),
            };
            print_report(&report, format)?;
            Ok(exit_codes::SUCCESS)
        }
        Commands::Config { init, path } => {
            handle_config(&config_path, init, path)?;
            Ok(exit_codes::SUCCESS)
        }
    }
}

async fn resolve_pin(
    args: &ResolveArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<advisory_pin::SelectionResult> {
    let source = args.source(config)?;

    let progress = if format == OutputFormat::Table {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message(format!("Fetching {} advisories...", config.ecosystem));
        Some(pb)
    } else {
        None
    };

    let result = resolver::resolve(source.as_ref(), config).await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    Ok(result?)
}

fn parse_format(format: Option<String>, config: &Config) -> Result<OutputFormat> {
    let format = format.unwrap_or_else(|| config.default_format.clone());
    OutputFormat::from_str(&format).map_err(|e| anyhow::anyhow!(e))
}

fn handle_config(config_path: &Path, init: bool, show_path: bool) -> Result<()> {
    if show_path {
        println!("{}", config_path.display());
        return Ok(());
    }

    if init {
        if config_path.exists() {
            println!("Config file already exists at: {}", config_path.display());
            return Ok(());
        }

        Config::default().save_to(config_path)?;
        println!("Created config file at: {}", config_path.display());
        println!();
        println!("Default configuration:");
        println!("{}", Config::generate_default_config());
        return Ok(());
    }

    if config_path.exists() {
        let content = std::fs::read_to_string(config_path)?;
        println!("Config file: {}", config_path.display());
        println!();
        println!("{}", content);
    } else {
        println!("No config file found.");
        println!("Run 'advisory-pin config --init' to create one.");
        println!();
        println!("Config path: {}", config_path.display());
    }

    Ok(())
}
