use anyhow::{Context, bail};
use city_prices_core::{
    Config, ConfigError, FetchError, Overrides, Settings, config::API_KEY_ENV, fetch, render,
    render_json,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use inquire::{Password, PasswordDisplayMode};
use std::{
    fmt,
    path::{Path, PathBuf},
    process::ExitCode,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "city-prices",
    version,
    about = "Fetch and display Numbeo city prices",
    subcommand_negates_reqs = true,
    after_help = "Environment Variables:\n  NUMBEO_API_KEY    Your Numbeo API key (alternative to --api-key)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    #[command(flatten)]
    pub lookup: LookupArgs,

    /// Config file path. Defaults to the platform config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print debug logs to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a Numbeo API key in the config file.
    Configure,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// City name, e.g. "San Francisco, CA".
    #[arg(long, required = true)]
    pub city: Option<String>,

    /// Country name, e.g. "United States".
    #[arg(long, required = true)]
    pub country: Option<String>,

    /// Numbeo API key (or set NUMBEO_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    /// Provider API root.
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Request timeout in seconds (default 30).
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

impl LookupArgs {
    fn overrides(self) -> Overrides {
        Overrides {
            city: self.city.unwrap_or_default(),
            country: self.country.unwrap_or_default(),
            api_key: self.api_key,
            base_url: self.base_url,
            timeout_secs: self.timeout,
        }
    }
}

/// Why a run failed; decides the exit code.
#[derive(Debug)]
enum Failure {
    Usage(anyhow::Error),
    Fetch(FetchError),
}

impl Failure {
    fn exit_code(&self) -> u8 {
        match self {
            Failure::Usage(_) => 1,
            Failure::Fetch(FetchError::Auth(_)) => 2,
            Failure::Fetch(FetchError::NotFound(_)) => 3,
            Failure::Fetch(FetchError::Network(_)) => 4,
            Failure::Fetch(FetchError::Parse(_)) => 5,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Failure::Usage(e) => write!(f, "{e:#}"),
            Failure::Fetch(e) => write!(f, "{e}"),
        }
    }
}

impl From<anyhow::Error> for Failure {
    fn from(e: anyhow::Error) -> Self {
        Failure::Usage(e)
    }
}

impl From<ConfigError> for Failure {
    fn from(e: ConfigError) -> Self {
        Failure::Usage(e.into())
    }
}

impl From<FetchError> for Failure {
    fn from(e: FetchError) -> Self {
        Failure::Fetch(e)
    }
}

impl Cli {
    pub async fn run(self) -> ExitCode {
        let outcome = match self.command {
            Some(Command::Configure) => configure(self.config.as_deref()).map_err(Failure::from),
            None => show(self.lookup, self.config.as_deref()).await,
        };

        match outcome {
            Ok(()) => ExitCode::SUCCESS,
            Err(failure) => {
                tracing::debug!(?failure, "run failed");
                eprintln!("error: {failure}");
                ExitCode::from(failure.exit_code())
            }
        }
    }
}

async fn show(lookup: LookupArgs, config_path: Option<&Path>) -> Result<(), Failure> {
    let format = lookup.format;
    let file = load_config(config_path)?;
    let settings = Settings::resolve(lookup.overrides(), std::env::var(API_KEY_ENV).ok(), &file)?;
    let query = &settings.query;

    tracing::info!("Fetching price data for {}, {}...", query.city, query.country);
    let mut report = fetch(query, &settings.base_url, settings.timeout).await?;

    report.city.get_or_insert_with(|| query.city.clone());
    report.country.get_or_insert_with(|| query.country.clone());

    match format {
        OutputFormat::Text => print!("{}", render(&report)),
        OutputFormat::Json => {
            println!("{}", render_json(&report).context("Failed to serialize report to JSON")?)
        }
    }

    Ok(())
}

fn configure(config_path: Option<&Path>) -> anyhow::Result<()> {
    let mut cfg = load_config(config_path)?;

    let key = Password::new("Numbeo API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }
    cfg.set_api_key(key.to_string());

    let path = match config_path {
        Some(path) => {
            cfg.save_to(path)?;
            path.to_path_buf()
        }
        None => cfg.save()?,
    };

    println!("Saved API key to {}", path.display());
    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
