//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroU32, path::PathBuf, str::FromStr, time::Duration};

use clap::{Args, Parser, Subcommand, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "vetrina";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_PAGE_SIZE: u32 = 10;
const DEFAULT_DEBOUNCE_MS: u64 = 500;
const DEFAULT_FRESHNESS_SECS: u64 = 5 * 60;
const DEFAULT_CACHE_PAGE_LIMIT: usize = 64;

/// Command-line arguments for the Vetrina binary.
#[derive(Debug, Parser)]
#[command(name = "vetrina", version, about = "Vetrina admin list console")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "VETRINA_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Fetch and print one page of a resource list.
    List(Box<ListArgs>),
}

#[derive(Debug, Args, Clone)]
pub struct ListArgs {
    #[command(flatten)]
    pub overrides: ListOverrides,

    /// Resource to list (category|sponsor|blog|donor).
    #[arg(value_name = "RESOURCE")]
    pub resource: String,

    /// Search term applied server-side.
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// 1-based page to display.
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Print rows as JSON instead of a table.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    pub json: bool,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ListOverrides {
    /// Override the backend base URL.
    #[arg(
        long = "api-base-url",
        env = "VETRINA_API_BASE_URL",
        value_name = "URL"
    )]
    pub api_base_url: Option<String>,

    /// Override the bearer token sent to the backend.
    #[arg(long = "api-token", env = "VETRINA_API_TOKEN", value_name = "TOKEN")]
    pub api_token: Option<String>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the server-driven page size.
    #[arg(long = "list-page-size", value_name = "ROWS")]
    pub page_size: Option<u32>,

    /// Override the search debounce quiet period.
    #[arg(long = "list-debounce-ms", value_name = "MILLIS")]
    pub debounce_ms: Option<u64>,

    /// Override the cache freshness window.
    #[arg(long = "list-freshness-seconds", value_name = "SECONDS")]
    pub freshness_secs: Option<u64>,

    /// Override the number of cached pages kept per resource.
    #[arg(long = "list-cache-page-limit", value_name = "COUNT")]
    pub cache_page_limit: Option<usize>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub api: ApiSettings,
    pub logging: LoggingSettings,
    pub list: ListSettings,
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub token: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct ListSettings {
    pub page_size: NonZeroU32,
    pub debounce: Duration,
    pub freshness_secs: u64,
    pub cache_page_limit: usize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Parse the command line and load settings in one step.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let cli = CliArgs::parse();
    let settings = load(&cli)?;
    Ok((cli, settings))
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("VETRINA").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    match cli.command.as_ref() {
        Some(Command::List(args)) => raw.apply_list_overrides(&args.overrides),
        None => raw.apply_list_overrides(&ListOverrides::default()),
    }

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    api: RawApiSettings,
    logging: RawLoggingSettings,
    list: RawListSettings,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawApiSettings {
    base_url: Option<String>,
    token: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawListSettings {
    page_size: Option<u32>,
    debounce_ms: Option<u64>,
    freshness_secs: Option<u64>,
    cache_page_limit: Option<usize>,
}

impl RawSettings {
    fn apply_list_overrides(&mut self, overrides: &ListOverrides) {
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.api.base_url = Some(url.clone());
        }
        if let Some(token) = overrides.api_token.as_ref() {
            self.api.token = Some(token.clone());
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
        if let Some(size) = overrides.page_size {
            self.list.page_size = Some(size);
        }
        if let Some(millis) = overrides.debounce_ms {
            self.list.debounce_ms = Some(millis);
        }
        if let Some(seconds) = overrides.freshness_secs {
            self.list.freshness_secs = Some(seconds);
        }
        if let Some(limit) = overrides.cache_page_limit {
            self.list.cache_page_limit = Some(limit);
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings { api, logging, list } = raw;

        let api = build_api_settings(api)?;
        let logging = build_logging_settings(logging)?;
        let list = build_list_settings(list)?;

        Ok(Self { api, logging, list })
    }
}

fn build_api_settings(api: RawApiSettings) -> Result<ApiSettings, LoadError> {
    let raw_url = api
        .base_url
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
    let base_url = Url::parse(&raw_url)
        .map_err(|err| LoadError::invalid("api.base_url", format!("failed to parse: {err}")))?;

    let token = api.token.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    });

    Ok(ApiSettings { base_url, token })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_list_settings(list: RawListSettings) -> Result<ListSettings, LoadError> {
    let page_size = list.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    let page_size = NonZeroU32::new(page_size)
        .ok_or_else(|| LoadError::invalid("list.page_size", "must be greater than zero"))?;

    let debounce_ms = list.debounce_ms.unwrap_or(DEFAULT_DEBOUNCE_MS);
    if debounce_ms == 0 {
        return Err(LoadError::invalid(
            "list.debounce_ms",
            "must be greater than zero",
        ));
    }

    let freshness_secs = list.freshness_secs.unwrap_or(DEFAULT_FRESHNESS_SECS);
    if freshness_secs == 0 {
        return Err(LoadError::invalid(
            "list.freshness_secs",
            "must be greater than zero",
        ));
    }

    Ok(ListSettings {
        page_size,
        debounce: Duration::from_millis(debounce_ms),
        freshness_secs,
        cache_page_limit: list.cache_page_limit.unwrap_or(DEFAULT_CACHE_PAGE_LIMIT),
    })
}
