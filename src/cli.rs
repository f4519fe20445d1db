//! Command-line interface parsing for shopgrid
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a validated [`StartupConfig`].

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use reqwest::Url;
use thiserror::Error;

use crate::data::DEFAULT_ENDPOINT;
use crate::query::QueryOptions;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// The endpoint is not a valid URL
    #[error("Invalid endpoint '{url}': {reason}")]
    InvalidEndpoint {
        /// Endpoint as given
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

/// shopgrid - Browse a product catalog and search it by title
#[derive(Parser, Debug)]
#[command(name = "shopgrid")]
#[command(about = "Browse a product catalog in the terminal and search it by title")]
#[command(version)]
pub struct Cli {
    /// Catalog endpoint returning a JSON array of products
    #[arg(long, env = "SHOPGRID_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,

    /// Search term to start with
    #[arg(long, value_name = "TERM")]
    pub search: Option<String>,

    /// Seconds a fetched catalog stays fresh before it is refetched
    #[arg(long, value_name = "SECS", default_value_t = 300)]
    pub stale_secs: u64,

    /// Retries after a failed fetch
    #[arg(long, value_name = "N", default_value_t = 3)]
    pub retries: u32,

    /// Log filter, e.g. `info` or `shopgrid=debug`
    #[arg(long, env = "SHOPGRID_LOG", default_value = "info")]
    pub log_level: String,

    /// Log file path (defaults to the platform data directory)
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Catalog URL to fetch, already validated
    pub endpoint: String,
    /// Search term applied when the view mounts
    pub initial_search: Option<String>,
    /// Cache and retry behaviour of the query layer
    pub query_options: QueryOptions,
    /// Log filter directive
    pub log_level: String,
    /// Explicit log file, if any
    pub log_file: Option<PathBuf>,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            initial_search: None,
            query_options: QueryOptions::default(),
            log_level: "info".to_string(),
            log_file: None,
        }
    }
}

/// Parses and checks an endpoint argument.
///
/// # Returns
/// * `Ok(Url)` for absolute `http`/`https` URLs
/// * `Err(CliError::InvalidEndpoint)` otherwise
pub fn parse_endpoint_arg(s: &str) -> Result<Url, CliError> {
    let url = Url::parse(s).map_err(|e| CliError::InvalidEndpoint {
        url: s.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(CliError::InvalidEndpoint {
            url: s.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the endpoint is invalid
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let endpoint = parse_endpoint_arg(&cli.endpoint)?.to_string();
        let initial_search = cli.search.clone().filter(|term| !term.is_empty());

        Ok(StartupConfig {
            endpoint,
            initial_search,
            query_options: QueryOptions {
                stale_time: Duration::from_secs(cli.stale_secs),
                retry: cli.retries,
                ..QueryOptions::default()
            },
            log_level: cli.log_level.clone(),
            log_file: cli.log_file.clone(),
        })
    }
}
