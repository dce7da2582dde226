//! Command-line interface parsing for the CTA web call tool
//!
//! This module handles parsing of CLI arguments using clap and turns them into
//! the caller, transport, and output settings used at startup.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::cache::ResponseCache;
use crate::transport::{HttpTransport, TransportError};
use crate::web::{CallMode, WebCaller};

/// Error types for CLI argument handling
#[derive(Debug, Error)]
pub enum CliError {
    /// A zero timeout would fail every request immediately
    #[error("Invalid timeout: '{0}'. Timeout must be at least 1 second")]
    InvalidTimeout(u64),

    /// Rendering the JSON report failed
    #[error("Failed to render report: {0}")]
    Report(#[from] serde_json::Error),
}

/// CTA web call - fetch a Bus Tracker response, save it, or replay it offline
#[derive(Parser, Debug)]
#[command(name = "ctaweb")]
#[command(about = "Call the CTA Bus Tracker web service with optional offline replay")]
#[command(version)]
pub struct Cli {
    /// Request URL, including rt= and stpid= parameters followed by '&'
    ///
    /// Example:
    ///   "http://ctabustracker.com/bustime/api/v2/getpredictions?key=KEY&rt=20&stpid=456&format=json"
    #[arg(value_name = "URL")]
    pub url: String,

    /// How to obtain the response: live, save (live and keep a copy), or offline
    #[arg(long, value_enum, default_value_t = CallMode::Live)]
    pub mode: CallMode,

    /// Directory for saved responses (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Give up on live requests after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Print a JSON report instead of the raw response body
    #[arg(long)]
    pub json: bool,
}

/// Output format for the call result
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The response body exactly as received
    #[default]
    Raw,
    /// A [`CallReport`] rendered as JSON
    Json,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone, Default)]
pub struct StartupConfig {
    /// How responses are obtained
    pub mode: CallMode,
    /// Directory for saved responses, if not the current directory
    pub cache_dir: Option<PathBuf>,
    /// Timeout for live requests
    pub timeout: Option<Duration>,
    /// How the result is printed
    pub output: OutputFormat,
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if the timeout is zero
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let timeout = match cli.timeout {
            None => None,
            Some(0) => return Err(CliError::InvalidTimeout(0)),
            Some(secs) => Some(Duration::from_secs(secs)),
        };

        Ok(StartupConfig {
            mode: cli.mode,
            cache_dir: cli.cache_dir.clone(),
            timeout,
            output: if cli.json {
                OutputFormat::Json
            } else {
                OutputFormat::Raw
            },
        })
    }

    /// Builds the web caller for the configured mode and cache directory
    pub fn caller(&self) -> WebCaller {
        let cache = match &self.cache_dir {
            Some(dir) => ResponseCache::with_dir(dir),
            None => ResponseCache::new(),
        };
        WebCaller::with_cache(self.mode, cache)
    }

    /// Builds the live transport with the configured timeout
    pub fn transport(&self) -> Result<HttpTransport, TransportError> {
        HttpTransport::with_timeout(self.timeout)
    }
}

/// Result of one call, as printed by `--json`
#[derive(Debug, Clone, Serialize)]
pub struct CallReport<'a> {
    pub url: &'a str,
    pub mode: CallMode,
    pub success: bool,
    /// Response body, passed through without interpretation
    pub body: Option<&'a str>,
}

/// Renders the text printed to stdout for a call result
pub fn render_output(
    format: OutputFormat,
    report: &CallReport<'_>,
) -> Result<Option<String>, CliError> {
    match format {
        OutputFormat::Raw => Ok(report.body.map(str::to_string)),
        OutputFormat::Json => Ok(Some(serde_json::to_string_pretty(report)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "http://host/api?key=X&rt=20&stpid=456&format=json";

    #[test]
    fn test_cli_parse_url_only() {
        let cli = Cli::parse_from(["ctaweb", URL]);
        assert_eq!(cli.url, URL);
        assert_eq!(cli.mode, CallMode::Live);
        assert!(cli.cache_dir.is_none());
        assert!(cli.timeout.is_none());
        assert!(!cli.json);
    }

    #[test]
    fn test_cli_parse_modes() {
        let cli = Cli::parse_from(["ctaweb", "--mode", "save", URL]);
        assert_eq!(cli.mode, CallMode::LiveAndSave);

        let cli = Cli::parse_from(["ctaweb", "--mode", "offline", URL]);
        assert_eq!(cli.mode, CallMode::Offline);
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        let result = Cli::try_parse_from(["ctaweb", "--mode", "sometimes", URL]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_requires_url() {
        let result = Cli::try_parse_from(["ctaweb"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert_eq!(config.mode, CallMode::Live);
        assert!(config.cache_dir.is_none());
        assert!(config.timeout.is_none());
        assert_eq!(config.output, OutputFormat::Raw);
    }

    #[test]
    fn test_startup_config_from_cli_all_flags() {
        let cli = Cli::parse_from([
            "ctaweb",
            "--mode",
            "offline",
            "--cache-dir",
            "/tmp/cta",
            "--timeout",
            "10",
            "--json",
            URL,
        ]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.mode, CallMode::Offline);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/cta")));
        assert_eq!(config.timeout, Some(Duration::from_secs(10)));
        assert_eq!(config.output, OutputFormat::Json);
    }

    #[test]
    fn test_startup_config_rejects_zero_timeout() {
        let cli = Cli::parse_from(["ctaweb", "--timeout", "0", URL]);
        let err = StartupConfig::from_cli(&cli).unwrap_err();
        assert!(err.to_string().contains("Invalid timeout"));
    }

    #[test]
    fn test_caller_uses_cache_dir() {
        let cli = Cli::parse_from(["ctaweb", "--cache-dir", "/tmp/cta", URL]);
        let caller = StartupConfig::from_cli(&cli).unwrap().caller();
        assert_eq!(caller.cache().dir(), PathBuf::from("/tmp/cta").as_path());
    }

    #[test]
    fn test_render_raw_prints_body_only() {
        let report = CallReport {
            url: URL,
            mode: CallMode::Live,
            success: true,
            body: Some("{\"a\":1}\n"),
        };
        let output = render_output(OutputFormat::Raw, &report).unwrap();
        assert_eq!(output.as_deref(), Some("{\"a\":1}\n"));
    }

    #[test]
    fn test_render_raw_failure_prints_nothing() {
        let report = CallReport {
            url: URL,
            mode: CallMode::Offline,
            success: false,
            body: None,
        };
        assert!(render_output(OutputFormat::Raw, &report).unwrap().is_none());
    }

    #[test]
    fn test_render_json_report() {
        let report = CallReport {
            url: URL,
            mode: CallMode::LiveAndSave,
            success: true,
            body: Some("{\"a\":1}"),
        };
        let output = render_output(OutputFormat::Json, &report).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["mode"], "save");
        assert_eq!(value["success"], true);
        assert_eq!(value["body"], "{\"a\":1}");
        assert_eq!(value["url"], URL);
    }
}
