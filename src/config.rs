use crate::constants::{BASE_URL, PAGE_SIZE};
use crate::errors::{AppError, AppResult};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved configuration with all values filled in (no Options).
///
/// This struct represents the pipeline defaults and can be deserialized by the TOML
/// loader. All fields have concrete values, making it safe to access directly without unwrapping.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolvedConfig {
    /// Listing endpoint to paginate for candidate files
    pub base_url: String,
    /// Directory for the downloaded data file
    pub download_dir: PathBuf,

    // Discovery
    /// Number of listing entries per page request
    pub page_size: usize,
    /// Politeness delay between listing page fetches, in milliseconds
    pub page_delay_ms: u64,

    // Resolution
    /// Number of metadata probes in flight at once
    pub probe_concurrency: usize,

    // Download retry loop (mid-stream interruptions)
    /// Maximum download attempts before giving up
    pub max_attempts: u32,
    /// Fixed delay between download attempts, in seconds
    pub retry_delay_secs: u64,

    // Transport-level retry (429/500/502/503/504 and failed sends)
    /// Retries per request at the transport layer
    pub transport_max_retries: u32,
    /// Initial backoff delay in milliseconds before the first transport retry
    pub transport_initial_delay_ms: u64,
    /// Maximum backoff delay in milliseconds between transport retries
    pub transport_max_delay_ms: u64,

    // Per-request timeouts
    /// Timeout for a listing page request, in seconds
    pub listing_timeout_secs: u64,
    /// Timeout for a metadata probe, in seconds
    pub probe_timeout_secs: u64,
    /// Timeout for the download request, in seconds
    pub download_timeout_secs: u64,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
            download_dir: PathBuf::from("downloads"),
            page_size: PAGE_SIZE,
            page_delay_ms: 500,
            probe_concurrency: 4,
            max_attempts: 3,
            retry_delay_secs: 5,
            transport_max_retries: 5,
            transport_initial_delay_ms: 3000,
            transport_max_delay_ms: 60_000,
            listing_timeout_secs: 30,
            probe_timeout_secs: 20,
            download_timeout_secs: 120,
        }
    }
}

/// Configuration that can be loaded from a TOML file.
///
/// Deserializes the required period field and optional pipeline configuration.
/// The parser rejects unknown keys to catch typos, and validates that the
/// pagination and retry knobs are positive.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResolvedConfigFile {
    /// Free-form period of the file to fetch, e.g. `"março 2024"` or `"03/2024"`
    pub period: String,
    /// Flattened resolved configuration with pipeline defaults
    #[serde(flatten)]
    pub resolved: ResolvedConfig,
}

impl ResolvedConfigFile {
    /// Loads and validates configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the TOML is malformed, the period is missing
    /// or empty, unknown keys are present, or page_size/probe_concurrency/
    /// max_attempts are not positive.
    pub fn from_toml_file(path: &Path) -> AppResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: ResolvedConfigFile = toml::from_str(&contents)
            .map_err(|e| AppError::InvalidInput(format!("Failed to parse config: {e}")))?;

        if config.period.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Period must not be empty".into(),
            ));
        }
        if config.resolved.page_size == 0 {
            return Err(AppError::InvalidInput(
                "Page size must be greater than 0".into(),
            ));
        }
        if config.resolved.probe_concurrency == 0 {
            return Err(AppError::InvalidInput(
                "Probe concurrency must be greater than 0".into(),
            ));
        }
        if config.resolved.max_attempts == 0 {
            return Err(AppError::InvalidInput(
                "Max attempts must be greater than 0".into(),
            ));
        }

        Ok(config)
    }
}
