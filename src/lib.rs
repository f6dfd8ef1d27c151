//! terceirizados-cli library
//!
//! This crate provides the core functionality for the `terceirizados-cli` binary.
//! Keep the crate root minimal — implementation and tests live in their modules.
//!
//! ## Overview
//!
//! The library is organized into modules that handle different aspects of
//! fetching the monthly terceirizados data file from the CGU open data portal:
//!
//! - [`downloader`] - Period parsing, candidate discovery on the paginated
//!   listing, latest-version resolution via metadata probes, and the
//!   retrying file download
//! - [`http`] - Shared HTTP client and the transport-level retry layer
//! - [`cli`] - Command-line interface orchestrating a discovery + download run
//! - [`config`] - Resolved defaults and the TOML configuration loader
//! - [`models`] - Data structures for periods, resolved versions and downloads
//! - [`errors`] - Error types used throughout the application
//!
//! ## Example Usage
//!
//! The typical workflow parses a human-entered period, discovers candidate
//! files, resolves the most recently modified one, and downloads it:
//!
//! ```no_run
//! use terceirizados_cli::{config::ResolvedConfig, downloader, errors::AppResult, http};
//!
//! # async fn example() -> AppResult<()> {
//! let client = http::build_client()?;
//! let config = ResolvedConfig::default();
//!
//! let period = downloader::parse_period("março 2024");
//! let candidates = downloader::discover(&client, &config, &period).await?;
//! if let Some(version) = downloader::resolve(&client, &config, &candidates).await? {
//!     downloader::download_with_retry(&client, &config, &version.link).await?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod downloader;
pub mod errors;
pub mod http;
pub mod models;
pub mod ui;
pub mod utils;
