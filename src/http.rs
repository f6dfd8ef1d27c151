//! HTTP transport layer shared by discovery, resolution and download.
//!
//! Every request goes through [`send_with_retry`], which transparently retries
//! rate-limiting and server-error statuses with exponential backoff. This layer
//! is independent of the fetcher's own retry loop: the fetcher only re-runs a
//! download whose connection dropped mid-stream, which the transport cannot
//! retry because part of the body was already consumed.

use crate::config::ResolvedConfig;
use crate::constants::{RETRYABLE_STATUS_CODES, USER_AGENT};
use crate::errors::{AppError, AppResult};
use reqwest::{Client, Method, Response, StatusCode};
use std::time::Duration;
use tracing::warn;

/// Builds the HTTP client used for every request.
///
/// The portal requires a browser user-agent; redirects are followed with
/// reqwest's default policy (the download endpoint redirects to the blob).
pub fn build_client() -> AppResult<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| AppError::NetworkError(format!("Failed to build HTTP client: {e}")))
}

/// Transport-level retry policy applied beneath every request.
pub(crate) struct TransportRetry {
    max_retries: u32,
    initial_delay_ms: u64,
    max_delay_ms: u64,
}

impl TransportRetry {
    pub(crate) fn from_config(config: &ResolvedConfig) -> Self {
        Self {
            max_retries: config.transport_max_retries,
            initial_delay_ms: config.transport_initial_delay_ms,
            max_delay_ms: config.transport_max_delay_ms,
        }
    }
}

/// Calculates exponential backoff delay in milliseconds.
///
/// Formula: `min(initial_delay * 2^attempt, max_delay)`
fn calculate_backoff(attempt: u32, policy: &TransportRetry) -> u64 {
    let delay = policy
        .initial_delay_ms
        .saturating_mul(2_u64.saturating_pow(attempt));
    delay.min(policy.max_delay_ms)
}

fn is_retryable_status(status: StatusCode) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status.as_u16())
}

/// Maps a send-stage reqwest error to the application error space.
///
/// Connect failures are classified as interruptions so the fetcher's retry
/// loop can recognize them; everything else (timeouts included) is a plain
/// network error and is not retried above this layer.
pub(crate) fn classify_send_error(url: &str, err: &reqwest::Error) -> AppError {
    if err.is_connect() {
        AppError::ConnectionInterrupted(format!("Failed to connect to {url}: {err}"))
    } else {
        AppError::NetworkError(format!("Request to {url} failed: {err}"))
    }
}

/// Sends a request, retrying retryable statuses and failed sends with
/// exponential backoff.
///
/// Non-retryable statuses (404, 403, ...) are returned untouched so callers
/// can apply their own status handling. After the retry budget is spent, a
/// retryable status is also returned as-is; a send failure becomes an error.
pub(crate) async fn send_with_retry(
    client: &Client,
    method: Method,
    url: &str,
    timeout: Duration,
    policy: &TransportRetry,
) -> AppResult<Response> {
    let mut last_error: Option<AppError> = None;

    for attempt in 0..=policy.max_retries {
        let result = client
            .request(method.clone(), url)
            .timeout(timeout)
            .send()
            .await;

        match result {
            Ok(response) => {
                if is_retryable_status(response.status()) && attempt < policy.max_retries {
                    let delay_ms = calculate_backoff(attempt, policy);
                    warn!(
                        url = url,
                        status = response.status().as_u16(),
                        attempt = attempt + 1,
                        delay_ms = delay_ms,
                        "Server busy, retrying request"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    continue;
                }
                return Ok(response);
            }
            Err(e) => {
                let mapped = classify_send_error(url, &e);
                if attempt < policy.max_retries {
                    let delay_ms = calculate_backoff(attempt, policy);
                    warn!(
                        url = url,
                        attempt = attempt + 1,
                        delay_ms = delay_ms,
                        error = %mapped,
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    last_error = Some(mapped);
                    continue;
                }
                return Err(mapped);
            }
        }
    }

    Err(last_error.unwrap_or_else(|| {
        AppError::NetworkError(format!(
            "Request to {url} failed after {} retries (no error recorded)",
            policy.max_retries + 1
        ))
    }))
}
