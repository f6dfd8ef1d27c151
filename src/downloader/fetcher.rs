use super::resolver::download_url;
use crate::config::ResolvedConfig;
use crate::constants::VIEW_SUFFIX;
use crate::errors::{AppError, AppResult};
use crate::http::{self, TransportRetry};
use crate::models::{DownloadResult, FileKind};
use crate::ui;
use reqwest::{Client, Method};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Derives the local filename from a listing link: the final path segment
/// with the `/view` suffix stripped.
pub(crate) fn derive_filename(link: &str) -> String {
    link.replace(VIEW_SUFFIX, "")
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Downloads the resolved file, retrying dropped connections.
///
/// The body is streamed to a `.part` file and atomically renamed into place
/// on completion, so the destination only ever holds a complete stream. Each
/// attempt restarts from byte zero; there is no partial resume.
///
/// Only connection-interrupted failures (failed connects and mid-body stream
/// drops) are retried, up to `max_attempts` with a fixed delay between
/// attempts. An HTTP error status surfaces immediately via the status check
/// and is not retried by this loop; rate-limiting statuses were already
/// retried underneath by the transport layer.
///
/// # Errors
///
/// - `UnsupportedFileType` if the derived filename is not `.csv`/`.xlsx`,
///   checked before any bytes move
/// - `DownloadExhausted` after the attempt budget is spent
/// - `NetworkError`/`IoError` for non-retryable failures
pub async fn download_with_retry(
    client: &Client,
    config: &ResolvedConfig,
    link: &str,
) -> AppResult<DownloadResult> {
    let target = download_url(link);
    let filename = derive_filename(link);
    let kind = FileKind::from_filename(&filename)?;

    if !config.download_dir.exists() {
        fs::create_dir_all(&config.download_dir)
            .await
            .map_err(|e| AppError::IoError(format!("Failed to create download directory: {e}")))?;
    }

    let file_path = config.download_dir.join(&filename);
    let tmp_path = config.download_dir.join(format!("{filename}.part"));

    let policy = TransportRetry::from_config(config);
    let timeout = Duration::from_secs(config.download_timeout_secs);

    for attempt in 1..=config.max_attempts {
        info!(
            filename = %filename,
            kind = kind.display_name(),
            attempt = attempt,
            max_attempts = config.max_attempts,
            "Downloading file"
        );

        match stream_to_file(client, &target, &tmp_path, &file_path, timeout, &policy).await {
            Ok(bytes) => {
                info!(filename = %filename, bytes = bytes, "Download completed");
                return Ok(DownloadResult {
                    path: file_path,
                    bytes,
                });
            }
            Err(AppError::ConnectionInterrupted(msg)) => {
                warn!(
                    filename = %filename,
                    attempt = attempt,
                    error = %msg,
                    "Connection interrupted, waiting before next attempt"
                );
                tokio::time::sleep(Duration::from_secs(config.retry_delay_secs)).await;
            }
            Err(e) => return Err(e),
        }
    }

    // Leave no stale partial file behind (best-effort)
    if tmp_path.exists() {
        if let Err(e) = fs::remove_file(&tmp_path).await {
            warn!(
                file_path = %tmp_path.display(),
                error = %e,
                "Failed to remove stale temp file"
            );
        }
    }

    Err(AppError::DownloadExhausted {
        filename,
        attempts: config.max_attempts,
    })
}

/// Performs one download attempt: request, stream to temp file, atomic rename.
async fn stream_to_file(
    client: &Client,
    url: &str,
    tmp_path: &Path,
    file_path: &Path,
    timeout: Duration,
    policy: &TransportRetry,
) -> AppResult<u64> {
    let response = http::send_with_retry(client, Method::GET, url, timeout, policy).await?;

    let status = response.status();
    let mut response = response.error_for_status().map_err(|e| {
        AppError::NetworkError(format!("HTTP {}: download request failed: {e}", status.as_u16()))
    })?;

    let pb = ui::create_download_bar(response.content_length())?;

    let mut file = File::create(tmp_path).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to create temp file {}: {}",
            tmp_path.display(),
            e
        ))
    })?;

    let mut bytes: u64 = 0;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                file.write_all(&chunk).await.map_err(|e| {
                    AppError::IoError(format!(
                        "Failed to write to temp file {}: {}",
                        tmp_path.display(),
                        e
                    ))
                })?;
                bytes += chunk.len() as u64;
                pb.set_position(bytes);
            }
            Ok(None) => break,
            Err(e) => {
                // The transport layer cannot retry a body that is already
                // partially consumed; classify for the outer retry loop.
                pb.abandon();
                return Err(AppError::ConnectionInterrupted(format!(
                    "Stream from {url} dropped after {bytes} bytes: {e}"
                )));
            }
        }
    }

    pb.finish_and_clear();

    file.flush().await.map_err(|e| {
        AppError::IoError(format!("Failed to flush {}: {}", tmp_path.display(), e))
    })?;

    // Ensure the file is closed before renaming
    drop(file);

    // Atomically move the temp file to the final destination
    fs::rename(tmp_path, file_path).await.map_err(|e| {
        AppError::IoError(format!(
            "Failed to rename temp file {} to {}: {}",
            tmp_path.display(),
            file_path.display(),
            e
        ))
    })?;

    Ok(bytes)
}
