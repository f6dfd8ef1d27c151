use crate::config::ResolvedConfig;
use crate::constants::{DOWNLOAD_SUFFIX, LAST_MODIFIED_FORMAT, VIEW_SUFFIX};
use crate::errors::AppResult;
use crate::http::{self, TransportRetry};
use crate::models::ResolvedVersion;
use chrono::NaiveDateTime;
use futures::stream::{self, StreamExt};
use reqwest::{header, Client, Method};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Rewrites a listing link to the portal's direct-download endpoint.
///
/// The listing serves an HTML preview at `/view`; metadata and file bytes
/// live behind the download endpoint, so both the resolver and the fetcher
/// apply this rewrite.
pub(crate) fn download_url(link: &str) -> String {
    link.replace(VIEW_SUFFIX, DOWNLOAD_SUFFIX)
}

/// Selects the authoritative latest version among the candidates.
///
/// Each candidate's download endpoint is probed with a HEAD request (redirects
/// followed) and its `Last-Modified` header is parsed. Probes run with bounded
/// concurrency and are joined in input order, so selection behaves exactly as
/// a sequential scan over the candidate list.
///
/// Returns `Ok(None)` only for an empty candidate list; no probe is issued in
/// that case. A failed probe or a missing/unparseable header never aborts
/// resolution, it only removes that candidate from the timestamp comparison.
pub async fn resolve(
    client: &Client,
    config: &ResolvedConfig,
    candidates: &[String],
) -> AppResult<Option<ResolvedVersion>> {
    if candidates.is_empty() {
        return Ok(None);
    }

    info!(candidates = candidates.len(), "Probing candidate metadata");

    let policy = TransportRetry::from_config(config);
    let timeout = Duration::from_secs(config.probe_timeout_secs);

    let timestamps: Vec<Option<NaiveDateTime>> = stream::iter(candidates.iter())
        .map(|link| probe_last_modified(client, link, timeout, &policy))
        .buffered(config.probe_concurrency)
        .collect()
        .await;

    let selected = select_latest(candidates, &timestamps);
    if let Some(version) = &selected {
        info!(
            link = %version.link,
            last_modified = ?version.last_modified,
            "Latest version identified"
        );
    }
    Ok(selected)
}

/// Probes one candidate and returns its parsed `Last-Modified`, if any.
async fn probe_last_modified(
    client: &Client,
    link: &str,
    timeout: Duration,
    policy: &TransportRetry,
) -> Option<NaiveDateTime> {
    let target = download_url(link);

    let response = match http::send_with_retry(client, Method::HEAD, &target, timeout, policy).await
    {
        Ok(response) => response,
        Err(e) => {
            warn!(link = link, error = %e, "Metadata probe failed, skipping candidate");
            return None;
        }
    };

    let header_value = response
        .headers()
        .get(header::LAST_MODIFIED)?
        .to_str()
        .ok()?
        .to_string();

    match NaiveDateTime::parse_from_str(&header_value, LAST_MODIFIED_FORMAT) {
        Ok(timestamp) => {
            debug!(link = link, last_modified = %timestamp, "Probe succeeded");
            Some(timestamp)
        }
        Err(e) => {
            warn!(
                link = link,
                header = %header_value,
                error = %e,
                "Unparseable Last-Modified header, skipping candidate"
            );
            None
        }
    }
}

/// Two-slot selection over probe results.
///
/// `best_with_timestamp` tracks the maximum timestamp under strict
/// greater-than comparison (ties keep the earlier-seen candidate);
/// `first_without_timestamp` remembers the first candidate, in input order,
/// whose probe produced nothing. The slots are combined only at the end: any
/// timestamped candidate beats the fallback. The fallback slot is the one
/// place where input order matters.
pub(crate) fn select_latest(
    candidates: &[String],
    timestamps: &[Option<NaiveDateTime>],
) -> Option<ResolvedVersion> {
    let mut best_with_timestamp: Option<(usize, NaiveDateTime)> = None;
    let mut first_without_timestamp: Option<usize> = None;

    for (index, stamp) in timestamps.iter().enumerate() {
        match stamp {
            Some(ts) => {
                if best_with_timestamp.map_or(true, |(_, best)| *ts > best) {
                    best_with_timestamp = Some((index, *ts));
                }
            }
            None => {
                if first_without_timestamp.is_none() {
                    first_without_timestamp = Some(index);
                }
            }
        }
    }

    match (best_with_timestamp, first_without_timestamp) {
        (Some((index, timestamp)), _) => Some(ResolvedVersion {
            link: candidates[index].clone(),
            last_modified: Some(timestamp),
        }),
        (None, Some(index)) => Some(ResolvedVersion {
            link: candidates[index].clone(),
            last_modified: None,
        }),
        (None, None) => None,
    }
}
