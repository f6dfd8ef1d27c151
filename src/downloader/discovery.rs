use crate::config::ResolvedConfig;
use crate::constants::{ENTRY_LINK_SELECTOR, ENTRY_SELECTOR};
use crate::errors::{AppError, AppResult};
use crate::http::{self, TransportRetry};
use crate::models::Period;
use reqwest::{Client, Method};
use scraper::{Html, Selector};
use std::collections::HashSet;
use std::sync::OnceLock;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Cached CSS selector for listing entries.
/// Compiled once at initialization for performance.
static ENTRY_SELECTOR_CACHED: OnceLock<Selector> = OnceLock::new();

/// Cached CSS selector for the anchor inside an entry.
static ENTRY_LINK_SELECTOR_CACHED: OnceLock<Selector> = OnceLock::new();

/// Links and entry count extracted from one listing page.
pub(crate) struct ListingPage {
    pub(crate) links: Vec<String>,
    pub(crate) entry_count: usize,
}

/// Walks the paginated listing and collects every file link matching the period.
///
/// Pages are requested with an incrementing `b_start:int` offset until a page
/// comes back with no entries or fewer entries than the page size. A
/// politeness delay is inserted between page fetches so the portal is not
/// hammered.
///
/// The result is deduplicated (several pages may reference the same file)
/// with first-seen order preserved, which keeps the resolver's no-metadata
/// fallback deterministic.
///
/// # Errors
///
/// A transport error on any page aborts discovery with `DiscoveryError`;
/// retries for rate-limiting statuses happen below, in the transport layer.
pub async fn discover(
    client: &Client,
    config: &ResolvedConfig,
    period: &Period,
) -> AppResult<Vec<String>> {
    info!(
        period = %period.display_label(),
        "Searching listing for candidate files"
    );

    // Validate the listing endpoint once before paginating
    let base_url = Url::parse(&config.base_url)?;

    let policy = TransportRetry::from_config(config);
    let timeout = Duration::from_secs(config.listing_timeout_secs);

    let mut candidates: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut offset = 0usize;

    loop {
        let url = format!("{base_url}?b_start:int={offset}");
        debug!(url = %url, "Fetching listing page");

        let response = http::send_with_retry(client, Method::GET, &url, timeout, &policy)
            .await
            .map_err(|e| {
                AppError::DiscoveryError(format!("Listing page at offset {offset}: {e}"))
            })?;
        let body = response
            .error_for_status()
            .map_err(|e| {
                AppError::DiscoveryError(format!("Listing page at offset {offset}: {e}"))
            })?
            .text()
            .await
            .map_err(|e| {
                AppError::DiscoveryError(format!("Listing page at offset {offset}: {e}"))
            })?;

        let page = extract_candidates(&body, period);
        if page.entry_count == 0 {
            break;
        }

        for link in page.links {
            if seen.insert(link.clone()) {
                candidates.push(link);
            }
        }

        if page.entry_count < config.page_size {
            break;
        }

        offset += config.page_size;
        tokio::time::sleep(Duration::from_millis(config.page_delay_ms)).await;
    }

    info!(candidates = candidates.len(), "Listing search finished");
    Ok(candidates)
}

/// Parses one listing page and extracts the file links matching the period.
///
/// Each `<article class="entry">` is expected to contain one anchor; entries
/// without an anchor are skipped, and malformed markup never fails the page.
/// Matching is done on a lowercased copy of the link while the stored
/// candidate keeps its original casing:
///
/// - the link must reference a `.csv` or `.xlsx` file, and
/// - either the `YYYYMM` digit key or both the month name and the year must
///   occur in the link.
pub(crate) fn extract_candidates(html: &str, period: &Period) -> ListingPage {
    let document = Html::parse_document(html);

    let entry_selector = ENTRY_SELECTOR_CACHED.get_or_init(|| {
        Selector::parse(ENTRY_SELECTOR).expect("ENTRY_SELECTOR is a valid CSS selector")
    });
    let link_selector = ENTRY_LINK_SELECTOR_CACHED.get_or_init(|| {
        Selector::parse(ENTRY_LINK_SELECTOR).expect("ENTRY_LINK_SELECTOR is a valid CSS selector")
    });

    let digit_key = period.digit_key();

    let mut links = Vec::new();
    let mut entry_count = 0usize;

    for entry in document.select(entry_selector) {
        entry_count += 1;

        let href = match entry
            .select(link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            Some(href) => href,
            None => continue,
        };

        let lowered = href.to_lowercase();

        let is_file = lowered.contains(".csv") || lowered.contains(".xlsx");
        let match_by_digits = digit_key
            .as_deref()
            .map_or(false, |key| lowered.contains(key));
        let match_by_text = match (period.month_name, period.year.as_deref()) {
            (Some(name), Some(year)) => lowered.contains(name) && lowered.contains(year),
            _ => false,
        };

        if is_file && (match_by_digits || match_by_text) {
            links.push(href.to_string());
        }
    }

    ListingPage { links, entry_count }
}
