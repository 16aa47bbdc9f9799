use std::collections::HashSet;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::errors::AppError;
use crate::jobs::repository::JobStore;
use crate::matching::extractor::KeywordExtractor;
use crate::models::job::Listing;
use crate::sync::client::DescriptionSource;

/// How far back an empty store reaches on its first sync.
pub const INITIAL_LOOKBACK_DAYS: i64 = 30;

/// Only the head of a description is scanned for keywords.
pub const DESCRIPTION_CHARS: usize = 3000;

/// Description pages read at once.
const DESCRIPTION_CONCURRENCY: usize = 8;

const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Summary of one sync run, returned by `POST /api/v1/sync`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub fetched: usize,
    pub processed: usize,
    pub inserted: u64,
    pub updated: u64,
    pub cleaned_up: u64,
    /// Listings older than this were skipped.
    pub cutoff: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Newest stored timestamp, or `now` minus the initial lookback when the store is empty.
pub fn resolve_cutoff(newest: Option<i64>, now: i64) -> i64 {
    newest.unwrap_or(now - INITIAL_LOOKBACK_DAYS * SECS_PER_DAY)
}

/// Keeps listings whose latest timestamp is on or after `cutoff`.
pub fn filter_new_listings(listings: Vec<Listing>, cutoff: i64) -> Vec<Listing> {
    listings
        .into_iter()
        .filter(|l| l.latest_timestamp() >= cutoff)
        .collect()
}

/// Drops repeated ids. The last occurrence wins and takes that position.
pub fn dedup_by_id(listings: Vec<Listing>) -> Vec<Listing> {
    let mut seen = HashSet::new();
    let mut kept: Vec<Listing> = listings
        .into_iter()
        .rev()
        .filter(|l| seen.insert(l.id.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Keywords found in `text` over the scoring categories, in taxonomy order, each listed once.
pub fn scoring_keywords(extractor: &KeywordExtractor, text: &str) -> Vec<String> {
    let bag = extractor.extract(text);
    let mut seen = HashSet::new();
    let keywords = bag
        .iter()
        .filter(|(category, _)| category.counts_toward_score())
        .flat_map(|(_, terms)| terms.iter())
        .filter(|term| seen.insert(term.as_str()))
        .cloned()
        .collect();
    keywords
}

/// Keywords for one listing, read from the head of its description. The title
/// is used only when the description cannot be fetched.
async fn listing_keywords(
    extractor: &KeywordExtractor,
    descriptions: &dyn DescriptionSource,
    listing: &Listing,
) -> Vec<String> {
    match descriptions.description(&listing.url).await {
        Some(text) => {
            let head: String = text.chars().take(DESCRIPTION_CHARS).collect();
            scoring_keywords(extractor, &head)
        }
        None => {
            debug!(id = %listing.id, "No description, tagging from title");
            scoring_keywords(extractor, &listing.title)
        }
    }
}

/// One sync pass over an already-fetched feed: filter, tag, upsert, then expire
/// rows older than `retention_days`. A listing whose description yields no
/// keywords keeps whatever the store already holds for it.
pub async fn run_sync(
    store: &dyn JobStore,
    extractor: &KeywordExtractor,
    descriptions: &dyn DescriptionSource,
    feed: Vec<Listing>,
    retention_days: i64,
    now: DateTime<Utc>,
) -> Result<SyncReport, AppError> {
    let now_ts = now.timestamp();
    let cutoff = resolve_cutoff(store.newest_listing_timestamp().await?, now_ts);
    let fetched = feed.len();

    let mut listings = dedup_by_id(filter_new_listings(feed, cutoff));
    let lookups: Vec<_> = listings
        .iter()
        .map(|listing| listing_keywords(extractor, descriptions, listing))
        .collect();
    let tagged: Vec<Vec<String>> = stream::iter(lookups)
        .buffered(DESCRIPTION_CONCURRENCY)
        .collect()
        .await;
    for (listing, keywords) in listings.iter_mut().zip(tagged) {
        listing.keywords = keywords;
    }
    info!(
        "Filtered {} of {} listings on or after cutoff {}",
        listings.len(),
        fetched,
        cutoff
    );

    let outcome = if listings.is_empty() {
        Default::default()
    } else {
        store.upsert(&listings).await?
    };

    let retention_cutoff = now_ts.saturating_sub(retention_days.saturating_mul(SECS_PER_DAY));
    let cleaned_up = store.delete_older_than(retention_cutoff).await?;
    info!("Cleaned up {cleaned_up} internships older than {retention_days} days");

    Ok(SyncReport {
        fetched,
        processed: listings.len(),
        inserted: outcome.inserted,
        updated: outcome.updated,
        cleaned_up,
        cutoff: DateTime::from_timestamp(cutoff, 0).unwrap_or(now),
        finished_at: Utc::now(),
    })
}
