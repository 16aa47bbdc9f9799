//! In-memory `JobStore` for handler and sync tests. Mirrors `PgJobStore` ordering.

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::json;

use crate::errors::AppError;
use crate::jobs::repository::{JobFilter, JobStore, UpsertOutcome};
use crate::matching::ranker::PageRequest;
use crate::models::job::{JobRecord, JobRow, Listing};

#[derive(Default)]
pub struct MemoryJobStore {
    listings: Mutex<Vec<Listing>>,
}

impl MemoryJobStore {
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: Mutex::new(listings),
        }
    }

    fn snapshot(&self) -> Vec<Listing> {
        self.listings.lock().unwrap().clone()
    }

    fn matches(listing: &Listing, filter: &JobFilter) -> bool {
        listing.is_visible
            && filter.season.as_ref().map_or(true, |s| &listing.season == s)
            && filter
                .sponsorship
                .as_ref()
                .map_or(true, |s| &listing.sponsorship == s)
            && filter.active.map_or(true, |a| listing.active == a)
    }

    fn newest_first(mut listings: Vec<Listing>) -> Vec<Listing> {
        listings.sort_by(|a, b| b.date_posted.cmp(&a.date_posted).then(a.id.cmp(&b.id)));
        listings
    }
}

fn to_record(listing: Listing) -> JobRecord {
    JobRecord::from(JobRow {
        id: listing.id,
        active: Some(listing.active),
        company_name: Some(listing.company_name),
        date_posted: Some(listing.date_posted),
        date_updated: Some(listing.date_updated),
        is_visible: Some(listing.is_visible),
        locations: Some(json!(listing.locations)),
        season: Some(listing.season),
        sponsorship: Some(listing.sponsorship),
        title: Some(listing.title),
        url: Some(listing.url),
        keywords: Some(json!(listing.keywords)),
    })
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn list_page(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Vec<JobRecord>, AppError> {
        let filtered: Vec<Listing> = self
            .snapshot()
            .into_iter()
            .filter(|l| Self::matches(l, filter))
            .collect();
        Ok(Self::newest_first(filtered)
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.page_size() as usize)
            .map(to_record)
            .collect())
    }

    async fn count(&self, filter: &JobFilter) -> Result<u64, AppError> {
        Ok(self
            .snapshot()
            .iter()
            .filter(|l| Self::matches(l, filter))
            .count() as u64)
    }

    async fn match_candidates(&self) -> Result<Vec<JobRecord>, AppError> {
        let candidates: Vec<Listing> = self
            .snapshot()
            .into_iter()
            .filter(|l| l.is_visible && l.active)
            .collect();
        Ok(Self::newest_first(candidates)
            .into_iter()
            .map(to_record)
            .collect())
    }

    async fn all_visible(&self) -> Result<Vec<JobRecord>, AppError> {
        let mut visible: Vec<Listing> = self
            .snapshot()
            .into_iter()
            .filter(|l| l.is_visible)
            .collect();
        visible.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(visible.into_iter().map(to_record).collect())
    }

    async fn newest_listing_timestamp(&self) -> Result<Option<i64>, AppError> {
        Ok(self.snapshot().iter().map(Listing::latest_timestamp).max())
    }

    async fn upsert(&self, listings: &[Listing]) -> Result<UpsertOutcome, AppError> {
        let mut stored = self.listings.lock().unwrap();
        let mut outcome = UpsertOutcome::default();
        for listing in listings {
            match stored.iter_mut().find(|l| l.id == listing.id) {
                Some(existing) => {
                    let previous = std::mem::take(&mut existing.keywords);
                    *existing = listing.clone();
                    if existing.keywords.is_empty() {
                        existing.keywords = previous;
                    }
                    outcome.updated += 1;
                }
                None => {
                    stored.push(listing.clone());
                    outcome.inserted += 1;
                }
            }
        }
        Ok(outcome)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, AppError> {
        let mut stored = self.listings.lock().unwrap();
        let before = stored.len();
        stored.retain(|l| !(l.date_posted < cutoff && l.date_updated < cutoff));
        Ok((before - stored.len()) as u64)
    }
}
