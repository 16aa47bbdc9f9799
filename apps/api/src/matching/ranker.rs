//! Result Ranker: stable sort by date or match score, then 1-indexed page slicing.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::matching::scorer::ScoredJob;

/// Largest page a match request may ask for.
pub const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Date,
    Match,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// A validated page request: `page >= 1`, `1 <= page_size <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: u32, page_size: u32, max_page_size: u32) -> Result<Self, AppError> {
        if page == 0 {
            return Err(AppError::Validation("page must be >= 1".to_string()));
        }
        if page_size == 0 || page_size > max_page_size {
            return Err(AppError::Validation(format!(
                "page size must be between 1 and {max_page_size}"
            )));
        }
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Row offset of the first item on this page.
    pub fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }
}

/// Pagination metadata shared by match results and job browsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u64,
    pub total_count: u64,
    #[serde(rename = "limit")]
    pub page_size: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, total_count: u64) -> Self {
        let page_size = request.page_size();
        let total_pages = total_count.div_ceil(page_size as u64);
        let current_page = request.page();
        Self {
            current_page,
            total_pages,
            total_count,
            page_size,
            has_next_page: (current_page as u64) < total_pages,
            has_prev_page: current_page > 1,
        }
    }
}

/// One page of ranked match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedPage {
    pub jobs: Vec<ScoredJob>,
    pub pagination: Pagination,
    pub sort_by: SortKey,
    pub order: SortOrder,
}

fn compare(a: &ScoredJob, b: &ScoredJob, key: SortKey) -> Ordering {
    match key {
        // Undated postings sort as the oldest.
        SortKey::Date => a.job.date_posted.cmp(&b.job.date_posted),
        SortKey::Match => a.match_score.cmp(&b.match_score),
    }
}

/// Stable-sorts `jobs` by `key`/`order` and returns the requested page.
///
/// Equal keys keep their input order in both directions. A page past the end is
/// empty, with pagination metadata still describing the whole set.
pub fn rank(
    mut jobs: Vec<ScoredJob>,
    key: SortKey,
    order: SortOrder,
    request: PageRequest,
) -> RankedPage {
    jobs.sort_by(|a, b| {
        let ordering = compare(a, b, key);
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });

    let pagination = Pagination::new(request, jobs.len() as u64);
    let start = usize::try_from(request.offset())
        .unwrap_or(usize::MAX)
        .min(jobs.len());
    let end = start
        .saturating_add(request.page_size() as usize)
        .min(jobs.len());
    let page: Vec<ScoredJob> = jobs.drain(start..end).collect();

    RankedPage {
        jobs: page,
        pagination,
        sort_by: key,
        order,
    }
}
