//! Axum route handlers for browsing stored internships.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::jobs::repository::JobFilter;
use crate::jobs::stats::{compute_job_stats, JobStats};
use crate::matching::ranker::{PageRequest, Pagination};
use crate::models::job::JobRecord;
use crate::state::AppState;

/// Browse may ask for everything in one page.
pub const MAX_BROWSE_LIMIT: u32 = 10_000;

#[derive(Debug, Deserialize)]
pub struct BrowseQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub season: Option<String>,
    pub sponsorship: Option<String>,
    pub active: Option<bool>,
}

impl BrowseQuery {
    fn filter(&self) -> JobFilter {
        JobFilter {
            season: self.season.clone(),
            sponsorship: self.sponsorship.clone(),
            active: self.active,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BrowseResponse {
    pub success: bool,
    pub internships: Vec<JobRecord>,
    pub pagination: Pagination,
}

/// GET /api/v1/internships
pub async fn handle_list_internships(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> Result<Json<BrowseResponse>, AppError> {
    let request = PageRequest::new(
        query.page.unwrap_or(1),
        query.limit.unwrap_or(state.config.browse_page_size),
        MAX_BROWSE_LIMIT,
    )?;
    let filter = query.filter();

    let total = state.jobs.count(&filter).await?;
    let internships = state.jobs.list_page(&filter, request).await?;

    Ok(Json(BrowseResponse {
        success: true,
        internships,
        pagination: Pagination::new(request, total),
    }))
}

/// GET /api/v1/internships/stats
pub async fn handle_internship_stats(
    State(state): State<AppState>,
) -> Result<Json<JobStats>, AppError> {
    let jobs = state.jobs.all_visible().await?;
    Ok(Json(compute_job_stats(&jobs)))
}
