pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as jobs;
use crate::matching::handlers as matching;
use crate::state::AppState;
use crate::sync::handlers as sync;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.config.max_upload_bytes);

    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé analysis and matching
        .route(
            "/api/v1/resumes/analyze",
            post(matching::handle_analyze).layer(upload_limit.clone()),
        )
        .route(
            "/api/v1/resumes/analyze-text",
            post(matching::handle_analyze_text),
        )
        .route(
            "/api/v1/resumes/match",
            post(matching::handle_resume_match).layer(upload_limit),
        )
        .route("/api/v1/matches", post(matching::handle_matches))
        // Stored internships
        .route("/api/v1/internships", get(jobs::handle_list_internships))
        .route(
            "/api/v1/internships/stats",
            get(jobs::handle_internship_stats),
        )
        // Listing feed sync (cron)
        .route("/api/v1/sync", post(sync::handle_sync))
        .with_state(state)
}
