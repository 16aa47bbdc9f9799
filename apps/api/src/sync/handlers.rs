use axum::{
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap},
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::state::AppState;
use crate::sync::runner::{run_sync, SyncReport};

/// POST /api/v1/sync
///
/// Fetches the listings feed and folds it into the job store. Requires
/// `Authorization: Bearer <CRON_SECRET>` when a secret is configured.
pub async fn handle_sync(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SyncReport>, AppError> {
    authorize(&headers, state.config.cron_secret.as_deref())?;

    info!("Sync triggered, fetching {}", state.listings.url());
    let feed = state.listings.fetch().await?;

    let report = run_sync(
        state.jobs.as_ref(),
        &state.extractor,
        &state.listings,
        feed,
        state.config.retention_days,
        Utc::now(),
    )
    .await?;

    info!(
        processed = report.processed,
        cleaned_up = report.cleaned_up,
        "Sync finished"
    );
    Ok(Json(report))
}

fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), AppError> {
    let Some(secret) = secret else {
        return Ok(());
    };
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));
    if token == Some(secret) {
        Ok(())
    } else {
        warn!("Rejected sync request with missing or invalid bearer token");
        Err(AppError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    use super::*;
    use crate::jobs::memory::MemoryJobStore;
    use crate::routes::build_router;

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, format!("Bearer {token}").parse().unwrap());
        headers
    }

    #[test]
    fn test_authorize() {
        assert!(authorize(&HeaderMap::new(), None).is_ok());
        assert!(authorize(&bearer("s3cret"), Some("s3cret")).is_ok());
        assert!(matches!(
            authorize(&bearer("wrong"), Some("s3cret")),
            Err(AppError::Unauthorized)
        ));
        assert!(matches!(
            authorize(&HeaderMap::new(), Some("s3cret")),
            Err(AppError::Unauthorized)
        ));
    }

    #[tokio::test]
    async fn test_sync_route_rejects_bad_secret() {
        let mut state = AppState::for_tests(Arc::new(MemoryJobStore::default()));
        state.config.cron_secret = Some("s3cret".to_string());
        let response = build_router(state)
            .oneshot(
                Request::post("/api/v1/sync")
                    .header("authorization", "Bearer nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
