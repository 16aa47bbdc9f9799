//! Axum route handlers for résumé analysis and job matching.

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::documents::{ensure_text, preview};
use crate::errors::AppError;
use crate::matching::extractor::KeywordBag;
use crate::matching::pipeline::match_jobs;
use crate::matching::ranker::{PageRequest, RankedPage, SortKey, SortOrder, MAX_PAGE_SIZE};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeTextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub success: bool,
    /// Leading slice of the document text.
    pub text: String,
    pub full_text_length: usize,
    pub keywords: KeywordBag,
}

/// Sort and page options shared by both match endpoints.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParams {
    #[serde(default)]
    pub sort_by: SortKey,
    #[serde(default)]
    pub order: SortOrder,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub keywords: KeywordBag,
    #[serde(flatten)]
    pub params: MatchParams,
}

#[derive(Debug, Serialize)]
pub struct ResumeMatchResponse {
    pub keywords: KeywordBag,
    pub matches: RankedPage,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/resumes/analyze
///
/// Multipart upload (field `file`, PDF or plain text). Returns the extracted
/// keyword bag with a text preview.
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (bytes, content_type) = read_upload(multipart).await?;
    let text = state.documents.extract_text(bytes, &content_type).await?;
    Ok(Json(analyze(&state, &text)?))
}

/// POST /api/v1/resumes/analyze-text
pub async fn handle_analyze_text(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeTextRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    Ok(Json(analyze(&state, &request.text)?))
}

/// POST /api/v1/matches
///
/// Scores every active job against a previously extracted keyword bag.
pub async fn handle_matches(
    State(state): State<AppState>,
    Json(request): Json<MatchRequest>,
) -> Result<Json<RankedPage>, AppError> {
    let page = run_match(&state, &request.keywords, &request.params).await?;
    Ok(Json(page))
}

/// POST /api/v1/resumes/match
///
/// Upload, extract, score and rank in one call. Sort and page options come
/// from the query string.
pub async fn handle_resume_match(
    State(state): State<AppState>,
    Query(params): Query<MatchParams>,
    multipart: Multipart,
) -> Result<Json<ResumeMatchResponse>, AppError> {
    let (bytes, content_type) = read_upload(multipart).await?;
    let text = state.documents.extract_text(bytes, &content_type).await?;
    let keywords = state.extractor.extract(ensure_text(&text)?);

    let matches = run_match(&state, &keywords, &params).await?;
    Ok(Json(ResumeMatchResponse { keywords, matches }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn analyze(state: &AppState, text: &str) -> Result<AnalyzeResponse, AppError> {
    let text = ensure_text(text)?;
    let keywords = state.extractor.extract(text);
    info!(
        total_keywords = keywords.total_keywords(),
        "Analyzed resume text"
    );
    Ok(AnalyzeResponse {
        success: true,
        text: preview(text),
        full_text_length: text.chars().count(),
        keywords,
    })
}

async fn run_match(
    state: &AppState,
    bag: &KeywordBag,
    params: &MatchParams,
) -> Result<RankedPage, AppError> {
    let request = PageRequest::new(
        params.page.unwrap_or(1),
        params.page_size.unwrap_or(state.config.match_page_size),
        MAX_PAGE_SIZE,
    )?;

    let candidates = state.jobs.match_candidates().await?;
    match_jobs(bag, &candidates, params.sort_by, params.order, request)
}

/// Pulls the `file` field out of a multipart body. A missing content type is
/// inferred from the file name.
async fn read_upload(mut multipart: Multipart) -> Result<(Bytes, String), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| upload_error("Invalid multipart body", e))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| content_type_for(field.file_name().unwrap_or_default()));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| upload_error("Failed to read upload", e))?;
        return Ok((bytes, content_type));
    }
    Err(AppError::Validation("No file provided".to_string()))
}

/// Body-limit failures keep their 413; anything else is a malformed request.
fn upload_error(context: &str, e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::Validation(format!("{context}: {e}"))
    }
}

fn content_type_for(file_name: &str) -> String {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".pdf") {
        "application/pdf"
    } else if lower.ends_with(".txt") {
        "text/plain"
    } else if lower.ends_with(".md") {
        "text/markdown"
    } else {
        "application/octet-stream"
    }
    .to_string()
}
