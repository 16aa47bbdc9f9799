use tracing::{debug, info};

use crate::errors::AppError;
use crate::matching::extractor::KeywordBag;
use crate::matching::ranker::{rank, PageRequest, RankedPage, SortKey, SortOrder};
use crate::matching::scorer::MatchCorpus;
use crate::models::job::JobRecord;

/// Scores every candidate against `bag`, drops zero scores, then sorts and pages.
///
/// Scoring covers the whole candidate set before pagination, so page totals
/// reflect every matching job. An empty bag is rejected up front.
pub fn match_jobs(
    bag: &KeywordBag,
    candidates: &[JobRecord],
    key: SortKey,
    order: SortOrder,
    request: PageRequest,
) -> Result<RankedPage, AppError> {
    if bag.is_empty() {
        return Err(AppError::NoKeywordsFound);
    }

    let corpus = MatchCorpus::from_bag(bag);
    if corpus.is_empty() {
        debug!("Keyword bag has no scoring-category terms; every job scores 0");
    }
    let scored = corpus.score_all(candidates);
    let page = rank(scored, key, order, request);

    info!(
        candidates = candidates.len(),
        matched = page.pagination.total_count,
        page = request.page(),
        "Matched resume keywords against jobs"
    );
    Ok(page)
}
