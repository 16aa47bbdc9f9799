//! Job storage: the read/write boundary over the `internships` table.
//!
//! Handlers and the sync runner only see `Arc<dyn JobStore>`; `PgJobStore` is the
//! production backend.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};

use crate::errors::AppError;
use crate::matching::ranker::PageRequest;
use crate::models::job::{JobRecord, JobRow, Listing};

const JOB_COLUMNS: &str = "id, active, company_name, date_posted, date_updated, is_visible, \
     locations, season, sponsorship, title, url, keywords";

/// Browse filters. Visibility is always required and is not a filter option.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobFilter {
    pub season: Option<String>,
    pub sponsorship: Option<String>,
    pub active: Option<bool>,
}

/// Row counts from one upsert batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub inserted: u64,
    pub updated: u64,
}

#[async_trait]
pub trait JobStore: Send + Sync {
    /// One page of visible jobs matching `filter`, newest first.
    async fn list_page(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Vec<JobRecord>, AppError>;

    /// Number of visible jobs matching `filter`.
    async fn count(&self, filter: &JobFilter) -> Result<u64, AppError>;

    /// Every active, visible job. Scoring runs over this full set before pagination.
    async fn match_candidates(&self) -> Result<Vec<JobRecord>, AppError>;

    /// Every visible job, for analytics.
    async fn all_visible(&self) -> Result<Vec<JobRecord>, AppError>;

    /// Newest `max(date_posted, date_updated)` across stored jobs.
    async fn newest_listing_timestamp(&self) -> Result<Option<i64>, AppError>;

    /// Inserts or updates by id. An empty `keywords` list leaves stored keywords untouched.
    async fn upsert(&self, listings: &[Listing]) -> Result<UpsertOutcome, AppError>;

    /// Deletes jobs whose posted and updated timestamps are both before `cutoff`.
    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, AppError>;
}

// ────────────────────────────────────────────────────────────────────────────
// PostgreSQL backend
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &JobFilter) {
        if let Some(season) = &filter.season {
            builder.push(" AND season = ").push_bind(season.clone());
        }
        if let Some(sponsorship) = &filter.sponsorship {
            builder.push(" AND sponsorship = ").push_bind(sponsorship.clone());
        }
        if let Some(active) = filter.active {
            builder.push(" AND active = ").push_bind(active);
        }
    }

    async fn fetch_jobs(&self, sql: &str) -> Result<Vec<JobRecord>, AppError> {
        let rows = sqlx::query_as::<_, JobRow>(sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(JobRecord::from).collect())
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn list_page(
        &self,
        filter: &JobFilter,
        page: PageRequest,
    ) -> Result<Vec<JobRecord>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(format!(
            "SELECT {JOB_COLUMNS} FROM internships WHERE is_visible = TRUE"
        ));
        Self::push_filters(&mut builder, filter);
        builder
            .push(" ORDER BY date_posted DESC NULLS LAST, id LIMIT ")
            .push_bind(page.page_size() as i64)
            .push(" OFFSET ")
            .push_bind(page.offset() as i64);

        let rows: Vec<JobRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        debug!(rows = rows.len(), page = page.page(), "Fetched job page");
        Ok(rows.into_iter().map(JobRecord::from).collect())
    }

    async fn count(&self, filter: &JobFilter) -> Result<u64, AppError> {
        let mut builder =
            QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM internships WHERE is_visible = TRUE");
        Self::push_filters(&mut builder, filter);

        let total: i64 = builder.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(total.max(0) as u64)
    }

    async fn match_candidates(&self) -> Result<Vec<JobRecord>, AppError> {
        self.fetch_jobs(&format!(
            "SELECT {JOB_COLUMNS} FROM internships \
             WHERE is_visible = TRUE AND active = TRUE \
             ORDER BY date_posted DESC NULLS LAST, id"
        ))
        .await
    }

    async fn all_visible(&self) -> Result<Vec<JobRecord>, AppError> {
        self.fetch_jobs(&format!(
            "SELECT {JOB_COLUMNS} FROM internships WHERE is_visible = TRUE ORDER BY id"
        ))
        .await
    }

    async fn newest_listing_timestamp(&self) -> Result<Option<i64>, AppError> {
        let newest: Option<i64> = sqlx::query_scalar(
            r#"
            SELECT MAX(GREATEST(date_posted, date_updated))
            FROM internships
            WHERE date_posted IS NOT NULL OR date_updated IS NOT NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;
        Ok(newest)
    }

    async fn upsert(&self, listings: &[Listing]) -> Result<UpsertOutcome, AppError> {
        let mut outcome = UpsertOutcome::default();
        let mut tx = self.pool.begin().await?;

        for listing in listings {
            // xmax = 0 only for rows created by this statement
            let inserted: bool = sqlx::query_scalar(
                r#"
                INSERT INTO internships
                    (id, active, company_name, date_posted, date_updated, is_visible,
                     locations, season, sponsorship, title, url, keywords, scraped_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, NOW())
                ON CONFLICT (id) DO UPDATE SET
                    active = EXCLUDED.active,
                    company_name = EXCLUDED.company_name,
                    date_posted = EXCLUDED.date_posted,
                    date_updated = EXCLUDED.date_updated,
                    is_visible = EXCLUDED.is_visible,
                    locations = EXCLUDED.locations,
                    season = EXCLUDED.season,
                    sponsorship = EXCLUDED.sponsorship,
                    title = EXCLUDED.title,
                    url = EXCLUDED.url,
                    keywords = CASE
                        WHEN jsonb_array_length(EXCLUDED.keywords) > 0 THEN EXCLUDED.keywords
                        ELSE internships.keywords
                    END,
                    scraped_at = NOW()
                RETURNING (xmax = 0)
                "#,
            )
            .bind(&listing.id)
            .bind(listing.active)
            .bind(&listing.company_name)
            .bind(listing.date_posted)
            .bind(listing.date_updated)
            .bind(listing.is_visible)
            .bind(sqlx::types::Json(&listing.locations))
            .bind(&listing.season)
            .bind(&listing.sponsorship)
            .bind(&listing.title)
            .bind(&listing.url)
            .bind(sqlx::types::Json(&listing.keywords))
            .fetch_one(&mut *tx)
            .await?;

            if inserted {
                outcome.inserted += 1;
            } else {
                outcome.updated += 1;
            }
        }

        tx.commit().await?;
        info!(
            "Upserted {} internships: {} inserted, {} updated",
            listings.len(),
            outcome.inserted,
            outcome.updated
        );
        Ok(outcome)
    }

    async fn delete_older_than(&self, cutoff: i64) -> Result<u64, AppError> {
        let result =
            sqlx::query("DELETE FROM internships WHERE date_posted < $1 AND date_updated < $1")
                .bind(cutoff)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}
