use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::job::{JobRecord, Sponsorship};

const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NameCount {
    pub name: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStats {
    pub total: u64,
    pub active: u64,
    pub with_keywords: u64,
    pub by_season: Vec<NameCount>,
    pub by_sponsorship: Vec<NameCount>,
    pub top_companies: Vec<NameCount>,
    pub top_locations: Vec<NameCount>,
    /// Keywords are case-folded before counting.
    pub top_keywords: Vec<NameCount>,
}

/// Aggregates the visible job set for the analytics view.
pub fn compute_job_stats(jobs: &[JobRecord]) -> JobStats {
    let mut seasons = HashMap::new();
    let mut sponsorships: HashMap<Sponsorship, u64> = HashMap::new();
    let mut companies = HashMap::new();
    let mut locations = HashMap::new();
    let mut keywords = HashMap::new();

    for job in jobs {
        *seasons.entry(job.season.clone()).or_insert(0) += 1;
        *sponsorships.entry(job.sponsorship).or_insert(0) += 1;
        *companies.entry(job.company.clone()).or_insert(0) += 1;
        for location in &job.locations {
            *locations.entry(location.clone()).or_insert(0) += 1;
        }
        for keyword in &job.keywords {
            *keywords.entry(keyword.to_lowercase()).or_insert(0) += 1;
        }
    }

    let by_sponsorship = sponsorships
        .into_iter()
        .map(|(s, count)| (s.label().to_string(), count))
        .collect::<HashMap<_, _>>();

    JobStats {
        total: jobs.len() as u64,
        active: jobs.iter().filter(|j| j.active).count() as u64,
        with_keywords: jobs.iter().filter(|j| !j.keywords.is_empty()).count() as u64,
        by_season: ranked(seasons, None),
        by_sponsorship: ranked(by_sponsorship, None),
        top_companies: ranked(companies, Some(TOP_N)),
        top_locations: ranked(locations, Some(TOP_N)),
        top_keywords: ranked(keywords, Some(TOP_N)),
    }
}

/// Count descending, then name ascending, optionally truncated.
fn ranked(counts: HashMap<String, u64>, limit: Option<usize>) -> Vec<NameCount> {
    let mut entries: Vec<NameCount> = counts
        .into_iter()
        .map(|(name, count)| NameCount { name, count })
        .collect();
    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    if let Some(limit) = limit {
        entries.truncate(limit);
    }
    entries
}
