//! Job Matcher: scores a job's own keyword tags against a résumé's extracted terms.
//!
//! Algorithm:
//! 1. Flatten the bag into one lowercase corpus, skipping categories that do not
//!    count toward scoring (experience).
//! 2. A job keyword is matched when, lowercased, it contains some corpus term or is
//!    contained in one (bidirectional substring containment).
//! 3. score = round(100 × matched / total job keywords); 0 when the job has no keywords.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::extractor::KeywordBag;
use crate::models::job::JobRecord;

/// A job with its computed match score. Ephemeral; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredJob {
    #[serde(flatten)]
    pub job: JobRecord,
    /// 0 – 100
    pub match_score: u8,
    /// The job's keywords (original spelling) that matched, in job order.
    pub matched_keywords: Vec<String>,
}

/// Lowercased union of the scoring categories of a `KeywordBag`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchCorpus {
    terms: BTreeSet<String>,
}

impl MatchCorpus {
    pub fn from_bag(bag: &KeywordBag) -> Self {
        let terms = bag
            .iter()
            .filter(|(category, _)| category.counts_toward_score())
            .flat_map(|(_, terms)| terms.iter().map(|t| t.to_lowercase()))
            .collect();
        Self { terms }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Bidirectional substring test against every corpus term. `keyword` must be lowercase.
    fn covers(&self, keyword: &str) -> bool {
        self.terms
            .iter()
            .any(|term| term.contains(keyword) || keyword.contains(term.as_str()))
    }

    /// The job keywords that this corpus covers, in job order.
    pub fn matched_keywords<'a>(&self, keywords: &'a [String]) -> Vec<&'a str> {
        keywords
            .iter()
            .filter(|k| self.covers(&k.to_lowercase()))
            .map(String::as_str)
            .collect()
    }

    /// Score in [0, 100] plus the matched keywords for one job.
    pub fn score_job(&self, job: &JobRecord) -> ScoredJob {
        let matched_keywords: Vec<String> = self
            .matched_keywords(&job.keywords)
            .into_iter()
            .map(str::to_string)
            .collect();
        let match_score = percentage(matched_keywords.len(), job.keywords.len());

        ScoredJob {
            job: job.clone(),
            match_score,
            matched_keywords,
        }
    }

    /// Scores every job and drops those scoring 0, preserving input order.
    pub fn score_all(&self, jobs: &[JobRecord]) -> Vec<ScoredJob> {
        let scored: Vec<ScoredJob> = jobs
            .iter()
            .map(|job| self.score_job(job))
            .filter(|s| s.match_score > 0)
            .collect();

        debug!(
            candidates = jobs.len(),
            matched = scored.len(),
            corpus_terms = self.len(),
            "Scored jobs against keyword corpus"
        );
        scored
    }
}

/// round(100 × matched / total), half-up, computed exactly in integers.
/// An empty denominator scores 0.
fn percentage(matched: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    let rounded = (matched * 200 + total) / (total * 2);
    rounded.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matching::taxonomy::Category;
    use crate::models::job::Sponsorship;

    fn bag(entries: &[(Category, &str)]) -> KeywordBag {
        entries
            .iter()
            .map(|(c, t)| (*c, t.to_string()))
            .collect()
    }

    fn job(id: &str, keywords: &[&str]) -> JobRecord {
        JobRecord {
            id: id.to_string(),
            title: "Software Engineer Intern".to_string(),
            company: "Acme".to_string(),
            locations: vec!["Remote".to_string()],
            season: "Summer 2025".to_string(),
            sponsorship: Sponsorship::NotSpecified,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            date_posted: None,
            active: true,
            is_visible: true,
            url: String::new(),
        }
    }

    fn score(bag: &KeywordBag, job: &JobRecord) -> u8 {
        MatchCorpus::from_bag(bag).score_job(job).match_score
    }

    fn web_bag() -> KeywordBag {
        bag(&[
            (Category::ProgrammingLanguages, "TypeScript"),
            (Category::FrameworksAndLibraries, "React"),
            (Category::Databases, "PostgreSQL"),
        ])
    }

    #[test]
    fn test_empty_job_keywords_score_zero() {
        assert_eq!(score(&web_bag(), &job("a", &[])), 0);
    }

    #[test]
    fn test_score_ignores_case() {
        let upper = score(&web_bag(), &job("a", &["REACT"]));
        let lower = score(&web_bag(), &job("a", &["react"]));
        assert_eq!(upper, lower);
        assert_eq!(upper, 100);
    }

    #[test]
    fn test_containment_works_in_both_directions() {
        // "react.js" contains "react"; "postgres" is contained in "postgresql"
        let j = job("a", &["React.js", "Postgres", "Kafka"]);
        let corpus = MatchCorpus::from_bag(&web_bag());
        assert_eq!(corpus.matched_keywords(&j.keywords), vec!["React.js", "Postgres"]);
        assert_eq!(corpus.score_job(&j).match_score, 67);
    }

    #[test]
    fn test_score_all_agrees_with_single_job_scores() {
        let corpus = MatchCorpus::from_bag(&web_bag());
        let jobs = vec![
            job("a", &["React", "Kafka", "Go"]),
            job("b", &["Haskell"]),
            job("c", &["postgresql", "react"]),
        ];
        let all: Vec<(String, u8)> = corpus
            .score_all(&jobs)
            .into_iter()
            .map(|s| (s.job.id, s.match_score))
            .collect();
        assert_eq!(
            all,
            vec![
                ("a".to_string(), score(&web_bag(), &jobs[0])),
                ("c".to_string(), score(&web_bag(), &jobs[2])),
            ]
        );
        assert_eq!(all[1].1, 100);
    }

    #[test]
    fn test_score_rounds_half_up() {
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(3, 3), 100);
        assert_eq!(percentage(0, 5), 0);
    }

    #[test]
    fn test_experience_terms_do_not_count() {
        let b = bag(&[(Category::Experience, "Machine Learning")]);
        assert_eq!(score(&b, &job("a", &["machine learning"])), 0);

        let b = bag(&[(Category::SoftSkills, "Leadership")]);
        assert_eq!(score(&b, &job("a", &["leadership"])), 100);
    }

    #[test]
    fn test_score_is_order_independent() {
        let a = score(&web_bag(), &job("a", &["Kafka", "React", "Go"]));
        let b = score(&web_bag(), &job("a", &["Go", "Kafka", "React"]));
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_bag_scores_zero() {
        assert_eq!(score(&KeywordBag::default(), &job("a", &["React"])), 0);
    }

    #[test]
    fn test_short_terms_overmatch_by_containment() {
        // "go" is a substring of "django" and "mongodb"
        let b = bag(&[(Category::ProgrammingLanguages, "Go")]);
        assert_eq!(score(&b, &job("a", &["Django", "MongoDB"])), 100);
    }

    #[test]
    fn test_score_all_drops_zero_scores_and_keeps_order() {
        let jobs = vec![
            job("ten", &["React", "a1", "a2", "a3", "a4", "a5", "a6", "a7", "a8", "a9"]),
            job("zero", &["Kafka"]),
            job("forty", &["React", "TypeScript", "b1", "b2", "b3"]),
        ];
        let scored = MatchCorpus::from_bag(&web_bag()).score_all(&jobs);
        let summary: Vec<(&str, u8)> = scored
            .iter()
            .map(|s| (s.job.id.as_str(), s.match_score))
            .collect();
        assert_eq!(summary, vec![("ten", 10), ("forty", 40)]);
    }

    #[test]
    fn test_scored_job_serializes_flat() {
        let scored = MatchCorpus::from_bag(&web_bag()).score_job(&job("a", &["React"]));
        let json = serde_json::to_value(&scored).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["matchScore"], 100);
        assert_eq!(json["matchedKeywords"][0], "React");
    }
}
