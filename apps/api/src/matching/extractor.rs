//! Keyword Extractor: classifies raw document text into the skill taxonomy.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::matching::taxonomy::{Category, Taxonomy, CATEGORY_COUNT};

/// Terms found in one document, one list per category.
///
/// Each list holds canonical taxonomy spellings in taxonomy order, never repeated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "KeywordBagDto", into = "KeywordBagDto")]
pub struct KeywordBag {
    terms: [Vec<String>; CATEGORY_COUNT],
}

impl KeywordBag {
    pub fn terms(&self, category: Category) -> &[String] {
        &self.terms[category.index()]
    }

    /// Sum of all category list lengths.
    pub fn total_keywords(&self) -> usize {
        self.terms.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_keywords() == 0
    }

    /// Categories with their found terms, in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[String])> + '_ {
        Category::ALL
            .into_iter()
            .map(move |c| (c, self.terms(c)))
    }

    /// Appends `term` to `category` unless it is already listed there.
    fn insert(&mut self, category: Category, term: &str) -> bool {
        let list = &mut self.terms[category.index()];
        if list.iter().any(|t| t == term) {
            return false;
        }
        list.push(term.to_string());
        true
    }
}

impl FromIterator<(Category, String)> for KeywordBag {
    fn from_iter<I: IntoIterator<Item = (Category, String)>>(iter: I) -> Self {
        let mut bag = KeywordBag::default();
        for (category, term) in iter {
            bag.insert(category, &term);
        }
        bag
    }
}

/// Wire shape of a `KeywordBag`: one camelCase field per category plus `totalKeywords`.
///
/// `totalKeywords` is always recomputed; a client-supplied value is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct KeywordBagDto {
    programming_languages: Vec<String>,
    frameworks_and_libraries: Vec<String>,
    databases: Vec<String>,
    cloud_and_infrastructure: Vec<String>,
    tools_and_platforms: Vec<String>,
    mobile_and_web: Vec<String>,
    #[serde(rename = "testingAndQA")]
    testing_and_qa: Vec<String>,
    soft_skills: Vec<String>,
    experience: Vec<String>,
    total_keywords: usize,
}

impl From<KeywordBagDto> for KeywordBag {
    fn from(dto: KeywordBagDto) -> Self {
        let lists = [
            dto.programming_languages,
            dto.frameworks_and_libraries,
            dto.databases,
            dto.cloud_and_infrastructure,
            dto.tools_and_platforms,
            dto.mobile_and_web,
            dto.testing_and_qa,
            dto.soft_skills,
            dto.experience,
        ];
        Category::ALL
            .into_iter()
            .zip(lists)
            .flat_map(|(c, list)| list.into_iter().map(move |t| (c, t)))
            .collect()
    }
}

impl From<KeywordBag> for KeywordBagDto {
    fn from(bag: KeywordBag) -> Self {
        let total_keywords = bag.total_keywords();
        let [
            programming_languages,
            frameworks_and_libraries,
            databases,
            cloud_and_infrastructure,
            tools_and_platforms,
            mobile_and_web,
            testing_and_qa,
            soft_skills,
            experience,
        ] = bag.terms;
        Self {
            programming_languages,
            frameworks_and_libraries,
            databases,
            cloud_and_infrastructure,
            tools_and_platforms,
            mobile_and_web,
            testing_and_qa,
            soft_skills,
            experience,
            total_keywords,
        }
    }
}

/// Scans text against a shared taxonomy. Cheap to clone; holds no per-call state.
#[derive(Debug, Clone)]
pub struct KeywordExtractor {
    taxonomy: Arc<Taxonomy>,
}

impl KeywordExtractor {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Classifies `text` into a `KeywordBag`.
    ///
    /// Never fails. Blank input must be rejected by the caller beforehand
    /// (see `documents::ensure_text`); here it simply yields an empty bag.
    pub fn extract(&self, text: &str) -> KeywordBag {
        let normalized = text.to_lowercase();
        let mut bag = KeywordBag::default();

        for (category, terms) in self.taxonomy.iter() {
            for term in terms {
                if term.is_match(&normalized) {
                    bag.insert(category, term.canonical());
                }
            }
        }

        debug!(
            text_len = normalized.len(),
            total_keywords = bag.total_keywords(),
            "Keyword extraction finished"
        );
        bag
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> KeywordExtractor {
        KeywordExtractor::new(Arc::new(Taxonomy::builtin().unwrap()))
    }

    const RESUME: &str = r#"
        Jane Doe - Software Engineer Intern
        SKILLS
        Languages: TypeScript, Python, Rust
        Frontend: React, Next.js, Tailwind CSS
        Backend: Django, Spring Boot
        Databases: PostgreSQL, Redis
        Cloud: AWS, Docker, Kubernetes
        Tools: Git, Figma, Postman
        Testing: Jest, Cypress
        Leadership, Communication, Agile
    "#;

    #[test]
    fn test_total_equals_sum_of_category_lengths() {
        let bag = extractor().extract(RESUME);
        let sum: usize = bag.iter().map(|(_, terms)| terms.len()).sum();
        assert_eq!(bag.total_keywords(), sum);
        assert!(bag.total_keywords() > 0);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let ex = extractor();
        let first = ex.extract(RESUME);
        let _ = ex.extract("unrelated call in between: Haskell, Erlang");
        assert_eq!(first, ex.extract(RESUME));
    }

    #[test]
    fn test_repeated_term_recorded_once() {
        let bag = extractor().extract("I use React and react and REACT");
        let react_hits = bag
            .terms(Category::FrameworksAndLibraries)
            .iter()
            .filter(|t| *t == "React")
            .count();
        assert_eq!(react_hits, 1);
    }

    #[test]
    fn test_metacharacter_terms_are_found() {
        let bag = extractor().extract("I know Next.js");
        assert!(bag
            .terms(Category::FrameworksAndLibraries)
            .contains(&"Next.js".to_string()));

        let bag = extractor().extract("Comfortable with C++ and CI/CD pipelines");
        assert!(bag
            .terms(Category::ProgrammingLanguages)
            .contains(&"C++".to_string()));
        assert!(bag
            .terms(Category::CloudAndInfrastructure)
            .contains(&"CI/CD".to_string()));
    }

    #[test]
    fn test_multi_word_terms_are_found() {
        let bag = extractor().extract("Built services in spring boot on google cloud");
        let frameworks = bag.terms(Category::FrameworksAndLibraries);
        assert!(frameworks.contains(&"Spring".to_string()));
        assert!(frameworks.contains(&"Spring Boot".to_string()));
        assert!(bag
            .terms(Category::CloudAndInfrastructure)
            .contains(&"Google Cloud".to_string()));
    }

    #[test]
    fn test_terms_follow_taxonomy_order_not_text_order() {
        let bag = extractor().extract("postgresql first, then mysql");
        let dbs = bag.terms(Category::Databases);
        let mysql = dbs.iter().position(|t| t == "MySQL").unwrap();
        let pg = dbs.iter().position(|t| t == "PostgreSQL").unwrap();
        assert!(mysql < pg);
    }

    #[test]
    fn test_term_declared_in_two_categories_recorded_in_both() {
        let bag = extractor().extract("Active on GitHub");
        assert!(bag
            .terms(Category::ToolsAndPlatforms)
            .contains(&"GitHub".to_string()));
        assert!(bag.terms(Category::Experience).contains(&"GitHub".to_string()));
    }

    #[test]
    fn test_text_without_matches_yields_empty_bag() {
        let bag = extractor().extract("zzz qqq 123");
        assert!(bag.is_empty());
        assert_eq!(bag.total_keywords(), 0);
    }

    #[test]
    fn test_bag_serializes_with_category_names_and_total() {
        let bag = extractor().extract("Rust and Docker");
        let json = serde_json::to_value(&bag).unwrap();
        assert!(json["programmingLanguages"]
            .as_array()
            .unwrap()
            .contains(&serde_json::json!("Rust")));
        assert!(json["testingAndQA"].is_array());
        assert_eq!(json["totalKeywords"], bag.total_keywords());
    }

    #[test]
    fn test_deserialized_bag_recomputes_total_and_dedups() {
        let json = r#"{
            "programmingLanguages": ["Rust", "Rust", "Go"],
            "databases": ["Redis"],
            "totalKeywords": 999
        }"#;
        let bag: KeywordBag = serde_json::from_str(json).unwrap();
        assert_eq!(bag.total_keywords(), 3);
        assert_eq!(bag.terms(Category::ProgrammingLanguages), ["Rust", "Go"]);
        assert!(bag.terms(Category::SoftSkills).is_empty());
    }
}
