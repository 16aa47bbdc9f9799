//! Skill taxonomy: the fixed category → term table that résumé text is classified against.
//!
//! Built once at startup, validated, and shared as `Arc<Taxonomy>`. Each term carries its
//! two precompiled match patterns so extraction never compiles a regex per call.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of taxonomy categories. `KeywordBag` stores one term list per category.
pub const CATEGORY_COUNT: usize = 9;

/// A skill category. Declaration order is taxonomy order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    ProgrammingLanguages,
    FrameworksAndLibraries,
    Databases,
    CloudAndInfrastructure,
    ToolsAndPlatforms,
    MobileAndWeb,
    #[serde(rename = "testingAndQA")]
    TestingAndQa,
    SoftSkills,
    Experience,
}

impl Category {
    pub const ALL: [Category; CATEGORY_COUNT] = [
        Category::ProgrammingLanguages,
        Category::FrameworksAndLibraries,
        Category::Databases,
        Category::CloudAndInfrastructure,
        Category::ToolsAndPlatforms,
        Category::MobileAndWeb,
        Category::TestingAndQa,
        Category::SoftSkills,
        Category::Experience,
    ];

    /// Position of this category in taxonomy order.
    pub fn index(self) -> usize {
        self as usize
    }

    /// The wire name, as used in API payloads.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::ProgrammingLanguages => "programmingLanguages",
            Category::FrameworksAndLibraries => "frameworksAndLibraries",
            Category::Databases => "databases",
            Category::CloudAndInfrastructure => "cloudAndInfrastructure",
            Category::ToolsAndPlatforms => "toolsAndPlatforms",
            Category::MobileAndWeb => "mobileAndWeb",
            Category::TestingAndQa => "testingAndQA",
            Category::SoftSkills => "softSkills",
            Category::Experience => "experience",
        }
    }

    /// Whether terms found under this category join the flattened corpus used for job scoring.
    /// Experience terms ("Intern", "Projects", ...) describe the document, not a skill.
    pub fn counts_toward_score(self) -> bool {
        !matches!(self, Category::Experience)
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum TaxonomyError {
    #[error("category '{0}' has an empty term list")]
    EmptyCategory(&'static str),

    #[error("category '{0}' contains a blank term")]
    BlankTerm(&'static str),

    #[error("category '{0}' is declared more than once")]
    DuplicateCategory(&'static str),

    #[error("category '{0}' is missing from the table")]
    MissingCategory(&'static str),

    #[error("failed to compile pattern for term '{term}': {source}")]
    Pattern {
        term: String,
        #[source]
        source: regex::Error,
    },
}

/// A canonical term with its whole-word and unanchored patterns.
#[derive(Debug, Clone)]
pub struct Term {
    canonical: String,
    whole_word: Regex,
    partial: Regex,
}

impl Term {
    fn compile(canonical: &str) -> Result<Self, TaxonomyError> {
        let escaped = regex::escape(&canonical.to_lowercase());
        let build = |pattern: String| {
            RegexBuilder::new(&pattern)
                .case_insensitive(true)
                .build()
                .map_err(|source| TaxonomyError::Pattern {
                    term: canonical.to_string(),
                    source,
                })
        };

        Ok(Self {
            canonical: canonical.to_string(),
            whole_word: build(format!(r"\b{escaped}\b"))?,
            partial: build(escaped)?,
        })
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// True when the term occurs in `text` as a whole word or as a substring.
    ///
    /// The unanchored pattern subsumes the whole-word one; it exists for terms such as
    /// "Next.js" or "Spring Boot" that punctuation defeats under `\b` anchoring.
    pub fn is_match(&self, text: &str) -> bool {
        self.whole_word.is_match(text) || self.partial.is_match(text)
    }
}

/// The immutable, validated skill taxonomy.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    /// Indexed by `Category::index`.
    terms: [Vec<Term>; CATEGORY_COUNT],
}

impl Taxonomy {
    /// Validates `table` and precompiles every term.
    ///
    /// The table must name every category exactly once; rows are reordered into
    /// taxonomy order regardless of how they were declared.
    pub fn new(table: &[(Category, &[&str])]) -> Result<Self, TaxonomyError> {
        let mut slots: [Option<Vec<Term>>; CATEGORY_COUNT] = Default::default();

        for (category, raw_terms) in table {
            let slot = &mut slots[category.index()];
            if slot.is_some() {
                return Err(TaxonomyError::DuplicateCategory(category.as_str()));
            }
            if raw_terms.is_empty() {
                return Err(TaxonomyError::EmptyCategory(category.as_str()));
            }

            let mut terms = Vec::with_capacity(raw_terms.len());
            for raw in raw_terms.iter() {
                if raw.trim().is_empty() {
                    return Err(TaxonomyError::BlankTerm(category.as_str()));
                }
                terms.push(Term::compile(raw)?);
            }

            *slot = Some(terms);
        }

        if let Some(missing) = Category::ALL.into_iter().find(|c| slots[c.index()].is_none()) {
            return Err(TaxonomyError::MissingCategory(missing.as_str()));
        }
        Ok(Self {
            terms: slots.map(Option::unwrap_or_default),
        })
    }

    /// The product's built-in table.
    pub fn builtin() -> Result<Self, TaxonomyError> {
        Self::new(BUILTIN_TABLE)
    }

    /// Categories with their terms, in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Term])> + '_ {
        Category::ALL
            .into_iter()
            .map(move |c| (c, self.terms(c)))
    }

    pub fn terms(&self, category: Category) -> &[Term] {
        &self.terms[category.index()]
    }

    pub fn term_count(&self) -> usize {
        self.terms.iter().map(Vec::len).sum()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Built-in term table
// ────────────────────────────────────────────────────────────────────────────

const PROGRAMMING_LANGUAGES: &[&str] = &[
    "JavaScript", "TypeScript", "Python", "Java", "C++", "C#", "Go", "Rust", "PHP", "Ruby",
    "Swift", "Kotlin", "Dart", "Scala", "R", "MATLAB", "Perl", "Haskell", "Clojure", "Elixir",
    "Julia", "Lua", "Shell", "Bash", "PowerShell", "Assembly", "COBOL", "Fortran", "Pascal",
    "Objective-C", "C", "F#", "VB.NET", "Delphi", "Ada", "Lisp", "Prolog", "Erlang",
];

const FRAMEWORKS_AND_LIBRARIES: &[&str] = &[
    "React", "Vue", "Angular", "Svelte", "Ember", "Backbone", "jQuery", "Lodash", "Underscore",
    "Express", "Koa", "Hapi", "Fastify", "NestJS", "Next.js", "Nuxt.js", "Gatsby", "SvelteKit",
    "Django", "Flask", "FastAPI", "Spring", "Spring Boot", "Laravel", "Symfony", "CodeIgniter",
    "ASP.NET", "ASP.NET Core", "Blazor", "Xamarin", "MAUI", "Bootstrap", "Material-UI",
    "Tailwind", "Ant Design", "Chakra UI", "Mantine", "Semantic UI", "Bulma", "Foundation",
];

const DATABASES: &[&str] = &[
    "MySQL", "PostgreSQL", "MongoDB", "Redis", "Elasticsearch", "Cassandra", "DynamoDB",
    "SQLite", "Oracle", "SQL Server", "MariaDB", "CouchDB", "Neo4j", "ArangoDB", "InfluxDB",
    "TimescaleDB", "CockroachDB", "FaunaDB", "PlanetScale", "Supabase", "Firebase", "Firestore",
];

const CLOUD_AND_INFRASTRUCTURE: &[&str] = &[
    "AWS", "Azure", "Google Cloud", "GCP", "DigitalOcean", "Linode", "Vultr", "Heroku",
    "Vercel", "Netlify", "Railway", "Render", "Fly.io", "Cloudflare", "Docker", "Kubernetes",
    "k8s", "Helm", "Terraform", "Ansible", "Chef", "Puppet", "Vagrant", "CI/CD", "DevOps",
    "GitOps", "Infrastructure as Code", "IaC", "Monitoring", "Logging", "Prometheus", "Grafana",
    "ELK Stack", "Splunk", "Datadog", "New Relic", "AppDynamics",
];

const TOOLS_AND_PLATFORMS: &[&str] = &[
    "Git", "GitHub", "GitLab", "Bitbucket", "SVN", "Mercurial", "Jenkins", "GitHub Actions",
    "GitLab CI", "CircleCI", "Travis CI", "Azure DevOps", "Bamboo", "Jira", "Confluence",
    "Trello", "Asana", "Notion", "Slack", "Discord", "Teams", "Zoom", "Figma", "Sketch",
    "Adobe XD", "InVision", "Zeplin", "Canva", "Photoshop", "Illustrator", "VS Code",
    "WebStorm", "IntelliJ", "Eclipse", "Postman", "Insomnia", "Webpack", "Vite", "Parcel",
    "Rollup", "Babel", "ESLint", "Prettier", "Husky", "Lint-staged",
];

const MOBILE_AND_WEB: &[&str] = &[
    "React Native", "Flutter", "Ionic", "Cordova", "PhoneGap", "Unity", "Unreal Engine", "iOS",
    "Android", "HTML", "CSS", "SCSS", "Sass", "Less", "Stylus", "REST API", "GraphQL", "gRPC",
    "WebSocket", "Socket.io", "Server-Sent Events", "WebRTC", "JSON", "XML", "YAML",
    "Protocol Buffers", "Apache Kafka", "RabbitMQ", "Progressive Web App", "PWA", "SPA",
];

const TESTING_AND_QA: &[&str] = &[
    "Unit Testing", "Integration Testing", "E2E Testing", "TDD", "BDD", "Jest", "Mocha",
    "Jasmine", "Cypress", "Playwright", "Selenium", "Puppeteer", "TestCafe", "Karma", "Ava",
    "Vitest", "Quality Assurance", "Test Automation", "Load Testing", "Performance Testing",
    "Security Testing", "Accessibility Testing", "Cross-browser Testing",
];

const SOFT_SKILLS: &[&str] = &[
    "Problem Solving", "Communication", "Leadership", "Teamwork", "Project Management",
    "Analytical Thinking", "Critical Thinking", "Time Management", "Adaptability", "Creativity",
    "Attention to Detail", "Collaboration", "Presentation Skills", "Mentoring", "Coaching",
    "Negotiation", "Conflict Resolution", "Strategic Thinking", "Innovation", "Agile", "Scrum",
];

const EXPERIENCE: &[&str] = &[
    "Intern", "Internship", "Experience", "Projects", "Portfolio", "GitHub", "Open Source",
    "Frontend Development", "Backend Development", "Full Stack Development", "Web Development",
    "Mobile Development", "Software Development", "Data Analysis", "Machine Learning",
    "AI Development", "DevOps", "UI/UX Design", "Product Management", "Quality Assurance",
    "Testing", "Research", "Consulting", "Freelancing", "Contracting", "Startup", "Enterprise",
];

const BUILTIN_TABLE: &[(Category, &[&str])] = &[
    (Category::ProgrammingLanguages, PROGRAMMING_LANGUAGES),
    (Category::FrameworksAndLibraries, FRAMEWORKS_AND_LIBRARIES),
    (Category::Databases, DATABASES),
    (Category::CloudAndInfrastructure, CLOUD_AND_INFRASTRUCTURE),
    (Category::ToolsAndPlatforms, TOOLS_AND_PLATFORMS),
    (Category::MobileAndWeb, MOBILE_AND_WEB),
    (Category::TestingAndQa, TESTING_AND_QA),
    (Category::SoftSkills, SOFT_SKILLS),
    (Category::Experience, EXPERIENCE),
];

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER: &[&str] = &["x"];

    fn minimal_table() -> Vec<(Category, &'static [&'static str])> {
        Category::ALL.iter().map(|c| (*c, PLACEHOLDER)).collect()
    }

    #[test]
    fn test_builtin_table_compiles() {
        let taxonomy = Taxonomy::builtin().unwrap();
        assert_eq!(taxonomy.iter().count(), CATEGORY_COUNT);
        assert_eq!(taxonomy.terms(Category::ProgrammingLanguages).len(), 38);
        assert_eq!(taxonomy.terms(Category::FrameworksAndLibraries).len(), 40);
        assert_eq!(taxonomy.terms(Category::Experience).len(), 27);
        assert_eq!(taxonomy.term_count(), 284);
    }

    #[test]
    fn test_no_builtin_category_is_empty() {
        let taxonomy = Taxonomy::builtin().unwrap();
        for (category, terms) in taxonomy.iter() {
            assert!(!terms.is_empty(), "{} is empty", category.as_str());
        }
    }

    #[test]
    fn test_iteration_follows_category_order() {
        let taxonomy = Taxonomy::builtin().unwrap();
        let order: Vec<Category> = taxonomy.iter().map(|(c, _)| c).collect();
        assert_eq!(order, Category::ALL.to_vec());
    }

    #[test]
    fn test_rows_are_reordered_into_taxonomy_order() {
        let mut table = minimal_table();
        table.reverse();
        let taxonomy = Taxonomy::new(&table).unwrap();
        assert_eq!(
            taxonomy.iter().next().map(|(c, _)| c),
            Some(Category::ProgrammingLanguages)
        );
    }

    #[test]
    fn test_empty_category_rejected() {
        let mut table = minimal_table();
        table[2] = (Category::Databases, &[]);
        assert_eq!(
            Taxonomy::new(&table).unwrap_err(),
            TaxonomyError::EmptyCategory("databases")
        );
    }

    #[test]
    fn test_blank_term_rejected() {
        let mut table = minimal_table();
        table[0] = (Category::ProgrammingLanguages, &["Rust", "  "]);
        assert_eq!(
            Taxonomy::new(&table).unwrap_err(),
            TaxonomyError::BlankTerm("programmingLanguages")
        );
    }

    #[test]
    fn test_duplicate_and_missing_categories_rejected() {
        let mut table = minimal_table();
        table.push((Category::SoftSkills, &["Leadership"]));
        assert_eq!(
            Taxonomy::new(&table).unwrap_err(),
            TaxonomyError::DuplicateCategory("softSkills")
        );

        let full = minimal_table();
        assert_eq!(
            Taxonomy::new(&full[..8]).unwrap_err(),
            TaxonomyError::MissingCategory("experience")
        );
    }

    #[test]
    fn test_term_matches_regex_metacharacters_literally() {
        let term = Term::compile("C++").unwrap();
        assert!(term.is_match("c++ and rust"));
        assert!(!term.is_match("cpp"));

        let term = Term::compile("Next.js").unwrap();
        assert!(term.is_match("built with next.js"));
        assert!(!term.is_match("nextxjs"));
    }

    #[test]
    fn test_term_match_is_case_insensitive() {
        let term = Term::compile("PostgreSQL").unwrap();
        assert!(term.is_match("POSTGRESQL"));
        assert!(term.is_match("postgresql"));
    }

    #[test]
    fn test_experience_is_only_category_excluded_from_scoring() {
        let excluded: Vec<_> = Category::ALL
            .into_iter()
            .filter(|c| !c.counts_toward_score())
            .collect();
        assert_eq!(excluded, vec![Category::Experience]);
    }

    #[test]
    fn test_category_serde_names() {
        assert_eq!(
            serde_json::to_string(&Category::TestingAndQa).unwrap(),
            r#""testingAndQA""#
        );
        let parsed: Category = serde_json::from_str(r#""cloudAndInfrastructure""#).unwrap();
        assert_eq!(parsed, Category::CloudAndInfrastructure);
        for c in Category::ALL {
            assert_eq!(serde_json::to_value(c).unwrap(), c.as_str());
        }
    }
}
