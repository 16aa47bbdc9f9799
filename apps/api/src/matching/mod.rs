// Skill matching core: taxonomy, keyword extraction, job scoring, ranking.
// The core is pure and synchronous; handlers do the I/O around it.

pub mod extractor;
pub mod handlers;
pub mod pipeline;
pub mod ranker;
pub mod scorer;
pub mod taxonomy;
