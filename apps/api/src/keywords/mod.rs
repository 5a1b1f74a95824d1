// Keyword core: tokenizer → matcher/ranker → highlighter.
// Pure, synchronous functions with no shared state; handlers wrap them for HTTP.

pub mod handlers;
pub mod highlight;
pub mod matcher;
pub mod pipeline;
pub mod tokenizer;

// Re-export the types consumed by config, state and the document modules.
pub use highlight::EmphasisMarker;
pub use matcher::ScoreBasis;
pub use pipeline::KeywordOptions;
pub use tokenizer::TokenizerOptions;
