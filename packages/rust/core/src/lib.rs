//! Content transformation pipeline for Trendcast.
//!
//! Raw report input flows through the stages in this crate:
//!
//! ```text
//! ReportInput ──▶ report::assemble ──▶ ReportPayload
//!                      │
//!                      ├─ filter      (frequency-word title filter)
//!                      ├─ enricher    (AI title / summary / tag per item)
//!                      ├─ categorizer (keyword buckets)
//!                      └─ render      (listing, narration script, storyboard)
//! ```

pub mod categorizer;
pub mod enricher;
pub mod filter;
pub mod render;
pub mod report;

pub use categorizer::{CATEGORY_KEYWORDS, DEFAULT_BUCKET, categorize, classify};
pub use enricher::{
    BatchReport, ContentEnricher, EnrichOutcome, EnrichmentLimits, EnrichmentProgress,
    ItemFailure, SilentEnrichmentProgress,
};
pub use filter::{
    FrequencyWords, TitleFilter, WordGroup, load_frequency_words, matches_word_groups,
    parse_frequency_words,
};
pub use render::{NO_CONTENT, RenderOptions, RenderedDocument, SEPARATOR, render};
pub use report::{AiStage, AssembleOptions, assemble, collect_news_items};
