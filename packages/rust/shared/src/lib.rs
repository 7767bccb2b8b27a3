//! Shared types, error model, and configuration for Trendcast.
//!
//! This crate is the foundation depended on by all other Trendcast crates.
//! It provides:
//! - [`TrendcastError`], the unified error type
//! - Domain types ([`NewsItem`], [`CategoryBucket`], [`ReportInput`], [`ReportPayload`])
//! - Configuration ([`AppConfig`], [`EnrichmentConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EnrichmentConfig, ProviderConfig, ReportConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{Result, TrendcastError};
pub use types::{
    AiReport, CategorizedItems, CategoryBucket, Enrichment, NEW_HOTSPOT_KEYWORD, NewTitle,
    NewTitleGroup, NewsItem, ReportInput, ReportMode, ReportPayload, ReportTitle, SourceTitles,
    StatEntry,
};
