//! Core domain types: news items, category buckets, report input and payload.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::TrendcastError;

/// Keyword attached to items that come from the "new titles" section rather
/// than from a frequency-word aggregate.
pub const NEW_HOTSPOT_KEYWORD: &str = "新增热点";

// ---------------------------------------------------------------------------
// NewsItem
// ---------------------------------------------------------------------------

/// AI-generated fields for a single news item.
///
/// Either all of these exist on an item or none do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub ai_title: String,
    pub ai_summary: String,
    pub ai_tag: String,
    /// Title as it was before enrichment.
    pub original_title: String,
}

/// A single trend item flowing through enrichment, categorization and rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Used as source text when `content` is empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub source: String,
    /// Aggregate word the item was matched under, or [`NEW_HOTSPOT_KEYWORD`].
    #[serde(default)]
    pub keyword: String,
    #[serde(flatten)]
    pub enrichment: Option<Enrichment>,
}

impl NewsItem {
    /// Enriched title if present, raw title otherwise.
    pub fn display_title(&self) -> &str {
        self.enrichment
            .as_ref()
            .map_or(self.title.as_str(), |e| e.ai_title.as_str())
    }

    /// Enriched summary if present, raw content otherwise.
    pub fn summary_or_content(&self) -> &str {
        self.enrichment
            .as_ref()
            .map_or(self.content.as_str(), |e| e.ai_summary.as_str())
    }

    /// Enriched summary, if any.
    pub fn summary(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .map(|e| e.ai_summary.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Enriched tag, if any.
    pub fn tag(&self) -> Option<&str> {
        self.enrichment
            .as_ref()
            .map(|e| e.ai_tag.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Text handed to the generation service: content, else description.
    pub fn source_text(&self) -> &str {
        if self.content.is_empty() {
            &self.description
        } else {
            &self.content
        }
    }

    /// Copy of this item carrying the given enrichment.
    pub fn with_enrichment(&self, ai_title: String, ai_summary: String, ai_tag: String) -> Self {
        Self {
            enrichment: Some(Enrichment {
                ai_title,
                ai_summary,
                ai_tag,
                original_title: self.title.clone(),
            }),
            ..self.clone()
        }
    }
}

// ---------------------------------------------------------------------------
// Category buckets
// ---------------------------------------------------------------------------

/// Topical bucket. Declaration order is the fixed rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryBucket {
    #[serde(rename = "科技AI类")]
    TechAi,
    #[serde(rename = "游戏娱乐类")]
    GamingEntertainment,
    #[serde(rename = "硬件数码类")]
    HardwareDevices,
}

impl CategoryBucket {
    /// All buckets in rendering order.
    pub const ALL: [CategoryBucket; 3] = [
        CategoryBucket::TechAi,
        CategoryBucket::GamingEntertainment,
        CategoryBucket::HardwareDevices,
    ];

    /// Display label used in rendered documents and payload keys.
    pub fn label(&self) -> &'static str {
        match self {
            Self::TechAi => "科技AI类",
            Self::GamingEntertainment => "游戏娱乐类",
            Self::HardwareDevices => "硬件数码类",
        }
    }
}

impl std::fmt::Display for CategoryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Items grouped by bucket. Every bucket is always present, possibly empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategorizedItems(BTreeMap<CategoryBucket, Vec<NewsItem>>);

impl CategorizedItems {
    /// Empty grouping with all three buckets present.
    pub fn new() -> Self {
        Self(
            CategoryBucket::ALL
                .into_iter()
                .map(|bucket| (bucket, Vec::new()))
                .collect(),
        )
    }

    /// Append an item to the end of a bucket.
    pub fn push(&mut self, bucket: CategoryBucket, item: NewsItem) {
        self.0.entry(bucket).or_default().push(item);
    }

    /// Items in a bucket, in insertion order.
    pub fn get(&self, bucket: CategoryBucket) -> &[NewsItem] {
        self.0.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Non-empty buckets in fixed order.
    pub fn non_empty(&self) -> impl Iterator<Item = (CategoryBucket, &[NewsItem])> {
        self.0
            .iter()
            .filter(|(_, items)| !items.is_empty())
            .map(|(bucket, items)| (*bucket, items.as_slice()))
    }

    /// Total number of items across all buckets.
    pub fn total(&self) -> usize {
        self.0.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl Default for CategorizedItems {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Report mode
// ---------------------------------------------------------------------------

/// Report mode selected by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportMode {
    #[default]
    Daily,
    Current,
    Incremental,
}

impl ReportMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Current => "current",
            Self::Incremental => "incremental",
        }
    }

    /// Incremental reports never show the "new titles" section.
    pub fn hides_new_titles(&self) -> bool {
        matches!(self, Self::Incremental)
    }
}

impl std::fmt::Display for ReportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ReportMode {
    type Err = TrendcastError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "current" => Ok(Self::Current),
            "incremental" => Ok(Self::Incremental),
            other => Err(TrendcastError::validation(format!(
                "unknown report mode '{other}': expected daily, current or incremental"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// Report input (already-aggregated statistics)
// ---------------------------------------------------------------------------

/// One title inside a frequency-word aggregate, or a processed new title.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportTitle {
    pub title: String,
    #[serde(default)]
    pub source_name: String,
    #[serde(default)]
    pub time_display: String,
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub ranks: Vec<u32>,
    #[serde(default)]
    pub rank_threshold: u32,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "mobileUrl")]
    pub mobile_url: String,
    #[serde(default)]
    pub is_new: bool,
    /// Optional body text, handed to enrichment when present.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// A frequency-word aggregate with its per-title breakdown.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatEntry {
    pub word: String,
    pub count: i64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub titles: Vec<ReportTitle>,
}

/// A freshly appeared title as produced by the aggregation step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTitle {
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default, alias = "mobileUrl")]
    pub mobile_url: String,
    #[serde(default)]
    pub ranks: Vec<u32>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

/// New titles of one source, in the order the aggregation step produced them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceTitles {
    pub source_id: String,
    #[serde(default)]
    pub titles: Vec<NewTitle>,
}

/// Everything the report assembler consumes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReportInput {
    #[serde(default)]
    pub stats: Vec<StatEntry>,
    #[serde(default)]
    pub new_titles: Vec<SourceTitles>,
    /// Source id → human-readable source name.
    #[serde(default)]
    pub id_to_name: HashMap<String, String>,
    #[serde(default)]
    pub failed_ids: Vec<String>,
}

// ---------------------------------------------------------------------------
// Report payload
// ---------------------------------------------------------------------------

/// New titles of one source after filtering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTitleGroup {
    pub source_id: String,
    pub source_name: String,
    pub titles: Vec<ReportTitle>,
}

/// AI section of the payload, present only when enrichment ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiReport {
    pub ai_processed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_content: Option<String>,
    pub ai_categories: CategorizedItems,
}

/// Structured payload handed to HTML rendering and notification formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportPayload {
    pub stats: Vec<StatEntry>,
    pub new_titles: Vec<NewTitleGroup>,
    pub failed_ids: Vec<String>,
    pub total_new_count: usize,
    #[serde(flatten)]
    pub ai: Option<AiReport>,
}

impl ReportPayload {
    pub fn ai_processed(&self) -> bool {
        self.ai.as_ref().is_some_and(|ai| ai.ai_processed)
    }

    /// Rendered document, if enrichment produced one.
    pub fn ai_content(&self) -> Option<&str> {
        self.ai.as_ref().and_then(|ai| ai.ai_content.as_deref())
    }
}
