//! Report payload assembler.
//!
//! Merges pre-aggregated frequency-word statistics and per-source new titles
//! into a [`ReportPayload`], optionally running the AI stage (enrich,
//! categorize, render) over every title in the report.

use tracing::{debug, info, instrument};

use trendcast_shared::{
    AiReport, AppConfig, NEW_HOTSPOT_KEYWORD, NewTitleGroup, NewsItem, ReportConfig, ReportInput,
    ReportMode, ReportPayload, ReportTitle, StatEntry,
};

use crate::categorizer::categorize;
use crate::enricher::{ContentEnricher, EnrichmentProgress};
use crate::filter::TitleFilter;
use crate::render::{RenderOptions, render};

/// Display settings for assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    pub mode: ReportMode,
    /// Copied onto every processed new title.
    pub rank_threshold: u32,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self::from(&ReportConfig::default())
    }
}

impl From<&ReportConfig> for AssembleOptions {
    fn from(config: &ReportConfig) -> Self {
        Self {
            mode: config.mode,
            rank_threshold: config.rank_threshold,
        }
    }
}

/// The AI stage: an enricher plus the output toggles.
#[derive(Debug)]
pub struct AiStage {
    pub enricher: ContentEnricher,
    /// Render a document into `ai_content`.
    pub video_format: bool,
    pub render: RenderOptions,
}

impl AiStage {
    /// Build from config. A stage whose client could not be constructed is
    /// returned inactive.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            enricher: ContentEnricher::from_config(&config.enrichment, &config.provider),
            video_format: config.enrichment.video_format,
            render: RenderOptions::from(&config.enrichment),
        }
    }

    pub fn is_active(&self) -> bool {
        self.enricher.is_enabled()
    }
}

/// Build the report payload.
///
/// - `incremental` mode always yields an empty `new_titles` section.
/// - `filter`, when given, keeps only matching new titles; sources left with
///   no titles are dropped.
/// - Stat entries with `count <= 0` are dropped.
/// - An inactive or missing `ai` stage, one with `video_format` off, or one
///   with nothing to process yields a payload without AI fields.
#[instrument(skip_all, fields(mode = %options.mode, stats = input.stats.len(), sources = input.new_titles.len()))]
pub fn assemble(
    input: &ReportInput,
    options: &AssembleOptions,
    filter: Option<&dyn TitleFilter>,
    ai: Option<&AiStage>,
    progress: &dyn EnrichmentProgress,
) -> ReportPayload {
    let new_titles = if options.mode.hides_new_titles() {
        debug!("incremental mode, new titles hidden");
        Vec::new()
    } else {
        process_new_titles(input, options, filter)
    };

    let stats = process_stats(&input.stats);
    let total_new_count = new_titles.iter().map(|group| group.titles.len()).sum();

    let ai = ai
        .filter(|stage| stage.is_active())
        .and_then(|stage| run_ai_stage(stage, &stats, &new_titles, progress));

    info!(
        stats = stats.len(),
        new_titles = total_new_count,
        ai_processed = ai.is_some(),
        "report assembled"
    );

    ReportPayload {
        stats,
        new_titles,
        failed_ids: input.failed_ids.clone(),
        total_new_count,
        ai,
    }
}

fn process_new_titles(
    input: &ReportInput,
    options: &AssembleOptions,
    filter: Option<&dyn TitleFilter>,
) -> Vec<NewTitleGroup> {
    let original: usize = input.new_titles.iter().map(|s| s.titles.len()).sum();
    let mut kept = 0;

    let groups: Vec<NewTitleGroup> = input
        .new_titles
        .iter()
        .filter_map(|source| {
            let source_name = input
                .id_to_name
                .get(&source.source_id)
                .cloned()
                .unwrap_or_else(|| source.source_id.clone());

            let titles: Vec<ReportTitle> = source
                .titles
                .iter()
                .filter(|t| filter.is_none_or(|f| f.matches(&t.title)))
                .map(|t| ReportTitle {
                    title: t.title.clone(),
                    source_name: source_name.clone(),
                    time_display: String::new(),
                    count: 1,
                    ranks: t.ranks.clone(),
                    rank_threshold: options.rank_threshold,
                    url: t.url.clone(),
                    mobile_url: t.mobile_url.clone(),
                    is_new: true,
                    content: t.content.clone(),
                })
                .collect();

            kept += titles.len();

            (!titles.is_empty()).then(|| NewTitleGroup {
                source_id: source.source_id.clone(),
                source_name,
                titles,
            })
        })
        .collect();

    if filter.is_some() && original > 0 {
        info!(kept, original, "new titles after frequency-word filter");
    }

    groups
}

fn process_stats(stats: &[StatEntry]) -> Vec<StatEntry> {
    stats
        .iter()
        .filter(|stat| stat.count > 0)
        .cloned()
        .collect()
}

/// Flatten every title in the report into news items, stats first.
pub fn collect_news_items(stats: &[StatEntry], new_titles: &[NewTitleGroup]) -> Vec<NewsItem> {
    let from_stats = stats.iter().flat_map(|stat| {
        stat.titles
            .iter()
            .map(move |title| news_item(title, &stat.word))
    });
    let from_new = new_titles.iter().flat_map(|group| {
        group
            .titles
            .iter()
            .map(|title| news_item(title, NEW_HOTSPOT_KEYWORD))
    });

    from_stats.chain(from_new).collect()
}

fn news_item(title: &ReportTitle, keyword: &str) -> NewsItem {
    NewsItem {
        title: title.title.clone(),
        content: title.content.clone(),
        url: title.url.clone(),
        source: title.source_name.clone(),
        keyword: keyword.to_string(),
        ..Default::default()
    }
}

fn run_ai_stage(
    stage: &AiStage,
    stats: &[StatEntry],
    new_titles: &[NewTitleGroup],
    progress: &dyn EnrichmentProgress,
) -> Option<AiReport> {
    if !stage.video_format {
        debug!("video format off, AI stage skipped");
        return None;
    }

    let items = collect_news_items(stats, new_titles);
    if items.is_empty() {
        debug!("no titles for the AI stage");
        return None;
    }

    info!(items = items.len(), "starting AI stage");
    let batch = stage.enricher.enrich_batch(&items, progress);
    let categories = categorize(batch.items);

    progress.phase("Rendering video document");
    let ai_content = render(&categories, &stage.render);

    Some(AiReport {
        ai_processed: true,
        ai_content: Some(ai_content),
        ai_categories: categories,
    })
}
