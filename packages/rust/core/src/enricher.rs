//! Per-item AI enrichment with failure isolation.
//!
//! Each item gets a generated title, summary and tag from the injected
//! [`EnrichmentClient`]. Enrichment is all-or-nothing per item: if any of the
//! three calls fails, the item comes back exactly as it went in and the
//! failure is recorded. A failing item never stops the batch.

use tracing::{error, info, instrument, warn};

use trendcast_provider::{EnrichmentClient, build_client, truncate_generated};
use trendcast_shared::{EnrichmentConfig, NewsItem, ProviderConfig, Result, TrendcastError};

/// Log batch progress every this many items.
const PROGRESS_LOG_INTERVAL: usize = 10;

// ---------------------------------------------------------------------------
// Limits and outcomes
// ---------------------------------------------------------------------------

/// Length budgets for generated text, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnrichmentLimits {
    pub title_length: usize,
    pub summary_length: usize,
}

impl Default for EnrichmentLimits {
    fn default() -> Self {
        Self::from(&EnrichmentConfig::default())
    }
}

impl From<&EnrichmentConfig> for EnrichmentLimits {
    fn from(config: &EnrichmentConfig) -> Self {
        Self {
            title_length: config.title_length,
            summary_length: config.summary_length,
        }
    }
}

/// What happened to a single item.
#[derive(Debug)]
pub enum EnrichOutcome {
    /// All three fields were generated.
    Enriched(NewsItem),
    /// Enrichment is off; the item was not sent anywhere.
    Skipped(NewsItem),
    /// The service failed; the item is the unmodified input.
    Failed { item: NewsItem, error: TrendcastError },
}

impl EnrichOutcome {
    pub fn is_enriched(&self) -> bool {
        matches!(self, Self::Enriched(_))
    }

    /// The item to keep, enriched or not.
    pub fn into_item(self) -> NewsItem {
        match self {
            Self::Enriched(item) | Self::Skipped(item) | Self::Failed { item, .. } => item,
        }
    }
}

/// A failed item inside a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemFailure {
    /// Position in the input batch.
    pub index: usize,
    pub title: String,
    pub reason: String,
}

/// Result of [`ContentEnricher::enrich_batch`].
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// One item per input, in input order.
    pub items: Vec<NewsItem>,
    /// Number of items that gained AI fields.
    pub enriched: usize,
    pub failures: Vec<ItemFailure>,
}

// ---------------------------------------------------------------------------
// Enricher
// ---------------------------------------------------------------------------

/// Applies an [`EnrichmentClient`] to news items.
pub struct ContentEnricher {
    client: Option<Box<dyn EnrichmentClient>>,
    limits: EnrichmentLimits,
}

impl std::fmt::Debug for ContentEnricher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentEnricher")
            .field("client", &self.client.as_ref().map(|c| c.name()))
            .field("limits", &self.limits)
            .finish()
    }
}

impl ContentEnricher {
    /// An enricher backed by `client`.
    pub fn new(client: Box<dyn EnrichmentClient>, limits: EnrichmentLimits) -> Self {
        Self {
            client: Some(client),
            limits,
        }
    }

    /// An enricher that passes every item through untouched.
    pub fn disabled(limits: EnrichmentLimits) -> Self {
        Self {
            client: None,
            limits,
        }
    }

    /// Build from config. A client that cannot be constructed disables
    /// enrichment for the run instead of failing it.
    pub fn from_config(enrichment: &EnrichmentConfig, provider: &ProviderConfig) -> Self {
        let limits = EnrichmentLimits::from(enrichment);

        if !enrichment.enabled {
            info!("AI enrichment disabled by config");
            return Self::disabled(limits);
        }

        match build_client(enrichment, provider) {
            Ok(client) => Self::new(client, limits),
            Err(e) => {
                error!(error = %e, "failed to initialize enrichment client, continuing without AI");
                Self::disabled(limits)
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.client.is_some()
    }

    pub fn limits(&self) -> EnrichmentLimits {
        self.limits
    }

    /// Enrich a single item. The input is never modified.
    pub fn enrich(&self, item: &NewsItem) -> EnrichOutcome {
        let Some(client) = self.client.as_deref() else {
            return EnrichOutcome::Skipped(item.clone());
        };

        match self.generate(client, item) {
            Ok(enriched) => EnrichOutcome::Enriched(enriched),
            Err(error) => {
                warn!(title = %item.title, error = %error, "news item enrichment failed");
                EnrichOutcome::Failed {
                    item: item.clone(),
                    error,
                }
            }
        }
    }

    fn generate(&self, client: &dyn EnrichmentClient, item: &NewsItem) -> Result<NewsItem> {
        let source = item.source_text();

        let ai_title = client.generate_title(source, &item.title, self.limits.title_length)?;
        let ai_summary = client.generate_summary(source, &item.title, self.limits.summary_length)?;
        let ai_tag = client.generate_tag(source, &item.title)?;

        Ok(item.with_enrichment(
            truncate_generated(&ai_title, self.limits.title_length),
            truncate_generated(&ai_summary, self.limits.summary_length),
            ai_tag,
        ))
    }

    /// Enrich every item independently. Output length and order always match
    /// the input.
    #[instrument(skip_all, fields(items = items.len(), enabled = self.is_enabled()))]
    pub fn enrich_batch(&self, items: &[NewsItem], progress: &dyn EnrichmentProgress) -> BatchReport {
        if !self.is_enabled() {
            return BatchReport {
                items: items.to_vec(),
                ..Default::default()
            };
        }

        let total = items.len();
        let mut report = BatchReport {
            items: Vec::with_capacity(total),
            ..Default::default()
        };

        progress.phase("Enriching news items");

        for (index, item) in items.iter().enumerate() {
            let done = index + 1;
            progress.task_progress(done, total, &item.title);

            match self.enrich(item) {
                EnrichOutcome::Enriched(enriched) => {
                    report.enriched += 1;
                    report.items.push(enriched);
                }
                EnrichOutcome::Skipped(original) => report.items.push(original),
                EnrichOutcome::Failed { item: original, error } => {
                    report.failures.push(ItemFailure {
                        index,
                        title: original.title.clone(),
                        reason: error.to_string(),
                    });
                    report.items.push(original);
                }
            }

            if done % PROGRESS_LOG_INTERVAL == 0 {
                info!(done, total, "enrichment progress");
            }
        }

        info!(
            total,
            enriched = report.enriched,
            failed = report.failures.len(),
            "enrichment complete"
        );

        report
    }
}

// ---------------------------------------------------------------------------
// Progress trait
// ---------------------------------------------------------------------------

/// Progress callback for enrichment and report assembly.
pub trait EnrichmentProgress: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Item-level progress within the current phase.
    fn task_progress(&self, current: usize, total: usize, detail: &str);
}

/// No-op enrichment progress.
pub struct SilentEnrichmentProgress;

impl EnrichmentProgress for SilentEnrichmentProgress {
    fn phase(&self, _name: &str) {}
    fn task_progress(&self, _current: usize, _total: usize, _detail: &str) {}
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    /// Client that echoes predictable text and fails on titles containing "boom".
    struct ScriptedClient {
        fail_on: &'static str,
        fail_step: &'static str,
    }

    impl ScriptedClient {
        fn failing_on(fail_on: &'static str, fail_step: &'static str) -> Self {
            Self { fail_on, fail_step }
        }

        fn check(&self, step: &str, title: &str) -> Result<()> {
            if step == self.fail_step && !self.fail_on.is_empty() && title.contains(self.fail_on) {
                return Err(TrendcastError::Provider(format!("{step} failed for {title}")));
            }
            Ok(())
        }
    }

    impl EnrichmentClient for ScriptedClient {
        fn name(&self) -> &str {
            "scripted"
        }

        fn generate_title(&self, _content: &str, title: &str, _max: usize) -> Result<String> {
            self.check("title", title)?;
            Ok(format!("AI:{title}"))
        }

        fn generate_summary(&self, content: &str, title: &str, _max: usize) -> Result<String> {
            self.check("summary", title)?;
            Ok(format!("摘要:{content}"))
        }

        fn generate_tag(&self, _content: &str, title: &str) -> Result<String> {
            self.check("tag", title)?;
            Ok("热点".into())
        }
    }

    /// Client returning text far over any budget.
    struct VerboseClient;

    impl EnrichmentClient for VerboseClient {
        fn name(&self) -> &str {
            "verbose"
        }
        fn generate_title(&self, _c: &str, _t: &str, _max: usize) -> Result<String> {
            Ok("t".repeat(40))
        }
        fn generate_summary(&self, _c: &str, _t: &str, _max: usize) -> Result<String> {
            Ok("s".repeat(500))
        }
        fn generate_tag(&self, _c: &str, _t: &str) -> Result<String> {
            Ok("tag".into())
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        calls: Mutex<Vec<(usize, usize)>>,
    }

    impl EnrichmentProgress for RecordingProgress {
        fn phase(&self, _name: &str) {}
        fn task_progress(&self, current: usize, total: usize, _detail: &str) {
            self.calls.lock().unwrap().push((current, total));
        }
    }

    fn item(title: &str) -> NewsItem {
        NewsItem {
            title: title.into(),
            content: format!("{title} 正文"),
            url: format!("https://example.com/{title}"),
            ..Default::default()
        }
    }

    fn enricher_with(client: impl EnrichmentClient + 'static) -> ContentEnricher {
        ContentEnricher::new(Box::new(client), EnrichmentLimits::default())
    }

    #[test]
    fn enrich_adds_all_fields_and_keeps_original_title() {
        let enricher = enricher_with(ScriptedClient::failing_on("", ""));
        let input = item("芯片");

        let outcome = enricher.enrich(&input);
        assert!(outcome.is_enriched());

        let out = outcome.into_item();
        let ai = out.enrichment.as_ref().expect("enrichment");
        assert_eq!(ai.ai_title, "AI:芯片");
        assert_eq!(ai.ai_summary, "摘要:芯片 正文");
        assert_eq!(ai.ai_tag, "热点");
        assert_eq!(ai.original_title, "芯片");
        assert_eq!(out.title, "芯片");
        assert!(input.enrichment.is_none());
    }

    #[test]
    fn enrich_uses_description_when_content_empty() {
        let enricher = enricher_with(ScriptedClient::failing_on("", ""));
        let input = NewsItem {
            title: "t".into(),
            description: "描述".into(),
            ..Default::default()
        };
        let out = enricher.enrich(&input).into_item();
        assert_eq!(out.summary(), Some("摘要:描述"));
    }

    #[test]
    fn failure_on_any_step_discards_whole_enrichment() {
        for step in ["title", "summary", "tag"] {
            let enricher = enricher_with(ScriptedClient::failing_on("boom", step));
            let input = item("boom");
            match enricher.enrich(&input) {
                EnrichOutcome::Failed { item, error } => {
                    assert_eq!(item, input, "step {step}");
                    assert!(error.to_string().contains(step));
                }
                other => panic!("expected failure at {step}, got {other:?}"),
            }
        }
    }

    #[test]
    fn disabled_enricher_skips() {
        let enricher = ContentEnricher::disabled(EnrichmentLimits::default());
        assert!(!enricher.is_enabled());
        let input = item("x");
        assert!(matches!(enricher.enrich(&input), EnrichOutcome::Skipped(ref i) if *i == input));
    }

    #[test]
    fn from_config_disabled_when_not_enabled() {
        let enricher =
            ContentEnricher::from_config(&EnrichmentConfig::default(), &ProviderConfig::default());
        assert!(!enricher.is_enabled());
    }

    #[test]
    fn from_config_disabled_when_client_cannot_start() {
        let enrichment = EnrichmentConfig {
            enabled: true,
            ..Default::default()
        };
        let provider = ProviderConfig {
            api_key_env: "TC_TEST_ENRICHER_MISSING_KEY_4242".into(),
            ..Default::default()
        };
        let enricher = ContentEnricher::from_config(&enrichment, &provider);
        assert!(!enricher.is_enabled());
    }

    #[test]
    fn generated_text_is_truncated_to_limits() {
        let enricher = ContentEnricher::new(
            Box::new(VerboseClient),
            EnrichmentLimits {
                title_length: 30,
                summary_length: 150,
            },
        );
        let out = enricher.enrich(&item("x")).into_item();
        let ai = out.enrichment.expect("enrichment");
        assert_eq!(ai.ai_title.chars().count(), 30);
        assert_eq!(ai.ai_title, format!("{}...", "t".repeat(27)));
        assert_eq!(ai.ai_summary.chars().count(), 150);
        assert!(ai.ai_summary.ends_with("..."));
    }

    #[test]
    fn batch_preserves_length_and_order_through_failures() {
        let enricher = enricher_with(ScriptedClient::failing_on("boom", "summary"));
        let inputs = vec![item("a"), item("boom-1"), item("b"), item("boom-2"), item("c")];

        let report = enricher.enrich_batch(&inputs, &SilentEnrichmentProgress);

        assert_eq!(report.items.len(), inputs.len());
        let titles: Vec<_> = report.items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "boom-1", "b", "boom-2", "c"]);

        assert_eq!(report.enriched, 3);
        assert_eq!(report.failures.len(), 2);
        assert_eq!(report.failures[0].index, 1);
        assert_eq!(report.failures[1].index, 3);
        assert_eq!(report.items[1], inputs[1]);
        assert!(report.items[2].enrichment.is_some());
    }

    #[test]
    fn batch_reports_progress_for_every_item() {
        let enricher = enricher_with(ScriptedClient::failing_on("", ""));
        let inputs: Vec<_> = (0..12).map(|i| item(&format!("n{i}"))).collect();
        let progress = RecordingProgress::default();

        enricher.enrich_batch(&inputs, &progress);

        let calls = progress.calls.lock().unwrap();
        assert_eq!(calls.len(), 12);
        assert_eq!(calls[0], (1, 12));
        assert_eq!(calls[11], (12, 12));
    }

    #[test]
    fn disabled_batch_is_identity() {
        let enricher = ContentEnricher::disabled(EnrichmentLimits::default());
        let inputs = vec![item("a"), item("b")];
        let report = enricher.enrich_batch(&inputs, &SilentEnrichmentProgress);
        assert_eq!(report.items, inputs);
        assert_eq!(report.enriched, 0);
        assert!(report.failures.is_empty());
    }
}
