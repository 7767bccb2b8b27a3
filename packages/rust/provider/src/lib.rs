//! Text-generation service boundary.
//!
//! [`EnrichmentClient`] is the three-operation interface the enricher talks
//! to. [`ChatCompletionClient`] implements it against any OpenAI-compatible
//! chat completions endpoint (Zhipu GLM by default). Clients fail with an error
//! rather than falling back; fallback policy belongs to the caller.

mod client;

use tracing::{error, info};

use trendcast_shared::{EnrichmentConfig, ProviderConfig, Result, TrendcastError, validate_api_key};

pub use client::ChatCompletionClient;

/// Marker appended to text cut by [`truncate_generated`].
pub const ELLIPSIS: &str = "...";

/// Generates short titles, summaries and tags for a news item.
pub trait EnrichmentClient: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// A catchy title of at most `max_length` characters.
    fn generate_title(&self, content: &str, original_title: &str, max_length: usize)
    -> Result<String>;

    /// A summary of at most `max_length` characters.
    fn generate_summary(&self, content: &str, title: &str, max_length: usize) -> Result<String>;

    /// A single topic tag, without a leading `#`.
    fn generate_tag(&self, content: &str, title: &str) -> Result<String>;
}

/// Build the configured client.
///
/// Fails when the provider is unknown, the API key env var is empty, or the
/// base URL does not parse.
pub fn build_client(
    enrichment: &EnrichmentConfig,
    provider: &ProviderConfig,
) -> Result<Box<dyn EnrichmentClient>> {
    match enrichment.provider.as_str() {
        "zhipu" | "openai" => {
            let api_key = validate_api_key(provider)?;
            let client = ChatCompletionClient::new(
                &api_key,
                &provider.base_url,
                &provider.model,
                provider.timeout_secs,
            )?;
            info!(provider = %enrichment.provider, model = %provider.model, "enrichment client ready");
            Ok(Box::new(client))
        }
        other => {
            error!(provider = other, "unsupported enrichment provider");
            Err(TrendcastError::config(format!(
                "unsupported enrichment provider '{other}': expected 'zhipu' or 'openai'"
            )))
        }
    }
}

/// Cut generated text that exceeds `max_length` characters to
/// `max_length - 3` characters plus [`ELLIPSIS`]. Budgets too small to hold
/// the ellipsis get a plain cut.
pub fn truncate_generated(text: &str, max_length: usize) -> String {
    if text.chars().count() <= max_length {
        return text.to_string();
    }
    if max_length <= ELLIPSIS.len() {
        return clip_chars(text, max_length).to_string();
    }

    let keep = max_length.saturating_sub(ELLIPSIS.len());
    let mut truncated: String = text.chars().take(keep).collect();
    truncated.push_str(ELLIPSIS);
    truncated
}

/// First `max_chars` characters of `text`, on a char boundary.
pub(crate) fn clip_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate_generated("short", 30), "short");
        let exact = "a".repeat(30);
        assert_eq!(truncate_generated(&exact, 30), exact);
    }

    #[test]
    fn truncate_long_title_to_budget() {
        let title = "x".repeat(40);
        let result = truncate_generated(&title, 30);
        assert_eq!(result.chars().count(), 30);
        assert_eq!(result, format!("{}...", "x".repeat(27)));
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let title = "人工智能".repeat(10);
        let result = truncate_generated(&title, 10);
        assert_eq!(result, "人工智能人工智...");
        assert_eq!(result.chars().count(), 10);
    }

    #[test]
    fn truncate_tiny_budget_never_exceeds_it() {
        assert_eq!(truncate_generated("人工智能", 2), "人工");
        assert_eq!(truncate_generated("abcdef", 3), "abc");
        assert_eq!(truncate_generated("abcdef", 0), "");
        for budget in 0..=5 {
            let result = truncate_generated("人工智能大模型", budget);
            assert!(result.chars().count() <= budget, "budget {budget}: {result}");
        }
    }

    #[test]
    fn clip_chars_respects_boundaries() {
        assert_eq!(clip_chars("芯片发布会", 2), "芯片");
        assert_eq!(clip_chars("abc", 10), "abc");
        assert_eq!(clip_chars("", 3), "");
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let enrichment = EnrichmentConfig {
            provider: "mystery".into(),
            ..Default::default()
        };
        let result = build_client(&enrichment, &ProviderConfig::default());
        assert!(matches!(result, Err(TrendcastError::Config { .. })));
    }

    #[test]
    fn missing_api_key_is_rejected() {
        let provider = ProviderConfig {
            api_key_env: "TC_TEST_PROVIDER_MISSING_KEY_98765".into(),
            ..Default::default()
        };
        let result = build_client(&EnrichmentConfig::default(), &provider);
        let err = result.err().expect("missing key must fail");
        assert!(err.to_string().contains("TC_TEST_PROVIDER_MISSING_KEY_98765"));
    }
}
