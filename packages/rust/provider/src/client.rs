//! OpenAI-compatible chat completions client (blocking).

use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use url::Url;

use trendcast_shared::{Result, TrendcastError};

use crate::{EnrichmentClient, clip_chars};

/// User-Agent string for provider requests.
const USER_AGENT: &str = concat!("Trendcast/", env!("CARGO_PKG_VERSION"));

/// How much of the source text each prompt sees.
const TITLE_CONTEXT_CHARS: usize = 500;
const SUMMARY_CONTEXT_CHARS: usize = 1000;
const TAG_CONTEXT_CHARS: usize = 300;

/// Max characters of an error body quoted back in errors.
const ERROR_BODY_PREVIEW: usize = 200;

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct Message {
    #[serde(default)]
    content: Option<String>,
}

/// Sampling settings for one kind of generation.
#[derive(Debug, Clone, Copy)]
struct Sampling {
    max_tokens: u32,
    temperature: f32,
}

const TITLE_SAMPLING: Sampling = Sampling {
    max_tokens: 100,
    temperature: 0.8,
};
const SUMMARY_SAMPLING: Sampling = Sampling {
    max_tokens: 200,
    temperature: 0.7,
};
const TAG_SAMPLING: Sampling = Sampling {
    max_tokens: 50,
    temperature: 0.6,
};

/// Blocking client for `POST {base_url}/chat/completions`.
pub struct ChatCompletionClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl fmt::Debug for ChatCompletionClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatCompletionClient")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .finish()
    }
}

impl ChatCompletionClient {
    /// Build a client. Must not be called from inside an async runtime.
    pub fn new(api_key: &str, base_url: &str, model: &str, timeout_secs: u64) -> Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| TrendcastError::config(format!("invalid provider base_url '{base_url}': {e}")))?;
        let endpoint = format!("{}/chat/completions", base.as_str().trim_end_matches('/'));

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| TrendcastError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint,
            api_key: api_key.to_string(),
            model: model.to_string(),
        })
    }

    /// Send a single-message chat request and return the trimmed reply.
    #[instrument(skip(self, prompt), fields(model = %self.model))]
    fn complete(&self, prompt: &str, sampling: Sampling) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: sampling.max_tokens,
            temperature: sampling.temperature,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .map_err(|e| TrendcastError::Network(format!("{}: {e}", self.endpoint)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(TrendcastError::Provider(format!(
                "HTTP {status}: {}",
                clip_chars(&body, ERROR_BODY_PREVIEW)
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .map_err(|e| TrendcastError::Provider(format!("invalid completion response: {e}")))?;

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(TrendcastError::Provider("empty completion".into()));
        }

        debug!(chars = text.chars().count(), "completion received");
        Ok(text)
    }
}

impl EnrichmentClient for ChatCompletionClient {
    fn name(&self) -> &str {
        &self.model
    }

    fn generate_title(
        &self,
        content: &str,
        original_title: &str,
        max_length: usize,
    ) -> Result<String> {
        let prompt = format!(
            "请为下面这条新闻拟一个不超过{max_length}字的标题。\n\
             要求：突出核心关键词，简洁有力，适合作为短视频标题，只输出标题本身。\n\n\
             原标题：{original_title}\n\
             内容：{}\n\n\
             标题：",
            clip_chars(content, TITLE_CONTEXT_CHARS)
        );
        self.complete(&prompt, TITLE_SAMPLING)
    }

    fn generate_summary(&self, content: &str, title: &str, max_length: usize) -> Result<String> {
        let prompt = format!(
            "请为下面这条新闻写一段不超过{max_length}字的摘要。\n\
             要求：提炼核心信息，语言口语化、适合视频播报，不要出现“据报道”“消息称”之类的套话。\n\n\
             标题：{title}\n\
             内容：{}\n\n\
             摘要：",
            clip_chars(content, SUMMARY_CONTEXT_CHARS)
        );
        self.complete(&prompt, SUMMARY_SAMPLING)
    }

    fn generate_tag(&self, content: &str, title: &str) -> Result<String> {
        let prompt = format!(
            "请为下面这条新闻给出1个话题标签，3到8个字，只输出标签文字，不要带#号。\n\n\
             标题：{title}\n\
             内容：{}\n\n\
             标签：",
            clip_chars(content, TAG_CONTEXT_CHARS)
        );
        let tag = self.complete(&prompt, TAG_SAMPLING)?;
        let tag = tag.replace('#', "").trim().to_string();
        if tag.is_empty() {
            return Err(TrendcastError::Provider("tag completion was only '#'".into()));
        }
        Ok(tag)
    }
}
