//! Per-channel markup adaptation for outbound notifications.
//!
//! Rendered documents are written in standard Markdown. Some channels render
//! that natively, some need plain text, and Slack speaks its own `mrkdwn`
//! dialect. [`format_for_platform`] picks the right transform for a channel.

mod dialect;
mod strip;

use tracing::debug;

pub use dialect::translate_dialect;
pub use strip::strip_markup;

/// Outbound notification channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Platform {
    Feishu,
    DingTalk,
    WeCom,
    Telegram,
    Bark,
    Ntfy,
    Slack,
    /// Any channel without a dedicated adapter; content passes through.
    Other(String),
}

/// How a channel wants its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkupStyle {
    /// Renders standard Markdown natively.
    Markdown,
    /// Needs plain text.
    Plain,
    /// Needs Slack `mrkdwn`.
    Mrkdwn,
}

impl Platform {
    /// Parse a channel name as used in config files. Never fails.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "feishu" | "lark" => Self::Feishu,
            "dingtalk" => Self::DingTalk,
            "wework" | "wecom" => Self::WeCom,
            "telegram" => Self::Telegram,
            "bark" => Self::Bark,
            "ntfy" => Self::Ntfy,
            "slack" => Self::Slack,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Feishu => "feishu",
            Self::DingTalk => "dingtalk",
            Self::WeCom => "wework",
            Self::Telegram => "telegram",
            Self::Bark => "bark",
            Self::Ntfy => "ntfy",
            Self::Slack => "slack",
            Self::Other(name) => name,
        }
    }

    pub fn markup_style(&self) -> MarkupStyle {
        match self {
            Self::Bark | Self::Ntfy => MarkupStyle::Plain,
            Self::Slack => MarkupStyle::Mrkdwn,
            Self::Feishu | Self::DingTalk | Self::WeCom | Self::Telegram | Self::Other(_) => {
                MarkupStyle::Markdown
            }
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Adapt a rendered document to a channel's markup.
pub fn format_for_platform(content: &str, platform: &Platform) -> String {
    if content.is_empty() {
        return String::new();
    }

    let style = platform.markup_style();
    debug!(platform = %platform, ?style, len = content.len(), "adapting content for platform");

    match style {
        MarkupStyle::Markdown => content.to_string(),
        MarkupStyle::Plain => strip_markup(content),
        MarkupStyle::Mrkdwn => translate_dialect(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "**热点** [链接](https://example.com)";

    #[test]
    fn markdown_channels_pass_through() {
        for name in ["feishu", "dingtalk", "wework", "telegram"] {
            let platform = Platform::from_name(name);
            assert_eq!(format_for_platform(DOC, &platform), DOC, "{name}");
        }
    }

    #[test]
    fn push_channels_get_plain_text() {
        assert_eq!(
            format_for_platform(DOC, &Platform::Bark),
            "热点 链接 https://example.com"
        );
        assert_eq!(
            format_for_platform(DOC, &Platform::from_name("NTFY")),
            "热点 链接 https://example.com"
        );
    }

    #[test]
    fn slack_gets_mrkdwn() {
        assert_eq!(
            format_for_platform(DOC, &Platform::Slack),
            "*热点* <https://example.com|链接>"
        );
    }

    #[test]
    fn unknown_channel_passes_through() {
        let platform = Platform::from_name("email");
        assert_eq!(platform, Platform::Other("email".into()));
        assert_eq!(platform.markup_style(), MarkupStyle::Markdown);
        assert_eq!(format_for_platform(DOC, &platform), DOC);
    }

    #[test]
    fn empty_content_stays_empty() {
        assert_eq!(format_for_platform("", &Platform::Slack), "");
    }

    #[test]
    fn platform_names_roundtrip() {
        for name in ["feishu", "dingtalk", "wework", "telegram", "bark", "ntfy", "slack"] {
            assert_eq!(Platform::from_name(name).name(), name);
        }
    }
}
