//! Markdown-to-plain-text pass pipeline.
//!
//! Each pass is a function `&str -> String` applied in sequence. Image and link
//! passes run before tag stripping so their bracket syntax is still intact.

use std::sync::LazyLock;

use regex::Regex;

/// Strip Markdown and HTML-like markup, leaving readable plain text.
pub fn strip_markup(text: &str) -> String {
    let mut result = text.to_string();

    result = strip_emphasis(&result);
    result = strip_images(&result);
    result = flatten_links(&result);
    result = strip_inline_code(&result);
    result = strip_line_markers(&result);
    result = strip_html(&result);
    result = collapse_blank_lines(&result);

    result.trim().to_string()
}

// ---------------------------------------------------------------------------
// Pass 1: Bold, italic, strikethrough
// ---------------------------------------------------------------------------

/// Unwrap `**x**`, `__x__`, `*x*`, `_x_` and `~~x~~`, in that order.
fn strip_emphasis(text: &str) -> String {
    static BOLD_STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid regex"));
    static BOLD_UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"__(.+?)__").expect("valid regex"));
    static ITALIC_STAR_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*(.+?)\*").expect("valid regex"));
    static ITALIC_UNDERSCORE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"_(.+?)_").expect("valid regex"));
    static STRIKE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"~~(.+?)~~").expect("valid regex"));

    let result = BOLD_STAR_RE.replace_all(text, "$1");
    let result = BOLD_UNDERSCORE_RE.replace_all(&result, "$1");
    let result = ITALIC_STAR_RE.replace_all(&result, "$1");
    let result = ITALIC_UNDERSCORE_RE.replace_all(&result, "$1");
    STRIKE_RE.replace_all(&result, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 2: Images and links
// ---------------------------------------------------------------------------

/// `![alt](url)` → `alt`.
fn strip_images(text: &str) -> String {
    static IMAGE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"!\[(.+?)\]\(.+?\)").expect("valid regex"));

    IMAGE_RE.replace_all(text, "$1").into_owned()
}

/// `[text](url)` → `text url`, keeping the URL readable.
fn flatten_links(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));

    LINK_RE.replace_all(text, "${1} ${2}").into_owned()
}

/// `` `code` `` → `code`.
fn strip_inline_code(text: &str) -> String {
    static CODE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"`(.+?)`").expect("valid regex"));

    CODE_RE.replace_all(text, "$1").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 3: Line-level markers
// ---------------------------------------------------------------------------

/// Drop every leading `>` and `#` marker (nested quotes and stacked headings
/// included), and lines made only of `-`/`*` rules.
fn strip_line_markers(text: &str) -> String {
    static MARKER_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^(?:(?:>|#+)[ \t]*)+").expect("valid regex"));
    static RULE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?m)^[-*]{3,}[ \t]*$").expect("valid regex"));

    let result = MARKER_RE.replace_all(text, "");
    RULE_RE.replace_all(&result, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 4: HTML
// ---------------------------------------------------------------------------

/// Unwrap `<font ...>x</font>`, then remove any remaining tag.
fn strip_html(text: &str) -> String {
    static FONT_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<font[^>]*>(.+?)</font>").expect("valid regex"));
    static TAG_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

    let result = FONT_RE.replace_all(text, "$1");
    TAG_RE.replace_all(&result, "").into_owned()
}

// ---------------------------------------------------------------------------
// Pass 5: Blank lines
// ---------------------------------------------------------------------------

/// Collapse runs of 3+ newlines into exactly 2.
fn collapse_blank_lines(text: &str) -> String {
    static MULTI_BLANK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid regex"));

    MULTI_BLANK_RE.replace_all(text, "\n\n").into_owned()
}
