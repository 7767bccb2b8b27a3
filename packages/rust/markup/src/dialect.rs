//! Standard Markdown → Slack `mrkdwn`.

use std::sync::LazyLock;

use regex::Regex;

/// Translate links and bold to `mrkdwn`; everything else is left as is.
pub fn translate_dialect(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid regex"));
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*]+)\*\*").expect("valid regex"));

    let result = LINK_RE.replace_all(text, "<${2}|${1}>");
    BOLD_RE.replace_all(&result, "*${1}*").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translates_bold_and_links() {
        assert_eq!(
            translate_dialect("**bold** [t](http://x)"),
            "*bold* <http://x|t>"
        );
    }

    #[test]
    fn bold_link_becomes_bold_mrkdwn_link() {
        assert_eq!(
            translate_dialect("**[热榜](https://example.com/hot)**"),
            "*<https://example.com/hot|热榜>*"
        );
    }

    #[test]
    fn other_markup_untouched() {
        let input = "# Heading\n- item with `code` and ~~gone~~\n> quote";
        assert_eq!(translate_dialect(input), input);
    }
}
