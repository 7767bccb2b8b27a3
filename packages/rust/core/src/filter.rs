//! Frequency-word title filtering.
//!
//! File format, one entry per line:
//!
//! ```text
//! # comment
//! 华为          plain word: any one of the group's plain words must appear
//! +发布         required word: must appear
//! !广告         filter word: rejects the title anywhere in the file
//!
//! [GLOBAL_FILTER]
//! 震惊          global filter: rejects before any group is considered
//! [WORD_GROUPS]
//! ```
//!
//! Groups are separated by blank lines. All matching is case-insensitive.

use std::path::Path;

use tracing::{debug, instrument};

use trendcast_shared::{Result, TrendcastError};

/// Decides whether a new title is kept in the report.
pub trait TitleFilter {
    fn matches(&self, title: &str) -> bool;
}

impl<F> TitleFilter for F
where
    F: Fn(&str) -> bool,
{
    fn matches(&self, title: &str) -> bool {
        self(title)
    }
}

/// One blank-line separated group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordGroup {
    pub required: Vec<String>,
    pub normal: Vec<String>,
}

impl WordGroup {
    fn is_empty(&self) -> bool {
        self.required.is_empty() && self.normal.is_empty()
    }

    /// `lowered` must already be lowercase.
    fn accepts(&self, lowered: &str) -> bool {
        let required_ok = self
            .required
            .iter()
            .all(|w| lowered.contains(&w.to_lowercase()));
        let normal_ok = self.normal.is_empty()
            || self
                .normal
                .iter()
                .any(|w| lowered.contains(&w.to_lowercase()));
        required_ok && normal_ok
    }
}

/// Parsed frequency-word configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyWords {
    pub word_groups: Vec<WordGroup>,
    pub filter_words: Vec<String>,
    pub global_filters: Vec<String>,
}

impl TitleFilter for FrequencyWords {
    fn matches(&self, title: &str) -> bool {
        matches_word_groups(
            title,
            &self.word_groups,
            &self.filter_words,
            &self.global_filters,
        )
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Section {
    WordGroups,
    GlobalFilter,
}

/// Parse frequency-word text.
pub fn parse_frequency_words(text: &str) -> FrequencyWords {
    let mut words = FrequencyWords::default();
    let mut section = Section::WordGroups;
    let mut group = WordGroup::default();

    for raw in text.lines() {
        let line = raw.trim();

        if line.starts_with('#') {
            continue;
        }

        match line {
            "" => {
                close_group(&mut group, &mut words);
                continue;
            }
            "[GLOBAL_FILTER]" => {
                close_group(&mut group, &mut words);
                section = Section::GlobalFilter;
                continue;
            }
            "[WORD_GROUPS]" => {
                section = Section::WordGroups;
                continue;
            }
            _ => {}
        }

        if section == Section::GlobalFilter {
            words.global_filters.push(line.to_string());
            continue;
        }

        if let Some(word) = line.strip_prefix('!') {
            push_word(&mut words.filter_words, word);
        } else if let Some(word) = line.strip_prefix('+') {
            push_word(&mut group.required, word);
        } else {
            group.normal.push(line.to_string());
        }
    }
    close_group(&mut group, &mut words);

    words
}

fn close_group(group: &mut WordGroup, words: &mut FrequencyWords) {
    if !group.is_empty() {
        words.word_groups.push(std::mem::take(group));
    }
}

fn push_word(list: &mut Vec<String>, word: &str) {
    let word = word.trim();
    if !word.is_empty() {
        list.push(word.to_string());
    }
}

/// Read and parse a frequency-word file.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_frequency_words(path: &Path) -> Result<FrequencyWords> {
    let text = std::fs::read_to_string(path).map_err(|e| TrendcastError::io(path, e))?;
    let words = parse_frequency_words(&text);

    debug!(
        groups = words.word_groups.len(),
        filter_words = words.filter_words.len(),
        global_filters = words.global_filters.len(),
        "frequency words loaded"
    );

    Ok(words)
}

/// Whether `title` passes the configured groups and filters.
pub fn matches_word_groups(
    title: &str,
    word_groups: &[WordGroup],
    filter_words: &[String],
    global_filters: &[String],
) -> bool {
    let lowered = title.to_lowercase();
    let hit = |w: &String| lowered.contains(&w.to_lowercase());

    if global_filters.iter().any(hit) {
        return false;
    }
    if word_groups.is_empty() {
        return true;
    }
    if filter_words.iter().any(hit) {
        return false;
    }

    word_groups.iter().any(|group| group.accepts(&lowered))
}
