//! Text analyzer: entity extraction plus token and character inventories.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, instrument};

use crate::analyzers::patterns::{find_emails, find_phones};
use crate::analyzers::{FileAnalyzer, FileFormat};
use crate::config::SummaryConfig;
use crate::error::Result;
use crate::sources;
use crate::summary::{Summary, TextSummary};

/// Analyzer for line-oriented UTF-8 text.
#[derive(Debug, Clone, Default)]
pub struct TextAnalyzer {
    max_file_size: Option<u64>,
}

impl TextAnalyzer {
    /// Creates a text analyzer without a file size limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a text analyzer from the shared configuration.
    pub fn from_config(config: &SummaryConfig) -> Self {
        Self {
            max_file_size: config.max_file_size,
        }
    }
}

#[async_trait]
impl FileAnalyzer for TextAnalyzer {
    fn format(&self) -> FileFormat {
        FileFormat::Text
    }

    fn name(&self) -> &str {
        "text"
    }

    fn description(&self) -> &str {
        "Extracts emails and phone numbers and inventories the remaining tokens"
    }

    #[instrument(skip(self), fields(analyzer = "text", path = %path.display()))]
    async fn summarize(&self, path: &Path) -> Result<Summary> {
        let content = sources::read_to_string(path, self.max_file_size).await?;
        let summary = summarize_text(&content);

        info!(
            lines = summary.row_count,
            tokens = summary.unique_values.len(),
            emails = summary.emails.len(),
            phones = summary.phones.len(),
            "Text summary computed"
        );
        Ok(Summary::Text(summary))
    }
}

/// Summarizes text already held in memory.
///
/// Lines keep their terminators and are joined with single spaces before
/// matching. A token is dropped when it occurs inside any matched phone
/// number, so short numeric tokens such as `555` disappear from the
/// inventory even where they stand alone.
pub fn summarize_text(content: &str) -> TextSummary {
    let normalized = content.replace("\r\n", "\n").replace('\r', "\n");
    let lines: Vec<&str> = normalized.split_inclusive('\n').collect();
    let blob = lines.join(" ");

    let emails = find_emails(&blob);
    let phones = find_phones(&blob);

    let tokens: BTreeSet<&str> = blob
        .split_whitespace()
        .filter(|token| !phones.iter().any(|phone| phone.contains(token)))
        .filter(|token| !emails.iter().any(|email| email == token))
        .collect();

    let characters: BTreeSet<char> = tokens.iter().flat_map(|token| token.chars()).collect();
    let unique_characters = characters
        .iter()
        .map(char::to_string)
        .collect::<Vec<_>>()
        .join(" ");

    TextSummary {
        row_count: lines.len(),
        unique_values: tokens.into_iter().map(str::to_string).collect(),
        unique_characters,
        emails,
        phones,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entities_are_excluded_from_tokens() {
        let summary = summarize_text("Contact me at a@b.com or 555 123 456");

        assert_eq!(summary.row_count, 1);
        assert_eq!(summary.emails, vec!["a@b.com"]);
        assert_eq!(summary.phones, vec!["555 123 456"]);
        assert_eq!(summary.unique_values, vec!["Contact", "at", "me", "or"]);
        assert_eq!(summary.unique_characters, "C a c e m n o r t");
    }

    #[test]
    fn test_line_counting() {
        assert_eq!(summarize_text("").row_count, 0);
        assert_eq!(summarize_text("one").row_count, 1);
        assert_eq!(summarize_text("one\n").row_count, 1);
        assert_eq!(summarize_text("one\ntwo").row_count, 2);
        assert_eq!(summarize_text("one\r\ntwo\rthree\n").row_count, 3);
    }

    #[test]
    fn test_phone_fragments_are_over_excluded() {
        // "5" stands alone but is a substring of the matched phone
        let summary = summarize_text("5 items, call 555123456");
        assert_eq!(summary.phones, vec!["555123456"]);
        assert_eq!(summary.unique_values, vec!["call", "items,"]);
    }

    #[test]
    fn test_email_must_match_exactly() {
        let summary = summarize_text("mail a@b.com, now");
        assert_eq!(summary.emails, vec!["a@b.com"]);
        // trailing comma keeps the token distinct from the match
        assert!(summary.unique_values.contains(&"a@b.com,".to_string()));
    }

    #[test]
    fn test_entities_keep_duplicates_in_order() {
        let summary = summarize_text("x@y.org\nz@w.io\nx@y.org\n");
        assert_eq!(summary.emails, vec!["x@y.org", "z@w.io", "x@y.org"]);
        assert!(summary.unique_values.is_empty());
        assert_eq!(summary.unique_characters, "");
    }

    #[test]
    fn test_tokens_are_sorted_and_deduplicated() {
        let summary = summarize_text("b a b\nA");
        assert_eq!(summary.unique_values, vec!["A", "a", "b"]);
        assert_eq!(summary.unique_characters, "A a b");
    }
}
