//! Markdown-to-plain-text normalization.
//!
//! A fixed, ordered table of substitutions strips markup that should not be
//! read aloud. Each rule carries a category; callers disable whole categories
//! up front through [`MarkdownOptions`] and the resulting rule set never
//! changes afterwards.

use regex::Regex;
use std::sync::LazyLock;

/// Text filter applied before chunking.
pub trait Normalizer: Send + Sync {
    /// Turn the raw input into narratable plain text.
    fn normalize(&self, text: &str) -> String;

    /// Name for logging.
    fn name(&self) -> &'static str;
}

/// Normalizer that returns its input unchanged (`--no-clean`).
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNormalizer;

impl Normalizer for IdentityNormalizer {
    fn normalize(&self, text: &str) -> String {
        text.to_string()
    }

    fn name(&self) -> &'static str {
        "identity"
    }
}

/// Group of related substitution rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleCategory {
    /// Fenced blocks, indented blocks, inline code.
    Code,
    /// Images, inline links, reference links.
    Links,
    /// Footnote definitions and references.
    Footnotes,
    /// Headings, rules, quotes, lists, tables.
    Structure,
    /// Bold, italic, strikethrough.
    Emphasis,
    /// Inline HTML tags.
    Html,
    /// Runs of blank lines.
    Whitespace,
}

/// A single named substitution.
#[derive(Debug)]
pub struct Rule {
    pub category: RuleCategory,
    pub name: &'static str,
    pattern: Regex,
    replacement: &'static str,
}

impl Rule {
    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, self.replacement)
            .into_owned()
    }
}

/// Rule table, applied top to bottom.
const RULE_SPECS: &[(RuleCategory, &str, &str, &str)] = &[
    (RuleCategory::Code, "fenced-code", r"(?s)```.*?```", ""),
    (RuleCategory::Code, "indented-code", r"(?m)^    .*$", ""),
    (RuleCategory::Code, "inline-code", r"`([^`]*)`", "${1}"),
    (RuleCategory::Links, "image", r"!\[([^\]]*)\]\([^)]+\)", "${1}"),
    (RuleCategory::Links, "inline-link", r"\[([^\]]+)\]\([^)]+\)", "${1}"),
    (RuleCategory::Links, "reference-link", r"\[([^\]]+)\]\[[^\]]+\]", "${1}"),
    (RuleCategory::Footnotes, "footnote-definition", r"(?m)^\[\^[^\]]+\]:.*$", ""),
    (RuleCategory::Footnotes, "footnote-reference", r"\[\^[^\]]+\]", ""),
    (RuleCategory::Structure, "heading", r"(?m)^#{1,6}\s*", ""),
    (RuleCategory::Structure, "horizontal-rule", r"(?m)^[-*]{3,}$", ""),
    (RuleCategory::Structure, "blockquote", r"(?m)^>\s*", ""),
    (RuleCategory::Structure, "bullet", r"(?m)^[*\-+]\s+", ""),
    (RuleCategory::Structure, "numbered-item", r"(?m)^\d+\.\s+", ""),
    (RuleCategory::Structure, "table-separator", r"(?m)^\|[\s\-|:]+\|$", ""),
    (RuleCategory::Structure, "table-pipe", r"\|", " "),
    (RuleCategory::Emphasis, "bold-asterisk", r"\*\*([^*]+)\*\*", "${1}"),
    (RuleCategory::Emphasis, "bold-underscore", r"__([^_]+)__", "${1}"),
    (RuleCategory::Emphasis, "italic-asterisk", r"\*([^*]+)\*", "${1}"),
    (RuleCategory::Emphasis, "italic-underscore", r"_([^_]+)_", "${1}"),
    (RuleCategory::Emphasis, "strikethrough", r"~~([^~]+)~~", "${1}"),
    (RuleCategory::Html, "html-tag", r"<[^>]+>", ""),
    (RuleCategory::Whitespace, "blank-lines", r"\n{3,}", "\n\n"),
];

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    RULE_SPECS
        .iter()
        .map(|&(category, name, pattern, replacement)| Rule {
            category,
            name,
            // SAFETY: patterns are compile-time constants covered by tests
            #[allow(clippy::expect_used)]
            pattern: Regex::new(pattern).expect("hardcoded markdown pattern"),
            replacement,
        })
        .collect()
});

/// Which rule categories to keep out of the normalizer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Keep `[text](url)` links, images and reference links verbatim.
    pub preserve_links: bool,
    /// Keep `**bold**`, `*italic*` and `~~strike~~` markers verbatim.
    pub preserve_emphasis: bool,
}

impl MarkdownOptions {
    fn disabled(&self) -> Vec<RuleCategory> {
        let mut disabled = Vec::new();
        if self.preserve_links {
            disabled.push(RuleCategory::Links);
        }
        if self.preserve_emphasis {
            disabled.push(RuleCategory::Emphasis);
        }
        disabled
    }
}

/// Rule-based Markdown cleaner.
#[derive(Debug, Clone)]
pub struct MarkdownNormalizer {
    rules: Vec<&'static Rule>,
}

impl MarkdownNormalizer {
    /// Build the rule set once, dropping disabled categories.
    pub fn new(options: MarkdownOptions) -> Self {
        let disabled = options.disabled();
        let rules = RULES
            .iter()
            .filter(|rule| !disabled.contains(&rule.category))
            .collect();
        Self { rules }
    }

    /// Names of the active rules, in application order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }
}

impl Default for MarkdownNormalizer {
    fn default() -> Self {
        Self::new(MarkdownOptions::default())
    }
}

impl Normalizer for MarkdownNormalizer {
    fn normalize(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self
            .rules
            .iter()
            .fold(text.to_string(), |acc, rule| rule.apply(&acc));

        text.split('\n')
            .map(str::trim)
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string()
    }

    fn name(&self) -> &'static str {
        "markdown"
    }
}
