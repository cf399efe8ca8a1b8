// WHY: Text preparation ahead of matching, kept apart so the matching core stays pure
// Steps run in insertion order so callers control how HTML, case and accents interact

use std::io::Read;

use anyhow::{Context, Result};
use regex_automata::meta::Regex;
use scraper::Html;
use unicode_categories::UnicodeCategories;
use unicode_normalization::UnicodeNormalization;

use super::{Document, ScorePolicy};

/// One preparation step applied to the whole text
#[derive(Debug, Clone)]
pub enum PrepareStep {
    ParseHtml,
    FoldDiacritics,
    Lowercase,
    Uppercase,
    CollapseRepeats,
    Replace { pattern: Regex, replacement: String },
}

impl PrepareStep {
    pub fn apply(&self, text: &str) -> String {
        match self {
            PrepareStep::ParseHtml => html_text(text),
            PrepareStep::FoldDiacritics => fold_diacritics(text),
            PrepareStep::Lowercase => text.to_lowercase(),
            PrepareStep::Uppercase => text.to_uppercase(),
            PrepareStep::CollapseRepeats => collapse_repeats(text),
            PrepareStep::Replace { pattern, replacement } => replace_all(pattern, text, replacement),
        }
    }
}

/// How prepared text is cut into words
#[derive(Debug, Clone, Default)]
pub enum Tokenizer {
    /// Split on every single space, keeping empty words
    #[default]
    Spaces,
    /// Split on every match of the pattern, dropping empty words
    Regex(Regex),
    /// Remove all whitespace, the whole text becomes one word
    Joined,
}

impl Tokenizer {
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        match self {
            Tokenizer::Spaces => text.split(' ').map(str::to_string).collect(),
            Tokenizer::Regex(pattern) => split_regex(pattern, text),
            Tokenizer::Joined => vec![text.chars().filter(|c| !c.is_whitespace()).collect()],
        }
    }
}

/// Preparation recipe producing [`Document`]s.
/// The same builder can prepare any number of texts.
#[derive(Debug, Clone, Default)]
pub struct DocumentBuilder {
    steps: Vec<PrepareStep>,
    tokenizer: Tokenizer,
    policy: ScorePolicy,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(mut self, step: PrepareStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Keep only the text nodes of an HTML document
    pub fn parse_html(self) -> Self {
        self.step(PrepareStep::ParseHtml)
    }

    /// Strip accents: "cocaína" becomes "cocaina"
    pub fn fold_diacritics(self) -> Self {
        self.step(PrepareStep::FoldDiacritics)
    }

    pub fn lowercase(self) -> Self {
        self.step(PrepareStep::Lowercase)
    }

    pub fn uppercase(self) -> Self {
        self.step(PrepareStep::Uppercase)
    }

    /// Collapse runs of a repeated code point, numbers excepted
    pub fn collapse_repeats(self) -> Self {
        self.step(PrepareStep::CollapseRepeats)
    }

    /// Replace every match of `pattern` with `replacement`
    pub fn replace(self, pattern: &str, replacement: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid replace pattern: {}", pattern))?;
        Ok(self.step(PrepareStep::Replace {
            pattern,
            replacement: replacement.to_string(),
        }))
    }

    pub fn tokenizer(mut self, tokenizer: Tokenizer) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    /// Split words on matches of `pattern` instead of single spaces
    pub fn split_regex(self, pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern)
            .with_context(|| format!("Invalid split pattern: {}", pattern))?;
        Ok(self.tokenizer(Tokenizer::Regex(pattern)))
    }

    /// Treat the whole text as a single word
    pub fn joined(self) -> Self {
        self.tokenizer(Tokenizer::Joined)
    }

    pub fn policy(mut self, policy: ScorePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Minimum percentage of matching positions per word
    pub fn min_score(self, percent: u32) -> Self {
        self.policy(ScorePolicy::minimum_percent(percent))
    }

    /// Custom acceptance function `(matched, length) -> bool`
    pub fn score_fn<F>(self, f: F) -> Self
    where
        F: Fn(usize, usize) -> bool + Send + Sync + 'static,
    {
        self.policy(ScorePolicy::custom(f))
    }

    pub fn steps(&self) -> &[PrepareStep] {
        &self.steps
    }

    /// Run every step over `text`
    pub fn prepare(&self, text: &str) -> String {
        let mut prepared = text.to_string();
        for step in &self.steps {
            prepared = step.apply(&prepared);
        }
        prepared
    }

    pub fn build(&self, text: &str) -> Document {
        let prepared = self.prepare(text);
        let words = self.tokenizer.tokenize(&prepared);
        Document::from_parts(prepared, words, self.policy.clone())
    }

    pub fn build_from_reader<R: Read>(&self, mut reader: R) -> Result<Document> {
        let mut text = String::new();
        reader
            .read_to_string(&mut text)
            .context("Failed to read document text")?;
        Ok(self.build(&text))
    }
}

/// Concatenated text nodes of an HTML document
pub fn html_text(text: &str) -> String {
    Html::parse_document(text).root_element().text().collect()
}

/// Canonical decomposition, drop nonspacing marks, recompose
pub fn fold_diacritics(text: &str) -> String {
    text.nfd().filter(|c| !c.is_mark_nonspacing()).nfc().collect()
}

pub fn collapse_repeats(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous: Option<char> = None;
    for c in text.chars() {
        if previous == Some(c) && !c.is_numeric() {
            continue;
        }
        out.push(c);
        previous = Some(c);
    }
    out
}

pub fn replace_all(pattern: &Regex, text: &str, replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for m in pattern.find_iter(text) {
        out.push_str(&text[last..m.start()]);
        out.push_str(replacement);
        last = m.end();
    }
    out.push_str(&text[last..]);
    out
}

pub fn split_regex(pattern: &Regex, text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut last = 0;
    for m in pattern.find_iter(text) {
        if m.start() > last {
            words.push(text[last..m.start()].to_string());
        }
        last = m.end();
    }
    if last < text.len() {
        words.push(text[last..].to_string());
    }
    words
}
