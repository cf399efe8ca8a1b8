// WHY: Document interface tying canonical tokens, word scoring and alignment together
// A scanned text and its candidate queries are the same type with independent policies

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

pub mod aligner;
pub mod classify;
pub mod normalization;
pub mod score;
pub mod tokens;

// Re-export core types
pub use classify::{same_code_point, CodePointClass, NUMERIC_MARKERS};
pub use normalization::{DocumentBuilder, Tokenizer};
pub use score::{same_word, ScorePolicy};
pub use tokens::Tokens;

/// Candidate index -> matched span, only for candidates that matched
pub type Matches = BTreeMap<usize, String>;

/// Prepared text, its word list and the policy used when it acts as a query
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    words: Vec<String>,
    chars: Vec<Vec<char>>,
    policy: ScorePolicy,
}

impl Document {
    /// Document split on single spaces with exact matching
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let words = text.split(' ').map(str::to_string).collect();
        Self::from_parts(text, words, ScorePolicy::default())
    }

    /// Document from an already tokenized word list; the text is the words joined by spaces
    pub fn from_words<S: AsRef<str>>(words: &[S]) -> Self {
        let words: Vec<String> = words.iter().map(|w| w.as_ref().to_string()).collect();
        Self::from_parts(words.join(" "), words, ScorePolicy::default())
    }

    pub(crate) fn from_parts(text: String, words: Vec<String>, policy: ScorePolicy) -> Self {
        let chars = words.iter().map(|w| w.chars().collect()).collect();
        Self { text, words, chars, policy }
    }

    /// Start a preparation pipeline
    pub fn builder() -> DocumentBuilder {
        DocumentBuilder::new()
    }

    /// Replace the scoring policy used when this document is a candidate
    pub fn with_policy(mut self, policy: ScorePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn policy(&self) -> &ScorePolicy {
        &self.policy
    }

    /// Canonical tokens of this document's words
    pub fn tokens(&self) -> Tokens {
        Tokens::canonicalize(&self.words)
    }

    /// Look for this document, acting as a query, inside already canonicalized text.
    /// Returns the matched span as it appears in that text.
    pub fn compare(&self, tokens: &Tokens) -> Option<String> {
        aligner::align(&self.chars, tokens, &self.policy)
    }

    /// Run every candidate against this document. Candidates are independent,
    /// so overlapping spans from different candidates are all reported.
    pub fn scan(&self, candidates: &[Document]) -> Matches {
        let tokens = self.tokens();
        debug!(
            "Scanning {} tokens ({} distinct) against {} candidates",
            tokens.len(),
            tokens.distinct(),
            candidates.len()
        );

        let mut matches = Matches::new();
        for (index, candidate) in candidates.iter().enumerate() {
            if let Some(span) = candidate.compare(&tokens) {
                debug!("Candidate {} matched: {}", index, span);
                matches.insert(index, span);
            }
        }
        matches
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
