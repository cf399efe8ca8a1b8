// WHY: Word-level approximate equality under masking, with a pluggable acceptance policy
// Mismatches are tolerated only when a letter is masked by a non-letter (or vice versa)

use std::fmt;
use std::sync::Arc;
use tracing::warn;

use super::classify::{is_letter, same_code_point, CodePointClass};

/// Acceptance function: `(matched_positions, word_length) -> accepted`
pub type ScoreFn = dyn Fn(usize, usize) -> bool + Send + Sync;

/// Policy deciding whether enough positions of a word matched
#[derive(Clone)]
pub enum ScorePolicy {
    /// Accept when `matched * 100 / length >= percent`
    MinimumPercent(u32),
    /// Caller supplied acceptance function
    Custom(Arc<ScoreFn>),
}

impl ScorePolicy {
    /// Percentage policy. Values above 100 can never accept a word, so they fall back to 100.
    pub fn minimum_percent(percent: u32) -> Self {
        if percent > 100 {
            warn!("Minimum match score {} exceeds 100, using exact matching", percent);
            return ScorePolicy::MinimumPercent(100);
        }
        ScorePolicy::MinimumPercent(percent)
    }

    /// Wrap an arbitrary acceptance function
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(usize, usize) -> bool + Send + Sync + 'static,
    {
        ScorePolicy::Custom(Arc::new(f))
    }

    /// Exact matching, every position must agree
    pub fn exact() -> Self {
        ScorePolicy::MinimumPercent(100)
    }

    pub fn accept(&self, matched: usize, length: usize) -> bool {
        match self {
            ScorePolicy::MinimumPercent(percent) => {
                if length == 0 {
                    return true;
                }
                matched * 100 / length >= *percent as usize
            }
            ScorePolicy::Custom(f) => f(matched, length),
        }
    }
}

impl Default for ScorePolicy {
    fn default() -> Self {
        Self::exact()
    }
}

impl fmt::Debug for ScorePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScorePolicy::MinimumPercent(percent) => write!(f, "MinimumPercent({percent})"),
            ScorePolicy::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}

/// Decide whether `observed` (from the scanned text) is probably the word `expected`.
///
/// Words of different length never match. Single code point words defer to
/// [`same_code_point`]. Otherwise every differing position is inspected:
/// an expected number or numeric marker fails the word, as does a letter
/// swapped for another letter (or punctuation for other punctuation). A letter
/// masked by a digit or symbol is tolerated but does not count as matched.
pub fn same_word(observed: &[char], expected: &[char], policy: &ScorePolicy) -> bool {
    if observed.len() == 1 && expected.len() == 1 {
        return same_code_point(observed[0], expected[0]);
    }
    if observed.len() != expected.len() {
        return false;
    }
    if expected.is_empty() {
        return true;
    }

    let mut matched = 0;
    for (&o, &e) in observed.iter().zip(expected) {
        if o == e {
            matched += 1;
            continue;
        }
        if CodePointClass::of(e).is_numeric_like() {
            return false;
        }
        if is_letter(e) == is_letter(o) {
            return false;
        }
    }
    policy.accept(matched, expected.len())
}
