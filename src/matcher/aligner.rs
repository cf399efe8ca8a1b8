// WHY: Two-phase alignment of a query's words against the canonical tokens of scanned text
// Positional matching handles 1:1 words; reconstruction handles words split or merged by whitespace

use tracing::trace;

use super::score::{same_word, ScorePolicy};
use super::tokens::Tokens;
use super::classify::is_special;

/// Find `words` inside `tokens` and return the matched span.
///
/// Positional alignment is attempted first. When it fails its partial span is
/// discarded and the reconstruction fallback decides the result. A query
/// without any code point never matches.
pub fn align(words: &[Vec<char>], tokens: &Tokens, policy: &ScorePolicy) -> Option<String> {
    if words.iter().all(|w| w.is_empty()) {
        return None;
    }
    if let Some(span) = align_positional(words, tokens, policy) {
        trace!("Positional alignment matched {} words", words.len());
        return Some(span);
    }
    let span = align_reconstructive(words, tokens, policy);
    trace!("Reconstructive alignment result: {:?}", span);
    span
}

/// Phase A: every query word must match a token, the first one anywhere and
/// each following one at the very next position.
pub fn align_positional(words: &[Vec<char>], tokens: &Tokens, policy: &ScorePolicy) -> Option<String> {
    let mut cursor: Option<usize> = None;
    let mut pieces: Vec<&[char]> = Vec::with_capacity(words.len());

    for word in words {
        let (position, token) = match cursor {
            None => tokens
                .iter()
                .enumerate()
                .find(|(_, token)| same_word(token, word, policy))?,
            Some(position) => {
                let token = tokens.at(position)?;
                if !same_word(token, word, policy) {
                    trace!("Positional alignment broke at position {}", position);
                    return None;
                }
                (position, token)
            }
        };
        pieces.push(token);
        cursor = Some(position + 1);
    }

    if pieces.is_empty() {
        return None;
    }
    Some(join_spaced(&pieces))
}

/// Pieces accepted so far while tiling the flattened query, with the count of
/// leading single punctuation pieces that may be rolled back.
#[derive(Debug, Default)]
pub struct Tiling<'t> {
    pieces: Vec<&'t [char]>,
    special_run: usize,
}

impl<'t> Tiling<'t> {
    /// Record a matched token. `opens_at_start` is true when a single code point
    /// window was matched at the start of the flattened query.
    pub fn push(&mut self, token: &'t [char], opens_at_start: bool) {
        let starts_special = token.first().is_some_and(|&c| is_special(c));
        if opens_at_start {
            if starts_special {
                self.special_run += 1;
            }
        } else if self.special_run > 0 {
            if starts_special {
                self.special_run += 1;
            } else {
                self.special_run = 0;
            }
        }
        self.pieces.push(token);
    }

    /// Drop the provisional leading punctuation run. Returns false when there is nothing to undo.
    pub fn rollback_specials(&mut self) -> bool {
        if self.special_run == 0 {
            return false;
        }
        let drop = self.special_run.min(self.pieces.len());
        self.pieces.drain(..drop);
        self.special_run = 0;
        true
    }

    pub fn reset(&mut self) {
        self.pieces.clear();
        self.special_run = 0;
    }

    /// Pieces concatenated without separators
    pub fn joined(&self) -> Vec<char> {
        self.pieces.iter().flat_map(|p| p.iter().copied()).collect()
    }

    /// Pieces separated by single spaces
    pub fn spaced(&self) -> String {
        join_spaced(&self.pieces)
    }
}

/// Phase B: tile the query's code points, concatenated without separators, with
/// consecutive tokens of the scanned text.
///
/// Every token is compared against the window of its own length anchored at the
/// consumption cursor. A mismatch or a token longer than the rest of the query
/// clears the tiling and moves on to the next token. The only retry is after
/// rolling back a leading run of single punctuation pieces.
pub fn align_reconstructive(words: &[Vec<char>], tokens: &Tokens, policy: &ScorePolicy) -> Option<String> {
    let value: Vec<char> = words.iter().flatten().copied().collect();
    if value.is_empty() {
        return None;
    }

    let mut tiling = Tiling::default();
    let mut start_at = 0;

    for token in tokens.iter() {
        loop {
            let width = token.len();
            let exhausted = width == 0 || width > value.len() - start_at;
            if exhausted || !same_word(token, &value[start_at..start_at + width], policy) {
                start_at = 0;
                if !exhausted && tiling.rollback_specials() {
                    trace!("Rolled back leading punctuation, retrying token");
                    continue;
                }
                tiling.reset();
                break;
            }

            tiling.push(token, width == 1 && start_at == 0);
            start_at += width;
            if start_at == value.len() {
                if !same_word(&tiling.joined(), &value, policy) {
                    trace!("Tiling rejected by whole-query check");
                    return None;
                }
                return Some(tiling.spaced());
            }
            break;
        }
    }
    None
}

fn join_spaced(pieces: &[&[char]]) -> String {
    let mut out = String::new();
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.extend(piece.iter());
    }
    out
}
