// WHY: Canonical token table for a word list, built once per scan and shared read-only
// Leading/trailing punctuation is peeled into its own tokens so masked words still align

use std::collections::HashMap;

/// Dense token table plus the ordered sequence of identifiers referencing it.
///
/// Identifiers are handed out in first-seen order starting at 0. The sequence
/// holds one identifier per position after punctuation peeling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tokens {
    table: Vec<Vec<char>>,
    lookup: HashMap<Vec<char>, usize>,
    sequence: Vec<usize>,
}

impl Tokens {
    /// Canonicalize a word list into a token table and sequence
    pub fn canonicalize<S: AsRef<str>>(words: &[S]) -> Self {
        let mut tokens = Tokens::default();
        for word in words {
            let chars: Vec<char> = word.as_ref().chars().collect();
            let (leading, core, trailing) = peel_punctuation(&chars);
            for &c in leading {
                tokens.push(&[c]);
            }
            tokens.push(core);
            for &c in trailing {
                tokens.push(&[c]);
            }
        }
        tokens
    }

    fn push(&mut self, word: &[char]) {
        let id = match self.lookup.get(word) {
            Some(&id) => id,
            None => {
                let id = self.table.len();
                self.table.push(word.to_vec());
                self.lookup.insert(word.to_vec(), id);
                id
            }
        };
        self.sequence.push(id);
    }

    /// Number of positions in the sequence
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Number of distinct words in the table
    pub fn distinct(&self) -> usize {
        self.table.len()
    }

    /// Identifiers in position order
    pub fn ids(&self) -> &[usize] {
        &self.sequence
    }

    /// Canonical word registered under `id`
    pub fn word(&self, id: usize) -> Option<&[char]> {
        self.table.get(id).map(Vec::as_slice)
    }

    /// Word at sequence position `position`
    pub fn at(&self, position: usize) -> Option<&[char]> {
        self.sequence
            .get(position)
            .map(|&id| self.table[id].as_slice())
    }

    /// Words in sequence order
    pub fn iter(&self) -> impl Iterator<Item = &[char]> + '_ {
        self.sequence.iter().map(move |&id| self.table[id].as_slice())
    }

    /// Replay the sequence, single space between positions
    pub fn flatten(&self) -> String {
        let mut out = String::new();
        for (i, word) in self.iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            out.extend(word.iter());
        }
        out
    }
}

/// Peelable code points: neither letters nor numbers
fn is_peelable(c: char) -> bool {
    !(c.is_alphabetic() || c.is_numeric())
}

/// Split a word into leading punctuation, core and trailing punctuation.
/// A word with no letter or number at all is returned whole as the core.
fn peel_punctuation(word: &[char]) -> (&[char], &[char], &[char]) {
    let Some(start) = word.iter().position(|&c| !is_peelable(c)) else {
        return (&[], word, &[]);
    };
    // a non-peelable code point exists, so rposition always finds one
    let end = word
        .iter()
        .rposition(|&c| !is_peelable(c))
        .map_or(word.len(), |i| i + 1);
    (&word[..start], &word[start..end], &word[end..])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_of(tokens: &Tokens, word: &str) -> Option<usize> {
        let chars: Vec<char> = word.chars().collect();
        tokens.lookup.get(&chars).copied()
    }

    fn words_of(tokens: &Tokens) -> Vec<String> {
        tokens.iter().map(|w| w.iter().collect()).collect()
    }

    #[test]
    fn test_duplicate_words_share_identifier() {
        let tokens = Tokens::canonicalize(&["a", "b", "a"]);
        assert_eq!(tokens.ids(), &[0, 1, 0]);
        assert_eq!(tokens.distinct(), 2);
        assert_eq!(id_of(&tokens, "a"), Some(0));
        assert_eq!(id_of(&tokens, "b"), Some(1));
        assert_eq!(id_of(&tokens, "c"), None);
    }

    #[test]
    fn test_punctuation_is_peeled_in_position_order() {
        let tokens = Tokens::canonicalize(&["comida:", ".gostosa"]);
        assert_eq!(words_of(&tokens), vec!["comida", ":", ".", "gostosa"]);
        assert_eq!(tokens.ids(), &[0, 1, 2, 3]);
        assert_eq!(tokens.word(0), Some(&['c', 'o', 'm', 'i', 'd', 'a'][..]));
    }

    #[test]
    fn test_trailing_run_keeps_original_order() {
        let tokens = Tokens::canonicalize(&["wow?!", "(x)"]);
        assert_eq!(words_of(&tokens), vec!["wow", "?", "!", "(", "x", ")"]);
    }

    #[test]
    fn test_repeated_punctuation_reuses_identifier() {
        let tokens = Tokens::canonicalize(&[".cocaina."]);
        assert_eq!(words_of(&tokens), vec![".", "cocaina", "."]);
        assert_eq!(tokens.ids(), &[0, 1, 0]);
    }

    #[test]
    fn test_punctuation_only_word_stays_whole() {
        let tokens = Tokens::canonicalize(&["!!", "ok"]);
        assert_eq!(words_of(&tokens), vec!["!!", "ok"]);
    }

    #[test]
    fn test_empty_word_is_kept() {
        let tokens = Tokens::canonicalize(&["coca", "", "cola"]);
        assert_eq!(words_of(&tokens), vec!["coca", "", "cola"]);
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_percent_is_peeled_but_markers_that_are_letters_stay() {
        let tokens = Tokens::canonicalize(&["29%", "2x", "1º"]);
        assert_eq!(words_of(&tokens), vec!["29", "%", "2x", "1º"]);
    }

    #[test]
    fn test_flatten_reproduces_words_when_nothing_is_peeled() {
        let words = ["atibaia", "boa", "vida"];
        let tokens = Tokens::canonicalize(&words);
        assert_eq!(tokens.flatten(), "atibaia boa vida");
    }

    #[test]
    fn test_flatten_reproduces_original_characters() {
        let cases: &[&[&str]] = &[
            &["comida:", ".gostosa"],
            &["un!", "lever"],
            &["¿qué?", "--", "", "fim."],
            &["a", "b", "a"],
            &[],
        ];
        for words in cases {
            let tokens = Tokens::canonicalize(*words);
            let replayed: String = tokens.flatten().chars().filter(|&c| c != ' ').collect();
            assert_eq!(replayed, words.concat(), "replay mismatch for {words:?}");
        }
    }

    #[test]
    fn test_empty_input() {
        let tokens = Tokens::canonicalize::<&str>(&[]);
        assert!(tokens.is_empty());
        assert_eq!(tokens.at(0), None);
        assert_eq!(tokens.flatten(), "");
    }
}
