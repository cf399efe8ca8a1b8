// WHY: Code point categories drive every masking decision in the matcher
// Numbers and numeric markers must match verbatim; punctuation may stand in for letters

/// Symbols that behave like numbers when comparing words ("29%", "2x", "1ª", "30°", "2º")
pub const NUMERIC_MARKERS: &[char] = &['%', 'x', 'ª', '°', 'º'];

/// Category of a single code point as seen by the matcher
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CodePointClass {
    Number,
    NumericMarker,
    Letter,
    Other,
}

impl CodePointClass {
    /// Classify a code point. Numeric markers win over letters, so `x` is a marker.
    pub fn of(c: char) -> Self {
        if c.is_numeric() {
            CodePointClass::Number
        } else if is_numeric_marker(c) {
            CodePointClass::NumericMarker
        } else if c.is_alphabetic() {
            CodePointClass::Letter
        } else {
            CodePointClass::Other
        }
    }

    /// Numbers and numeric markers are compared verbatim
    pub fn is_numeric_like(self) -> bool {
        matches!(self, CodePointClass::Number | CodePointClass::NumericMarker)
    }
}

pub fn is_numeric_marker(c: char) -> bool {
    NUMERIC_MARKERS.contains(&c)
}

/// Raw letter-ness, independent of the marker table (`x` is a letter here)
pub fn is_letter(c: char) -> bool {
    c.is_alphabetic()
}

/// Punctuation-like code point: not a number, not a letter, not a numeric marker
pub fn is_special(c: char) -> bool {
    CodePointClass::of(c) == CodePointClass::Other
}

/// Compare a code point observed in the scanned text with the one the query expects.
///
/// The relation is not symmetric: a punctuation mark observed in the text may mask
/// any letter or punctuation of the query, but an observed letter never satisfies
/// expected punctuation, and numbers only ever match themselves.
pub fn same_code_point(observed: char, expected: char) -> bool {
    let observed_class = CodePointClass::of(observed);
    if observed_class.is_numeric_like() {
        return observed == expected;
    }
    if is_letter(observed) && is_letter(expected) {
        return observed == expected;
    }
    if CodePointClass::of(expected).is_numeric_like() {
        return false;
    }
    if is_letter(observed) && !is_letter(expected) {
        return false;
    }
    true
}
