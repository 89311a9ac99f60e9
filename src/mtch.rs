/// A single hit: one dictionary word, inflected form, phrase, or approximate
/// match found in the input.
///
/// Positions are code-point indices into the normalized text. With the
/// default length-preserving normalization they are identical to code-point
/// indices into the raw input.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Match {
    /// The dictionary word or phrase that matched, in normalized form.
    pub word: String,
    /// First code point of the span.
    pub start: usize,
    /// Span length in code points. Exact-stage spans cover any ignored
    /// separators between the matched letters.
    pub length: usize,
    /// Code of the language whose dictionary produced the match.
    pub language: String,
}

/// The outcome of [`crate::Detector::detect`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Detection {
    /// True iff at least one match was found.
    pub has_profanity: bool,
    /// Matches in pipeline production order: exact, then phrase, then
    /// approximate. The exact stage reports matches in start-position scan
    /// order.
    pub matches: Vec<Match>,
}
