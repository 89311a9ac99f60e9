use crate::config::DetectionOptions;
use crate::confusables::confusable;
use std::iter::once;
use unicode_normalization::UnicodeNormalization;

/// Snapshot of the configuration fields the normalizer reads.
#[derive(Clone, Debug)]
pub(crate) struct NormalizeOptions {
    pub case_sensitive: bool,
    pub strip_invisible: bool,
    pub strip_diacritics: bool,
    pub confusable_mapping: bool,
    pub use_compat_form: bool,
    pub length_preserving: bool,
}

impl NormalizeOptions {
    pub fn of(d: &DetectionOptions) -> Self {
        Self {
            case_sensitive: d.case_sensitive,
            strip_invisible: d.strip_invisible,
            strip_diacritics: d.strip_diacritics,
            confusable_mapping: d.confusable_mapping,
            use_compat_form: d.use_compat_form,
            length_preserving: d.length_preserving,
        }
    }
}

/// Invisible controls that evade naive filters: zero-width space, non-joiner,
/// joiner, BOM, soft hyphen.
pub(crate) fn is_invisible(c: char) -> bool {
    matches!(
        c,
        '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{00AD}'
    )
}

/// Combining marks removed by diacritic stripping.
fn is_stripped_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
}

/// Normalizes input text to canonical matching form, one `char` per code
/// point.
///
/// When `length_preserving` is set, the output has exactly as many code
/// points as the input and position `i` corresponds to input position `i`;
/// characters that would be removed are substituted with U+0020 instead.
pub(crate) fn normalize(text: &str, opts: &NormalizeOptions) -> Vec<char> {
    if opts.length_preserving {
        return text
            .chars()
            .map(|c| normalize_single(c, opts).unwrap_or(' '))
            .collect();
    }

    let mut out = Vec::with_capacity(text.len());
    if opts.use_compat_form {
        // Whole-string compatibility composition, up front.
        for c in text.chars().nfkc().collect::<Vec<char>>() {
            normalize_multi(c, opts, &mut out);
        }
    } else {
        for c in text.chars() {
            normalize_multi(c, opts, &mut out);
        }
    }
    out
}

/// Normalizes one dictionary word or phrase. Removable characters are
/// dropped rather than spaced out; the decomposition arity matches whatever
/// `normalize` does to scanned text, so a pattern always agrees with its own
/// surface form (a Hangul syllable reduces to its first jamo on both sides,
/// for example).
pub(crate) fn normalize_pattern(word: &str, opts: &NormalizeOptions) -> String {
    if opts.length_preserving {
        word.chars()
            .filter_map(|c| normalize_single(c, opts))
            .collect()
    } else {
        normalize(word, opts).into_iter().collect()
    }
}

/// Single-code-point transform; `None` marks a character with no canonical
/// form left (a stripped invisible, or a bare combining mark).
fn normalize_single(c: char, opts: &NormalizeOptions) -> Option<char> {
    let mut c = fold_case(c, opts);
    if opts.strip_invisible && is_invisible(c) {
        return None;
    }
    if opts.strip_diacritics {
        // Compatibility-decompose the single code point and keep the first
        // base character.
        c = once(c).nfkd().find(|&d| !is_stripped_mark(d))?;
    }
    if opts.confusable_mapping {
        if let Some(mapped) = confusable(c) {
            c = mapped;
        }
    }
    Some(c)
}

/// Free-length transform: zero or more output code points.
fn normalize_multi(c: char, opts: &NormalizeOptions, out: &mut Vec<char>) {
    let push = |c: char, out: &mut Vec<char>| {
        if opts.confusable_mapping {
            if let Some(mapped) = confusable(c) {
                out.push(mapped);
                return;
            }
        }
        out.push(c);
    };

    let emit = |c: char, out: &mut Vec<char>| {
        if opts.strip_invisible && is_invisible(c) {
            return;
        }
        if opts.strip_diacritics {
            for d in once(c).nfkd() {
                if !is_stripped_mark(d) {
                    push(d, out);
                }
            }
        } else {
            push(c, out);
        }
    };

    if opts.case_sensitive {
        emit(c, out);
    } else {
        for lc in c.to_lowercase() {
            emit(lc, out);
        }
    }
}

fn fold_case(c: char, opts: &NormalizeOptions) -> char {
    if opts.case_sensitive {
        c
    } else {
        // The first mapping character suffices for one-to-one output.
        c.to_lowercase().next().unwrap_or(c)
    }
}

/// Word-set build hook for German sharp s: `straße` is also spelled
/// `strasse`, so the expanded surface form becomes an extra entry.
pub(crate) fn eszett_variant(word: &str) -> Option<String> {
    word.contains('ß').then(|| word.replace('ß', "ss"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> NormalizeOptions {
        NormalizeOptions::of(&DetectionOptions::default())
    }

    fn normalized(text: &str) -> String {
        normalize(text, &defaults()).into_iter().collect()
    }

    #[test]
    fn case_folds() {
        assert_eq!(normalized("ShIt"), "shit");
    }

    #[test]
    fn confusables_map() {
        assert_eq!(normalized("sh1t"), "shit");
        assert_eq!(normalized("$#!t"), "s#it");
        assert_eq!(normalized("a55"), "ass");
    }

    #[test]
    fn case_sensitive_skips_folding() {
        let opts = NormalizeOptions {
            case_sensitive: true,
            ..defaults()
        };
        let out: String = normalize("ShIt", &opts).into_iter().collect();
        assert_eq!(out, "ShIt");
    }

    #[test]
    fn invisibles_become_spaces() {
        assert_eq!(normalized("s\u{200B}h\u{200C}i\u{200D}t"), "s h i t");
        assert_eq!(normalized("a\u{FEFF}b\u{00AD}c"), "a b c");
    }

    #[test]
    fn invisibles_drop_without_length_preservation() {
        let opts = NormalizeOptions {
            length_preserving: false,
            ..defaults()
        };
        let out: String = normalize("s\u{200B}h\u{00AD}it", &opts).into_iter().collect();
        assert_eq!(out, "shit");
    }

    #[test]
    fn diacritics_strip() {
        assert_eq!(normalized("café"), "cafe");
        assert_eq!(normalized("naïve"), "naive");
        // Decomposed input: the base stays, the bare mark becomes a space.
        assert_eq!(normalized("cafe\u{0301}"), "cafe ");
    }

    #[test]
    fn length_preservation_holds() {
        for text in [
            "hello",
            "café",
            "s\u{200B}h\u{2001}i\u{200D}t",
            "ﬁle ½ m²",
            "ＦＵＬＬＷＩＤＴＨ",
            "мир",
            "씨발",
            "ばか",
        ] {
            let out = normalize(text, &defaults());
            assert_eq!(out.len(), text.chars().count(), "input {:?}", text);
        }
    }

    #[test]
    fn ligature_keeps_first_base_when_length_preserving() {
        // NFKD of `ﬁ` is `fi`; only the first base survives.
        assert_eq!(normalized("ﬁle"), "fle");
    }

    #[test]
    fn ligature_expands_without_length_preservation() {
        let opts = NormalizeOptions {
            length_preserving: false,
            ..defaults()
        };
        let out: String = normalize("ﬁle", &opts).into_iter().collect();
        assert_eq!(out, "file");
    }

    #[test]
    fn compat_form_composes_up_front() {
        let opts = NormalizeOptions {
            length_preserving: false,
            use_compat_form: true,
            ..defaults()
        };
        let out: String = normalize("ＨＥＬＬＯ", &opts).into_iter().collect();
        assert_eq!(out, "hello");
    }

    #[test]
    fn patterns_drop_removable_characters() {
        let opts = defaults();
        assert_eq!(normalize_pattern("\u{200B}\u{00AD}", &opts), "");
        assert_eq!(normalize_pattern("Sh1t", &opts), "shit");
        assert_eq!(normalize_pattern("café", &opts), "cafe");
    }

    #[test]
    fn patterns_agree_with_scanned_text() {
        // Scripts whose code points decompose into several survivors must
        // reduce identically on the pattern and the text side.
        let opts = defaults();
        for word in ["씨발", "ばか", "ёлки", "scheiße"] {
            let pattern = normalize_pattern(word, &opts);
            let text: String = normalize(word, &opts).into_iter().collect();
            assert_eq!(pattern, text, "word {:?}", word);
        }
    }

    #[test]
    fn eszett_variants() {
        assert_eq!(eszett_variant("straße"), Some("strasse".to_owned()));
        assert_eq!(eszett_variant("scheiße"), Some("scheisse".to_owned()));
        assert_eq!(eszett_variant("strasse"), None);
    }
}
