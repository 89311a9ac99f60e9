use crate::Map;
use lazy_static::lazy_static;

lazy_static! {
    /// Characters that visually resemble a letter, mapped to that letter.
    ///
    /// For example, `$` can be read as `s`, so the word `shit` matches
    /// `$hit`.
    static ref CONFUSABLES: Map<char, char> = include_str!("confusables.csv")
        .lines()
        .filter(|line| !line.is_empty())
        .map(|line| {
            let comma = line.find(',').unwrap();
            (
                line[..comma].chars().next().unwrap(),
                line[comma + 1..].chars().next().unwrap(),
            )
        })
        .collect();
}

/// The letter a confusable character stands in for, if any.
pub(crate) fn confusable(src: char) -> Option<char> {
    CONFUSABLES.get(&src).copied()
}
