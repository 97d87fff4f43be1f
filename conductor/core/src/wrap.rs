//! Random word-group line wrapping
//!
//! Text is broken into lines of one to four words, the count drawn fresh for
//! each line. With a seeded RNG the result is deterministic.

use rand::Rng;

/// Largest number of words placed on one line
pub const MAX_WORDS_PER_LINE: usize = 4;

/// Group consecutive words into lines of 1..=4 words
///
/// Joining the returned lines with single spaces reproduces the input words
/// in order. An empty slice yields no lines.
pub fn wrap_into_lines<S, R>(words: &[S], rng: &mut R) -> Vec<String>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    let mut lines = Vec::new();
    let mut rest = words;

    while !rest.is_empty() {
        let take = rng.gen_range(1..=MAX_WORDS_PER_LINE).min(rest.len());
        let (line, tail) = rest.split_at(take);
        lines.push(
            line.iter()
                .map(AsRef::as_ref)
                .collect::<Vec<&str>>()
                .join(" "),
        );
        rest = tail;
    }

    lines
}

/// Split `text` on whitespace and wrap the words
pub fn wrap_text<R: Rng + ?Sized>(text: &str, rng: &mut R) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    wrap_into_lines(&words, rng)
}
