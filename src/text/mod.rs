//! String similarity scoring for recognized transcripts.
//!
//! Voice commands are rarely transcribed verbatim — "open the door" may come
//! back as "open a door".  [`compare_strings`] gives callers a normalized
//! similarity score so they can match a transcript against a set of expected
//! phrases with a tolerance threshold instead of exact equality.

// ---------------------------------------------------------------------------
// levenshtein
// ---------------------------------------------------------------------------

/// Classic dynamic-programming Levenshtein edit distance over two byte
/// strings.
///
/// Uses the two-row formulation so memory stays `O(min_len)` instead of the
/// full `O(len_a * len_b)` table.
///
/// # Example
///
/// ```rust
/// use vosk_voice::text::levenshtein;
///
/// assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
/// assert_eq!(levenshtein(b"", b"abc"), 3);
/// assert_eq!(levenshtein(b"same", b"same"), 0);
/// ```
pub fn levenshtein(a: &[u8], b: &[u8]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

// ---------------------------------------------------------------------------
// compare_strings
// ---------------------------------------------------------------------------

/// Normalized similarity between two strings in `[0.0, 1.0]`.
///
/// Defined as `1 - distance / max(len_left, len_right)` over the UTF-8 bytes,
/// with two fixed points:
///
/// * `0.0` when either string is empty,
/// * `1.0` when the strings are identical.
///
/// # Example
///
/// ```rust
/// use vosk_voice::text::compare_strings;
///
/// assert_eq!(compare_strings("hello", "hello"), 1.0);
/// assert_eq!(compare_strings("", "hello"), 0.0);
/// assert!(compare_strings("hello", "hallo") > 0.7);
/// ```
pub fn compare_strings(left: &str, right: &str) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    if left == right {
        return 1.0;
    }

    let distance = levenshtein(left.as_bytes(), right.as_bytes());
    let max_len = left.len().max(right.len());

    1.0 - (distance as f64 / max_len as f64) as f32
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // ---- levenshtein -------------------------------------------------------

    #[test]
    fn distance_of_empty_strings_is_zero() {
        assert_eq!(levenshtein(b"", b""), 0);
    }

    #[test]
    fn distance_against_empty_is_other_length() {
        assert_eq!(levenshtein(b"abc", b""), 3);
        assert_eq!(levenshtein(b"", b"abcd"), 4);
    }

    #[test]
    fn distance_single_substitution() {
        assert_eq!(levenshtein(b"cat", b"bat"), 1);
    }

    #[test]
    fn distance_single_insertion() {
        assert_eq!(levenshtein(b"cat", b"cart"), 1);
    }

    #[test]
    fn distance_single_deletion() {
        assert_eq!(levenshtein(b"cart", b"cat"), 1);
    }

    #[test]
    fn distance_kitten_sitting() {
        // The textbook example: 2 substitutions + 1 insertion.
        assert_eq!(levenshtein(b"kitten", b"sitting"), 3);
    }

    #[test]
    fn distance_is_symmetric() {
        assert_eq!(
            levenshtein(b"open the door", b"open a door"),
            levenshtein(b"open a door", b"open the door"),
        );
    }

    #[test]
    fn distance_completely_different() {
        assert_eq!(levenshtein(b"abc", b"xyz"), 3);
    }

    // ---- compare_strings ---------------------------------------------------

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(compare_strings("turn left", "turn left"), 1.0);
    }

    #[test]
    fn either_empty_scores_zero() {
        assert_eq!(compare_strings("", "turn left"), 0.0);
        assert_eq!(compare_strings("turn left", ""), 0.0);
        assert_eq!(compare_strings("", ""), 0.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        // Same length, every byte differs → distance == max_len → score 0.
        assert_eq!(compare_strings("abc", "xyz"), 0.0);
    }

    #[test]
    fn close_strings_score_high() {
        let score = compare_strings("open the door", "open a door");
        assert!(score > 0.7, "expected > 0.7, got {score}");
        assert!(score < 1.0);
    }

    #[test]
    fn score_is_within_unit_interval() {
        for (a, b) in [
            ("hello", "goodbye"),
            ("a", "aaaaaaaaaa"),
            ("voice", "choice"),
        ] {
            let s = compare_strings(a, b);
            assert!((0.0..=1.0).contains(&s), "{a:?} vs {b:?} → {s}");
        }
    }
}
