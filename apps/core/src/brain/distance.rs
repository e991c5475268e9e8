//! Levenshtein edit distance and the normalized score used by the fuzzy pass.
//!
//! Lengths are counted in Unicode scalar values, so an emoji or a CJK character
//! costs one edit like any ASCII letter.

/// Minimum number of single-character insertions, deletions or substitutions
/// needed to turn `a` into `b`.
///
/// Classic dynamic programming over a `(len(b)+1) x (len(a)+1)` table, kept as a
/// single rolling row. `row[j]` holds `matrix[i][j]` for the row being filled.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    // matrix[0][j] = j
    let mut row: Vec<usize> = (0..=b_chars.len()).collect();

    for (i, a_char) in a_chars.iter().enumerate() {
        // matrix[i][j-1] of the previous row, i.e. the diagonal.
        let mut diagonal = row[0];
        // matrix[i][0] = i
        row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if a_char == b_char {
                diagonal
            } else {
                1 + diagonal.min(row[j]).min(above)
            };
            diagonal = above;
        }
    }

    row[b_chars.len()]
}

/// Edit distance divided by the longer of the two lengths.
///
/// `0.0` means identical, `1.0` means nothing in common. Two empty strings
/// divide by 1 instead of 0 and score `0.0`.
pub fn normalized_score(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count()).max(1);
    levenshtein(a, b) as f64 / longest as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_strings() {
        assert_eq!(levenshtein("rust", "rust"), 0);
        assert_eq!(normalized_score("rust", "rust"), 0.0);
    }

    #[test]
    fn test_empty_sides() {
        assert_eq!(levenshtein("", ""), 0);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abcd", ""), 4);
        assert_eq!(normalized_score("", ""), 0.0);
        assert_eq!(normalized_score("", "abc"), 1.0);
    }

    #[test]
    fn test_classic_pairs() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("flaw", "lawn"), 2);
        assert_eq!(levenshtein("intention", "execution"), 5);
        assert_eq!(levenshtein("hello", "heyyy"), 3);
    }

    #[test]
    fn test_symmetry() {
        let pairs = [("what is rust", "wat is rsut"), ("abc", "yabd"), ("", "x")];
        for (a, b) in pairs {
            assert_eq!(levenshtein(a, b), levenshtein(b, a), "{} / {}", a, b);
        }
    }

    #[test]
    fn test_counts_chars_not_bytes() {
        // Each emoji is 4 bytes but one char.
        assert_eq!(levenshtein("😀", "😃"), 1);
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert_eq!(normalized_score("日本", "日本語"), 1.0 / 3.0);
    }

    #[test]
    fn test_normalized_score_uses_longest_length() {
        // "wat is ur name" vs "what is your name": 3 insertions over 17 chars.
        let score = normalized_score("wat is ur name", "what is your name");
        assert!((score - 3.0 / 17.0).abs() < 1e-9, "score was {}", score);
    }
}
