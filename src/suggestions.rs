//! # Command Suggestions
//!
//! Helpers for turning a mistyped command into a helpful diagnostic. When a
//! token does not match any subcommand, the dispatcher asks this module for
//! siblings the user probably meant, and the error message renders them as
//! a "Did you mean this?" block.
//!
//! A candidate is suggested when the token is a prefix of it, or when the
//! two are within a small edit distance.

/// Maximum Levenshtein distance for a candidate to count as a near miss.
const MAX_DISTANCE: usize = 2;

/// Find commands similar to `token`, preserving the order of `candidates`.
pub fn similar_commands<'a, I>(token: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    if token.is_empty() {
        return Vec::new();
    }
    let lowered = token.to_lowercase();

    candidates
        .into_iter()
        .filter(|candidate| {
            let candidate = candidate.to_lowercase();
            if candidate.starts_with(&lowered) {
                return true;
            }
            let distance = edit_distance(&lowered, &candidate);
            distance <= MAX_DISTANCE && distance < lowered.len()
        })
        .map(str::to_string)
        .collect()
}

/// Render the suggestion block appended to unknown-command errors.
///
/// Returns an empty string when there is nothing to suggest.
pub fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let mut rendered = String::from("\n\nDid you mean this?");
    for suggestion in suggestions {
        rendered.push_str("\n\t");
        rendered.push_str(suggestion);
    }
    rendered
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut matrix = vec![vec![0usize; b_len + 1]; a_len + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for (j, cell) in matrix[0].iter_mut().enumerate() {
        *cell = j;
    }

    for i in 1..=a_len {
        for j in 1..=b_len {
            let cost = if a_chars[i - 1] == b_chars[j - 1] {
                0
            } else {
                1
            };
            matrix[i][j] = (matrix[i - 1][j] + 1)
                .min(matrix[i][j - 1] + 1)
                .min(matrix[i - 1][j - 1] + cost);
        }
    }

    matrix[a_len][b_len]
}
