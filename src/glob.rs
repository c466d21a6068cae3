//! Glob pattern matching: `*`, `?`, `[set]` with ranges and leading `!`/`^`
//! negation, backed by the `glob` crate's `Pattern`. Two entry points are
//! exposed because the two callers anchor differently: pathname expansion
//! matches component by component, while `find -name` anchors end-to-end
//! over a bare basename — both are single-component whole-string matches,
//! so both compile down to the same `glob::Pattern`.

use glob::{MatchOptions, Pattern};

const OPTIONS: MatchOptions =
    MatchOptions { case_sensitive: true, require_literal_separator: true, require_literal_leading_dot: false };

const OPTIONS_CI: MatchOptions =
    MatchOptions { case_sensitive: false, require_literal_separator: true, require_literal_leading_dot: false };

/// Matches `pattern` against `name` end-to-end, as `find -name` does.
pub fn matches(pattern: &str, name: &str) -> bool {
    match compile(pattern) {
        Some(p) => p.matches_with(name, OPTIONS),
        None => pattern == name,
    }
}

/// Case-insensitive variant, backing `-iname`.
pub fn matches_ci(pattern: &str, name: &str) -> bool {
    match compile(pattern) {
        Some(p) => p.matches_with(name, OPTIONS_CI),
        None => pattern.eq_ignore_ascii_case(name),
    }
}

/// Compiles `pattern` as a `glob::Pattern`, translating the shell's `[^...]`
/// negation spelling to the `[!...]` spelling the crate recognizes (the
/// crate otherwise covers the same glob grammar spec.md §4.6 describes).
fn compile(pattern: &str) -> Option<Pattern> {
    Pattern::new(&normalize_negation(pattern)).ok()
}

fn normalize_negation(pattern: &str) -> String {
    let chars: Vec<char> = pattern.chars().collect();
    let mut out = String::with_capacity(chars.len());
    let mut i = 0;
    while i < chars.len() {
        out.push(chars[i]);
        if chars[i] == '[' && chars.get(i + 1) == Some(&'^') {
            out.push('!');
            i += 2;
            continue;
        }
        i += 1;
    }
    out
}

/// Splits a pathname pattern into components and matches each segment of
/// `path` against the corresponding component (the anchored-per-component
/// rule pathname expansion needs); `*`/`?` never cross a `/` boundary.
pub fn matches_path(pattern: &str, path: &str) -> bool {
    let pat_parts: Vec<&str> = pattern.split('/').collect();
    let path_parts: Vec<&str> = path.split('/').collect();
    if pat_parts.len() != path_parts.len() {
        return false;
    }
    pat_parts.iter().zip(path_parts.iter()).all(|(p, n)| matches(p, n))
}

/// Whether `pattern` contains any glob metacharacter, so callers can skip
/// matching work for plain literal words.
pub fn has_metachars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_matches_any_run() {
        assert!(matches("*.ts", "index.ts"));
        assert!(!matches("*.ts", "index.tsx"));
        assert!(matches("*", ""));
    }

    #[test]
    fn question_matches_one_char() {
        assert!(matches("a?c", "abc"));
        assert!(!matches("a?c", "ac"));
    }

    #[test]
    fn bracket_set_and_range() {
        assert!(matches("[a-c]og", "bog"));
        assert!(!matches("[a-c]og", "dog"));
        assert!(matches("[!a-c]og", "dog"));
        assert!(matches("[^a-c]og", "dog"));
    }

    #[test]
    fn non_matching_stays_literal_word_in_caller() {
        assert!(!matches("*.nomatch", "index.ts"));
    }

    #[test]
    fn case_insensitive_variant() {
        assert!(matches_ci("*.TXT", "readme.txt"));
        assert!(!matches("*.TXT", "readme.txt"));
    }
}
