// Multi-valued field handling: a field value holds several terms joined
// by a separator (e.g. "Maps; Rivers").

/// Split on `separator` (trailing spaces in it optional), trimming terms
/// and dropping empty ones.
pub fn split_terms<'a>(value: &'a str, separator: &str) -> Vec<&'a str> {
    let sep = separator.trim();
    let sep = if sep.is_empty() { separator } else { sep };
    value
        .split(sep)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Remove repeated terms, keeping the first occurrence.
pub fn dedupe<'a>(terms: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut out: Vec<&str> = Vec::new();
    for term in terms {
        if !out.contains(&term) {
            out.push(term);
        }
    }
    out
}

/// Current terms followed by new ones not already present.
pub fn append_terms(current: &str, additional: &str, separator: &str) -> String {
    let merged = dedupe(
        split_terms(current, separator)
            .into_iter()
            .chain(split_terms(additional, separator)),
    );
    merged.join(separator)
}
