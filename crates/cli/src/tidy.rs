// Value cleanup for `catcher tidy`
// Each operation rewrites the values of the nicks it is given.

use std::sync::OnceLock;

use regex::Regex;

use catcher_recon::CatcherEdit;

use crate::terms::{dedupe, split_terms};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TidyOp {
    /// Collapse whitespace runs to one space and trim.
    NormalizeWhitespace,
    /// Curly quotes, dashes, ellipses and non-breaking spaces to ASCII.
    ReplaceSmartChars,
    /// Subject heading subdivisions as `Term--Sub--Sub`, no trailing period.
    NormalizeLcsh,
    /// Terms deduplicated and sorted case-insensitively.
    SortTerms,
}

impl TidyOp {
    /// Order in which operations run when several target one field.
    pub const ORDER: [TidyOp; 4] = [
        TidyOp::NormalizeWhitespace,
        TidyOp::ReplaceSmartChars,
        TidyOp::NormalizeLcsh,
        TidyOp::SortTerms,
    ];

    pub fn apply(&self, value: &str, separator: &str) -> String {
        match self {
            TidyOp::NormalizeWhitespace => normalize_whitespace(value),
            TidyOp::ReplaceSmartChars => replace_smart_chars(value),
            TidyOp::NormalizeLcsh => normalize_lcsh(value, separator),
            TidyOp::SortTerms => sort_terms(value, separator),
        }
    }
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn subdivision_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s*-{2,}\s*|\s+[—–]\s+|[—–]").unwrap())
}

pub fn normalize_whitespace(value: &str) -> String {
    whitespace_re().replace_all(value.trim(), " ").into_owned()
}

pub fn replace_smart_chars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}' => out.push('"'),
            '\u{2010}' | '\u{2011}' | '\u{2012}' => out.push('-'),
            '\u{2026}' => out.push_str("..."),
            '\u{00A0}' | '\u{2007}' | '\u{202F}' => out.push(' '),
            other => out.push(other),
        }
    }
    out
}

/// Headings are separated by `separator`; subdivisions by `--` (or a dash).
pub fn normalize_lcsh(value: &str, separator: &str) -> String {
    split_terms(value, separator)
        .into_iter()
        .map(|heading| {
            let parts: Vec<&str> = subdivision_re()
                .split(heading)
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .collect();
            strip_final_period(parts.join("--"))
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// "Maps." loses its period, an abbreviation such as "U.S." keeps it.
fn strip_final_period(heading: String) -> String {
    let last_word = heading.rsplit([' ', '-']).next().unwrap_or("");
    if heading.ends_with('.') && last_word.matches('.').count() == 1 {
        heading[..heading.len() - 1].to_string()
    } else {
        heading
    }
}

pub fn sort_terms(value: &str, separator: &str) -> String {
    let mut terms = dedupe(split_terms(value, separator));
    terms.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()).then(a.cmp(b)));
    terms.join(separator)
}

/// Apply `ops` (operation, nick) to every edit, in [`TidyOp::ORDER`].
/// Returns the number of values that changed.
pub fn tidy_edits(edits: &mut [CatcherEdit], ops: &[(TidyOp, String)], separator: &str) -> usize {
    let mut changed = 0;
    for edit in edits.iter_mut() {
        for op in TidyOp::ORDER {
            for (_, nick) in ops.iter().filter(|(o, _)| *o == op) {
                let Some(Some(value)) = edit.fields.get_mut(nick) else {
                    continue;
                };
                let tidied = op.apply(value, separator);
                if tidied != *value {
                    *value = tidied;
                    changed += 1;
                }
            }
        }
    }
    changed
}
