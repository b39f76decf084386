// Comparison logic for `catcher diff`
// Pure functions: catcher edits + current remote values in, field diffs out.
// No IO, no clap, no formatting.

use std::collections::BTreeMap;

use catcher_recon::CatcherEdit;

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldStatus {
    /// Edit value equals the current value.
    Same,
    /// Edit value differs from the current value.
    Changed,
    /// The item has no field with this nick.
    Unknown,
}

impl FieldStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldStatus::Same => "same",
            FieldStatus::Changed => "changed",
            FieldStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub pointer: String,
    pub field: String,
    pub current: Option<String>,
    pub proposed: String,
    pub status: FieldStatus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    pub items: usize,
    pub same: usize,
    pub changed: usize,
    pub unknown: usize,
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------

/// Values are compared after trimming; remote values are stored trimmed.
fn normalize(s: &str) -> &str {
    s.trim()
}

/// Field-by-field comparison of one edit with the item's current metadata.
/// Fields come out in the edit's field order.
pub fn compare(edit: &CatcherEdit, pointer: &str, current: &BTreeMap<String, String>) -> Vec<FieldDiff> {
    edit.fields
        .keys()
        .map(|field| {
            let proposed = edit.value(field).to_string();
            let current_value = current.get(field).cloned();
            let status = match current_value.as_deref() {
                None => FieldStatus::Unknown,
                Some(c) if normalize(c) == normalize(&proposed) => FieldStatus::Same,
                Some(_) => FieldStatus::Changed,
            };
            FieldDiff {
                pointer: pointer.to_string(),
                field: field.clone(),
                current: current_value,
                proposed,
                status,
            }
        })
        .collect()
}

pub fn summarize(items: usize, diffs: &[FieldDiff]) -> DiffSummary {
    let mut summary = DiffSummary {
        items,
        ..DiffSummary::default()
    };
    for d in diffs {
        match d.status {
            FieldStatus::Same => summary.same += 1,
            FieldStatus::Changed => summary.changed += 1,
            FieldStatus::Unknown => summary.unknown += 1,
        }
    }
    summary
}
