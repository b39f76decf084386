use tracing::{debug, info};

use crate::catalog::Catalog;
use crate::combine::merge;
use crate::config::{MatchMode, ReconConfig};
use crate::error::ReconError;
use crate::matcher::{check_join, index_records, index_rows, Index};
use crate::model::{CatcherEdit, LocalRow, RemoteRecord};
use crate::progress::{Progress, ReconEvent};

/// Reconcile `rows` against the collection named in `config`.
///
/// Either every row is reconciled or the run fails; join failures are
/// reported in full.
pub fn reconcile(
    rows: &[LocalRow],
    catalog: &dyn Catalog,
    config: &ReconConfig,
    progress: &mut dyn Progress,
) -> Result<Vec<CatcherEdit>, ReconError> {
    check_rows(rows, config.mode)?;

    let rows_index = index_rows(rows);
    info!(
        rows = rows.len(),
        identifiers = rows_index.len(),
        mode = %config.mode,
        "reconciling against {}",
        config.alias()
    );

    let mut records = catalog.list_records(config.alias(), &config.identifier)?;
    let total = records.len();
    records.retain(|r| rows_index.contains(&r.identifier));
    progress.report(ReconEvent::RecordsListed {
        total,
        kept: records.len(),
    });

    if config.mode == MatchMode::Page {
        attach_page_pointers(&mut records, catalog, config.alias(), progress)?;
    }

    let records_index = index_records(&records);
    let report = check_join(&rows_index, &records_index);
    if !report.is_clean() {
        return Err(ReconError::Mismatch {
            unreconcilable: report.unreconcilable,
            confused: report.confused,
        });
    }

    let edits = match config.mode {
        MatchMode::Object => reconcile_objects(rows, &records_index)?,
        MatchMode::Page => reconcile_pages(rows, &records_index)?,
    };
    progress.report(ReconEvent::EditsBuilt { count: edits.len() });
    Ok(edits)
}

/// Checks that need no catalog access.
fn check_rows(rows: &[LocalRow], mode: MatchMode) -> Result<(), ReconError> {
    let missing: Vec<usize> = rows
        .iter()
        .filter(|r| r.identifier.is_none())
        .map(|r| r.row_number)
        .collect();
    if !missing.is_empty() {
        return Err(ReconError::MissingIdentifier { rows: missing });
    }

    if mode == MatchMode::Page {
        let missing: Vec<usize> = rows
            .iter()
            .filter(|r| r.page_position.is_none())
            .map(|r| r.row_number)
            .collect();
        if !missing.is_empty() {
            return Err(ReconError::MissingPagePosition { rows: missing });
        }
    }

    if mode == MatchMode::Object {
        let collisions = index_rows(rows).duplicated();
        if !collisions.is_empty() {
            return Err(ReconError::RowCollision {
                identifiers: collisions,
            });
        }
    }

    Ok(())
}

fn attach_page_pointers(
    records: &mut [RemoteRecord],
    catalog: &dyn Catalog,
    alias: &str,
    progress: &mut dyn Progress,
) -> Result<(), ReconError> {
    let of = records.iter().filter(|r| r.is_compound).count();
    let mut done = 0;
    for record in records.iter_mut().filter(|r| r.is_compound) {
        record.page_pointers = catalog.child_pointers(alias, &record.pointer)?;
        done += 1;
        debug!(pointer = %record.pointer, pages = record.page_pointers.len(), "child pointers");
        progress.report(ReconEvent::PagesFetched {
            pointer: record.pointer.clone(),
            pages: record.page_pointers.len(),
            done,
            of,
        });
    }
    Ok(())
}

fn reconcile_objects(
    rows: &[LocalRow],
    records_index: &Index<'_, RemoteRecord>,
) -> Result<Vec<CatcherEdit>, ReconError> {
    let mut edits = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(identifier) = row.identifier.as_deref() else {
            continue;
        };
        for record in records_index.get(identifier).unwrap_or(&[]) {
            let base = CatcherEdit::pointer_only(record.pointer.as_str());
            edits.push(merge(&base, &CatcherEdit::from(row))?);
        }
    }
    Ok(edits)
}

fn reconcile_pages(
    rows: &[LocalRow],
    records_index: &Index<'_, RemoteRecord>,
) -> Result<Vec<CatcherEdit>, ReconError> {
    let mut edits = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(identifier) = row.identifier.as_deref() else {
            continue;
        };
        let Some(record) = records_index.get(identifier).and_then(|m| m.first()) else {
            continue;
        };
        let position = row.page_position.ok_or_else(|| ReconError::MissingPagePosition {
            rows: vec![row.row_number],
        })?;
        let pointer = resolve_page_pointer(record, position)?;
        let base = CatcherEdit::pointer_only(pointer);
        edits.push(merge(&base, &CatcherEdit::from(row))?);
    }
    Ok(edits)
}

/// Pointer of the page at 1-based `position` in a compound record.
pub fn resolve_page_pointer(record: &RemoteRecord, position: usize) -> Result<&str, ReconError> {
    position
        .checked_sub(1)
        .and_then(|i| record.page_pointers.get(i))
        .map(String::as_str)
        .ok_or_else(|| ReconError::PageOutOfRange {
            identifier: record.identifier.clone(),
            position,
            page_count: record.page_pointers.len(),
        })
}
