/// Something the reconciler reports while it runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconEvent {
    /// Records listed from the catalog, and how many share an identifier with a row.
    RecordsListed { total: usize, kept: usize },
    /// Child pointers fetched for one compound record.
    PagesFetched {
        pointer: String,
        pages: usize,
        done: usize,
        of: usize,
    },
    /// Reconciliation finished.
    EditsBuilt { count: usize },
}

/// Observer for reconciliation progress.
pub trait Progress {
    fn report(&mut self, event: ReconEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl Progress for NoProgress {
    fn report(&mut self, _event: ReconEvent) {}
}

impl Progress for Vec<ReconEvent> {
    fn report(&mut self, event: ReconEvent) {
        self.push(event);
    }
}
