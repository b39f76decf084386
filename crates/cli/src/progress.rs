use catcher_recon::{Progress, ReconEvent};

/// Progress lines on stderr, shown only on a terminal and without `--quiet`.
pub struct StderrProgress {
    enabled: bool,
}

impl StderrProgress {
    pub fn new(quiet: bool) -> Self {
        Self {
            enabled: !quiet && atty::is(atty::Stream::Stderr),
        }
    }

    /// Free-form progress note.
    pub fn note(&self, message: impl AsRef<str>) {
        if self.enabled {
            eprintln!("  {}", message.as_ref());
        }
    }
}

impl Progress for StderrProgress {
    fn report(&mut self, event: ReconEvent) {
        if !self.enabled {
            return;
        }
        match event {
            ReconEvent::RecordsListed { total, kept } => {
                eprintln!("  found {total} records, {kept} with identifiers from the table");
            }
            ReconEvent::PagesFetched { pointer, pages, done, of } => {
                eprintln!("  [{done}/{of}] record {pointer}: {pages} pages");
            }
            ReconEvent::EditsBuilt { count } => {
                eprintln!("  built {count} edits");
            }
        }
    }
}
