//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain    | Description                                   |
//! |---------|-----------|-----------------------------------------------|
//! | 0       | Universal | Success                                       |
//! | 1       | Universal | General error (unspecified)                   |
//! | 2       | Universal | CLI usage error (bad args)                    |
//! | 3-9     | Input     | File IO, parse and configuration errors       |
//! | 10-19   | recon     | Reconciliation failures                       |
//! | 20-29   | remote    | Collection management / transcription service |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use catcher_io::TableError;
use catcher_recon::{ReconError, RemoteError};

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Input (3-9)
// =============================================================================

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Table, mapping or catcher JSON could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// Reconciliation config or settings file invalid.
pub const EXIT_CONFIG: u8 = 5;

// =============================================================================
// Recon (10-19)
// =============================================================================

/// Unreconcilable and/or ambiguous identifiers.
pub const EXIT_RECON_MISMATCH: u8 = 10;

/// Several rows share an identifier in object mode.
pub const EXIT_RECON_ROW_COLLISION: u8 = 11;

/// Two non-empty values disagree while merging edits.
pub const EXIT_RECON_COMBINE_COLLISION: u8 = 12;

/// Page position missing, malformed or out of range.
pub const EXIT_RECON_PAGE_POSITION: u8 = 13;

/// Row without an identifier.
pub const EXIT_RECON_MISSING_IDENTIFIER: u8 = 14;

// =============================================================================
// Remote (20-29)
// =============================================================================

/// The service returned an error payload.
pub const EXIT_REMOTE_APPLICATION: u8 = 20;

/// Non-success HTTP status or network failure.
pub const EXIT_REMOTE_HTTP: u8 = 21;

/// Response body could not be interpreted.
pub const EXIT_REMOTE_MALFORMED: u8 = 22;

// =============================================================================
// Error mapping
// =============================================================================

pub fn remote_exit_code(err: &RemoteError) -> u8 {
    match err {
        RemoteError::Application(_) => EXIT_REMOTE_APPLICATION,
        RemoteError::Http(..) | RemoteError::Transport(_) => EXIT_REMOTE_HTTP,
        RemoteError::Malformed(_) => EXIT_REMOTE_MALFORMED,
    }
}

pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_CONFIG,
        ReconError::MissingIdentifier { .. } => EXIT_RECON_MISSING_IDENTIFIER,
        ReconError::MissingPagePosition { .. }
        | ReconError::PagePosition { .. }
        | ReconError::PageOutOfRange { .. } => EXIT_RECON_PAGE_POSITION,
        ReconError::Mismatch { .. } => EXIT_RECON_MISMATCH,
        ReconError::RowCollision { .. } => EXIT_RECON_ROW_COLLISION,
        ReconError::CombineCollision { .. } => EXIT_RECON_COMBINE_COLLISION,
        ReconError::Remote(e) => remote_exit_code(e),
    }
}

pub fn table_exit_code(err: &TableError) -> u8 {
    match err {
        TableError::Io(_) => EXIT_IO,
        TableError::Encoding(_) => EXIT_USAGE,
        _ => EXIT_PARSE,
    }
}
