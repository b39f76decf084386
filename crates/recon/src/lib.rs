//! `catcher-recon`: reconciliation of local metadata rows against a
//! remote catalog.
//!
//! Pure engine crate: receives parsed rows and a [`Catalog`] to query,
//! returns merged catcher edits. No CLI, HTTP, or file IO.

pub mod catalog;
pub mod combine;
pub mod config;
pub mod engine;
pub mod error;
pub mod matcher;
pub mod model;
pub mod progress;

pub use catalog::{Catalog, RemoteError};
pub use combine::{combine_values, merge, Collision};
pub use config::{MatchMode, ReconConfig};
pub use engine::{reconcile, resolve_page_pointer};
pub use error::ReconError;
pub use model::{CatcherEdit, FieldValues, LocalRow, RemoteRecord};
pub use progress::{NoProgress, Progress, ReconEvent};
