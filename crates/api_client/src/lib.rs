//! Blocking HTTP clients (no Tokio runtime required).
//!
//! - [`CdmClient`]: CONTENTdm web services, implements [`catcher_recon::Catalog`]
//! - [`FtpClient`]: FromThePage IIIF API

mod http;

pub mod cdm;
pub mod ftp;

pub use catcher_recon::RemoteError;
pub use cdm::{flatten_page_pointers, CdmClient, CdmRecord, CollectionInfo, FieldInfo};
pub use ftp::{cdm_pointer_from_source, FtpClient, FtpPage, FtpWork, ManifestRef};
