//! Upstream source acquisition.
//!
//! Getting a buildable tree takes three steps: obtain the release archive
//! (download or local file) and verify its checksum, extract it, and apply
//! the vendored patches.

pub mod archive;
pub mod extract;
pub mod patch;

pub use archive::{ArchiveFetcher, FetchOptions};
pub use extract::{extract_archive, ArchiveFormat};
pub use patch::{apply_patches, PatchOutcome};
