//! Disk-backed manifest store.
//!
//! Owns the three persisted configuration artifacts of one project directory:
//! the package manifest (`Cargo.toml`), the toolchain descriptor
//! (`rust-toolchain`), and the per-architecture build settings
//! (`.cargo/config.toml`).
//!
//! Every operation re-reads its file from disk, merges the mutation into the
//! parsed document, and rewrites the whole file. Repair actions run
//! interleaved with external toolchain invocations that rewrite
//! manifest-adjacent state, so disk is the source of truth between
//! operations; no parsed document outlives a single call.

mod edition;
mod error;
mod store;

pub use error::{ManifestError, ManifestResult};
pub use store::ManifestStore;
