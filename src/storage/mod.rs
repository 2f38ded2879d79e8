//! In-memory record storage
//!
//! Records live only in memory; nothing is persisted across restarts.
//!
//! # Key Components
//!
//! - **RecordSet**: insertion-ordered records plus an identifier set for O(1)
//!   membership, shared by the store and by every tag index entry
//! - **RecordStore**: the append-only owner of all ingested records

/// Insertion-ordered record collection with O(1) membership
pub mod record_set;
/// Append-only store of every ingested record
pub mod store;

pub use record_set::RecordSet;
pub use store::RecordStore;
