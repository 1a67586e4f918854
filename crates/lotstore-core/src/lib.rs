//! LotStore Core — Fixed-Slot Record Files
//!
//! Domain-free storage primitives for append-only flat files where every
//! record occupies a fixed-width slot, paired with flat index files
//! mapping natural keys to byte offsets.
//!
//! # Architecture
//!
//! - **Slot file**: append-only, 501-byte slots (500-byte record budget +
//!   newline), in-place rewrite and tombstoning at a known offset
//! - **Flat index**: `<key> <offset>` lines, fully reloaded per access,
//!   first-match-wins on duplicate keys
//!
//! # No Domain Assumptions
//!
//! This crate knows nothing about what the records mean. Typed entity
//! stores live in separate crates (e.g. lotstore-dealer).

pub mod error;
pub mod format;
pub mod index;
pub mod slot;

// Re-export key types for convenience
pub use error::{LotError, LotResult};
pub use format::{RECORD_MAX, SLOT_SIZE};
pub use index::FlatIndex;
pub use slot::SlotFile;
