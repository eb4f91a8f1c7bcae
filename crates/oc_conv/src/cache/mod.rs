//! Process-wide, append-only caches keyed by type.
//!
//! All caches share one discipline: a read lock on the hot path; on a miss the
//! lock is released, the entry is built without holding any lock, and then
//! inserted under a write lock. If two threads race, both build, the first
//! insert wins and every caller observes the same `&'static` entry.

mod descriptor;
mod type_cache;
mod zero;

pub use descriptor::{FieldDescriptor, StructDescriptor, describe};
pub use type_cache::TypeCache;
pub use zero::zero_of;
