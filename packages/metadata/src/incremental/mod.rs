//! Session-scoped caches with compilation-cycle lifecycle.
//!
//! One [`MetadataSession`] is owned by the embedding compiler driver and
//! shared (by reference) with every engine call of that session. The host
//! driver brackets compilation cycles with `begin_cycle`/`end_cycle` to
//! bound cache growth.

pub mod src;

pub use src::session::{CachedMetadata, MetadataKey, MetadataSession};

#[cfg(test)]
mod test;
