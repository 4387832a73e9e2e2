//! Identity registry for resq earth models.
//!
//! The [`Registry`] is the canonical owner of every entity in a model. It
//! hands out collision-free ids, keeps entities in insertion order, and
//! maintains a [`ReverseIndex`] so that dangling references and cycles are
//! detected without scanning the table.
//!
//! # Architecture
//!
//! ```text
//! Registry<E: Entity>
//! ├── IndexMap<EntityId, E>   (insertion-ordered entity table)
//! ├── ReverseIndex            (target → referrers)
//! └── next_id: u64            (monotonic, never reused)
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod index;
pub mod registry;

pub use error::RegistryError;
pub use index::ReverseIndex;
pub use registry::{Registry, RemoveMode};
