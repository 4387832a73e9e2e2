//! In-memory earth model for resq.
//!
//! A [`Model`] is a typed table of [`ModelObject`]s (CRSs, grids and
//! properties) over a [`Registry`](resq_registry::Registry). It is the only
//! mutation path for registered entities: every setter validates before
//! it commits, and reference changes go through
//! [`repoint`](Model::repoint) so the reverse index stays exact.
//!
//! A model is `Send + Sync`. Mutation needs `&mut self`, so readers sharing
//! a model never observe a half-applied change.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod object;

pub use error::ModelError;
pub use model::Model;
pub use object::ModelObject;
pub use resq_registry::RemoveMode;
