//! Container persistence for resq earth models.
//!
//! A container is a pair of files: a JSON metadata document holding every
//! entity's citation, references and attributes, and a chunk store holding
//! the bulk arrays (corner points and property values). Loading parses the
//! document eagerly and defers arrays until first access.
//!
//! # Architecture
//!
//! - [`save`] / [`Store::save_to`] write a model in dependency order
//! - [`load`] / [`Store::load_from`] restore the entity graph with lazy arrays
//! - [`compare_models`] reports entity-level divergences between models
//! - [`StoreConfig`] sets the read deadline and checksum verification
//!
//! # Format
//!
//! ```text
//! <dest>.json    { format, schema_version, byte_order, chunk_store, entities }
//! <dest>.chunks  [MAGIC "RQCS"] [VERSION u8] [BYTE ORDER u8] [2 reserved]
//!                [chunk] [chunk] ...
//! ```
//!
//! Each chunk is addressed from the document by offset, length, scalar
//! type, scalar count and an FNV-1a checksum. Saving a loaded model
//! reproduces the metadata document byte for byte.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod compare;
pub mod config;
pub mod document;
pub mod error;
pub mod hash;
pub mod reader;
pub mod store;
pub mod writer;

pub use codec::{ByteOrder, FORMAT_VERSION, MAGIC};
pub use compare::{compare_models, Divergence, DivergenceKind};
pub use config::{ConfigError, StoreConfig};
pub use document::{ArrayRecord, ChunkRef, Document, EntityRecord, SCHEMA_VERSION};
pub use error::StoreError;
pub use hash::chunk_checksum;
pub use reader::{ChunkSource, FileSource, MemorySource};
pub use store::{load, load_eager, load_from, save, save_to, Store};
pub use writer::{write_model, ChunkWriter, SaveSummary};
