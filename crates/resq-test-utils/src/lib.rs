//! Test fixtures and mock chunk loaders for resq development.
//!
//! Provides geometry fixtures ([`box_corner_points`],
//! [`jittered_corner_points`]), a ready-made [`sample_model`], mock
//! [`ChunkLoader`](resq_core::ChunkLoader)s for exercising lazy arrays
//! without a container, and [`init_tracing`] for test and bench logging.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;
pub mod loaders;

pub use fixtures::{box_corner_points, jittered_corner_points, sample_model, SampleIds, TOP_DEPTH};
pub use loaders::{FailingChunkLoader, MemoryChunkLoader, SlowChunkLoader};

use tracing_subscriber::EnvFilter;

/// Install a `fmt` subscriber honouring `RUST_LOG` (default `warn`).
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
