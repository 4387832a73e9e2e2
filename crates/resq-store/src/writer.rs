//! Container writer.
//!
//! [`ChunkWriter`] streams array payloads to any `Write` sink behind the
//! fixed header; [`write_model`] drives it over a whole model and then
//! emits the metadata document.

use std::io::Write;

use tracing::{debug, info};

use resq_core::ArrayBuffer;
use resq_model::Model;

use crate::codec::{encode_header, encode_scalars, padding, ByteOrder, HEADER_LEN};
use crate::document::{describe, ArrayRecord, ChunkRef, Document, FORMAT_NAME, SCHEMA_VERSION};
use crate::error::StoreError;
use crate::hash::chunk_checksum;

const ZEROS: [u8; 8] = [0; 8];

/// Writes array payloads to a chunk store.
///
/// Generic over `W: Write` so tests can use `Vec<u8>` and production
/// code can use `BufWriter<File>`.
pub struct ChunkWriter<W: Write> {
    writer: W,
    order: ByteOrder,
    offset: u64,
    chunks_written: usize,
}

impl<W: Write> ChunkWriter<W> {
    /// Create a writer in the native byte order, immediately writing the
    /// header.
    pub fn new(writer: W) -> Result<Self, StoreError> {
        Self::with_byte_order(writer, ByteOrder::NATIVE)
    }

    /// Create a writer emitting scalars in `order`.
    pub fn with_byte_order(mut writer: W, order: ByteOrder) -> Result<Self, StoreError> {
        encode_header(&mut writer, order)?;
        Ok(Self {
            writer,
            order,
            offset: HEADER_LEN,
            chunks_written: 0,
        })
    }

    /// Append one payload, returning its address.
    pub fn write_chunk(&mut self, buf: &ArrayBuffer) -> Result<ChunkRef, StoreError> {
        let pad = padding(self.offset);
        if pad > 0 {
            self.writer.write_all(&ZEROS[..pad as usize])?;
            self.offset += pad;
        }
        let bytes = encode_scalars(buf, self.order);
        self.writer.write_all(&bytes)?;
        let chunk = ChunkRef {
            offset: self.offset,
            length: bytes.len() as u64,
            dtype: buf.dtype().as_str().to_string(),
            count: buf.len() as u64,
            checksum: chunk_checksum(&bytes),
        };
        self.offset += chunk.length;
        self.chunks_written += 1;
        Ok(chunk)
    }

    /// Byte order of the payloads.
    pub fn byte_order(&self) -> ByteOrder {
        self.order
    }

    /// Bytes written so far, header included.
    pub fn bytes_written(&self) -> u64 {
        self.offset
    }

    /// Number of chunks written so far.
    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    /// Flush the underlying writer.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.writer.flush()?;
        Ok(())
    }

    /// Consume the writer and return the underlying `Write` sink.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

/// What a save wrote.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SaveSummary {
    /// Entities in the document.
    pub entities: usize,
    /// Chunks in the store.
    pub chunks: usize,
    /// Size of the chunk store in bytes.
    pub chunk_bytes: u64,
}

/// Write `model` as a metadata document to `meta` and array payloads to
/// `chunks`.
///
/// Entities are written in dependency order. Deferred arrays are loaded
/// as they are reached; a failed load aborts the save.
pub fn write_model<C: Write, M: Write>(
    model: &Model,
    chunks: &mut ChunkWriter<C>,
    mut meta: M,
    chunk_store: Option<String>,
) -> Result<SaveSummary, StoreError> {
    let mut entities = Vec::with_capacity(model.len());
    for id in model.registry().topological_order() {
        let object = model
            .object(id)
            .map_err(|e| StoreError::Encode { detail: e.to_string() })?;
        let described = describe(id, object)?;
        let mut record = described.record;
        for (attribute, slot) in described.arrays {
            let chunk = chunks.write_chunk(&slot.buffer()?)?;
            debug!(entity = %id, attribute, offset = chunk.offset, length = chunk.length, "wrote chunk");
            record.arrays.push(ArrayRecord {
                attribute: attribute.to_string(),
                chunk,
            });
        }
        entities.push(record);
    }
    chunks.flush()?;

    let document = Document {
        format: FORMAT_NAME.to_string(),
        schema_version: SCHEMA_VERSION,
        byte_order: chunks.byte_order().as_str().to_string(),
        chunk_store,
        entities,
    };
    serde_json::to_writer_pretty(&mut meta, &document).map_err(|e| StoreError::Encode {
        detail: e.to_string(),
    })?;
    meta.write_all(b"\n")?;
    meta.flush()?;

    let summary = SaveSummary {
        entities: document.entities.len(),
        chunks: chunks.chunks_written(),
        chunk_bytes: chunks.bytes_written(),
    };
    info!(
        entities = summary.entities,
        chunks = summary.chunks,
        chunk_bytes = summary.chunk_bytes,
        "model saved"
    );
    Ok(summary)
}
