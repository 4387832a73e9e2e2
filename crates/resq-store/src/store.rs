//! Path-based save and load.

use std::ffi::OsString;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use resq_model::Model;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::reader::{parse_document, prefetch_all, read_model, read_with_deadline, ChunkSource, FileSource};
use crate::writer::{write_model, ChunkWriter, SaveSummary};

/// Suffix of the metadata document.
pub const METADATA_SUFFIX: &str = ".json";

/// Suffix of the chunk store.
pub const CHUNKS_SUFFIX: &str = ".chunks";

/// Suffix of files being written by [`Store::save`].
pub const TEMP_SUFFIX: &str = ".tmp";

/// `base` with `suffix` appended to its last component.
fn suffixed(base: &Path, suffix: &str) -> PathBuf {
    let mut s = OsString::from(base.as_os_str());
    s.push(suffix);
    PathBuf::from(s)
}

fn write_files(
    model: &Model,
    meta_path: &Path,
    chunk_path: &Path,
    chunk_name: Option<String>,
) -> Result<SaveSummary, StoreError> {
    let mut chunks = ChunkWriter::new(BufWriter::new(File::create(chunk_path)?))?;
    let meta = BufWriter::new(File::create(meta_path)?);
    write_model(model, &mut chunks, meta, chunk_name)
}

/// Saves and loads models with a fixed [`StoreConfig`].
#[derive(Clone, Debug, Default)]
pub struct Store {
    config: StoreConfig,
}

impl Store {
    /// A store with `config`, validated.
    pub fn new(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Write `model` to `<dest>.json` and `<dest>.chunks`.
    ///
    /// Both files are written under a [`TEMP_SUFFIX`] name and renamed
    /// into place once complete, so `dest` may be the container `model`
    /// was lazily loaded from. On failure the existing container is left
    /// untouched.
    #[tracing::instrument(skip_all, fields(dest = %dest.as_ref().display()))]
    pub fn save(&self, model: &Model, dest: impl AsRef<Path>) -> Result<SaveSummary, StoreError> {
        let dest = dest.as_ref();
        let meta_path = suffixed(dest, METADATA_SUFFIX);
        let chunk_path = suffixed(dest, CHUNKS_SUFFIX);
        let meta_tmp = suffixed(&meta_path, TEMP_SUFFIX);
        let chunk_tmp = suffixed(&chunk_path, TEMP_SUFFIX);
        let chunk_name = chunk_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());

        let written = write_files(model, &meta_tmp, &chunk_tmp, chunk_name).and_then(|summary| {
            std::fs::rename(&chunk_tmp, &chunk_path)?;
            std::fs::rename(&meta_tmp, &meta_path)?;
            Ok(summary)
        });
        if written.is_err() {
            for path in [&meta_tmp, &chunk_tmp] {
                if let Err(e) = std::fs::remove_file(path) {
                    tracing::debug!(path = %path.display(), error = %e, "temporary file not removed");
                }
            }
        }
        written
    }

    /// Write `model` to arbitrary sinks. The document names no chunk
    /// store file.
    pub fn save_to<M: Write, C: Write>(
        &self,
        model: &Model,
        meta: M,
        chunks: C,
    ) -> Result<SaveSummary, StoreError> {
        let mut chunks = ChunkWriter::new(chunks)?;
        write_model(model, &mut chunks, meta, None)
    }

    /// Load the container at `<source>.json`, leaving arrays deferred.
    ///
    /// The chunk store is the file the document names, next to the
    /// document, or `<source>.chunks` when it names none.
    #[tracing::instrument(skip_all, fields(source = %source.as_ref().display()))]
    pub fn load(&self, source: impl AsRef<Path>) -> Result<Model, StoreError> {
        let source = source.as_ref();
        let meta_path = suffixed(source, METADATA_SUFFIX);
        let timeout = self.config.io_timeout;
        let bytes = {
            let path = meta_path.clone();
            read_with_deadline(timeout, move || std::fs::read(path))
                .map_err(|e| StoreError::from_io(e, timeout))?
        };
        let doc = parse_document(bytes.as_slice())?;
        let chunk_path = match doc.chunk_store.as_deref() {
            Some(name) => {
                if Path::new(name).file_name().map(|n| n.to_str()) != Some(Some(name)) {
                    return Err(StoreError::corrupt(format!(
                        "chunk store '{name}' is not a plain file name"
                    )));
                }
                meta_path
                    .parent()
                    .unwrap_or_else(|| Path::new(""))
                    .join(name)
            }
            None => suffixed(source, CHUNKS_SUFFIX),
        };
        read_model(&self.config, &doc, Arc::new(FileSource::new(chunk_path)))
    }

    /// Load from an arbitrary metadata reader and chunk source.
    pub fn load_from(&self, meta: impl Read, chunks: Arc<dyn ChunkSource>) -> Result<Model, StoreError> {
        let doc = parse_document(meta)?;
        read_model(&self.config, &doc, chunks)
    }

    /// [`load`](Self::load), then load every array.
    pub fn load_eager(&self, source: impl AsRef<Path>) -> Result<Model, StoreError> {
        let model = self.load(source)?;
        prefetch_all(&model)?;
        Ok(model)
    }
}

/// Save with the default configuration. See [`Store::save`].
pub fn save(model: &Model, dest: impl AsRef<Path>) -> Result<SaveSummary, StoreError> {
    Store::default().save(model, dest)
}

/// Save to sinks with the default configuration. See [`Store::save_to`].
pub fn save_to<M: Write, C: Write>(model: &Model, meta: M, chunks: C) -> Result<SaveSummary, StoreError> {
    Store::default().save_to(model, meta, chunks)
}

/// Load with the default configuration. See [`Store::load`].
pub fn load(source: impl AsRef<Path>) -> Result<Model, StoreError> {
    Store::default().load(source)
}

/// Load from a reader and source with the default configuration. See
/// [`Store::load_from`].
pub fn load_from(meta: impl Read, chunks: Arc<dyn ChunkSource>) -> Result<Model, StoreError> {
    Store::default().load_from(meta, chunks)
}

/// Eager load with the default configuration. See [`Store::load_eager`].
pub fn load_eager(source: impl AsRef<Path>) -> Result<Model, StoreError> {
    Store::default().load_eager(source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use std::time::Duration;

    #[test]
    fn suffix_is_appended_not_replaced() {
        assert_eq!(
            suffixed(Path::new("out/model.v2"), ".json"),
            PathBuf::from("out/model.v2.json")
        );
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = Store::new(StoreConfig::new().with_io_timeout(Some(Duration::ZERO))).unwrap_err();
        assert!(matches!(err, StoreError::Config(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn missing_container_is_io_error() {
        let err = load("/nonexistent/resq/container").unwrap_err();
        assert!(matches!(err, StoreError::Io(_)));
    }
}
