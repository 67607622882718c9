//! Sample source abstraction - allows swapping the real decoder for
//! in-memory buffers

use crate::error::DecodeError;
use crate::model::SampleBuffer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Something that turns a finalized recording into samples
pub trait SampleSource {
    /// Decode the recording at `path` to mono samples
    fn load(&self, path: &Path) -> Result<SampleBuffer, DecodeError>;
}

/// Sample source serving pre-decoded buffers keyed by path
#[derive(Debug, Default)]
pub struct MemorySource {
    buffers: RwLock<HashMap<PathBuf, SampleBuffer>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `buffer` available under `path`, replacing any previous one
    pub fn insert(&self, path: impl Into<PathBuf>, buffer: SampleBuffer) {
        let mut buffers = self.buffers.write().unwrap_or_else(|e| e.into_inner());
        buffers.insert(path.into(), buffer);
    }
}

impl SampleSource for MemorySource {
    fn load(&self, path: &Path) -> Result<SampleBuffer, DecodeError> {
        let buffers = self.buffers.read().unwrap_or_else(|e| e.into_inner());
        buffers.get(path).cloned().ok_or_else(|| DecodeError::Open {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no buffer for path"),
        })
    }
}

impl<S: SampleSource + ?Sized> SampleSource for std::sync::Arc<S> {
    fn load(&self, path: &Path) -> Result<SampleBuffer, DecodeError> {
        (**self).load(path)
    }
}
