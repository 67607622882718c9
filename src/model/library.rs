use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions the decoder is built to read
const AUDIO_EXTENSIONS: &[&str] = &["m4a", "mp4", "aac", "wav", "mp3", "flac", "ogg"];

/// A closed recording that is safe to hand to the analyzer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalizedRecording {
    pub path: PathBuf,

    /// File size in bytes at the time it was finalized
    pub size_bytes: u64,

    /// Last modification time
    pub modified: DateTime<Local>,
}

/// Size and mtime seen on a scan
type Stamp = (u64, DateTime<Local>);

impl FinalizedRecording {
    /// Stat a recording on disk
    pub fn from_path(path: &Path) -> Result<Self> {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat recording: {:?}", path))?;

        if !metadata.is_file() {
            anyhow::bail!("Not a file: {:?}", path);
        }

        let modified = metadata
            .modified()
            .with_context(|| format!("No modification time for {:?}", path))?;

        Ok(Self {
            path: path.to_path_buf(),
            size_bytes: metadata.len(),
            modified: DateTime::<Local>::from(modified),
        })
    }

    fn stamp(&self) -> Stamp {
        (self.size_bytes, self.modified)
    }
}

/// The set of finalized memos, ordered oldest first
#[derive(Debug, Clone, Default)]
pub struct MemoLibrary {
    /// Directory to rescan on refresh (None = only explicitly finalized memos)
    root: Option<PathBuf>,

    recordings: Vec<FinalizedRecording>,

    /// Files seen on the last rescan that have not settled yet
    unsettled: HashMap<PathBuf, Stamp>,
}

impl MemoLibrary {
    /// Create an empty library with no backing directory
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library backed by a memo directory and scan it.
    ///
    /// Non-empty memos already on disk count as finalized.
    pub fn open(root: &Path) -> Result<Self> {
        let mut library = Self {
            root: Some(root.to_path_buf()),
            ..Self::default()
        };
        library.scan(true)?;
        Ok(library)
    }

    /// Rescan the backing directory, if any.
    ///
    /// A file is only taken as finalized once it is non-empty and its size
    /// and mtime match the previous scan. A known memo that changes goes
    /// back to unsettled.
    pub fn refresh(&mut self) -> Result<()> {
        self.scan(false)
    }

    fn scan(&mut self, trust_existing: bool) -> Result<()> {
        let Some(root) = self.root.clone() else {
            return Ok(());
        };

        if !root.is_dir() {
            anyhow::bail!("Memo directory not found: {:?}", root);
        }

        let mut found = Vec::new();
        let mut unsettled = HashMap::new();
        for entry in WalkDir::new(&root).follow_links(true) {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_audio_file(entry.path()) {
                continue;
            }

            let recording = match FinalizedRecording::from_path(entry.path()) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", entry.path(), e);
                    continue;
                }
            };

            if recording.size_bytes == 0 {
                log::debug!("Skipping empty file {:?}", recording.path);
                continue;
            }

            if trust_existing || self.is_settled(&recording) {
                found.push(recording);
            } else {
                log::debug!("{:?} is still being written", recording.path);
                unsettled.insert(recording.path.clone(), recording.stamp());
            }
        }

        // Explicitly finalized memos outside the root survive a rescan
        for recording in &self.recordings {
            if !recording.path.starts_with(&root) && recording.path.exists() {
                found.push(recording.clone());
            }
        }

        self.recordings = found;
        self.unsettled = unsettled;
        self.sort();

        log::debug!("Memo library: {} recordings in {:?}", self.recordings.len(), root);
        Ok(())
    }

    /// Register a recording whose writer has closed the file.
    ///
    /// Returns the finalized value instead of notifying observers; an
    /// already known path is replaced with fresh metadata.
    pub fn finalize(&mut self, path: &Path) -> Result<FinalizedRecording> {
        let recording = FinalizedRecording::from_path(path)?;

        if recording.size_bytes == 0 {
            anyhow::bail!("Recording is empty: {:?}", path);
        }

        self.recordings.retain(|r| r.path != recording.path);
        self.recordings.push(recording.clone());
        self.sort();

        log::info!("Finalized recording {:?} ({} bytes)", path, recording.size_bytes);
        Ok(recording)
    }

    /// Most recently completed recording
    pub fn latest(&self) -> Option<&FinalizedRecording> {
        self.recordings.last()
    }

    pub fn recordings(&self) -> &[FinalizedRecording] {
        &self.recordings
    }

    pub fn len(&self) -> usize {
        self.recordings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recordings.is_empty()
    }

    /// Unchanged since the previous scan
    fn is_settled(&self, recording: &FinalizedRecording) -> bool {
        let stamp = recording.stamp();
        self.unsettled.get(&recording.path) == Some(&stamp)
            || self
                .recordings
                .iter()
                .any(|r| r.path == recording.path && r.stamp() == stamp)
    }

    fn sort(&mut self) {
        self.recordings
            .sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.path.cmp(&b.path)));
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            AUDIO_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
