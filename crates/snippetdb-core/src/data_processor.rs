use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::traits::DocumentSource;
use crate::types::{Chunk, Document};

/// Window size and overlap, both in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub window: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { window: 600, overlap: 80 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(Error::InvalidConfig("chunk window must be greater than zero".into()));
        }
        if self.overlap >= self.window {
            return Err(Error::InvalidConfig(format!(
                "chunk overlap ({}) must be smaller than the window ({})",
                self.overlap, self.window
            )));
        }
        Ok(())
    }
}

/// Splits text into fixed-size overlapping character windows.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Default for Chunker {
    fn default() -> Self {
        Self { config: ChunkingConfig::default() }
    }
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Windows over the whitespace-normalized text. Always returns at least one
    /// chunk; empty input yields a single empty string.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let normalized = normalize_whitespace(text);
        // Byte offset of every char plus the end, so windows are counted in chars.
        let bounds: Vec<usize> = normalized
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(normalized.len()))
            .collect();
        let len = bounds.len() - 1;
        let step = self.config.window - self.config.overlap;

        let mut chunks = Vec::new();
        let mut start = 0;
        loop {
            let end = (start + self.config.window).min(len);
            chunks.push(normalized[bounds[start]..bounds[end]].to_string());
            if end >= len {
                break;
            }
            start += step;
        }
        chunks
    }

    pub fn chunk_document(&self, doc: &Document) -> Vec<Chunk> {
        self.chunk(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(index, text)| Chunk { source: doc.name.clone(), index, text })
            .collect()
    }

    pub fn chunk_documents(&self, docs: &[Document]) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = docs.iter().flat_map(|d| self.chunk_document(d)).collect();
        debug!(documents = docs.len(), chunks = chunks.len(), "chunked documents");
        chunks
    }
}

/// Collapse every whitespace run (newlines and tabs included) to one space and trim.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Documents stored as files directly under one directory.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { root: root.into(), extension: extension.into() }
    }

    fn list_files(&self) -> Result<Vec<PathBuf>> {
        if !self.root.is_dir() {
            return Err(Error::Io {
                path: self.root.display().to_string(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            });
        }
        let mut files = Vec::new();
        for entry in walkdir::WalkDir::new(&self.root).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warn!(error = %e, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some(self.extension.as_str()) {
                files.push(path.to_path_buf());
            }
        }
        Ok(files)
    }
}

impl DocumentSource for DirectorySource {
    fn documents(&self) -> Result<Vec<Document>> {
        let files = self.list_files()?;
        if files.is_empty() {
            warn!(dir = %self.root.display(), extension = %self.extension, "no documents found");
        }
        let mut docs = Vec::with_capacity(files.len());
        for path in files {
            let Some(name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else { continue };
            match read_utf8(&path) {
                Ok(text) => docs.push(Document { name, text }),
                Err(e) => warn!(file = %path.display(), error = %e, "skipping malformed document"),
            }
        }
        debug!(dir = %self.root.display(), documents = docs.len(), "loaded documents");
        Ok(docs)
    }
}

fn read_utf8(path: &Path) -> std::io::Result<String> {
    let bytes = fs::read(path)?;
    String::from_utf8(bytes).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}
