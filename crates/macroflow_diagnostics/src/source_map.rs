//! Source files, byte spans, and line/column resolution.

use macroflow_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

/// Index of a file inside a [`SourceMap`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct FileId(u32);

impl FileId {
    /// Creates a `FileId` from its raw index.
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    /// Returns the raw index.
    pub fn as_raw(self) -> u32 {
        self.0
    }
}

/// A half-open byte range `[start, end)` inside one source file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Span {
    /// The file this span points into.
    pub file: FileId,
    /// First byte (inclusive).
    pub start: u32,
    /// One past the last byte.
    pub end: u32,
}

impl Span {
    /// Creates a span.
    pub fn new(file: FileId, start: u32, end: u32) -> Self {
        Self { file, start, end }
    }

    /// Returns the smallest span covering both `self` and `other`.
    ///
    /// # Panics
    ///
    /// Panics if the spans belong to different files.
    pub fn to(self, other: Span) -> Span {
        assert_eq!(self.file, other.file, "spans from different files");
        Span {
            file: self.file,
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    /// Returns `true` for a zero-length span.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A 1-indexed position for display.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Path of the file as it was loaded.
    pub path: PathBuf,
    /// Line number, starting at 1.
    pub line: u32,
    /// Column in bytes, starting at 1.
    pub column: u32,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.path.display(), self.line, self.column)
    }
}

/// One loaded source file.
pub struct SourceFile {
    /// Path used in diagnostics.
    pub path: PathBuf,
    /// Full text.
    pub content: String,
    /// Digest of `content`.
    pub hash: ContentHash,
    line_starts: Vec<u32>,
}

impl SourceFile {
    fn new(path: PathBuf, content: String) -> Self {
        let mut line_starts = vec![0u32];
        line_starts.extend(
            content
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| (i + 1) as u32),
        );
        let hash = ContentHash::from_bytes(content.as_bytes());
        Self {
            path,
            content,
            hash,
            line_starts,
        }
    }

    /// Converts a byte offset to a 1-indexed `(line, column)` pair.
    pub fn line_col(&self, offset: u32) -> (u32, u32) {
        let idx = match self.line_starts.binary_search(&offset) {
            Ok(idx) => idx,
            Err(idx) => idx - 1,
        };
        (idx as u32 + 1, offset - self.line_starts[idx] + 1)
    }

    /// Returns the full text of the line containing `offset`, without the newline.
    pub fn line_text(&self, offset: u32) -> &str {
        let offset = (offset as usize).min(self.content.len());
        let start = self.content[..offset].rfind('\n').map_or(0, |p| p + 1);
        let end = self.content[offset..]
            .find('\n')
            .map_or(self.content.len(), |p| offset + p);
        &self.content[start..end]
    }
}

/// Owns every source file read in a session.
#[derive(Default)]
pub struct SourceMap {
    files: Vec<SourceFile>,
}

impl SourceMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a file from disk.
    pub fn load(&mut self, path: &Path) -> io::Result<FileId> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.add(path, content))
    }

    /// Adds in-memory text under the given display path.
    pub fn add(&mut self, path: impl Into<PathBuf>, content: String) -> FileId {
        let id = FileId(self.files.len() as u32);
        self.files.push(SourceFile::new(path.into(), content));
        id
    }

    /// Returns the file for `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was not issued by this map.
    pub fn file(&self, id: FileId) -> &SourceFile {
        &self.files[id.0 as usize]
    }

    /// Number of loaded files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Returns `true` if nothing has been loaded.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Resolves the start of `span` for display.
    pub fn locate(&self, span: Span) -> Location {
        let file = self.file(span.file);
        let (line, column) = file.line_col(span.start);
        Location {
            path: file.path.clone(),
            line,
            column,
        }
    }

    /// Returns the text covered by `span`.
    pub fn snippet(&self, span: Span) -> &str {
        &self.file(span.file).content[span.start as usize..span.end as usize]
    }
}
