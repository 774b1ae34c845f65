//! Text buffer of the generated declaration module and its edits.
//!
//! Edits are recorded against byte offsets of the original snapshot and
//! applied in a single ascending pass, so an earlier edit never shifts the
//! meaning of an offset computed later in the traversal.

use crate::error::RewriteError;
use std::io::Write;
use std::path::{Path, PathBuf};

/// A replacement of `start..end` (original byte offsets) with `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Pending edits against one source snapshot.
#[derive(Debug, Default, Clone)]
pub struct Patch {
    edits: Vec<Edit>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule replacing `start..end` with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.edits.push(Edit {
            start,
            end,
            text: text.into(),
        });
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Drop every edit scheduled after `len` edits; used to undo a failed statement.
    pub fn truncate(&mut self, len: usize) {
        self.edits.truncate(len);
    }

    /// Apply all edits to `source`.
    ///
    /// Identical duplicates collapse into one. Overlapping or out-of-range
    /// edits are rejected without touching the source.
    pub fn apply(&self, source: &str) -> Result<String, RewriteError> {
        let mut edits: Vec<&Edit> = self.edits.iter().collect();
        edits.sort_by_key(|e| (e.start, e.end));
        edits.dedup();

        for edit in &edits {
            let in_bounds = edit.start <= edit.end
                && edit.end <= source.len()
                && source.is_char_boundary(edit.start)
                && source.is_char_boundary(edit.end);
            if !in_bounds {
                return Err(RewriteError::EditOutOfBounds {
                    start: edit.start,
                    end: edit.end,
                    len: source.len(),
                });
            }
        }
        for pair in edits.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            // Two insertions at the same point have no defined order either.
            if b.start < a.end || (a.start == b.start && a.start == a.end) {
                return Err(RewriteError::OverlappingEdits {
                    first: (a.start, a.end),
                    second: (b.start, b.end),
                });
            }
        }

        let mut out = String::with_capacity(source.len());
        let mut cursor = 0;
        for edit in edits {
            out.push_str(&source[cursor..edit.start]);
            out.push_str(&edit.text);
            cursor = edit.end;
        }
        out.push_str(&source[cursor..]);
        Ok(out)
    }
}

/// Owns the declaration file's text between `load` and `save`.
#[derive(Debug)]
pub struct DeclarationWriter {
    path: PathBuf,
    content: String,
    patch: Patch,
    dirty: bool,
}

impl DeclarationWriter {
    /// Read the file at `path` into an editable buffer.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, RewriteError> {
        let path = path.into();
        let content =
            std::fs::read_to_string(&path).map_err(|e| RewriteError::io(&path, e))?;
        Ok(Self::from_source(path, content))
    }

    /// Wrap already-loaded text; `path` is used for saving and diagnostics.
    pub fn from_source(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            patch: Patch::new(),
            dirty: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replace `start..end` of the current snapshot with `text`.
    pub fn replace(&mut self, start: usize, end: usize, text: impl Into<String>) {
        self.patch.replace(start, end, text);
    }

    /// Borrow the snapshot and the pending patch at the same time.
    pub fn split_mut(&mut self) -> (&str, &mut Patch) {
        (&self.content, &mut self.patch)
    }

    pub fn pending(&self) -> usize {
        self.patch.len()
    }

    /// Apply pending edits to the buffer, starting a new snapshot.
    ///
    /// Returns the number of edits applied.
    pub fn commit(&mut self) -> Result<usize, RewriteError> {
        if self.patch.is_empty() {
            return Ok(0);
        }
        let applied = self.patch.len();
        let updated = self.patch.apply(&self.content)?;
        self.patch = Patch::new();
        if updated != self.content {
            self.content = updated;
            self.dirty = true;
        }
        Ok(applied)
    }

    /// Whether committed edits changed the buffer since it was loaded.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Commit pending edits and atomically replace the file on disk.
    ///
    /// Nothing is written when the content is unchanged. The replaced file's
    /// permissions carry over to the new one.
    pub fn save(&mut self) -> Result<bool, RewriteError> {
        self.commit()?;
        if !self.dirty {
            return Ok(false);
        }

        let dir = match self.path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };
        let mut tmp =
            tempfile::NamedTempFile::new_in(&dir).map_err(|e| RewriteError::io(&dir, e))?;
        tmp.write_all(self.content.as_bytes())
            .map_err(|e| RewriteError::io(tmp.path(), e))?;
        if let Ok(meta) = std::fs::metadata(&self.path) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .map_err(|e| RewriteError::io(tmp.path(), e))?;
        }
        tmp.persist(&self.path)
            .map_err(|e| RewriteError::io(&self.path, e.error))?;

        self.dirty = false;
        Ok(true)
    }
}
