use std::io;
use std::path::{Path, PathBuf};

use super::surface::{SurfaceInput, SurfaceOutcome, TextSurface};

/// Label shown for documents that were never saved.
pub const UNTITLED_LABEL: &str = "untitled";

/// Where a document stands relative to its backing file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentState {
    /// Never saved; always dirty.
    Untitled,
    /// Matches the backing file.
    Clean,
    /// Edited since the last load or save.
    Dirty,
}

/// One open document: a text surface plus its file association and dirty
/// state.
#[derive(Debug, Clone)]
pub struct DocumentTab {
    surface: TextSurface,
    backing_path: Option<PathBuf>,
    dirty: bool,
}

impl DocumentTab {
    /// A fresh document with no backing file.
    pub fn untitled(tab_width: usize) -> Self {
        Self {
            surface: TextSurface::new(tab_width),
            backing_path: None,
            dirty: true,
        }
    }

    /// Replace the content with `text` read from `path`.
    pub fn load(&mut self, path: &Path, text: &str) {
        self.surface.set_text(text);
        self.backing_path = Some(path.to_path_buf());
        self.dirty = false;
    }

    /// Write the content to `path` and associate the document with it.
    /// On failure nothing about the document changes.
    pub fn save(&mut self, path: &Path) -> io::Result<()> {
        self.surface.buffer().save_to_file(path)?;
        self.backing_path = Some(path.to_path_buf());
        self.dirty = false;
        Ok(())
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn backing_path(&self) -> Option<&Path> {
        self.backing_path.as_deref()
    }

    pub fn state(&self) -> DocumentState {
        match (&self.backing_path, self.dirty) {
            (None, _) => DocumentState::Untitled,
            (Some(_), false) => DocumentState::Clean,
            (Some(_), true) => DocumentState::Dirty,
        }
    }

    /// Tab label: the file's base name, or "untitled".
    pub fn label(&self) -> String {
        self.backing_path
            .as_ref()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| UNTITLED_LABEL.to_string())
    }

    pub fn surface(&self) -> &TextSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut TextSurface {
        &mut self.surface
    }

    pub fn text(&self) -> String {
        self.surface.text()
    }

    /// Forward input to the surface. Edits mark the document dirty; the
    /// surface's outcome, including its cursor notification, is returned
    /// unchanged.
    pub fn handle_input(&mut self, input: SurfaceInput) -> SurfaceOutcome {
        let outcome = self.surface.handle_input(input);
        if outcome.content_changed {
            self.mark_dirty();
        }
        outcome
    }

    /// Insert text at the cursor, as if typed.
    pub fn insert_text(&mut self, text: &str) -> SurfaceOutcome {
        let outcome = self.surface.insert_text(text);
        if outcome.content_changed {
            self.mark_dirty();
        }
        outcome
    }
}
