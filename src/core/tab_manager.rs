use std::collections::{HashSet, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::cursor::CursorPosition;
use super::document::DocumentTab;
use super::error::{FileError, FileOp, TabError};
use super::surface::{SurfaceInput, SurfaceOutcome};

/// Lifecycle notifications emitted by the [`TabManager`], in the order the
/// state changes happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEvent {
    /// A file got its own tab (opened, or saved under a new path).
    Opened(PathBuf),
    /// The active tab changed; carries its backing path, if any.
    Activated(Option<PathBuf>),
    /// A tab was removed; carries its backing path, if any.
    Closed(Option<PathBuf>),
    /// The cursor of the active tab moved.
    CursorMoved(CursorPosition),
    /// The active tab's dirty flag flipped.
    DirtyChanged(bool),
}

/// Receiver for [`TabEvent`]s. Every method defaults to doing nothing.
pub trait TabObserver {
    fn on_opened(&mut self, _path: &Path) {}
    fn on_activated(&mut self, _path: Option<&Path>) {}
    fn on_closed(&mut self, _path: Option<&Path>) {}
    fn on_cursor_moved(&mut self, _position: CursorPosition) {}
    fn on_dirty_changed(&mut self, _dirty: bool) {}
}

/// Result of [`TabManager::save_active`] when nothing went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Written to this path.
    Saved(PathBuf),
    /// There is no tab to save.
    NoDocument,
    /// The active tab has no file yet; the caller must ask for a path.
    NeedsPath,
}

/// Identity used to detect that two paths name the same open file.
fn path_key(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

/// Owns the open documents in display order and which one is active.
#[derive(Debug)]
pub struct TabManager {
    tabs: Vec<DocumentTab>,
    open_paths: HashSet<PathBuf>,
    active: Option<usize>,
    tab_width: usize,
    events: VecDeque<TabEvent>,
}

impl TabManager {
    pub fn new(tab_width: usize) -> Self {
        Self {
            tabs: Vec::new(),
            open_paths: HashSet::new(),
            active: None,
            tab_width,
            events: VecDeque::new(),
        }
    }

    // =======================================================================
    // Accessors
    // =======================================================================

    pub fn tabs(&self) -> &[DocumentTab] {
        &self.tabs
    }

    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn active_tab(&self) -> Option<&DocumentTab> {
        self.active.and_then(|i| self.tabs.get(i))
    }

    pub fn active_tab_mut(&mut self) -> Option<&mut DocumentTab> {
        self.active.and_then(|i| self.tabs.get_mut(i))
    }

    /// Whether `path` (by identity) has a tab.
    pub fn is_open(&self, path: &Path) -> bool {
        self.open_paths.contains(&path_key(path))
    }

    pub fn has_dirty_tabs(&self) -> bool {
        self.tabs.iter().any(|t| t.is_dirty())
    }

    /// Indices of tabs with unsaved changes.
    pub fn dirty_tabs(&self) -> Vec<usize> {
        self.tabs
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_dirty())
            .map(|(i, _)| i)
            .collect()
    }

    // =======================================================================
    // Document lifecycle
    // =======================================================================

    /// Append an untitled document and make it active.
    pub fn new_document(&mut self) -> usize {
        self.tabs.push(DocumentTab::untitled(self.tab_width));
        let index = self.tabs.len() - 1;
        debug!("created untitled tab at index {index}");
        self.set_active(index);
        index
    }

    /// Open `path` in a tab, or activate the tab that already shows it.
    /// Returns the tab's index.
    pub fn open(&mut self, path: &Path) -> Result<usize, FileError> {
        if let Some(index) = self.find_by_path(path) {
            debug!("{} already open in tab {index}", path.display());
            self.set_active(index);
            return Ok(index);
        }

        let text = fs::read_to_string(path).map_err(|e| FileError::from_io(FileOp::Open, path, e))?;

        let mut tab = DocumentTab::untitled(self.tab_width);
        tab.load(path, &text);
        self.tabs.push(tab);
        self.open_paths.insert(path_key(path));
        let index = self.tabs.len() - 1;
        info!("opened {} in tab {index}", path.display());

        self.events.push_back(TabEvent::Opened(path.to_path_buf()));
        self.set_active(index);
        Ok(index)
    }

    /// Save the active tab, to `path` when given or to its backing file.
    pub fn save_active(&mut self, path: Option<&Path>) -> Result<SaveOutcome, FileError> {
        let Some(index) = self.active else {
            return Ok(SaveOutcome::NoDocument);
        };
        let old_path = self.tabs[index].backing_path().map(Path::to_path_buf);
        let target = match (path, &old_path) {
            (Some(p), _) => p.to_path_buf(),
            (None, Some(p)) => p.clone(),
            (None, None) => return Ok(SaveOutcome::NeedsPath),
        };

        let retarget = old_path
            .as_deref()
            .map_or(true, |old| path_key(old) != path_key(&target));
        if retarget {
            if let Some(other) = self.find_by_path(&target).filter(|&i| i != index) {
                debug!("{} is already open in tab {other}", target.display());
                return Err(FileError::AlreadyOpen {
                    op: FileOp::Save,
                    path: target,
                });
            }
        }

        let was_dirty = self.tabs[index].is_dirty();
        self.tabs[index]
            .save(&target)
            .map_err(|e| FileError::from_io(FileOp::Save, &target, e))?;
        info!("saved tab {index} to {}", target.display());

        if retarget {
            if let Some(old) = &old_path {
                self.open_paths.remove(&path_key(old));
                self.events.push_back(TabEvent::Closed(Some(old.clone())));
            }
            self.open_paths.insert(path_key(&target));
            self.events.push_back(TabEvent::Opened(target.clone()));
            self.events
                .push_back(TabEvent::Activated(Some(target.clone())));
        }
        if was_dirty {
            self.events.push_back(TabEvent::DirtyChanged(false));
        }
        Ok(SaveOutcome::Saved(target))
    }

    /// Remove the tab at `index`, discarding unsaved changes. Returns its
    /// backing path.
    pub fn close(&mut self, index: usize) -> Result<Option<PathBuf>, TabError> {
        if index >= self.tabs.len() {
            return Err(TabError::IndexOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        let tab = self.tabs.remove(index);
        let path = tab.backing_path().map(Path::to_path_buf);
        if let Some(p) = &path {
            self.open_paths.remove(&path_key(p));
        }
        info!("closed tab {index} ({})", tab.label());
        self.events.push_back(TabEvent::Closed(path.clone()));

        match self.active {
            _ if self.tabs.is_empty() => self.active = None,
            Some(active) if active == index => {
                self.set_active(index.min(self.tabs.len() - 1));
            }
            Some(active) if active > index => self.active = Some(active - 1),
            _ => {}
        }
        Ok(path)
    }

    // =======================================================================
    // Activation
    // =======================================================================

    /// Activate the tab backed by `path`, if there is one.
    pub fn activate_by_path(&mut self, path: &Path) {
        if let Some(index) = self.find_by_path(path) {
            self.set_active(index);
        }
    }

    pub fn activate(&mut self, index: usize) -> Result<(), TabError> {
        if index >= self.tabs.len() {
            return Err(TabError::IndexOutOfRange {
                index,
                len: self.tabs.len(),
            });
        }
        self.set_active(index);
        Ok(())
    }

    /// Switch to the next tab, wrapping around.
    pub fn next_tab(&mut self) {
        if let Some(active) = self.active {
            self.set_active((active + 1) % self.tabs.len());
        }
    }

    /// Switch to the previous tab, wrapping around.
    pub fn prev_tab(&mut self) {
        if let Some(active) = self.active {
            let prev = if active == 0 {
                self.tabs.len() - 1
            } else {
                active - 1
            };
            self.set_active(prev);
        }
    }

    fn find_by_path(&self, path: &Path) -> Option<usize> {
        let key = path_key(path);
        self.tabs
            .iter()
            .position(|t| t.backing_path().is_some_and(|p| path_key(p) == key))
    }

    fn set_active(&mut self, index: usize) {
        self.active = Some(index);
        let tab = &self.tabs[index];
        self.events.push_back(TabEvent::Activated(
            tab.backing_path().map(Path::to_path_buf),
        ));
        self.events
            .push_back(TabEvent::CursorMoved(tab.surface().cursor_position()));
    }

    // =======================================================================
    // Editing
    // =======================================================================

    /// Route input to the active tab and queue the notifications it causes.
    pub fn handle_input(&mut self, input: SurfaceInput) -> SurfaceOutcome {
        let Some(tab) = self.active_tab_mut() else {
            return SurfaceOutcome::default();
        };
        let was_dirty = tab.is_dirty();
        let outcome = tab.handle_input(input);
        let dirty = tab.is_dirty();
        if dirty != was_dirty {
            self.events.push_back(TabEvent::DirtyChanged(dirty));
        }
        if let Some(position) = outcome.cursor_moved {
            self.events.push_back(TabEvent::CursorMoved(position));
        }
        outcome
    }

    // =======================================================================
    // Notifications
    // =======================================================================

    /// Take every queued event, oldest first.
    pub fn drain_events(&mut self) -> Vec<TabEvent> {
        self.events.drain(..).collect()
    }

    /// Hand every queued event to `observer`, oldest first.
    pub fn deliver(&mut self, observer: &mut dyn TabObserver) {
        for event in self.drain_events() {
            dispatch(&event, observer);
        }
    }
}

/// Call the observer method matching `event`.
pub fn dispatch(event: &TabEvent, observer: &mut dyn TabObserver) {
    match event {
        TabEvent::Opened(path) => observer.on_opened(path),
        TabEvent::Activated(path) => observer.on_activated(path.as_deref()),
        TabEvent::Closed(path) => observer.on_closed(path.as_deref()),
        TabEvent::CursorMoved(position) => observer.on_cursor_moved(*position),
        TabEvent::DirtyChanged(dirty) => observer.on_dirty_changed(*dirty),
    }
}

impl Default for TabManager {
    fn default() -> Self {
        Self::new(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::DocumentState;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_new_document() {
        let mut tm = TabManager::default();
        let i = tm.new_document();
        assert_eq!(i, 0);
        assert_eq!(tm.active_index(), Some(0));
        let tab = tm.active_tab().unwrap();
        assert_eq!(tab.backing_path(), None);
        assert!(tab.is_dirty());
        assert_eq!(tab.label(), "untitled");
    }

    #[test]
    fn test_open_twice_yields_one_tab() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let b = write(dir.path(), "b.txt", "B");
        let mut tm = TabManager::default();

        assert_eq!(tm.open(&a).unwrap(), 0);
        assert_eq!(tm.open(&b).unwrap(), 1);
        assert_eq!(tm.open(&a).unwrap(), 0);
        assert_eq!(tm.len(), 2);
        assert_eq!(tm.active_index(), Some(0));
    }

    #[test]
    fn test_open_same_file_through_other_spelling() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        fs::create_dir(dir.path().join("sub")).unwrap();
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.open(&dir.path().join("sub").join("..").join("a.txt"))
            .unwrap();
        assert_eq!(tm.len(), 1);
    }

    #[test]
    fn test_open_missing_file_leaves_state() {
        let mut tm = TabManager::default();
        tm.new_document();
        tm.drain_events();

        let err = tm.open(Path::new("/no/such/file")).unwrap_err();
        assert!(matches!(err, FileError::NotFound { op: FileOp::Open, .. }));
        assert_eq!(tm.len(), 1);
        assert_eq!(tm.active_index(), Some(0));
        assert!(tm.drain_events().is_empty());
    }

    #[test]
    fn test_open_event_order() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        assert_eq!(
            tm.drain_events(),
            vec![
                TabEvent::Opened(a.clone()),
                TabEvent::Activated(Some(a.clone())),
                TabEvent::CursorMoved(CursorPosition { line: 1, column: 1 }),
            ]
        );
    }

    #[test]
    fn test_save_untitled_needs_path() {
        let mut tm = TabManager::default();
        assert_eq!(tm.save_active(None).unwrap(), SaveOutcome::NoDocument);
        tm.new_document();
        assert_eq!(tm.save_active(None).unwrap(), SaveOutcome::NeedsPath);
    }

    #[test]
    fn test_save_as_registers_path() {
        let dir = tempfile::tempdir().unwrap();
        let x = dir.path().join("X");
        let mut tm = TabManager::default();
        tm.new_document();
        tm.handle_input(SurfaceInput::char('q'));
        tm.drain_events();

        let out = tm.save_active(Some(&x)).unwrap();
        assert_eq!(out, SaveOutcome::Saved(x.clone()));
        let tab = tm.active_tab().unwrap();
        assert_eq!(tab.backing_path(), Some(x.as_path()));
        assert!(!tab.is_dirty());
        assert_eq!(tab.label(), "X");
        assert!(tm.is_open(&x));
        assert_eq!(
            tm.drain_events(),
            vec![
                TabEvent::Opened(x.clone()),
                TabEvent::Activated(Some(x.clone())),
                TabEvent::DirtyChanged(false),
            ]
        );
    }

    #[test]
    fn test_save_dirty_keeps_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.handle_input(SurfaceInput::char('z'));
        assert_eq!(tm.active_tab().unwrap().state(), DocumentState::Dirty);

        tm.save_active(None).unwrap();
        let tab = tm.active_tab().unwrap();
        assert_eq!(tab.state(), DocumentState::Clean);
        assert_eq!(tab.backing_path(), Some(a.as_path()));
        assert_eq!(fs::read_to_string(&a).unwrap(), "zA");
    }

    #[cfg(unix)]
    #[test]
    fn test_save_to_read_only_file_is_denied() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        fs::set_permissions(&a, fs::Permissions::from_mode(0o444)).unwrap();
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.handle_input(SurfaceInput::char('z'));
        tm.drain_events();

        let err = tm.save_active(None).unwrap_err();

        assert!(matches!(err, FileError::PermissionDenied { op: FileOp::Save, .. }));
        assert_eq!(fs::read_to_string(&a).unwrap(), "A");
        let tab = tm.active_tab().unwrap();
        assert_eq!(tab.state(), DocumentState::Dirty);
        assert_eq!(tab.surface().text(), "zA");
        assert!(tm.drain_events().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_through_symlink_keeps_link() {
        let dir = tempfile::tempdir().unwrap();
        let real = write(dir.path(), "real.txt", "A");
        let link = dir.path().join("link.txt");
        std::os::unix::fs::symlink(&real, &link).unwrap();
        let mut tm = TabManager::default();
        tm.open(&link).unwrap();
        tm.handle_input(SurfaceInput::char('x'));

        tm.save_active(None).unwrap();

        assert_eq!(fs::read_to_string(&real).unwrap(), "xA");
        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(tm.active_tab().unwrap().backing_path(), Some(link.as_path()));
    }

    #[test]
    fn test_save_as_path_of_other_tab_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.new_document();
        let err = tm.save_active(Some(&a)).unwrap_err();
        assert!(matches!(err, FileError::AlreadyOpen { .. }));
        assert_eq!(fs::read_to_string(&a).unwrap(), "A");
    }

    #[test]
    fn test_save_as_moves_identity() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let b = dir.path().join("b.txt");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.save_active(Some(&b)).unwrap();
        assert!(!tm.is_open(&a));
        assert!(tm.is_open(&b));
    }

    #[test]
    fn test_close_removes_exactly_that_tab() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let b = write(dir.path(), "b.txt", "B");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.open(&b).unwrap();
        tm.new_document();
        tm.drain_events();

        assert_eq!(tm.close(0).unwrap(), Some(a.clone()));
        assert_eq!(tm.len(), 2);
        assert!(!tm.is_open(&a));
        assert!(tm.is_open(&b));
        assert_eq!(tm.active_index(), Some(1));
        assert_eq!(tm.drain_events(), vec![TabEvent::Closed(Some(a))]);
    }

    #[test]
    fn test_close_active_picks_neighbour() {
        let mut tm = TabManager::default();
        tm.new_document();
        tm.new_document();
        tm.new_document();
        tm.activate(2).unwrap();
        tm.close(2).unwrap();
        assert_eq!(tm.active_index(), Some(1));
        tm.activate(0).unwrap();
        tm.close(0).unwrap();
        assert_eq!(tm.active_index(), Some(0));
    }

    #[test]
    fn test_close_only_tab() {
        let mut tm = TabManager::default();
        tm.new_document();
        assert_eq!(tm.close(0).unwrap(), None);
        assert!(tm.is_empty());
        assert_eq!(tm.active_index(), None);
    }

    #[test]
    fn test_close_out_of_range() {
        let mut tm = TabManager::default();
        tm.new_document();
        assert_eq!(
            tm.close(5),
            Err(TabError::IndexOutOfRange { index: 5, len: 1 })
        );
        assert_eq!(tm.len(), 1);
    }

    #[test]
    fn test_activate_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.new_document();
        tm.activate_by_path(&a);
        assert_eq!(tm.active_index(), Some(0));
        tm.activate_by_path(Path::new("/elsewhere"));
        assert_eq!(tm.active_index(), Some(0));
    }

    #[test]
    fn test_next_prev_wrap() {
        let mut tm = TabManager::default();
        tm.next_tab();
        assert_eq!(tm.active_index(), None);
        tm.new_document();
        tm.new_document();
        tm.next_tab();
        assert_eq!(tm.active_index(), Some(0));
        tm.prev_tab();
        assert_eq!(tm.active_index(), Some(1));
    }

    #[test]
    fn test_edit_events() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.drain_events();
        tm.handle_input(SurfaceInput::char('b'));
        assert_eq!(
            tm.drain_events(),
            vec![
                TabEvent::DirtyChanged(true),
                TabEvent::CursorMoved(CursorPosition { line: 1, column: 2 }),
            ]
        );
        assert_eq!(tm.dirty_tabs(), vec![0]);
        assert!(tm.has_dirty_tabs());
    }

    #[derive(Default)]
    struct Recorder(Vec<String>);

    impl TabObserver for Recorder {
        fn on_opened(&mut self, path: &Path) {
            self.0.push(format!("opened {}", path.display()));
        }
        fn on_closed(&mut self, path: Option<&Path>) {
            self.0.push(format!("closed {:?}", path));
        }
    }

    #[test]
    fn test_deliver_uses_default_methods() {
        let dir = tempfile::tempdir().unwrap();
        let a = write(dir.path(), "a.txt", "A");
        let mut tm = TabManager::default();
        tm.open(&a).unwrap();
        tm.close(0).unwrap();
        let mut rec = Recorder::default();
        tm.deliver(&mut rec);
        assert_eq!(
            rec.0,
            vec![
                format!("opened {}", a.display()),
                format!("closed {:?}", Some(a.as_path())),
            ]
        );
    }
}
