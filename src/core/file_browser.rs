//! The file browser panel: a flat list of open files plus snapshot trees of
//! opened directories.
//!
//! The panel holds a handle to the [`TabManager`] it was built with and asks
//! it to open files when an entry is activated. It keeps its projection in
//! step with the manager by observing [`TabEvent`](super::tab_manager::TabEvent)s.

use std::cell::RefCell;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info};

use super::error::{FileError, FileOp};
use super::tab_manager::{TabManager, TabObserver};

/// One row of the open-files list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub path: PathBuf,
    pub name: String,
}

impl FileEntry {
    fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            name: file_name(path),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory(Vec<DirNode>),
}

/// A filesystem entry in a directory snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirNode {
    pub path: PathBuf,
    pub name: String,
    pub kind: NodeKind,
}

impl DirNode {
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn children(&self) -> &[DirNode] {
        match &self.kind {
            NodeKind::Directory(children) => children,
            NodeKind::File => &[],
        }
    }

    /// Depth-first, pre-order search for `path` in this subtree.
    pub fn find(&self, path: &Path) -> Option<&DirNode> {
        if self.path == path {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(path))
    }
}

/// What a display row represents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKind {
    /// Section heading ("OPEN FILES", or a tree root label).
    Header,
    /// Entry in the open-files list.
    OpenFile,
    /// File leaf in a directory tree.
    File,
    /// Directory node in a directory tree.
    Directory { expanded: bool },
}

/// One line of the panel, ready to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserRow {
    pub depth: usize,
    pub name: String,
    pub path: Option<PathBuf>,
    pub kind: RowKind,
    pub highlighted: bool,
}

/// What activating a row did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    /// Asked the tab manager to open this file; carries the tab index.
    Opened(usize),
    /// Expanded or collapsed a directory.
    Toggled,
    /// Header or out-of-range row.
    Nothing,
}

pub struct FileBrowserPanel {
    tabs: Rc<RefCell<TabManager>>,
    entries: Vec<FileEntry>,
    active_entry: Option<usize>,
    roots: Vec<DirNode>,
    opened_roots: HashSet<PathBuf>,
    expanded: HashSet<PathBuf>,
}

impl FileBrowserPanel {
    pub fn new(tabs: Rc<RefCell<TabManager>>) -> Self {
        Self {
            tabs,
            entries: Vec::new(),
            active_entry: None,
            roots: Vec::new(),
            opened_roots: HashSet::new(),
            expanded: HashSet::new(),
        }
    }

    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    pub fn active_entry(&self) -> Option<usize> {
        self.active_entry
    }

    pub fn roots(&self) -> &[DirNode] {
        &self.roots
    }

    // =======================================================================
    // Open-files list
    // =======================================================================

    /// Add `path` to the list and highlight it.
    pub fn add_entry(&mut self, path: &Path) {
        if let Some(idx) = self.entries.iter().position(|e| e.path == path) {
            self.active_entry = Some(idx);
            return;
        }
        self.entries.push(FileEntry::new(path));
        self.active_entry = Some(self.entries.len() - 1);
    }

    /// Remove the first entry for `path`.
    pub fn remove_entry(&mut self, path: &Path) {
        let Some(idx) = self.entries.iter().position(|e| e.path == path) else {
            return;
        };
        self.entries.remove(idx);
        self.active_entry = match self.active_entry {
            _ if self.entries.is_empty() => None,
            Some(active) if active > idx => Some(active - 1),
            Some(active) => Some(active.min(self.entries.len() - 1)),
            None => None,
        };
    }

    /// Highlight the first entry for `path`; no-op when it is not listed.
    pub fn set_active(&mut self, path: &Path) {
        if let Some(idx) = self.entries.iter().position(|e| e.path == path) {
            self.active_entry = Some(idx);
        }
    }

    /// Open the file of list entry `index` in the tab manager.
    pub fn activate_entry(&mut self, index: usize) -> Result<Activation, FileError> {
        let Some(entry) = self.entries.get(index) else {
            return Ok(Activation::Nothing);
        };
        let path = entry.path.clone();
        self.open_in_tabs(&path)
    }

    fn open_in_tabs(&mut self, path: &Path) -> Result<Activation, FileError> {
        debug!("browser activation opens {}", path.display());
        let index = self.tabs.borrow_mut().open(path)?;
        Ok(Activation::Opened(index))
    }

    // =======================================================================
    // Directory trees
    // =======================================================================

    /// Snapshot the directory tree under `root`. Returns `Ok(false)` when the
    /// root was already opened this session. On error the panel is unchanged.
    pub fn open_directory(&mut self, root: &Path) -> Result<bool, FileError> {
        let key = root_key(root);
        if self.opened_roots.contains(&key) {
            debug!("{} already opened; not rescanning", root.display());
            return Ok(false);
        }
        let tree = scan_root(root).map_err(|e| FileError::from_io(FileOp::OpenDirectory, root, e))?;
        info!(
            "opened directory {} ({} entries)",
            root.display(),
            count_nodes(&tree) - 1
        );
        self.expanded.insert(tree.path.clone());
        self.roots.push(tree);
        self.opened_roots.insert(key);
        Ok(true)
    }

    /// Find a node by path in any opened tree.
    pub fn find_node(&self, path: &Path) -> Option<&DirNode> {
        self.roots.iter().find_map(|r| r.find(path))
    }

    pub fn is_expanded(&self, path: &Path) -> bool {
        self.expanded.contains(path)
    }

    /// Expand or collapse the directory node at `path`.
    pub fn toggle_expanded(&mut self, path: &Path) {
        if !self.find_node(path).is_some_and(DirNode::is_dir) {
            return;
        }
        if !self.expanded.remove(path) {
            self.expanded.insert(path.to_path_buf());
        }
    }

    // =======================================================================
    // Display rows
    // =======================================================================

    /// Flatten the panel into display rows: the open-files section first,
    /// then each directory tree with expanded directories' children.
    pub fn rows(&self) -> Vec<BrowserRow> {
        let mut rows = vec![BrowserRow {
            depth: 0,
            name: "OPEN FILES".to_string(),
            path: None,
            kind: RowKind::Header,
            highlighted: false,
        }];
        for (i, entry) in self.entries.iter().enumerate() {
            rows.push(BrowserRow {
                depth: 1,
                name: entry.name.clone(),
                path: Some(entry.path.clone()),
                kind: RowKind::OpenFile,
                highlighted: Some(i) == self.active_entry,
            });
        }
        let active_path = self
            .active_entry
            .and_then(|i| self.entries.get(i))
            .map(|e| e.path.as_path());
        for root in &self.roots {
            self.collect_rows(root, 0, active_path, &mut rows);
        }
        rows
    }

    fn collect_rows(
        &self,
        node: &DirNode,
        depth: usize,
        active_path: Option<&Path>,
        out: &mut Vec<BrowserRow>,
    ) {
        let expanded = self.is_expanded(&node.path);
        let kind = if node.is_dir() {
            RowKind::Directory { expanded }
        } else {
            RowKind::File
        };
        out.push(BrowserRow {
            depth,
            name: node.name.clone(),
            path: Some(node.path.clone()),
            kind,
            highlighted: active_path == Some(node.path.as_path()),
        });
        if expanded {
            for child in node.children() {
                self.collect_rows(child, depth + 1, active_path, out);
            }
        }
    }

    /// Activate display row `row`: open files, toggle directories.
    pub fn activate_row(&mut self, row: usize) -> Result<Activation, FileError> {
        let Some(target) = self.rows().into_iter().nth(row) else {
            return Ok(Activation::Nothing);
        };
        match (target.kind, target.path) {
            (RowKind::Directory { .. }, Some(path)) => {
                self.toggle_expanded(&path);
                Ok(Activation::Toggled)
            }
            (RowKind::File | RowKind::OpenFile, Some(path)) => self.open_in_tabs(&path),
            _ => Ok(Activation::Nothing),
        }
    }
}

impl TabObserver for FileBrowserPanel {
    fn on_opened(&mut self, path: &Path) {
        self.add_entry(path);
    }

    fn on_activated(&mut self, path: Option<&Path>) {
        match path {
            Some(p) => self.set_active(p),
            None => self.active_entry = None,
        }
    }

    fn on_closed(&mut self, path: Option<&Path>) {
        if let Some(p) = path {
            self.remove_entry(p);
        }
    }
}

/// Identity of an opened root, so `proj`, `./proj` and links to it match.
fn root_key(root: &Path) -> PathBuf {
    root.canonicalize().unwrap_or_else(|_| root.to_path_buf())
}

/// Snapshot the tree under `root`. The root itself may be a symlink to a
/// directory; links found below it are not followed.
fn scan_root(root: &Path) -> std::io::Result<DirNode> {
    if !fs::metadata(root)?.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a directory",
        ));
    }
    scan_dir(root)
}

/// Depth-first, pre-order snapshot of `path`. Symlinks are recorded as
/// leaves and not followed.
fn scan(path: &Path) -> std::io::Result<DirNode> {
    if fs::symlink_metadata(path)?.is_dir() {
        scan_dir(path)
    } else {
        Ok(DirNode {
            path: path.to_path_buf(),
            name: file_name(path),
            kind: NodeKind::File,
        })
    }
}

fn scan_dir(path: &Path) -> std::io::Result<DirNode> {
    let mut entries = fs::read_dir(path)?.collect::<Result<Vec<_>, _>>()?;
    // Dirs first, then alphabetical
    entries.sort_by_key(|e| {
        let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
        (!is_dir, e.file_name())
    });
    let children = entries
        .iter()
        .map(|e| scan(&e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    Ok(DirNode {
        path: path.to_path_buf(),
        name: file_name(path),
        kind: NodeKind::Directory(children),
    })
}

fn count_nodes(node: &DirNode) -> usize {
    1 + node.children().iter().map(count_nodes).sum::<usize>()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
