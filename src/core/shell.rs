//! The editor shell: owns the tab manager, the file browser and the gutter,
//! turns key presses into commands, and holds the status bar, prompts,
//! confirmations and the current notice.
//!
//! Front ends feed key names through [`Shell::handle_key`] and scroll ticks
//! through [`Shell::handle_scroll`], then draw from the accessors.

use std::cell::{Ref, RefCell};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use tracing::{debug, info, warn};

use super::cursor::CursorPosition;
use super::document::DocumentTab;
use super::error::{FileError, Notice};
use super::file_browser::{Activation, FileBrowserPanel};
use super::file_filter::FileFilter;
use super::gutter::{Gutter, GutterFrame, GutterLabel, GutterMetrics};
use super::settings::Settings;
use super::surface::{SurfaceInput, SurfaceOutcome};
use super::tab_manager::{dispatch, SaveOutcome, TabEvent, TabManager, TabObserver};

/// What the front end should do after a key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellAction {
    None,
    Quit,
}

/// Where keys go when no prompt or dialog is up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Editor,
    Browser,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    OpenFile,
    SaveAs,
    OpenDirectory,
}

impl PromptKind {
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::OpenFile => "Open file",
            PromptKind::SaveAs => "Save file",
            PromptKind::OpenDirectory => "Open folder",
        }
    }

    fn uses_filter(self) -> bool {
        !matches!(self, PromptKind::OpenDirectory)
    }
}

/// A path being typed in the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub kind: PromptKind,
    pub input: String,
    /// Index into the shell's filters.
    pub filter: usize,
    /// Candidates offered by the last Tab completion.
    pub completions: Vec<String>,
}

/// A yes/no question guarding unsaved changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirm {
    CloseTab(usize),
    Quit,
}

/// Cursor position and save state of the active tab.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusBar {
    position: Option<CursorPosition>,
    dirty: Option<bool>,
}

impl StatusBar {
    /// e.g. `line:3 column:7`; empty with no tab open.
    pub fn line_and_column(&self) -> String {
        match self.position {
            Some(p) => format!("line:{} column:{}", p.line, p.column),
            None => String::new(),
        }
    }

    pub fn position(&self) -> Option<CursorPosition> {
        self.position
    }

    pub fn dirty(&self) -> Option<bool> {
        self.dirty
    }
}

impl TabObserver for StatusBar {
    fn on_activated(&mut self, path: Option<&Path>) {
        if path.is_none() {
            // Untitled documents are always unsaved.
            self.dirty = Some(true);
        }
    }

    fn on_cursor_moved(&mut self, position: CursorPosition) {
        self.position = Some(position);
    }

    fn on_dirty_changed(&mut self, dirty: bool) {
        self.dirty = Some(dirty);
    }
}

pub struct Shell {
    tabs: Rc<RefCell<TabManager>>,
    browser: FileBrowserPanel,
    gutter: Gutter,
    gutter_labels: Vec<GutterLabel>,
    settings: Settings,
    filters: Vec<FileFilter>,
    status: StatusBar,
    /// One-line feedback shown in the command line area ("written", ...).
    pub message: String,
    notice: Option<Notice>,
    prompt: Option<Prompt>,
    confirm: Option<Confirm>,
    focus: Focus,
    browser_visible: bool,
    browser_selection: usize,
    viewport: (usize, usize),
}

impl Shell {
    pub fn new(settings: Settings) -> Self {
        let tabs = Rc::new(RefCell::new(TabManager::new(settings.tab_width as usize)));
        let browser = FileBrowserPanel::new(Rc::clone(&tabs));
        let mut gutter = Gutter::new(GutterMetrics::cells(settings.gutter_padding));
        gutter.set_visible(settings.show_line_numbers);
        Self {
            tabs,
            browser,
            gutter,
            gutter_labels: Vec::new(),
            filters: FileFilter::defaults(),
            status: StatusBar::default(),
            message: String::new(),
            notice: None,
            prompt: None,
            confirm: None,
            focus: Focus::Editor,
            browser_visible: settings.explorer_visible_on_startup,
            browser_selection: 0,
            viewport: (40, 80),
            settings,
        }
    }

    // =======================================================================
    // Accessors
    // =======================================================================

    pub fn tabs(&self) -> Ref<'_, TabManager> {
        self.tabs.borrow()
    }

    pub fn browser(&self) -> &FileBrowserPanel {
        &self.browser
    }

    pub fn gutter(&self) -> &Gutter {
        &self.gutter
    }

    /// Line numbers as of the last repaint.
    pub fn gutter_labels(&self) -> &[GutterLabel] {
        &self.gutter_labels
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn filters(&self) -> &[FileFilter] {
        &self.filters
    }

    pub fn status(&self) -> &StatusBar {
        &self.status
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn confirm(&self) -> Option<Confirm> {
        self.confirm
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn browser_visible(&self) -> bool {
        self.browser_visible
    }

    pub fn browser_selection(&self) -> usize {
        self.browser_selection
    }

    /// Font size of the active tab after zoom.
    pub fn font_size(&self) -> i32 {
        let zoom = self
            .tabs
            .borrow()
            .active_tab()
            .map_or(0, |t| t.surface().zoom());
        self.settings.zoomed_font_size(zoom)
    }

    /// The question text for the pending confirmation.
    pub fn confirm_question(&self) -> Option<String> {
        let confirm = self.confirm?;
        let tabs = self.tabs.borrow();
        Some(match confirm {
            Confirm::CloseTab(index) => {
                let label = tabs.tabs().get(index).map(DocumentTab::label).unwrap_or_default();
                format!("{label} has unsaved changes. Close anyway? (y/n)")
            }
            Confirm::Quit => {
                let count = tabs.tabs().iter().filter(|t| needs_confirmation(t)).count();
                format!("{count} tab(s) have unsaved changes. Quit anyway? (y/n)")
            }
        })
    }

    /// Set the room the front end gives the text area.
    pub fn set_viewport(&mut self, lines: usize, cols: usize) {
        if self.viewport == (lines, cols) {
            return;
        }
        self.viewport = (lines, cols);
        self.refresh_gutter();
    }

    // =======================================================================
    // Commands
    // =======================================================================

    pub fn new_document(&mut self) {
        self.tabs.borrow_mut().new_document();
        self.after_tab_change();
    }

    /// Open `path` as a tab, or its tree in the browser when it is a
    /// directory. Used for command-line arguments.
    pub fn open_argument(&mut self, path: &Path) {
        if path.is_dir() {
            self.open_directory(path);
        } else {
            self.open_file(path);
        }
    }

    pub fn open_file(&mut self, path: &Path) {
        let result = self.tabs.borrow_mut().open(path);
        match result {
            Ok(_) => self.after_tab_change(),
            Err(e) => self.report(e),
        }
    }

    pub fn open_directory(&mut self, path: &Path) {
        match self.browser.open_directory(path) {
            Ok(true) => {
                self.browser_visible = true;
                self.message = format!("opened {}", path.display());
            }
            Ok(false) => self.message = format!("{} is already open", path.display()),
            Err(e) => self.report(e),
        }
    }

    /// Save the active tab; untitled tabs go through the save-as prompt.
    pub fn save(&mut self) {
        let result = self.tabs.borrow_mut().save_active(None);
        match result {
            Ok(SaveOutcome::Saved(path)) => {
                self.message = format!("\"{}\" written", path.display());
                self.pump_events();
            }
            Ok(SaveOutcome::NeedsPath) => self.start_prompt(PromptKind::SaveAs),
            Ok(SaveOutcome::NoDocument) => {}
            Err(e) => self.report(e),
        }
    }

    pub fn save_as(&mut self, path: &Path) {
        let result = self.tabs.borrow_mut().save_active(Some(path));
        match result {
            Ok(SaveOutcome::Saved(path)) => {
                self.message = format!("\"{}\" written", path.display());
                self.pump_events();
            }
            Ok(_) => {}
            Err(e) => self.report(e),
        }
    }

    /// Close the active tab, asking first if it holds unsaved work.
    pub fn close_active(&mut self) {
        let pending = {
            let tabs = self.tabs.borrow();
            tabs.active_index()
                .map(|i| (i, tabs.tabs().get(i).is_some_and(needs_confirmation)))
        };
        match pending {
            Some((index, true)) => self.confirm = Some(Confirm::CloseTab(index)),
            Some((index, false)) => self.close_tab(index),
            None => {}
        }
    }

    fn close_tab(&mut self, index: usize) {
        let result = self.tabs.borrow_mut().close(index);
        if let Err(e) = result {
            warn!("{e}");
            return;
        }
        self.after_tab_change();
        if self.tabs.borrow().is_empty() {
            self.status = StatusBar::default();
        }
    }

    /// Quit, asking first if any tab holds unsaved work.
    pub fn request_quit(&mut self) -> ShellAction {
        let unsaved = self.tabs.borrow().tabs().iter().any(needs_confirmation);
        if unsaved {
            self.confirm = Some(Confirm::Quit);
            ShellAction::None
        } else {
            ShellAction::Quit
        }
    }

    pub fn toggle_line_numbers(&mut self) {
        let visible = !self.gutter.is_visible();
        self.gutter.set_visible(visible);
        self.refresh_gutter();
    }

    pub fn toggle_browser(&mut self) {
        self.browser_visible = !self.browser_visible;
        if !self.browser_visible {
            self.focus = Focus::Editor;
        }
    }

    fn report(&mut self, err: FileError) {
        warn!("{err}");
        self.notice = Some(err.notice());
    }

    // =======================================================================
    // Input
    // =======================================================================

    /// Handle one key press. `key_name` uses the same names as
    /// [`SurfaceInput::Key`]; printable characters arrive in `unicode`.
    pub fn handle_key(&mut self, key_name: &str, unicode: Option<char>, ctrl: bool) -> ShellAction {
        if self.notice.take().is_some() {
            return ShellAction::None;
        }
        if let Some(confirm) = self.confirm {
            return self.handle_confirm_key(confirm, key_name, unicode);
        }
        if self.prompt.is_some() {
            self.handle_prompt_key(key_name, unicode, ctrl);
            return ShellAction::None;
        }
        self.message.clear();

        if ctrl {
            if let Some(action) = self.handle_ctrl_key(key_name, unicode) {
                return action;
            }
        }
        if key_name == "F12" {
            self.start_prompt(PromptKind::SaveAs);
            return ShellAction::None;
        }

        match self.focus {
            Focus::Editor => self.handle_editor_input(SurfaceInput::Key {
                name: key_name.to_string(),
                unicode,
                ctrl,
            }),
            Focus::Browser => self.handle_browser_key(key_name),
        }
        ShellAction::None
    }

    /// Handle `delta` scroll ticks over the text area. With `modifier` held
    /// the active tab zooms instead.
    pub fn handle_scroll(&mut self, delta: i32, modifier: bool) {
        if self.notice.is_some() || self.confirm.is_some() {
            return;
        }
        self.handle_editor_input(SurfaceInput::Scroll { delta, modifier });
    }

    fn handle_ctrl_key(&mut self, key_name: &str, unicode: Option<char>) -> Option<ShellAction> {
        match (key_name, unicode) {
            ("Page_Down", _) => self.tabs.borrow_mut().next_tab(),
            ("Page_Up", _) => self.tabs.borrow_mut().prev_tab(),
            (_, Some('n')) => {
                self.new_document();
                return Some(ShellAction::None);
            }
            (_, Some('o')) => self.start_prompt(PromptKind::OpenFile),
            (_, Some('d')) => self.start_prompt(PromptKind::OpenDirectory),
            (_, Some('s')) => self.save(),
            (_, Some('S')) => self.start_prompt(PromptKind::SaveAs),
            (_, Some('w')) => self.close_active(),
            (_, Some('q')) => return Some(self.request_quit()),
            (_, Some('l')) => self.toggle_line_numbers(),
            (_, Some('b')) => self.toggle_browser(),
            (_, Some('e')) => {
                self.browser_visible = true;
                self.focus = match self.focus {
                    Focus::Editor => Focus::Browser,
                    Focus::Browser => Focus::Editor,
                };
            }
            _ => return None,
        }
        self.after_tab_change();
        Some(ShellAction::None)
    }

    fn handle_editor_input(&mut self, input: SurfaceInput) {
        if self.tabs.borrow().is_empty() {
            return;
        }
        let outcome = self.tabs.borrow_mut().handle_input(input);
        self.update_gutter(&outcome);
        self.pump_events();
    }

    fn handle_browser_key(&mut self, key_name: &str) {
        let row_count = self.browser.rows().len();
        match key_name {
            "Up" => self.browser_selection = self.browser_selection.saturating_sub(1),
            "Down" => {
                self.browser_selection = (self.browser_selection + 1).min(row_count.saturating_sub(1))
            }
            "Home" => self.browser_selection = 0,
            "End" => self.browser_selection = row_count.saturating_sub(1),
            "Escape" => self.focus = Focus::Editor,
            "Return" => match self.browser.activate_row(self.browser_selection) {
                Ok(Activation::Opened(_)) => {
                    self.focus = Focus::Editor;
                    self.after_tab_change();
                }
                Ok(_) => {}
                Err(e) => self.report(e),
            },
            _ => {}
        }
        let row_count = self.browser.rows().len();
        self.browser_selection = self.browser_selection.min(row_count.saturating_sub(1));
    }

    fn handle_confirm_key(&mut self, confirm: Confirm, key_name: &str, unicode: Option<char>) -> ShellAction {
        match (key_name, unicode) {
            (_, Some('y' | 'Y')) => {
                self.confirm = None;
                match confirm {
                    Confirm::CloseTab(index) => {
                        info!("discarding unsaved changes in tab {index}");
                        self.close_tab(index);
                    }
                    Confirm::Quit => return ShellAction::Quit,
                }
            }
            ("Escape", _) | (_, Some('n' | 'N')) => self.confirm = None,
            _ => {}
        }
        ShellAction::None
    }

    // =======================================================================
    // Prompts
    // =======================================================================

    pub fn start_prompt(&mut self, kind: PromptKind) {
        if kind == PromptKind::SaveAs && self.tabs.borrow().is_empty() {
            return;
        }
        let mut input = std::env::current_dir()
            .map(|d| d.display().to_string())
            .unwrap_or_default();
        if !input.ends_with('/') {
            input.push('/');
        }
        let filter = self
            .filters
            .iter()
            .position(|f| f.name == self.settings.default_filter)
            .unwrap_or(0);
        self.prompt = Some(Prompt {
            kind,
            input,
            filter,
            completions: Vec::new(),
        });
    }

    fn handle_prompt_key(&mut self, key_name: &str, unicode: Option<char>, ctrl: bool) {
        let Some(prompt) = self.prompt.as_mut() else {
            return;
        };
        match key_name {
            "Escape" => self.prompt = None,
            "Return" => {
                if let Some(prompt) = self.prompt.take() {
                    self.submit_prompt(prompt);
                }
            }
            "BackSpace" => {
                prompt.input.pop();
                prompt.completions.clear();
            }
            "Tab" => {
                let filter = prompt
                    .kind
                    .uses_filter()
                    .then(|| &self.filters[prompt.filter]);
                let dirs_only = prompt.kind == PromptKind::OpenDirectory;
                match complete_path(&prompt.input, filter, dirs_only) {
                    Ok((completed, candidates)) => {
                        prompt.input = completed;
                        prompt.completions = candidates;
                    }
                    Err(e) => debug!("no completion for {}: {e}", prompt.input),
                }
            }
            _ if ctrl && unicode == Some('t') => {
                if prompt.kind.uses_filter() {
                    prompt.filter = (prompt.filter + 1) % self.filters.len();
                    prompt.completions.clear();
                }
            }
            _ => {
                if let Some(ch) = unicode.filter(|c| !ctrl && !c.is_control()) {
                    prompt.input.push(ch);
                    prompt.completions.clear();
                }
            }
        }
    }

    fn submit_prompt(&mut self, prompt: Prompt) {
        let input = prompt.input.trim();
        if input.is_empty() {
            return;
        }
        let path = PathBuf::from(input);
        debug!("{} prompt submitted {}", prompt.kind.title(), path.display());
        match prompt.kind {
            PromptKind::OpenFile => self.open_file(&path),
            PromptKind::SaveAs => self.save_as(&path),
            PromptKind::OpenDirectory => self.open_directory(&path),
        }
    }

    // =======================================================================
    // Event routing
    // =======================================================================

    fn after_tab_change(&mut self) {
        self.pump_events();
        self.refresh_gutter();
    }

    /// Deliver queued tab events to the browser and the status bar.
    fn pump_events(&mut self) {
        let events = self.tabs.borrow_mut().drain_events();
        for event in &events {
            debug!("tab event {event:?}");
            dispatch(event, &mut self.browser);
            dispatch(event, &mut self.status);
            if let TabEvent::Activated(Some(_)) = event {
                self.status.dirty = self.tabs.borrow().active_tab().map(DocumentTab::is_dirty);
            }
        }
    }

    fn update_gutter(&mut self, outcome: &SurfaceOutcome) {
        let frame = {
            let tabs = self.tabs.borrow();
            tabs.active_tab().map(|t| GutterFrame::of(t.surface()))
        };
        let Some(frame) = frame else {
            return;
        };
        if let Some(labels) = self.gutter.on_surface_update(outcome, &frame) {
            self.gutter_labels = labels;
        }
    }

    /// Apply the viewport to the active tab and lay the gutter out again.
    fn refresh_gutter(&mut self) {
        let (lines, cols) = self.viewport;
        let frame = {
            let mut tabs = self.tabs.borrow_mut();
            tabs.active_tab_mut().map(|t| {
                t.surface_mut().set_viewport(lines, cols);
                GutterFrame::of(t.surface())
            })
        };
        match frame {
            Some(frame) => {
                self.gutter.update_width(frame.line_count);
                self.gutter_labels = if self.gutter.is_visible() {
                    self.gutter.labels(&frame)
                } else {
                    Vec::new()
                };
            }
            None => self.gutter_labels.clear(),
        }
    }
}

/// Closing this tab would lose work. Empty untitled tabs lose nothing.
fn needs_confirmation(tab: &DocumentTab) -> bool {
    tab.is_dirty() && !(tab.backing_path().is_none() && tab.surface().buffer().len_chars() == 0)
}

/// Complete the last path component of `input` against the entries of its
/// directory. Returns the new input and the candidate names when more than
/// one entry matches.
fn complete_path(
    input: &str,
    filter: Option<&FileFilter>,
    dirs_only: bool,
) -> io::Result<(String, Vec<String>)> {
    let (dir, prefix) = match input.rfind('/') {
        Some(i) => (&input[..=i], &input[i + 1..]),
        None => ("", input),
    };
    let read_from = if dir.is_empty() { Path::new(".") } else { Path::new(dir) };

    let mut candidates: Vec<(String, bool)> = fs::read_dir(read_from)?
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name().to_string_lossy().to_string();
            let is_dir = e.file_type().map(|t| t.is_dir()).unwrap_or(false);
            let keep = name.starts_with(prefix)
                && (is_dir || (!dirs_only && filter.map_or(true, |f| f.matches(Path::new(&name)))));
            keep.then_some((name, is_dir))
        })
        .collect();
    candidates.sort();

    match candidates.as_slice() {
        [] => Ok((input.to_string(), Vec::new())),
        [(name, is_dir)] => {
            let slash = if *is_dir { "/" } else { "" };
            Ok((format!("{dir}{name}{slash}"), Vec::new()))
        }
        [(first, _), rest @ ..] => {
            let common = rest.iter().fold(first.as_str(), |acc, (name, _)| {
                let len = acc
                    .char_indices()
                    .zip(name.chars())
                    .take_while(|((_, a), b)| a == b)
                    .last()
                    .map_or(0, |((i, a), _)| i + a.len_utf8());
                &acc[..len]
            });
            let names = candidates.iter().map(|(n, _)| n.clone()).collect();
            Ok((format!("{dir}{common}"), names))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shell() -> Shell {
        Shell::new(Settings::default())
    }

    fn type_text(shell: &mut Shell, text: &str) {
        for ch in text.chars() {
            shell.handle_key("", Some(ch), false);
        }
    }

    fn ctrl(shell: &mut Shell, ch: char) -> ShellAction {
        shell.handle_key("", Some(ch), true)
    }

    fn set_prompt_input(shell: &mut Shell, text: &str) {
        for _ in 0..shell.prompt().map_or(0, |p| p.input.chars().count()) {
            shell.handle_key("BackSpace", None, false);
        }
        type_text(shell, text);
    }

    #[test]
    fn test_status_tracks_cursor() {
        let mut s = shell();
        s.new_document();
        assert_eq!(s.status().line_and_column(), "line:1 column:1");
        type_text(&mut s, "ab");
        s.handle_key("Return", None, false);
        type_text(&mut s, "c");
        assert_eq!(s.status().line_and_column(), "line:2 column:2");
        assert_eq!(s.status().dirty(), Some(true));
    }

    #[test]
    fn test_save_untitled_goes_through_prompt() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out.txt");
        let mut s = shell();
        s.new_document();
        type_text(&mut s, "abc");

        ctrl(&mut s, 's');
        assert_eq!(s.prompt().map(|p| p.kind), Some(PromptKind::SaveAs));
        set_prompt_input(&mut s, &target.display().to_string());
        s.handle_key("Return", None, false);

        assert!(s.prompt().is_none());
        assert_eq!(fs::read_to_string(&target).unwrap(), "abc");
        assert_eq!(s.tabs().active_tab().map(|t| t.label()), Some("out.txt".to_string()));
        assert_eq!(s.status().dirty(), Some(false));
        assert_eq!(s.browser().entries().len(), 1);
    }

    #[test]
    fn test_open_failure_shows_notice() {
        let mut s = shell();
        s.open_file(Path::new("/no/such/file.py"));
        let notice = s.notice().unwrap();
        assert_eq!(notice.title, "File not found");
        assert_eq!(notice.message, "Can't open this file: file not found");

        // Any key dismisses it without reaching the editor.
        s.handle_key("", Some('x'), false);
        assert!(s.notice().is_none());
        assert!(s.tabs().is_empty());
    }

    #[test]
    fn test_close_dirty_tab_asks_first() {
        let mut s = shell();
        s.new_document();
        type_text(&mut s, "work");
        ctrl(&mut s, 'w');
        assert_eq!(s.confirm(), Some(Confirm::CloseTab(0)));
        assert!(s.confirm_question().unwrap().contains("untitled"));

        s.handle_key("", Some('n'), false);
        assert_eq!(s.tabs().len(), 1);

        ctrl(&mut s, 'w');
        s.handle_key("", Some('y'), false);
        assert!(s.tabs().is_empty());
        assert_eq!(s.status().line_and_column(), "");
    }

    #[test]
    fn test_empty_untitled_closes_without_asking() {
        let mut s = shell();
        s.new_document();
        ctrl(&mut s, 'w');
        assert!(s.confirm().is_none());
        assert!(s.tabs().is_empty());
    }

    #[test]
    fn test_quit_with_unsaved_work() {
        let mut s = shell();
        assert_eq!(ctrl(&mut s, 'q'), ShellAction::Quit);

        s.new_document();
        type_text(&mut s, "x");
        assert_eq!(ctrl(&mut s, 'q'), ShellAction::None);
        assert_eq!(s.confirm(), Some(Confirm::Quit));
        assert_eq!(s.handle_key("", Some('y'), false), ShellAction::Quit);
    }

    #[test]
    fn test_browser_activation_opens_tab() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.py"), "print()\n").unwrap();
        let mut s = shell();
        s.open_directory(dir.path());
        ctrl(&mut s, 'e');
        assert_eq!(s.focus(), Focus::Browser);

        // rows: OPEN FILES, root, a.py
        s.handle_key("Down", None, false);
        s.handle_key("Down", None, false);
        s.handle_key("Return", None, false);

        assert_eq!(s.focus(), Focus::Editor);
        assert_eq!(s.tabs().len(), 1);
        assert_eq!(s.browser().entries()[0].name, "a.py");
        assert_eq!(s.status().dirty(), Some(false));
    }

    #[test]
    fn test_ctrl_scroll_zooms() {
        let mut s = shell();
        s.new_document();
        s.handle_scroll(2, true);
        assert_eq!(s.font_size(), 16);
        s.handle_scroll(-40, true);
        assert_eq!(s.font_size(), 14 - 8);
    }

    #[test]
    fn test_toggle_line_numbers() {
        let mut s = shell();
        s.new_document();
        assert_eq!(s.gutter_labels().len(), 1);
        ctrl(&mut s, 'l');
        assert!(!s.gutter().is_visible());
        assert!(s.gutter_labels().is_empty());
    }

    #[test]
    fn test_prompt_filter_cycles() {
        let mut s = shell();
        s.start_prompt(PromptKind::OpenFile);
        assert_eq!(s.prompt().map(|p| p.filter), Some(1));
        ctrl(&mut s, 't');
        assert_eq!(s.prompt().map(|p| p.filter), Some(0));
        s.handle_key("Escape", None, false);
        assert!(s.prompt().is_none());
    }

    #[test]
    fn test_complete_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("main.py"), "").unwrap();
        fs::write(dir.path().join("make.txt"), "").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();
        let base = format!("{}/", dir.path().display());
        let py = FileFilter::new("Python files", &["*.py"]);

        let (input, names) = complete_path(&format!("{base}ma"), None, false).unwrap();
        assert_eq!(input, format!("{base}ma"));
        assert_eq!(names, vec!["main.py", "make.txt"]);

        let (input, names) = complete_path(&format!("{base}ma"), Some(&py), false).unwrap();
        assert_eq!(input, format!("{base}main.py"));
        assert!(names.is_empty());

        let (input, _) = complete_path(&base, None, true).unwrap();
        assert_eq!(input, format!("{base}src/"));
    }
}
