//! Platform-agnostic rendering abstraction layer.
//!
//! This module turns [`Shell`] state into a [`ScreenLayout`]: plain structs
//! describing the tab bar, the visible text with its gutter, the file browser,
//! the status and command lines and any notice. Front ends only paint it.
//!
//! **No terminal dependencies are allowed here.**

use crate::core::error::Notice;
use crate::core::file_browser::RowKind;
use crate::core::gutter::GutterLabel;
use crate::core::shell::{Focus, PromptKind, Shell};

// ─── Color ───────────────────────────────────────────────────────────────────

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

// ─── TabInfo ──────────────────────────────────────────────────────────────────

/// Display information for a single tab-bar entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabInfo {
    /// Display label, e.g. `" 1: main.py* "`.
    pub name: String,
    pub active: bool,
    /// Whether the document has unsaved changes.
    pub dirty: bool,
}

// ─── RenderedLine ─────────────────────────────────────────────────────────────

/// A single visible line ready for painting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
    /// Visible slice of the line, horizontal scroll already applied.
    pub text: String,
    /// Pre-formatted gutter text; empty when line numbers are hidden.
    pub gutter_text: String,
    /// The line holds the cursor; its number is drawn bold.
    pub is_current_line: bool,
    pub line_idx: usize,
}

/// Cursor position in cells relative to the text area (excluding gutter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPos {
    pub row: usize,
    pub col: usize,
}

/// The text area of the active tab.
#[derive(Debug, Clone)]
pub struct RenderedEditor {
    pub lines: Vec<RenderedLine>,
    /// `None` when the cursor is scrolled off-screen.
    pub cursor: Option<CursorPos>,
    /// Gutter width in cells (0 = hidden).
    pub gutter_cols: usize,
    pub scroll_top: usize,
    pub total_lines: usize,
}

// ─── Browser ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedBrowserRow {
    /// Indented text including the expand marker.
    pub text: String,
    pub header: bool,
    /// Mirrors the active tab.
    pub highlighted: bool,
    /// Keyboard selection while the browser has focus.
    pub selected: bool,
}

#[derive(Debug, Clone)]
pub struct RenderedBrowser {
    pub rows: Vec<RenderedBrowserRow>,
    pub focused: bool,
}

// ─── CommandLineData ──────────────────────────────────────────────────────────

/// Data needed to render the command / message line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLineData {
    pub text: String,
    /// Draw an insert cursor after `text` (prompts).
    pub show_cursor: bool,
}

// ─── ScreenLayout ─────────────────────────────────────────────────────────────

/// The complete, platform-agnostic description of one editor frame.
/// Build it with [`build_screen_layout`], then hand it to the backend renderer.
#[derive(Debug, Clone)]
pub struct ScreenLayout {
    pub tab_bar: Vec<TabInfo>,
    /// `None` when no tab is open.
    pub editor: Option<RenderedEditor>,
    /// `None` when the browser is hidden.
    pub browser: Option<RenderedBrowser>,
    pub status_left: String,
    pub status_right: String,
    pub command: CommandLineData,
    /// Candidates from the last path completion.
    pub completions: Vec<String>,
    pub notice: Option<Notice>,
}

// ─── Theme ────────────────────────────────────────────────────────────────────

/// All colours used by the editor UI.
pub struct Theme {
    pub background: Color,
    pub foreground: Color,

    pub tab_bar_bg: Color,
    pub tab_active_bg: Color,
    pub tab_active_fg: Color,
    pub tab_inactive_fg: Color,
    pub tab_dirty_fg: Color,

    pub status_bg: Color,
    pub status_fg: Color,

    pub command_bg: Color,
    pub command_fg: Color,

    pub line_number_fg: Color,
    pub line_number_active_fg: Color,

    pub separator: Color,

    pub browser_bg: Color,
    pub browser_fg: Color,
    pub browser_header_fg: Color,
    pub browser_highlight_bg: Color,
    pub browser_selected_bg: Color,

    pub notice_bg: Color,
    pub notice_fg: Color,
    pub notice_border: Color,
}

impl Theme {
    /// OneDark-inspired default scheme.
    pub fn onedark() -> Self {
        Self {
            background: Color::from_rgb(0x1a, 0x1a, 0x1a),
            foreground: Color::from_rgb(0xe5, 0xe5, 0xe5),

            tab_bar_bg: Color::from_rgb(0x26, 0x26, 0x33),
            tab_active_bg: Color::from_rgb(0x3f, 0x3f, 0x59),
            tab_active_fg: Color::from_rgb(0xff, 0xff, 0xff),
            tab_inactive_fg: Color::from_rgb(0xb2, 0xb2, 0xb2),
            tab_dirty_fg: Color::from_rgb(0xe5, 0xc0, 0x7b),

            status_bg: Color::from_rgb(0x33, 0x33, 0x4c),
            status_fg: Color::from_rgb(0xe5, 0xe5, 0xe5),

            command_bg: Color::from_rgb(0x1a, 0x1a, 0x1a),
            command_fg: Color::from_rgb(0xe5, 0xe5, 0xe5),

            line_number_fg: Color::from_rgb(0xb2, 0xb2, 0xb2),
            line_number_active_fg: Color::from_rgb(0xe5, 0xe5, 0x7f),

            separator: Color::from_rgb(0x4c, 0x4c, 0x66),

            browser_bg: Color::from_rgb(0x21, 0x25, 0x2b),
            browser_fg: Color::from_rgb(0xab, 0xb2, 0xbf),
            browser_header_fg: Color::from_rgb(0x61, 0xaf, 0xef),
            browser_highlight_bg: Color::from_rgb(0x2c, 0x31, 0x3a),
            browser_selected_bg: Color::from_rgb(0x3e, 0x44, 0x51),

            notice_bg: Color::from_rgb(0x28, 0x2c, 0x34),
            notice_fg: Color::from_rgb(0xab, 0xb2, 0xbf),
            notice_border: Color::from_rgb(0xe0, 0x6c, 0x75),
        }
    }
}

// ─── build_screen_layout ──────────────────────────────────────────────────────

/// Build a complete `ScreenLayout` from current shell state.
///
/// The text area size comes from the viewport the front end last passed to
/// [`Shell::set_viewport`]. This function is pure.
pub fn build_screen_layout(shell: &Shell) -> ScreenLayout {
    let (status_left, status_right) = build_status_line(shell);
    ScreenLayout {
        tab_bar: build_tab_bar(shell),
        editor: build_editor(shell),
        browser: build_browser(shell),
        status_left,
        status_right,
        command: build_command_line(shell),
        completions: shell
            .prompt()
            .map(|p| p.completions.clone())
            .unwrap_or_default(),
        notice: shell.notice().cloned(),
    }
}

// ─── Private builder helpers ──────────────────────────────────────────────────

fn build_tab_bar(shell: &Shell) -> Vec<TabInfo> {
    let tabs = shell.tabs();
    let active = tabs.active_index();
    tabs.tabs()
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            let dirty_marker = if tab.is_dirty() { "*" } else { "" };
            TabInfo {
                name: format!(" {}: {}{} ", i + 1, tab.label(), dirty_marker),
                active: Some(i) == active,
                dirty: tab.is_dirty(),
            }
        })
        .collect()
}

fn build_editor(shell: &Shell) -> Option<RenderedEditor> {
    let tabs = shell.tabs();
    let surface = tabs.active_tab()?.surface();
    let view = surface.view();
    let buffer = surface.buffer();

    let gutter_cols = if shell.gutter().is_visible() {
        shell.gutter().width_cells()
    } else {
        0
    };
    let labels = shell.gutter_labels();

    let first = view.scroll_top;
    let last = surface.line_count().min(first + view.viewport_lines);
    let lines = (first..last)
        .map(|line_idx| {
            let text: String = buffer
                .line_text(line_idx)
                .chars()
                .skip(view.scroll_left)
                .take(view.viewport_cols)
                .collect();
            RenderedLine {
                text,
                gutter_text: format_gutter(labels, line_idx, gutter_cols),
                is_current_line: line_idx == view.cursor.line,
                line_idx,
            }
        })
        .collect();

    let cursor = view.cursor;
    let on_screen = cursor.line >= first
        && cursor.line < first + view.viewport_lines
        && cursor.col >= view.scroll_left
        && cursor.col < view.scroll_left + view.viewport_cols + 1;
    Some(RenderedEditor {
        lines,
        cursor: on_screen.then(|| CursorPos {
            row: cursor.line - first,
            col: cursor.col - view.scroll_left,
        }),
        gutter_cols,
        scroll_top: first,
        total_lines: surface.line_count(),
    })
}

/// One blank cell, the number left-aligned, then padding up to the gutter
/// width. Empty when the gutter is hidden or the line has no label.
fn format_gutter(labels: &[GutterLabel], line_idx: usize, gutter_cols: usize) -> String {
    if gutter_cols == 0 {
        return String::new();
    }
    match labels.iter().find(|l| l.number == line_idx + 1) {
        Some(label) => format!(
            " {:<width$}",
            label.number,
            width = gutter_cols.saturating_sub(1)
        ),
        None => " ".repeat(gutter_cols),
    }
}

fn build_browser(shell: &Shell) -> Option<RenderedBrowser> {
    if !shell.browser_visible() {
        return None;
    }
    let focused = shell.focus() == Focus::Browser;
    let selection = shell.browser_selection();
    let rows = shell
        .browser()
        .rows()
        .into_iter()
        .enumerate()
        .map(|(i, row)| {
            let indent = "  ".repeat(row.depth);
            let marker = match row.kind {
                RowKind::Header => "",
                RowKind::Directory { expanded: true } => "▾ ",
                RowKind::Directory { expanded: false } => "▸ ",
                RowKind::File | RowKind::OpenFile => "  ",
            };
            RenderedBrowserRow {
                text: format!("{indent}{marker}{}", row.name),
                header: row.kind == RowKind::Header,
                highlighted: row.highlighted,
                selected: focused && i == selection,
            }
        })
        .collect();
    Some(RenderedBrowser { rows, focused })
}

fn build_status_line(shell: &Shell) -> (String, String) {
    let tabs = shell.tabs();
    let left = match tabs.active_tab() {
        Some(tab) => {
            let name = tab
                .backing_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| tab.label());
            let dirty = if shell.status().dirty() == Some(true) {
                " [+]"
            } else {
                ""
            };
            format!(" {name}{dirty}")
        }
        None => " no file".to_string(),
    };
    let position = shell.status().line_and_column();
    let right = if position.is_empty() {
        String::new()
    } else {
        format!("{position}  {}pt ", shell.font_size())
    };
    (left, right)
}

fn build_command_line(shell: &Shell) -> CommandLineData {
    if let Some(prompt) = shell.prompt() {
        let filter = if prompt.kind == PromptKind::OpenDirectory {
            String::new()
        } else {
            shell
                .filters()
                .get(prompt.filter)
                .map(|f| format!(" [{}]", f.label()))
                .unwrap_or_default()
        };
        return CommandLineData {
            text: format!("{}{}: {}", prompt.kind.title(), filter, prompt.input),
            show_cursor: true,
        };
    }
    if let Some(question) = shell.confirm_question() {
        return CommandLineData {
            text: question,
            show_cursor: false,
        };
    }
    CommandLineData {
        text: shell.message.clone(),
        show_cursor: false,
    }
}
