//! The editable text surface: one buffer, its cursor and scroll state, and a
//! zoom level.
//!
//! Input reaches the buffer only through [`TextSurface::handle_input`]. That
//! method acts as an event filter: it handles the Tab key and modifier-held
//! scrolling itself, and passes every other event through to standard
//! cursor-based editing.

use super::buffer::Buffer;
use super::cursor::CursorPosition;
use super::view::View;

pub const ZOOM_MIN: i32 = -8;
pub const ZOOM_MAX: i32 = 16;

/// An input event aimed at the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceInput {
    /// A key press. `name` is a key name such as `"Tab"` or `"Left"`; it is
    /// empty for plain printable characters, which arrive in `unicode`.
    Key {
        name: String,
        unicode: Option<char>,
        ctrl: bool,
    },
    /// A scroll gesture of `delta` discrete ticks (negative = up / zoom out).
    Scroll { delta: i32, modifier: bool },
}

impl SurfaceInput {
    pub fn key(name: &str) -> Self {
        SurfaceInput::Key {
            name: name.to_string(),
            unicode: None,
            ctrl: false,
        }
    }

    pub fn char(ch: char) -> Self {
        SurfaceInput::Key {
            name: String::new(),
            unicode: Some(ch),
            ctrl: false,
        }
    }
}

/// What changed while handling one input event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SurfaceOutcome {
    /// The text was edited.
    pub content_changed: bool,
    /// The cursor moved; carries the new 1-based position.
    pub cursor_moved: Option<CursorPosition>,
    /// The number of lines changed; carries the new count.
    pub line_count_changed: Option<usize>,
    /// The visible region changed (scroll, or any edit that may repaint).
    pub view_changed: bool,
    /// The zoom level changed.
    pub zoom_changed: bool,
}

#[derive(Debug, Clone)]
pub struct TextSurface {
    buffer: Buffer,
    view: View,
    zoom: i32,
    tab_width: usize,
}

impl TextSurface {
    pub fn new(tab_width: usize) -> Self {
        Self {
            buffer: Buffer::new(),
            view: View::new(),
            zoom: 0,
            tab_width: tab_width.max(1),
        }
    }

    /// Replace the whole content and move the cursor to the start.
    pub fn set_text(&mut self, text: &str) {
        self.buffer.set_text(text);
        self.view.cursor = Default::default();
        self.view.scroll_top = 0;
        self.view.scroll_left = 0;
    }

    /// The full text content.
    pub fn text(&self) -> String {
        self.buffer.to_string()
    }

    pub fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn zoom(&self) -> i32 {
        self.zoom
    }

    pub fn cursor_position(&self) -> CursorPosition {
        self.view.cursor.position()
    }

    pub fn line_count(&self) -> usize {
        self.buffer.len_lines()
    }

    pub fn first_visible_line(&self) -> usize {
        self.view.scroll_top
    }

    /// Number of buffer lines currently on screen.
    pub fn visible_line_count(&self) -> usize {
        self.line_count()
            .saturating_sub(self.view.scroll_top)
            .min(self.view.viewport_lines)
    }

    /// Tell the surface how much room the front end gives it.
    pub fn set_viewport(&mut self, lines: usize, cols: usize) {
        self.view.viewport_lines = lines.max(1);
        self.view.viewport_cols = cols.max(1);
    }

    /// Insert `text` at the cursor, as if typed.
    pub fn insert_text(&mut self, text: &str) -> SurfaceOutcome {
        let before = self.snapshot();
        for ch in text.chars() {
            if ch == '\n' {
                self.newline();
            } else {
                self.insert_at_cursor(&ch.to_string());
            }
        }
        self.view.ensure_cursor_visible();
        self.outcome_since(before, true)
    }

    /// Handle one input event.
    pub fn handle_input(&mut self, input: SurfaceInput) -> SurfaceOutcome {
        match input {
            SurfaceInput::Scroll { delta, modifier } => self.handle_scroll(delta, modifier),
            SurfaceInput::Key {
                name,
                unicode,
                ctrl,
            } => self.handle_key(&name, unicode, ctrl),
        }
    }

    fn handle_scroll(&mut self, delta: i32, modifier: bool) -> SurfaceOutcome {
        if modifier {
            let zoom = (self.zoom + delta).clamp(ZOOM_MIN, ZOOM_MAX);
            let changed = zoom != self.zoom;
            self.zoom = zoom;
            return SurfaceOutcome {
                zoom_changed: changed,
                view_changed: changed,
                ..Default::default()
            };
        }
        let total = self.line_count();
        let changed = self.view.scroll_by(delta, total);
        SurfaceOutcome {
            view_changed: changed,
            ..Default::default()
        }
    }

    fn handle_key(&mut self, key_name: &str, unicode: Option<char>, ctrl: bool) -> SurfaceOutcome {
        let before = self.snapshot();
        let mut changed = false;
        match key_name {
            "Tab" => {
                let spaces = " ".repeat(self.tab_width);
                self.insert_at_cursor(&spaces);
                changed = true;
            }
            "Return" => {
                self.newline();
                changed = true;
            }
            "BackSpace" => changed = self.backspace(),
            "Delete" => changed = self.delete_forward(),
            "Left" => self.move_left(),
            "Right" => self.move_right(),
            "Up" => self.move_vertical(-1),
            "Down" => self.move_vertical(1),
            "Page_Up" => self.move_vertical(-(self.view.viewport_lines.max(1) as isize)),
            "Page_Down" => self.move_vertical(self.view.viewport_lines.max(1) as isize),
            "Home" => self.view.cursor.col = 0,
            "End" => self.view.cursor.col = self.buffer.line_len_chars(self.view.cursor.line),
            _ => {
                if let Some(ch) = unicode.filter(|c| !ctrl && !c.is_control()) {
                    let mut buf = [0u8; 4];
                    self.insert_at_cursor(ch.encode_utf8(&mut buf));
                    changed = true;
                }
            }
        }
        self.view.ensure_cursor_visible();
        self.outcome_since(before, changed)
    }

    fn cursor_char_idx(&self) -> usize {
        self.buffer.line_to_char(self.view.cursor.line) + self.view.cursor.col
    }

    fn insert_at_cursor(&mut self, text: &str) {
        let idx = self.cursor_char_idx();
        self.buffer.insert(idx, text);
        self.view.cursor.col += text.chars().count();
    }

    fn newline(&mut self) {
        let idx = self.cursor_char_idx();
        self.buffer.insert(idx, "\n");
        self.view.cursor.line += 1;
        self.view.cursor.col = 0;
    }

    fn backspace(&mut self) -> bool {
        let line = self.view.cursor.line;
        let col = self.view.cursor.col;
        let idx = self.cursor_char_idx();
        if col > 0 {
            self.buffer.delete_range(idx - 1, idx);
            self.view.cursor.col -= 1;
            true
        } else if line > 0 {
            // Join with the previous line, removing its whole terminator.
            let prev_len = self.buffer.line_len_chars(line - 1);
            let join_at = self.buffer.line_to_char(line - 1) + prev_len;
            self.buffer.delete_range(join_at, idx);
            self.view.cursor.line -= 1;
            self.view.cursor.col = prev_len;
            true
        } else {
            false
        }
    }

    fn delete_forward(&mut self) -> bool {
        let line = self.view.cursor.line;
        let idx = self.cursor_char_idx();
        if self.view.cursor.col < self.buffer.line_len_chars(line) {
            self.buffer.delete_range(idx, idx + 1);
            true
        } else if line + 1 < self.buffer.len_lines() {
            let next_start = self.buffer.line_to_char(line + 1);
            self.buffer.delete_range(idx, next_start);
            true
        } else {
            false
        }
    }

    fn move_left(&mut self) {
        if self.view.cursor.col > 0 {
            self.view.cursor.col -= 1;
        } else if self.view.cursor.line > 0 {
            self.view.cursor.line -= 1;
            self.view.cursor.col = self.buffer.line_len_chars(self.view.cursor.line);
        }
    }

    fn move_right(&mut self) {
        let line = self.view.cursor.line;
        if self.view.cursor.col < self.buffer.line_len_chars(line) {
            self.view.cursor.col += 1;
        } else if line + 1 < self.buffer.len_lines() {
            self.view.cursor.line += 1;
            self.view.cursor.col = 0;
        }
    }

    fn move_vertical(&mut self, delta: isize) {
        let max_line = self.buffer.len_lines().saturating_sub(1);
        let target = self.view.cursor.line.saturating_add_signed(delta).min(max_line);
        self.view.cursor.line = target;
        let len = self.buffer.line_len_chars(target);
        if self.view.cursor.col > len {
            self.view.cursor.col = len;
        }
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            position: self.cursor_position(),
            line_count: self.line_count(),
            scroll_top: self.view.scroll_top,
            scroll_left: self.view.scroll_left,
        }
    }

    fn outcome_since(&self, before: Snapshot, content_changed: bool) -> SurfaceOutcome {
        let position = self.cursor_position();
        let line_count = self.line_count();
        SurfaceOutcome {
            content_changed,
            cursor_moved: (position != before.position).then_some(position),
            line_count_changed: (line_count != before.line_count).then_some(line_count),
            view_changed: content_changed
                || position != before.position
                || self.view.scroll_top != before.scroll_top
                || self.view.scroll_left != before.scroll_left,
            zoom_changed: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Snapshot {
    position: CursorPosition,
    line_count: usize,
    scroll_top: usize,
    scroll_left: usize,
}
