use super::Cursor;

/// View holds the per-surface state for displaying a buffer: where the
/// cursor sits and which part of the text is scrolled into view.
#[derive(Debug, Clone)]
pub struct View {
    /// Cursor position within the buffer (line, col).
    pub cursor: Cursor,
    /// First visible line (for viewport scrolling).
    pub scroll_top: usize,
    /// Number of lines that fit in the text viewport.
    pub viewport_lines: usize,
    /// First visible column (for horizontal scrolling).
    pub scroll_left: usize,
    /// Number of columns that fit in the text viewport.
    pub viewport_cols: usize,
}

impl View {
    pub fn new() -> Self {
        Self {
            cursor: Cursor::new(),
            scroll_top: 0,
            viewport_lines: 40, // sensible default, overridden by UI
            scroll_left: 0,
            viewport_cols: 80, // sensible default, overridden by UI
        }
    }

    /// Ensure the cursor is visible within the viewport, adjusting scroll_top
    /// and scroll_left.
    pub fn ensure_cursor_visible(&mut self) {
        if self.cursor.line < self.scroll_top {
            self.scroll_top = self.cursor.line;
        }
        if self.viewport_lines > 0 && self.cursor.line >= self.scroll_top + self.viewport_lines {
            self.scroll_top = self.cursor.line - self.viewport_lines + 1;
        }
        if self.cursor.col < self.scroll_left {
            self.scroll_left = self.cursor.col;
        }
        if self.viewport_cols > 0 && self.cursor.col >= self.scroll_left + self.viewport_cols {
            self.scroll_left = self.cursor.col - self.viewport_cols + 1;
        }
    }

    /// Scroll by `delta` lines without moving the cursor. `total_lines`
    /// bounds the scroll so the last line can still reach the top.
    pub fn scroll_by(&mut self, delta: i32, total_lines: usize) -> bool {
        let max_top = total_lines.saturating_sub(1);
        let new_top = if delta < 0 {
            self.scroll_top.saturating_sub(delta.unsigned_abs() as usize)
        } else {
            (self.scroll_top + delta as usize).min(max_top)
        };
        let changed = new_top != self.scroll_top;
        self.scroll_top = new_top;
        changed
    }
}

impl Default for View {
    fn default() -> Self {
        Self::new()
    }
}
