/// Zero-based cursor location inside a buffer (line index, char column).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub line: usize,
    pub col: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self { line: 0, col: 0 }
    }

    /// The user-facing, 1-based position.
    pub fn position(&self) -> CursorPosition {
        CursorPosition {
            line: self.line + 1,
            column: self.col + 1,
        }
    }
}

/// 1-based line and column, as shown in the status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorPosition {
    pub line: usize,
    pub column: usize,
}

impl Default for CursorPosition {
    fn default() -> Self {
        Self { line: 1, column: 1 }
    }
}
