use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ropey::Rope;

/// Plain text storage for one document.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    pub content: Rope,
}

impl Buffer {
    pub fn new() -> Self {
        Self {
            content: Rope::new(),
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self {
            content: Rope::from_str(text),
        }
    }

    /// Write buffer contents to a file.
    ///
    /// The text goes to a hidden sibling file first and is then renamed over
    /// `path`, so a crash mid-write never leaves a truncated target behind.
    /// A symlinked `path` is resolved first so the link survives and its
    /// target gets the new text. An existing file keeps its permissions.
    pub fn save_to_file(&self, path: &Path) -> Result<(), io::Error> {
        let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        let permissions = match fs::metadata(&target) {
            // A rename would silently replace a read-only target.
            Ok(meta) if meta.permissions().readonly() => {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "target file is read-only",
                ));
            }
            Ok(meta) => Some(meta.permissions()),
            Err(_) => None,
        };
        let temp_path = temp_sibling(&target);
        let written = fs::write(&temp_path, self.to_string()).and_then(|()| match permissions {
            Some(perms) => fs::set_permissions(&temp_path, perms),
            None => Ok(()),
        });
        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }
        fs::rename(&temp_path, &target).inspect_err(|_| {
            let _ = fs::remove_file(&temp_path);
        })
    }

    /// Replace the whole content.
    pub fn set_text(&mut self, text: &str) {
        self.content = Rope::from_str(text);
    }

    pub fn insert(&mut self, char_idx: usize, text: &str) {
        if char_idx <= self.content.len_chars() {
            self.content.insert(char_idx, text);
        }
    }

    pub fn delete_range(&mut self, start_idx: usize, end_idx: usize) {
        if start_idx < end_idx && end_idx <= self.content.len_chars() {
            self.content.remove(start_idx..end_idx);
        }
    }

    pub fn len_chars(&self) -> usize {
        self.content.len_chars()
    }

    pub fn line_to_char(&self, line_idx: usize) -> usize {
        self.content.line_to_char(line_idx)
    }

    /// Returns the number of lines in the buffer, counted the way a text
    /// widget counts blocks: an empty buffer has one line, and a trailing
    /// `\n` opens a new (empty) line.
    pub fn len_lines(&self) -> usize {
        self.content.len_lines()
    }

    /// Length of a line in chars, excluding its line terminator.
    pub fn line_len_chars(&self, line_idx: usize) -> usize {
        if line_idx >= self.len_lines() {
            return 0;
        }
        let line = self.content.line(line_idx);
        let len = line.len_chars();
        if len == 0 {
            return 0;
        }
        match line.char(len - 1) {
            '\n' if len > 1 && line.char(len - 2) == '\r' => len - 2,
            c if is_line_break(c) => len - 1,
            _ => len,
        }
    }

    /// Text of a line without its line terminator.
    pub fn line_text(&self, line_idx: usize) -> String {
        if line_idx >= self.len_lines() {
            return String::new();
        }
        let len = self.line_len_chars(line_idx);
        self.content.line(line_idx).chars().take(len).collect()
    }
}

impl fmt::Display for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.content)
    }
}

/// Every char ropey treats as ending a line (CRLF is handled by the caller).
fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.pride-tmp"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_editing() {
        let mut buffer = Buffer::new();
        buffer.insert(0, "Hello");
        assert_eq!(buffer.to_string(), "Hello");

        buffer.insert(5, " World");
        assert_eq!(buffer.to_string(), "Hello World");

        buffer.delete_range(5, 11);
        assert_eq!(buffer.to_string(), "Hello");
    }

    #[test]
    fn test_line_counting_matches_blocks() {
        assert_eq!(Buffer::new().len_lines(), 1);
        assert_eq!(Buffer::from_text("a").len_lines(), 1);
        assert_eq!(Buffer::from_text("a\n").len_lines(), 2);
        assert_eq!(Buffer::from_text("a\nb\nc").len_lines(), 3);
    }

    #[test]
    fn test_line_len_excludes_terminator() {
        let buffer = Buffer::from_text("abc\r\nde\nf");
        assert_eq!(buffer.line_len_chars(0), 3);
        assert_eq!(buffer.line_len_chars(1), 2);
        assert_eq!(buffer.line_len_chars(2), 1);
        assert_eq!(buffer.line_len_chars(3), 0);
        assert_eq!(buffer.line_text(0), "abc");
    }

    #[test]
    fn test_line_len_excludes_lone_cr_and_unicode_breaks() {
        let buffer = Buffer::from_text("ab\rcd\u{2028}efg\u{0085}h");
        assert_eq!(buffer.len_lines(), 4);
        assert_eq!(buffer.line_len_chars(0), 2);
        assert_eq!(buffer.line_len_chars(1), 2);
        assert_eq!(buffer.line_text(2), "efg");
        assert_eq!(buffer.line_len_chars(3), 1);
    }

    #[test]
    fn test_save_to_file_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, "old contents that are longer").unwrap();

        Buffer::from_text("new").save_to_file(&path).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "new");
        assert!(!dir.path().join(".out.txt.pride-tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_through_symlink_updates_target() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.txt");
        let link = dir.path().join("link.txt");
        std::fs::write(&real, "A").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        Buffer::from_text("xA").save_to_file(&link).unwrap();

        assert_eq!(std::fs::read_to_string(&real).unwrap(), "xA");
        assert!(std::fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert!(!dir.path().join(".real.txt.pride-tmp").exists());
        assert!(!dir.path().join(".link.txt.pride-tmp").exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("run.py");
        std::fs::write(&path, "print(1)\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();

        Buffer::from_text("print(2)\n").save_to_file(&path).unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "print(2)\n");
    }

    #[test]
    fn test_save_refuses_read_only_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("locked.txt");
        std::fs::write(&path, "keep").unwrap();
        let mut perms = std::fs::metadata(&path).unwrap().permissions();
        perms.set_readonly(true);
        std::fs::set_permissions(&path, perms).unwrap();

        let err = Buffer::from_text("lost").save_to_file(&path).unwrap_err();

        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "keep");
    }
}
