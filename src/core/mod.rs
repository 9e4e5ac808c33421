pub mod buffer;
pub mod cursor;
pub mod document;
pub mod error;
pub mod file_browser;
pub mod file_filter;
pub mod gutter;
pub mod settings;
pub mod shell;
pub mod surface;
pub mod tab_manager;
pub mod view;

pub use cursor::{Cursor, CursorPosition};
pub use document::DocumentTab;
pub use error::{FileError, Notice, TabError};
pub use file_browser::FileBrowserPanel;
pub use settings::Settings;
pub use shell::{Shell, ShellAction};
pub use tab_manager::{TabEvent, TabManager, TabObserver};
