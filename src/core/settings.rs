use tracing::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// User settings loaded from `<config dir>/pride/settings.json`.
///
/// New fields must carry `#[serde(default = "...")]` so that older settings
/// files keep loading; [`Settings::load`] writes the merged result back so the
/// user sees every option with its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Show the line-number gutter beside the text.
    #[serde(default = "default_show_line_numbers")]
    pub show_line_numbers: bool,

    /// Number of spaces the Tab key inserts.
    #[serde(default = "default_tab_width")]
    pub tab_width: u8,

    /// Base font size; zoom steps are added on top of it.
    #[serde(default = "default_font_size")]
    pub font_size: i32,

    /// Points added or removed per zoom step.
    #[serde(default = "default_zoom_step")]
    pub zoom_step: i32,

    /// Show the file browser on startup
    #[serde(default = "default_explorer_visible")]
    pub explorer_visible_on_startup: bool,

    /// Width of the file browser in terminal cells.
    #[serde(default = "default_explorer_width")]
    pub explorer_width: u16,

    /// Blank cells added to the widest line number in the gutter.
    #[serde(default = "default_gutter_padding")]
    pub gutter_padding: u16,

    /// `error`, `warn`, `info`, `debug` or `trace`.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Name of the file filter preselected in open/save prompts.
    #[serde(default = "default_filter")]
    pub default_filter: String,
}

fn default_show_line_numbers() -> bool {
    true
}

fn default_tab_width() -> u8 {
    4
}

fn default_font_size() -> i32 {
    14
}

fn default_zoom_step() -> i32 {
    1
}

fn default_explorer_visible() -> bool {
    true
}

fn default_explorer_width() -> u16 {
    30
}

fn default_gutter_padding() -> u16 {
    2
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_filter() -> String {
    "All Files".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            show_line_numbers: default_show_line_numbers(),
            tab_width: default_tab_width(),
            font_size: default_font_size(),
            zoom_step: default_zoom_step(),
            explorer_visible_on_startup: default_explorer_visible(),
            explorer_width: default_explorer_width(),
            gutter_padding: default_gutter_padding(),
            log_level: default_log_level(),
            default_filter: default_filter(),
        }
    }
}

impl Settings {
    /// Load settings from the default location, falling back to defaults if
    /// the file doesn't exist or is invalid. The file is rewritten so that it
    /// lists every option.
    pub fn load() -> Self {
        let Some(path) = Self::settings_path() else {
            warn!("no config directory available; using default settings");
            return Settings::default();
        };
        match Self::load_from(&path) {
            Ok(settings) => {
                if let Err(e) = settings.save_to(&path) {
                    warn!("failed to update settings file: {e}");
                }
                settings
            }
            Err(e) => {
                warn!("{e}. Using defaults.");
                let defaults = Settings::default();
                if let Err(save_err) = defaults.save_to(&path) {
                    warn!("failed to write default settings: {save_err}");
                }
                defaults
            }
        }
    }

    /// Load settings from `path`, with descriptive error messages.
    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read settings file at {}: {}", path.display(), e))?;

        let settings: Settings = serde_json::from_str(&contents)
            .map_err(|e| format!("Failed to parse settings.json: {}. Check JSON syntax.", e))?;
        debug!("loaded settings from {}", path.display());
        Ok(settings.sanitized())
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Directory holding settings and the log file.
    pub fn config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pride"))
    }

    fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Font size after applying `zoom` steps, never below 1.
    pub fn zoomed_font_size(&self, zoom: i32) -> i32 {
        (self.font_size + zoom * self.zoom_step).max(1)
    }

    fn sanitized(mut self) -> Self {
        if self.tab_width == 0 {
            warn!("tab_width must be greater than 0; using default");
            self.tab_width = default_tab_width();
        }
        if self.zoom_step <= 0 {
            self.zoom_step = default_zoom_step();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let s = Settings::default();
        assert!(s.show_line_numbers);
        assert_eq!(s.tab_width, 4);
        assert_eq!(s.gutter_padding, 2);
        assert_eq!(s.default_filter, "All Files");
    }

    #[test]
    fn test_missing_fields_get_defaults() {
        let s: Settings = serde_json::from_str(r#"{"tab_width": 2}"#).unwrap();
        assert_eq!(s.tab_width, 2);
        assert_eq!(s.font_size, 14);
        assert!(s.explorer_visible_on_startup);
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut s = Settings::default();
        s.show_line_numbers = false;
        s.explorer_width = 42;
        s.save_to(&path).unwrap();

        let loaded = Settings::load_from(&path).unwrap();
        assert_eq!(loaded, s);
    }

    #[test]
    fn test_load_from_reports_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();
        let err = Settings::load_from(&path).unwrap_err();
        assert!(err.contains("Failed to parse settings.json"));
    }

    #[test]
    fn test_zero_tab_width_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, r#"{"tab_width": 0, "zoom_step": -2}"#).unwrap();
        let s = Settings::load_from(&path).unwrap();
        assert_eq!(s.tab_width, 4);
        assert_eq!(s.zoom_step, 1);
    }

    #[test]
    fn test_zoomed_font_size() {
        let s = Settings::default();
        assert_eq!(s.zoomed_font_size(0), 14);
        assert_eq!(s.zoomed_font_size(3), 17);
        assert_eq!(s.zoomed_font_size(-40), 1);
    }
}
