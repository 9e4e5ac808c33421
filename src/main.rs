use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;

use pride_core::core::{Settings, Shell};
use pride_core::logging;

mod tui_main;

const USAGE: &str = "\
Usage: pride [OPTIONS] [PATH]...

Open each file PATH in a tab and each directory PATH in the file browser.

Options:
  -h, --help       Print this help
  -V, --version    Print version

Keys:
  Ctrl-N new   Ctrl-O open   Ctrl-D open folder   Ctrl-S save   F12 save as
  Ctrl-W close   Ctrl-Q quit   Ctrl-PgUp/PgDn switch tab   Ctrl-L line numbers
  Ctrl-B toggle browser   Ctrl-E focus browser   Ctrl+wheel zoom";

fn main() -> ExitCode {
    let mut paths = Vec::new();
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "-h" | "--help" => {
                println!("{USAGE}");
                return ExitCode::SUCCESS;
            }
            "-V" | "--version" => {
                println!("pride {}", env!("CARGO_PKG_VERSION"));
                return ExitCode::SUCCESS;
            }
            s if s.starts_with('-') && s.len() > 1 => {
                eprintln!("pride: unknown option '{s}'\n\n{USAGE}");
                return ExitCode::from(2);
            }
            _ => paths.push(PathBuf::from(arg)),
        }
    }

    let log = init_logging();
    let settings = Settings::load();
    if let Some(log) = &log {
        log.apply_configured(&settings.log_level);
    }
    info!("pride {} starting", env!("CARGO_PKG_VERSION"));

    let mut shell = Shell::new(settings);
    for path in &paths {
        shell.open_argument(path);
    }
    if shell.tabs().is_empty() {
        shell.new_document();
    }

    match tui_main::run(shell) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("pride: {e}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() -> Option<logging::LogHandle> {
    let path = Settings::config_dir()?.join("pride.log");
    match logging::init(&path) {
        Ok(handle) => {
            if handle.from_env() {
                info!("log filter taken from {}", logging::LOG_ENV);
            }
            Some(handle)
        }
        Err(e) => {
            // The terminal is not taken over yet, so stderr is still visible.
            eprintln!("pride: logging disabled: {e}");
            None
        }
    }
}
