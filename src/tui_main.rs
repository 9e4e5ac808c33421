//! Terminal front end for pride.
//!
//! Uses ratatui + crossterm to paint the `ScreenLayout` produced by
//! `render::build_screen_layout`, and translates terminal input into the key
//! names and scroll ticks the shell understands.
//!
//! **No editor logic here.** All state lives in `core::shell`.

use std::io::{self, Stdout};
use std::time::Duration;

use tracing::{debug, info};
use ratatui::backend::CrosstermBackend;
use ratatui::crossterm::event::{
    self as ct_event, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent,
    KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color as RColor, Modifier};
use ratatui::Terminal;

use pride_core::core::error::Notice;
use pride_core::core::{Shell, ShellAction};
use pride_core::render::{
    self, build_screen_layout, Color, RenderedBrowser, RenderedEditor, ScreenLayout, Theme,
};

/// Lines scrolled per wheel tick.
const SCROLL_LINES: i32 = 3;

// ─── Public entry point ───────────────────────────────────────────────────────

/// Set up the terminal, run the event loop, and restore the terminal on exit
/// (also when the loop panics).
pub fn run(mut shell: Shell) -> io::Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        event_loop(&mut terminal, &mut shell)
    }));

    restore_terminal(&mut terminal);

    match result {
        Ok(r) => r,
        Err(e) => std::panic::resume_unwind(e),
    }
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) {
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    );
    let _ = terminal.show_cursor();
}

// ─── Event loop ───────────────────────────────────────────────────────────────

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    shell: &mut Shell,
) -> io::Result<()> {
    let theme = Theme::onedark();
    info!("terminal front end started");

    loop {
        // Layout: [tab(1)] / [sidebar? | editor] / [status(1)] / [cmd(1)]
        let size = terminal.size()?;
        let content_rows = size.height.saturating_sub(3);
        let sidebar_cols = sidebar_cols(shell, size.width);
        let gutter_cols = if shell.gutter().is_visible() {
            shell.gutter().width_cells() as u16
        } else {
            0
        };
        let text_cols = size.width.saturating_sub(sidebar_cols + gutter_cols);
        shell.set_viewport(content_rows.max(1) as usize, text_cols.max(1) as usize);

        let screen = build_screen_layout(shell);
        let sidebar_width = sidebar_cols;
        terminal.draw(|frame| draw_frame(frame, &screen, &theme, sidebar_width))?;

        if !ct_event::poll(Duration::from_millis(250))? {
            continue;
        }
        match ct_event::read()? {
            Event::Key(key) => {
                let Some((name, unicode, ctrl)) = translate_key(key) else {
                    continue;
                };
                if shell.handle_key(&name, unicode, ctrl) == ShellAction::Quit {
                    info!("quit requested");
                    return Ok(());
                }
            }
            Event::Mouse(mouse) => handle_mouse(shell, mouse),
            Event::Resize(w, h) => debug!("terminal resized to {w}x{h}"),
            _ => {}
        }
    }
}

fn sidebar_cols(shell: &Shell, total_width: u16) -> u16 {
    if !shell.browser_visible() {
        return 0;
    }
    // +1 for the separator; leave the editor at least half the screen.
    (shell.settings().explorer_width + 1).min(total_width / 2)
}

fn handle_mouse(shell: &mut Shell, mouse: MouseEvent) {
    let modifier = mouse.modifiers.contains(KeyModifiers::CONTROL);
    // Wheel up zooms in with the modifier held and scrolls up without it.
    let delta = match (mouse.kind, modifier) {
        (MouseEventKind::ScrollUp, true) => 1,
        (MouseEventKind::ScrollDown, true) => -1,
        (MouseEventKind::ScrollUp, false) => -SCROLL_LINES,
        (MouseEventKind::ScrollDown, false) => SCROLL_LINES,
        _ => return,
    };
    shell.handle_scroll(delta, modifier);
}

// ─── Frame rendering ──────────────────────────────────────────────────────────

fn draw_frame(frame: &mut ratatui::Frame, screen: &ScreenLayout, theme: &Theme, sidebar_width: u16) {
    let area = frame.area();

    // ── Global vertical split: [tabs(1)] / [main_area] / [status(1)] / [cmd(1)]
    let v_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);
    let tab_area = v_chunks[0];
    let main_area = v_chunks[1];
    let status_area = v_chunks[2];
    let cmd_area = v_chunks[3];

    // ── Horizontal split of main_area: [sidebar?] [editor] ───────────────────
    let h_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(main_area);
    let sidebar_area = h_chunks[0];
    let editor_area = h_chunks[1];

    let buf = frame.buffer_mut();
    render_tab_bar(buf, tab_area, &screen.tab_bar, theme);
    if let Some(browser) = &screen.browser {
        render_sidebar(buf, sidebar_area, browser, theme);
    }
    match &screen.editor {
        Some(editor) => render_editor(buf, editor_area, editor, theme),
        None => fill(buf, editor_area, rc(theme.background)),
    }
    if screen.completions.is_empty() {
        render_status_line(buf, status_area, &screen.status_left, &screen.status_right, theme);
    } else {
        render_status_line(buf, status_area, &screen.completions.join("  "), "", theme);
    }
    render_command_line(buf, cmd_area, &screen.command, theme);

    if let Some(notice) = &screen.notice {
        render_notice(buf, area, notice, theme);
    }

    // Terminal cursor goes to the text cursor unless a prompt or notice owns
    // the screen.
    if screen.notice.is_none() && !screen.command.show_cursor {
        if let Some(editor) = &screen.editor {
            if let Some(cursor) = editor.cursor {
                let x = editor_area.x as usize + editor.gutter_cols + cursor.col;
                let y = editor_area.y as usize + cursor.row;
                if x < (editor_area.x + editor_area.width) as usize
                    && y < (editor_area.y + editor_area.height) as usize
                {
                    frame.set_cursor_position((x as u16, y as u16));
                }
            }
        }
    }
}

fn set_cell(buf: &mut ratatui::buffer::Buffer, x: u16, y: u16, ch: char, fg: RColor, bg: RColor) {
    set_cell_styled(buf, x, y, ch, fg, bg, Modifier::empty());
}

fn set_cell_styled(
    buf: &mut ratatui::buffer::Buffer,
    x: u16,
    y: u16,
    ch: char,
    fg: RColor,
    bg: RColor,
    modifier: Modifier,
) {
    if let Some(cell) = buf.cell_mut((x, y)) {
        cell.set_char(ch).set_fg(fg).set_bg(bg);
        cell.modifier = modifier;
    }
}

/// Write `text` from `x`, clipped at the right edge of `area`. Returns the
/// column after the last written char.
#[allow(clippy::too_many_arguments)]
fn put_str(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    mut x: u16,
    y: u16,
    text: &str,
    fg: RColor,
    bg: RColor,
    modifier: Modifier,
) -> u16 {
    for ch in text.chars() {
        if x >= area.x + area.width {
            break;
        }
        set_cell_styled(buf, x, y, ch, fg, bg, modifier);
        x += 1;
    }
    x
}

fn fill(buf: &mut ratatui::buffer::Buffer, area: Rect, bg: RColor) {
    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            set_cell(buf, x, y, ' ', bg, bg);
        }
    }
}

// ─── Tab bar ──────────────────────────────────────────────────────────────────

fn render_tab_bar(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    tabs: &[render::TabInfo],
    theme: &Theme,
) {
    let bar_bg = rc(theme.tab_bar_bg);
    fill(buf, area, bar_bg);

    let mut x = area.x;
    for tab in tabs {
        let fg = match (tab.active, tab.dirty) {
            (true, _) => rc(theme.tab_active_fg),
            (false, true) => rc(theme.tab_dirty_fg),
            (false, false) => rc(theme.tab_inactive_fg),
        };
        let (bg, modifier) = if tab.active {
            (rc(theme.tab_active_bg), Modifier::BOLD)
        } else {
            (bar_bg, Modifier::empty())
        };
        x = put_str(buf, area, x, area.y, &tab.name, fg, bg, modifier);
        if x < area.x + area.width {
            set_cell(buf, x, area.y, ' ', bar_bg, bar_bg);
            x += 1;
        }
    }
}

// ─── Editor ───────────────────────────────────────────────────────────────────

fn render_editor(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    editor: &RenderedEditor,
    theme: &Theme,
) {
    let bg = rc(theme.background);
    let fg = rc(theme.foreground);
    fill(buf, area, bg);

    let text_x = area.x + editor.gutter_cols as u16;
    for (row, line) in editor.lines.iter().enumerate() {
        let y = area.y + row as u16;
        if y >= area.y + area.height {
            break;
        }
        if !line.gutter_text.is_empty() {
            let (gutter_fg, modifier) = if line.is_current_line {
                (rc(theme.line_number_active_fg), Modifier::BOLD)
            } else {
                (rc(theme.line_number_fg), Modifier::empty())
            };
            put_str(buf, area, area.x, y, &line.gutter_text, gutter_fg, bg, modifier);
        }
        put_str(buf, area, text_x, y, &line.text, fg, bg, Modifier::empty());
    }
}

// ─── Sidebar ──────────────────────────────────────────────────────────────────

fn render_sidebar(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    browser: &RenderedBrowser,
    theme: &Theme,
) {
    if area.width == 0 {
        return;
    }
    let bg = rc(theme.browser_bg);
    fill(buf, area, bg);

    // Separator in the last column
    let sep_x = area.x + area.width - 1;
    for y in area.y..area.y + area.height {
        set_cell(buf, sep_x, y, '│', rc(theme.separator), bg);
    }
    let rows_area = Rect {
        width: area.width - 1,
        ..area
    };

    // Keep the selection on screen.
    let height = rows_area.height as usize;
    let selected = browser.rows.iter().position(|r| r.selected).unwrap_or(0);
    let scroll_top = (selected + 1).saturating_sub(height);

    for (i, row) in browser.rows.iter().skip(scroll_top).take(height).enumerate() {
        let y = rows_area.y + i as u16;
        let row_bg = if row.selected {
            rc(theme.browser_selected_bg)
        } else if row.highlighted {
            rc(theme.browser_highlight_bg)
        } else {
            bg
        };
        let (fg, modifier) = if row.header {
            (rc(theme.browser_header_fg), Modifier::BOLD)
        } else if row.highlighted {
            (rc(theme.tab_active_fg), Modifier::empty())
        } else {
            (rc(theme.browser_fg), Modifier::empty())
        };
        for x in rows_area.x..rows_area.x + rows_area.width {
            set_cell(buf, x, y, ' ', fg, row_bg);
        }
        put_str(buf, rows_area, rows_area.x, y, &row.text, fg, row_bg, modifier);
    }
}

// ─── Notice popup ─────────────────────────────────────────────────────────────

fn render_notice(buf: &mut ratatui::buffer::Buffer, area: Rect, notice: &Notice, theme: &Theme) {
    let hint = "Press any key";
    let inner = notice
        .message
        .chars()
        .count()
        .max(notice.title.chars().count())
        .max(hint.len()) as u16;
    let width = (inner + 4).min(area.width);
    let height = 6u16.min(area.height);
    let popup = Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    };
    let fg = rc(theme.notice_fg);
    let bg = rc(theme.notice_bg);
    let border = rc(theme.notice_border);
    fill(buf, popup, bg);

    let right = popup.x + popup.width.saturating_sub(1);
    let bottom = popup.y + popup.height.saturating_sub(1);
    for x in popup.x..=right {
        set_cell(buf, x, popup.y, '─', border, bg);
        set_cell(buf, x, bottom, '─', border, bg);
    }
    for y in popup.y..=bottom {
        set_cell(buf, popup.x, y, '│', border, bg);
        set_cell(buf, right, y, '│', border, bg);
    }
    set_cell(buf, popup.x, popup.y, '┌', border, bg);
    set_cell(buf, right, popup.y, '┐', border, bg);
    set_cell(buf, popup.x, bottom, '└', border, bg);
    set_cell(buf, right, bottom, '┘', border, bg);

    let x = popup.x + 2;
    put_str(buf, popup, x, popup.y + 1, &notice.title, border, bg, Modifier::BOLD);
    put_str(buf, popup, x, popup.y + 2, &notice.message, fg, bg, Modifier::empty());
    put_str(buf, popup, x, popup.y + 4, hint, fg, bg, Modifier::DIM);
}

// ─── Status / command line ────────────────────────────────────────────────────

fn render_status_line(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    left: &str,
    right: &str,
    theme: &Theme,
) {
    let fg = rc(theme.status_fg);
    let bg = rc(theme.status_bg);
    fill(buf, area, bg);
    put_str(buf, area, area.x, area.y, left, fg, bg, Modifier::empty());

    let right_len = right.chars().count() as u16;
    if right_len <= area.width {
        put_str(
            buf,
            area,
            area.x + area.width - right_len,
            area.y,
            right,
            fg,
            bg,
            Modifier::empty(),
        );
    }
}

fn render_command_line(
    buf: &mut ratatui::buffer::Buffer,
    area: Rect,
    command: &render::CommandLineData,
    theme: &Theme,
) {
    let fg = rc(theme.command_fg);
    let bg = rc(theme.command_bg);
    fill(buf, area, bg);
    let x = put_str(buf, area, area.x, area.y, &command.text, fg, bg, Modifier::empty());

    // Command-line cursor (inverted block at insertion point)
    if command.show_cursor {
        let cx = x.min(area.x + area.width.saturating_sub(1));
        if let Some(cell) = buf.cell_mut((cx, area.y)) {
            cell.set_fg(bg).set_bg(fg);
        }
    }
}

// ─── Input translation ────────────────────────────────────────────────────────

/// Map a crossterm key event to `(key_name, unicode, ctrl)`. Ctrl combos
/// carry the lowercased char as both name and unicode, except that Shift
/// keeps the uppercase char (Ctrl-Shift-S).
fn translate_key(event: KeyEvent) -> Option<(String, Option<char>, bool)> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let shift = event.modifiers.contains(KeyModifiers::SHIFT);
    let named = |name: &str| Some((name.to_string(), None, ctrl));
    match event.code {
        KeyCode::Char(c) => {
            let (key_name, unicode) = if ctrl {
                let lower = c.to_ascii_lowercase();
                let ch = if shift { c.to_ascii_uppercase() } else { lower };
                (lower.to_string(), Some(ch))
            } else {
                (String::new(), Some(c))
            };
            Some((key_name, unicode, ctrl))
        }
        KeyCode::Esc => named("Escape"),
        KeyCode::Enter => named("Return"),
        KeyCode::Backspace => named("BackSpace"),
        KeyCode::Delete => named("Delete"),
        KeyCode::Tab => named("Tab"),
        KeyCode::Up => named("Up"),
        KeyCode::Down => named("Down"),
        KeyCode::Left => named("Left"),
        KeyCode::Right => named("Right"),
        KeyCode::Home => named("Home"),
        KeyCode::End => named("End"),
        KeyCode::PageUp => named("Page_Up"),
        KeyCode::PageDown => named("Page_Down"),
        KeyCode::F(n) => Some((format!("F{n}"), None, ctrl)),
        _ => None,
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Convert a `render::Color` to a ratatui `Color::Rgb`.
#[inline]
fn rc(c: Color) -> RColor {
    RColor::Rgb(c.r, c.g, c.b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyEventState;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    #[test]
    fn test_translate_key() {
        assert_eq!(
            translate_key(key(KeyCode::Char('a'), KeyModifiers::NONE)),
            Some((String::new(), Some('a'), false))
        );
        assert_eq!(
            translate_key(key(KeyCode::Char('S'), KeyModifiers::CONTROL | KeyModifiers::SHIFT)),
            Some(("s".to_string(), Some('S'), true))
        );
        assert_eq!(
            translate_key(key(KeyCode::PageDown, KeyModifiers::CONTROL)),
            Some(("Page_Down".to_string(), None, true))
        );
        assert_eq!(
            translate_key(key(KeyCode::Tab, KeyModifiers::NONE)),
            Some(("Tab".to_string(), None, false))
        );
    }

    #[test]
    fn test_ctrl_wheel_zooms() {
        let mut shell = Shell::new(Default::default());
        shell.new_document();
        let wheel = |kind| MouseEvent {
            kind,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::CONTROL,
        };
        handle_mouse(&mut shell, wheel(MouseEventKind::ScrollUp));
        assert_eq!(shell.font_size(), 15);
        handle_mouse(&mut shell, wheel(MouseEventKind::ScrollDown));
        assert_eq!(shell.font_size(), 14);
    }
}
