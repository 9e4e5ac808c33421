//! Line-number gutter layout.
//!
//! The gutter does no painting. It works out which line numbers are visible,
//! where each one sits vertically, which one is bold, and how wide the column
//! has to be. Front ends draw from that.

use super::surface::{SurfaceOutcome, TextSurface};

/// Font metrics the gutter lays itself out with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GutterMetrics {
    pub char_width: f64,
    pub line_height: f64,
    /// Fixed space added to the widest number.
    pub padding: f64,
}

impl GutterMetrics {
    /// Terminal metrics: one cell per char and per line.
    pub fn cells(padding: u16) -> Self {
        Self {
            char_width: 1.0,
            line_height: 1.0,
            padding: padding as f64,
        }
    }

    /// Pixel metrics with the classic 30px padding.
    pub fn pixels(char_width: f64, line_height: f64) -> Self {
        Self {
            char_width,
            line_height,
            padding: 30.0,
        }
    }
}

/// The part of a surface the gutter has to label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GutterFrame {
    /// Zero-based index of the first visible line.
    pub first_visible: usize,
    /// Rows available on screen.
    pub visible_rows: usize,
    /// Zero-based line holding the cursor.
    pub cursor_line: usize,
    /// Total lines in the surface.
    pub line_count: usize,
}

impl GutterFrame {
    pub fn of(surface: &TextSurface) -> Self {
        Self {
            first_visible: surface.first_visible_line(),
            visible_rows: surface.view().viewport_lines,
            cursor_line: surface.view().cursor.line,
            line_count: surface.line_count(),
        }
    }
}

/// One line number, positioned for drawing.
#[derive(Debug, Clone, PartialEq)]
pub struct GutterLabel {
    /// 1-based line number.
    pub number: usize,
    /// Vertical offset from the top of the text area.
    pub top: f64,
    /// Set for the line that holds the cursor.
    pub bold: bool,
}

#[derive(Debug, Clone)]
pub struct Gutter {
    metrics: GutterMetrics,
    width: f64,
    visible: bool,
}

impl Gutter {
    pub fn new(metrics: GutterMetrics) -> Self {
        let mut gutter = Self {
            metrics,
            width: 0.0,
            visible: true,
        };
        gutter.update_width(1);
        gutter
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    /// Width rounded up to whole cells, for terminal front ends.
    pub fn width_cells(&self) -> usize {
        self.width.ceil() as usize
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    /// Width needed to show numbers up to `line_count`.
    pub fn required_width(&self, line_count: usize) -> f64 {
        digits(line_count.max(1)) as f64 * self.metrics.char_width + self.metrics.padding
    }

    /// Resize for `line_count` lines. Returns true only when the width
    /// actually changed, so callers reflow only then.
    pub fn update_width(&mut self, line_count: usize) -> bool {
        let width = self.required_width(line_count);
        if width == self.width {
            return false;
        }
        self.width = width;
        true
    }

    /// Lay out the visible line numbers.
    pub fn labels(&self, frame: &GutterFrame) -> Vec<GutterLabel> {
        let last = frame
            .line_count
            .min(frame.first_visible.saturating_add(frame.visible_rows));
        (frame.first_visible..last)
            .map(|line| GutterLabel {
                number: line + 1,
                top: (line - frame.first_visible) as f64 * self.metrics.line_height,
                bold: line == frame.cursor_line,
            })
            .collect()
    }

    /// React to a surface update. Returns fresh labels when a repaint is due,
    /// or `None` when nothing visible changed or the gutter is hidden.
    pub fn on_surface_update(
        &mut self,
        outcome: &SurfaceOutcome,
        frame: &GutterFrame,
    ) -> Option<Vec<GutterLabel>> {
        if let Some(count) = outcome.line_count_changed {
            self.update_width(count);
        }
        if !self.visible {
            return None;
        }
        let repaint = outcome.view_changed
            || outcome.line_count_changed.is_some()
            || outcome.cursor_moved.is_some();
        repaint.then(|| self.labels(frame))
    }
}

fn digits(mut n: usize) -> usize {
    let mut count = 1;
    while n >= 10 {
        n /= 10;
        count += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::SurfaceInput;

    fn frame(first: usize, rows: usize, cursor: usize, lines: usize) -> GutterFrame {
        GutterFrame {
            first_visible: first,
            visible_rows: rows,
            cursor_line: cursor,
            line_count: lines,
        }
    }

    #[test]
    fn test_width_grows_with_digit_count() {
        let mut g = Gutter::new(GutterMetrics::cells(2));
        assert_eq!(g.width(), 3.0);
        assert!(!g.update_width(9));
        assert!(g.update_width(10));
        assert_eq!(g.width(), 4.0);
        assert!(!g.update_width(99));
        assert!(g.update_width(100));
        assert_eq!(g.width_cells(), 5);
    }

    #[test]
    fn test_pixel_metrics_padding() {
        let g = Gutter::new(GutterMetrics::pixels(8.0, 16.0));
        assert_eq!(g.width(), 38.0);
        assert_eq!(g.required_width(1234), 62.0);
    }

    #[test]
    fn test_labels_are_aligned_and_bold_on_cursor_line() {
        let g = Gutter::new(GutterMetrics::pixels(8.0, 16.0));
        let labels = g.labels(&frame(10, 3, 11, 100));
        assert_eq!(
            labels,
            vec![
                GutterLabel { number: 11, top: 0.0, bold: false },
                GutterLabel { number: 12, top: 16.0, bold: true },
                GutterLabel { number: 13, top: 32.0, bold: false },
            ]
        );
    }

    #[test]
    fn test_labels_stop_at_end_of_buffer() {
        let g = Gutter::new(GutterMetrics::cells(2));
        let labels = g.labels(&frame(0, 40, 0, 3));
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.last().map(|l| l.number), Some(3));
    }

    #[test]
    fn test_hidden_gutter_skips_repaint_but_tracks_width() {
        let mut surface = TextSurface::new(4);
        let mut g = Gutter::new(GutterMetrics::cells(2));
        g.set_visible(false);

        let out = surface.insert_text(&"x\n".repeat(12));
        assert!(g.on_surface_update(&out, &GutterFrame::of(&surface)).is_none());
        assert_eq!(g.width(), 4.0);
    }

    #[test]
    fn test_repaints_on_scroll_and_edit() {
        let mut surface = TextSurface::new(4);
        surface.set_text(&"x\n".repeat(30));
        surface.set_viewport(5, 80);
        let mut g = Gutter::new(GutterMetrics::cells(2));

        let out = surface.handle_input(SurfaceInput::Scroll {
            delta: 4,
            modifier: false,
        });
        let labels = g
            .on_surface_update(&out, &GutterFrame::of(&surface))
            .unwrap();
        assert_eq!(labels.first().map(|l| l.number), Some(5));
        assert_eq!(labels.len(), 5);

        // Any key brings the cursor line back into view.
        let out = surface.handle_input(SurfaceInput::key("Home"));
        let labels = g
            .on_surface_update(&out, &GutterFrame::of(&surface))
            .unwrap();
        assert_eq!(labels.first().map(|l| (l.number, l.bold)), Some((1, true)));

        let out = surface.handle_input(SurfaceInput::key("Home"));
        assert!(g.on_surface_update(&out, &GutterFrame::of(&surface)).is_none());
    }
}
