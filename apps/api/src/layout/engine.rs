//! Page Layout Engine — places lines top-to-bottom and breaks pages.
//!
//! The cursor always moves *after* drawing: a line is drawn at the current
//! position, the cursor steps down, and only then is the bottom margin checked.
//! When the cursor has dropped below `margin` the current page is closed and the
//! cursor returns to `page_height - margin` on a fresh page.
//!
//! A section header steps down without a break check, so the first line under a
//! header near the bottom can sit below the margin; the break follows that line.

use crate::layout::font_metrics::{FontSpec, PageConfig};
use crate::render::sink::{PageSink, RenderError};

/// Mutable drawing position for one rendering pass.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutCursor {
    /// Baseline of the next line, in points from the bottom edge.
    pub y: f32,
    /// Body font restored after headers and page breaks.
    pub font: FontSpec,
    /// Number of page breaks taken so far.
    pub page_breaks: usize,
}

impl LayoutCursor {
    pub fn new(config: &PageConfig) -> Self {
        LayoutCursor {
            y: config.top(),
            font: config.body_font,
            page_breaks: 0,
        }
    }
}

/// Draws each line at the left margin, stepping `line_height` after every line.
pub fn place_lines<S: PageSink + ?Sized>(
    lines: &[String],
    cursor: &mut LayoutCursor,
    config: &PageConfig,
    sink: &mut S,
) -> Result<(), RenderError> {
    for line in lines {
        sink.draw_text(config.margin, cursor.y, line)?;
        advance(cursor, config, sink, config.line_height)?;
    }
    Ok(())
}

/// Draws a section header in the header font, then restores the body font.
/// The header step never breaks the page.
pub fn place_header<S: PageSink + ?Sized>(
    title: &str,
    cursor: &mut LayoutCursor,
    config: &PageConfig,
    sink: &mut S,
) -> Result<(), RenderError> {
    sink.set_font(config.header_font)?;
    sink.draw_text(config.margin, cursor.y, title)?;
    sink.set_font(cursor.font)?;
    cursor.y -= config.header_step;
    Ok(())
}

/// Trailing space after a full entry block, followed by a break check.
pub fn gap<S: PageSink + ?Sized>(
    cursor: &mut LayoutCursor,
    config: &PageConfig,
    sink: &mut S,
) -> Result<bool, RenderError> {
    advance(cursor, config, sink, config.entry_gap)
}

/// Moves the cursor down by `amount` and breaks the page if it passed the margin.
/// Returns whether a page break happened.
pub fn advance<S: PageSink + ?Sized>(
    cursor: &mut LayoutCursor,
    config: &PageConfig,
    sink: &mut S,
    amount: f32,
) -> Result<bool, RenderError> {
    cursor.y -= amount;
    break_page_if_needed(cursor, config, sink)
}

/// Starts a new page when the cursor is below the bottom margin.
pub fn break_page_if_needed<S: PageSink + ?Sized>(
    cursor: &mut LayoutCursor,
    config: &PageConfig,
    sink: &mut S,
) -> Result<bool, RenderError> {
    if cursor.y >= config.margin {
        return Ok(false);
    }
    sink.show_page()?;
    sink.set_font(cursor.font)?;
    cursor.y = config.top();
    cursor.page_breaks += 1;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::FontFace;
    use crate::render::sink::RecordingSink;

    fn start(config: &PageConfig) -> (LayoutCursor, RecordingSink) {
        let cursor = LayoutCursor::new(config);
        let mut sink = RecordingSink::new();
        sink.set_font(cursor.font).unwrap();
        (cursor, sink)
    }

    fn lines(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn test_lines_step_down_by_line_height() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);

        place_lines(&lines(3), &mut cursor, &config, &mut sink).unwrap();

        assert_eq!(cursor.y, 792.0 - 45.0);
        let doc = sink.finish().unwrap();
        let ys: Vec<f32> = doc.pages[0].texts().map(|t| t.y).collect();
        assert_eq!(ys, vec![792.0, 777.0, 762.0]);
    }

    #[test]
    fn test_page_break_resets_cursor_to_top_margin() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);
        cursor.y = 60.0;

        place_lines(&lines(2), &mut cursor, &config, &mut sink).unwrap();

        // First line drawn at 60 pushed the cursor to 45 < 50: break, then the
        // second line opens page 2 at the top margin.
        assert_eq!(cursor.page_breaks, 1);
        assert_eq!(cursor.y, config.top() - config.line_height);
        let doc = sink.finish().unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].texts().next().unwrap().y, 60.0);
        assert_eq!(doc.pages[1].texts().next().unwrap().y, config.top());
    }

    #[test]
    fn test_cursor_exactly_at_margin_does_not_break() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);
        cursor.y = 65.0;

        place_lines(&lines(1), &mut cursor, &config, &mut sink).unwrap();
        assert_eq!(cursor.y, 50.0);
        assert_eq!(cursor.page_breaks, 0);
    }

    #[test]
    fn test_gap_can_trigger_break() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);
        cursor.y = 55.0;

        let broke = gap(&mut cursor, &config, &mut sink).unwrap();
        assert!(broke);
        assert_eq!(cursor.y, config.top());
    }

    #[test]
    fn test_header_uses_bold_font_then_restores_body() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);

        place_header("Livros", &mut cursor, &config, &mut sink).unwrap();
        place_lines(&lines(1), &mut cursor, &config, &mut sink).unwrap();

        assert_eq!(cursor.y, 792.0 - 30.0 - 15.0);
        let doc = sink.finish().unwrap();
        let texts: Vec<_> = doc.pages[0].texts().collect();
        assert_eq!(texts[0].font.face, FontFace::HelveticaBold);
        assert_eq!(texts[0].font.size_pt, 14.0);
        assert_eq!(texts[1].font.face, FontFace::Helvetica);
        assert_eq!(texts[1].y, 762.0);
    }

    #[test]
    fn test_header_near_bottom_keeps_its_first_line() {
        let config = PageConfig::default();
        let (mut cursor, mut sink) = start(&config);
        cursor.y = 60.0;

        place_header("Livros", &mut cursor, &config, &mut sink).unwrap();
        assert_eq!(cursor.y, 30.0);
        assert_eq!(cursor.page_breaks, 0);

        place_lines(&["Title: A".to_string()], &mut cursor, &config, &mut sink).unwrap();
        assert_eq!(cursor.page_breaks, 1);
        assert_eq!(cursor.y, config.top());

        let doc = sink.finish().unwrap();
        assert_eq!(doc.pages.len(), 1);
        let placed: Vec<(&str, f32)> = doc.pages[0]
            .texts()
            .map(|t| (t.text.as_str(), t.y))
            .collect();
        assert_eq!(placed, vec![("Livros", 60.0), ("Title: A", 30.0)]);
    }
}
