//! Page sinks — the drawing backend the layout engine talks to.

use serde::Serialize;
use thiserror::Error;

use crate::layout::font_metrics::FontSpec;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("PDF encoding failed: {0}")]
    Encode(String),
}

/// Destination for drawing commands.
///
/// A page is only materialized once something is drawn on it, so `show_page` on a
/// page that is still blank is a no-op apart from resetting page state.
pub trait PageSink {
    type Output;

    /// Selects the font for subsequent `draw_text` calls.
    fn set_font(&mut self, font: FontSpec) -> Result<(), RenderError>;

    /// Draws one line with its baseline at `(x, y)`.
    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), RenderError>;

    /// Closes the current page and starts a new one.
    fn show_page(&mut self) -> Result<(), RenderError>;

    /// Closes the last page and produces the finished artifact.
    fn finish(self) -> Result<Self::Output, RenderError>
    where
        Self: Sized;
}

// ────────────────────────────────────────────────────────────────────────────
// Recording sink
// ────────────────────────────────────────────────────────────────────────────

/// One `draw_text` call as recorded by [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnText {
    pub x: f32,
    pub y: f32,
    pub font: FontSpec,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedPage {
    pub lines: Vec<DrawnText>,
}

impl RecordedPage {
    pub fn texts(&self) -> impl Iterator<Item = &DrawnText> {
        self.lines.iter()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordedDocument {
    pub pages: Vec<RecordedPage>,
}

impl RecordedDocument {
    /// All drawn strings in page order.
    pub fn all_text(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|p| p.texts().map(|t| t.text.as_str()))
            .collect()
    }
}

/// Keeps the layout in memory. Backs the JSON preview and the layout tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    font: Option<FontSpec>,
    current: RecordedPage,
    pages: Vec<RecordedPage>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PageSink for RecordingSink {
    type Output = RecordedDocument;

    fn set_font(&mut self, font: FontSpec) -> Result<(), RenderError> {
        self.font = Some(font);
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), RenderError> {
        let font = self
            .font
            .ok_or_else(|| RenderError::Encode("draw_text called before set_font".to_string()))?;
        self.current.lines.push(DrawnText {
            x,
            y,
            font,
            text: text.to_string(),
        });
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), RenderError> {
        if !self.current.lines.is_empty() {
            self.pages.push(std::mem::take(&mut self.current));
        }
        Ok(())
    }

    fn finish(mut self) -> Result<RecordedDocument, RenderError> {
        self.show_page()?;
        Ok(RecordedDocument { pages: self.pages })
    }
}
