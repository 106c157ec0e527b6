//! Document Renderer — lays out a categorized bibliography into a page sink.

use tracing::debug;

use crate::bibliography::classify::{classify, sort_all, CategorizedEntries};
use crate::bibliography::entry::BibEntry;
use crate::layout::engine::{gap, place_header, place_lines, LayoutCursor};
use crate::layout::font_metrics::PageConfig;
use crate::layout::wrap::wrap;
use crate::render::sink::{PageSink, RenderError};

const NO_TITLE: &str = "No Title";
const UNKNOWN_AUTHOR: &str = "Unknown Author";

/// `"Title: ..."` line for an entry, before wrapping.
pub fn title_text(entry: &BibEntry) -> String {
    format!("Title: {}", entry.title().unwrap_or(NO_TITLE))
}

/// `"Authors: A and B"` line for an entry, before wrapping.
pub fn authors_text(entry: &BibEntry) -> String {
    let authors = entry.authors();
    if authors.is_empty() {
        return format!("Authors: {UNKNOWN_AUTHOR}");
    }
    let names: Vec<String> = authors.iter().map(ToString::to_string).collect();
    format!("Authors: {}", names.join(" and "))
}

/// Renders categories in display order, skipping empty ones, then finalizes the sink.
pub fn render<S: PageSink>(
    categorized: &CategorizedEntries<'_>,
    config: &PageConfig,
    mut sink: S,
) -> Result<S::Output, RenderError> {
    debug!(entries = categorized.total(), "Rendering bibliography");
    let mut cursor = LayoutCursor::new(config);
    sink.set_font(cursor.font)?;

    let measure = |s: &str| config.body_font.string_width(s);
    let max_width = config.text_width();

    for (category, entries) in categorized.iter() {
        if entries.is_empty() {
            continue;
        }
        debug!(category = ?category, entries = entries.len(), "Rendering category");
        place_header(category.display_title(), &mut cursor, config, &mut sink)?;

        for entry in entries {
            let title_lines = wrap(&title_text(entry), max_width, measure);
            let author_lines = wrap(&authors_text(entry), max_width, measure);

            place_lines(&title_lines, &mut cursor, config, &mut sink)?;
            place_lines(&author_lines, &mut cursor, config, &mut sink)?;
            gap(&mut cursor, config, &mut sink)?;
        }
    }

    debug!(page_breaks = cursor.page_breaks, "Layout complete");
    sink.finish()
}

/// Classifies, sorts and renders a flat list of entries.
pub fn render_bibliography<S: PageSink>(
    entries: &[BibEntry],
    config: &PageConfig,
    sink: S,
) -> Result<S::Output, RenderError> {
    let categorized = sort_all(classify(entries));
    render(&categorized, config, sink)
}
