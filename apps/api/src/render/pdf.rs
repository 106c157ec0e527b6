//! PDF page sink built on `lopdf`.
//!
//! Text is drawn with the standard (non-embedded) Helvetica faces using
//! WinAnsiEncoding, so Latin-1 titles such as "Periódicos" render without a font
//! program. Characters outside WinAnsi are written as `?`.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::layout::font_metrics::{FontFace, FontSpec, PageConfig};
use crate::render::sink::{PageSink, RenderError};

/// A finished PDF. Write-once: produced by [`PdfSink::finish`].
#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    /// Pages that received at least one line of text.
    pub page_count: usize,
}

pub struct PdfSink {
    doc: Document,
    pages_id: ObjectId,
    resources_id: ObjectId,
    page_ids: Vec<ObjectId>,
    operations: Vec<Operation>,
    font: Option<FontSpec>,
    media_box: (i64, i64),
    title: Option<String>,
}

impl PdfSink {
    pub fn new(config: &PageConfig) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let regular_id = doc.add_object(font_dictionary(FontFace::Helvetica));
        let bold_id = doc.add_object(font_dictionary(FontFace::HelveticaBold));
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                resource_name(FontFace::Helvetica) => Object::Reference(regular_id),
                resource_name(FontFace::HelveticaBold) => Object::Reference(bold_id),
            },
        });

        PdfSink {
            doc,
            pages_id,
            resources_id,
            page_ids: Vec::new(),
            operations: Vec::new(),
            font: None,
            media_box: (
                config.page_width.round() as i64,
                config.page_height.round() as i64,
            ),
            title: None,
        }
    }

    /// Sets the document-info title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    fn add_page(&mut self, operations: Vec<Operation>) -> Result<(), RenderError> {
        let content = Content { operations }
            .encode()
            .map_err(|e| RenderError::Encode(format!("content stream: {e}")))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let (width, height) = self.media_box;
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => Object::Reference(self.pages_id),
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(width),
                Object::Integer(height),
            ],
            "Contents" => Object::Reference(content_id),
            "Resources" => Object::Reference(self.resources_id),
        });
        self.page_ids.push(page_id);
        Ok(())
    }
}

impl PageSink for PdfSink {
    type Output = RenderedDocument;

    fn set_font(&mut self, font: FontSpec) -> Result<(), RenderError> {
        self.font = Some(font);
        Ok(())
    }

    fn draw_text(&mut self, x: f32, y: f32, text: &str) -> Result<(), RenderError> {
        let font = self
            .font
            .ok_or_else(|| RenderError::Encode("draw_text called before set_font".to_string()))?;

        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new(
                "Tf",
                vec![
                    Object::Name(resource_name(font.face).as_bytes().to_vec()),
                    Object::Real(font.size_pt.into()),
                ],
            ),
            Operation::new("Td", vec![Object::Real(x.into()), Object::Real(y.into())]),
            Operation::new(
                "Tj",
                vec![Object::String(encode_win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
        Ok(())
    }

    fn show_page(&mut self) -> Result<(), RenderError> {
        if self.operations.is_empty() {
            return Ok(());
        }
        let operations = std::mem::take(&mut self.operations);
        self.add_page(operations)
    }

    fn finish(mut self) -> Result<RenderedDocument, RenderError> {
        self.show_page()?;
        let page_count = self.page_ids.len();
        if page_count == 0 {
            // A PDF needs at least one page to open in most viewers.
            self.add_page(Vec::new())?;
        }

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::Reference(*id)).collect();
        let count = kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => Object::Integer(count),
            }),
        );

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(self.pages_id),
        });
        self.doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut info = dictionary! {
            "Producer" => Object::string_literal(concat!("bibpdf ", env!("CARGO_PKG_VERSION"))),
            "CreationDate" => Object::string_literal(
                Utc::now().format("D:%Y%m%d%H%M%SZ").to_string(),
            ),
        };
        if let Some(title) = &self.title {
            info.set("Title", Object::String(encode_win_ansi(title), StringFormat::Literal));
        }
        let info_id = self.doc.add_object(info);
        self.doc.trailer.set("Info", Object::Reference(info_id));

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| RenderError::Encode(format!("write: {e}")))?;

        Ok(RenderedDocument { bytes, page_count })
    }
}

fn resource_name(face: FontFace) -> &'static str {
    match face {
        FontFace::Helvetica => "F1",
        FontFace::HelveticaBold => "F2",
    }
}

fn font_dictionary(face: FontFace) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => face.base_font(),
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Maps text to WinAnsiEncoding bytes. Latin-1 maps directly; the few
/// typographic characters WinAnsi places in 0x80..=0x9F are translated.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '\u{20}'..='\u{7E}' | '\u{A0}'..='\u{FF}' => c as u8,
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            _ => b'?',
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_lines(pages: &[&[&str]]) -> RenderedDocument {
        let config = PageConfig::default();
        let mut sink = PdfSink::new(&config).with_title("Test");
        sink.set_font(config.body_font).unwrap();
        for (i, lines) in pages.iter().enumerate() {
            if i > 0 {
                sink.show_page().unwrap();
            }
            for (n, line) in lines.iter().enumerate() {
                sink.draw_text(50.0, 792.0 - 15.0 * n as f32, line).unwrap();
            }
        }
        sink.finish().unwrap()
    }

    #[test]
    fn test_output_is_loadable_pdf_with_expected_pages() {
        let rendered = render_lines(&[&["first"], &["second", "third"]]);
        assert!(rendered.bytes.starts_with(b"%PDF-1.5"));
        assert_eq!(rendered.page_count, 2);

        let doc = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 2);
    }

    #[test]
    fn test_blank_pages_are_not_emitted() {
        let config = PageConfig::default();
        let mut sink = PdfSink::new(&config);
        sink.set_font(config.body_font).unwrap();
        sink.draw_text(50.0, 792.0, "only").unwrap();
        sink.show_page().unwrap();
        sink.show_page().unwrap();
        let rendered = sink.finish().unwrap();
        assert_eq!(rendered.page_count, 1);
    }

    #[test]
    fn test_empty_document_is_still_a_valid_pdf() {
        let rendered = PdfSink::new(&PageConfig::default()).finish().unwrap();
        assert_eq!(rendered.page_count, 0);
        let doc = Document::load_mem(&rendered.bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_draw_before_font_is_an_error() {
        let mut sink = PdfSink::new(&PageConfig::default());
        assert!(sink.draw_text(0.0, 0.0, "x").is_err());
    }

    #[test]
    fn test_win_ansi_encoding() {
        assert_eq!(encode_win_ansi("Periódicos"), b"Peri\xf3dicos".to_vec());
        assert_eq!(encode_win_ansi("a–b"), vec![b'a', 0x96, b'b']);
        assert_eq!(encode_win_ansi("日本"), b"??".to_vec());
    }

    #[test]
    fn test_text_is_extractable() {
        let rendered = render_lines(&[&["Livros", "Title: A"]]);
        let text = pdf_extract::extract_text_from_mem(&rendered.bytes).unwrap();
        assert!(text.contains("Livros"), "{text}");
        assert!(text.contains("Title: A"), "{text}");
    }
}
