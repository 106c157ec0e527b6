//! Static font-metric tables for the two PDF base-14 faces the renderer uses.
//!
//! Character widths are in em units (relative to font size), taken from the
//! Adobe AFM files for Helvetica and Helvetica-Bold. Since both faces are standard
//! PDF fonts they are never embedded, so these tables are the only metrics needed to
//! wrap text exactly the way a viewer will draw it.
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters).
//! Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font faces
// ────────────────────────────────────────────────────────────────────────────

/// The font faces available to the page sinks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFace {
    /// Body text.
    Helvetica,
    /// Section headers.
    HelveticaBold,
}

impl FontFace {
    /// PostScript name written into the PDF font dictionary.
    pub fn base_font(self) -> &'static str {
        match self {
            FontFace::Helvetica => "Helvetica",
            FontFace::HelveticaBold => "Helvetica-Bold",
        }
    }
}

/// A face at a given size. This is what a sink has "set" when it draws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    pub face: FontFace,
    pub size_pt: f32,
}

impl FontSpec {
    pub fn new(face: FontFace, size_pt: f32) -> Self {
        FontSpec { face, size_pt }
    }

    /// Rendered width of `s` in points.
    pub fn string_width(&self, s: &str) -> f32 {
        get_metrics(self.face).measure_str(s) * self.size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Page configuration
// ────────────────────────────────────────────────────────────────────────────

/// Page geometry and typography for one rendered bibliography.
///
/// All lengths are PDF points (1/72"). The cursor runs from the top margin
/// (`page_height - margin`) down to `margin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub page_width: f32,
    pub page_height: f32,
    /// Applied on all four sides.
    pub margin: f32,
    pub body_font: FontSpec,
    pub header_font: FontSpec,
    /// Vertical step after each body line.
    pub line_height: f32,
    /// Extra step after a complete entry block.
    pub entry_gap: f32,
    /// Vertical step after a section header.
    pub header_step: f32,
}

/// A4 portrait.
pub const A4_WIDTH_PT: f32 = 595.0;
pub const A4_HEIGHT_PT: f32 = 842.0;

impl Default for PageConfig {
    /// A4, 50pt margins, Helvetica 12 body, Helvetica-Bold 14 headers.
    fn default() -> Self {
        PageConfig {
            page_width: A4_WIDTH_PT,
            page_height: A4_HEIGHT_PT,
            margin: 50.0,
            body_font: FontSpec::new(FontFace::Helvetica, 12.0),
            header_font: FontSpec::new(FontFace::HelveticaBold, 14.0),
            line_height: 15.0,
            entry_gap: 10.0,
            header_step: 30.0,
        }
    }
}

impl PageConfig {
    /// Usable line width between the left and right margins.
    pub fn text_width(&self) -> f32 {
        self.page_width - 2.0 * self.margin
    }

    /// Cursor position of the first line on a fresh page.
    pub fn top(&self) -> f32 {
        self.page_height - self.margin
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for a font face.
///
/// `widths[i]` = width of ASCII character `(i + 32)` at 1em, covering 0x20 (space)
/// through 0x7E (~).
pub struct FontMetricTable {
    widths: [f32; 95],
    /// Fallback width for characters outside printable ASCII.
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32]
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }
}

/// Returns the static metric table for a face.
pub fn get_metrics(face: FontFace) -> &'static FontMetricTable {
    match face {
        FontFace::Helvetica => &HELVETICA_TABLE,
        FontFace::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
};

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_space_is_narrower_than_letters() {
        for face in [FontFace::Helvetica, FontFace::HelveticaBold] {
            let metrics = get_metrics(face);
            assert!(metrics.measure_str(" ") < metrics.measure_str("a"));
        }
    }

    #[test]
    fn test_measure_empty_string_is_zero() {
        assert_eq!(get_metrics(FontFace::Helvetica).measure_str(""), 0.0);
    }

    #[test]
    fn test_known_helvetica_widths() {
        // "Title: " = T(611) i(222) t(278) l(222) e(556) :(278) sp(278) = 2445/1000 em
        let font = FontSpec::new(FontFace::Helvetica, 12.0);
        assert!((font.string_width("Title: ") - 2.445 * 12.0).abs() < 1e-3);
    }

    #[test]
    fn test_bold_is_wider_than_regular() {
        let text = "Periodicals and Proceedings";
        let regular = get_metrics(FontFace::Helvetica).measure_str(text);
        let bold = get_metrics(FontFace::HelveticaBold).measure_str(text);
        assert!(bold > regular);
    }

    #[test]
    fn test_non_ascii_uses_average_width() {
        let metrics = get_metrics(FontFace::Helvetica);
        assert!((metrics.measure_str("ó") - metrics.average_char_width).abs() < 1e-6);
    }

    #[test]
    fn test_default_page_config_is_a4() {
        let config = PageConfig::default();
        assert_eq!(config.page_width, 595.0);
        assert_eq!(config.page_height, 842.0);
        assert_eq!(config.text_width(), 495.0);
        assert_eq!(config.top(), 792.0);
        assert_eq!(config.body_font.face, FontFace::Helvetica);
        assert_eq!(config.header_font.size_pt, 14.0);
    }
}
