use std::path::Path;

use image::GenericImageView;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Rgb,
};

use super::ReportError;

pub const PAGE_WIDTH_MM: f32 = 210.0;
pub const PAGE_HEIGHT_MM: f32 = 297.0;
pub const MARGIN_MM: f32 = 15.0;
pub const CONTENT_WIDTH_MM: f32 = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;

const PT_TO_MM: f32 = 25.4 / 72.0;
// Average Helvetica glyph advance, in em.
const AVG_GLYPH_EM: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

fn pdf_error(err: impl std::fmt::Display) -> ReportError {
    ReportError::Pdf(err.to_string())
}

pub fn text_width_mm(text: &str, size_pt: f32) -> f32 {
    text.chars().count() as f32 * size_pt * AVG_GLYPH_EM * PT_TO_MM
}

/// Greedy word wrap against an estimated glyph width. Words longer than a
/// line are split.
pub fn wrap_text(text: &str, size_pt: f32, width_mm: f32) -> Vec<String> {
    let max_chars = ((width_mm / (size_pt * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars && !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

/// Top-down writer over an A4 printpdf document. `y` is the cursor in mm
/// from the page bottom.
pub struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    italic: IndirectFontRef,
    y: f32,
    pages: usize,
}

impl PdfWriter {
    pub fn new(title: &str) -> Result<Self, ReportError> {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(pdf_error)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_error)?;
        let italic = doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(pdf_error)?;

        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            italic,
            y: PAGE_HEIGHT_MM - MARGIN_MM,
            pages: 1,
        })
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    fn font(&self, style: FontStyle) -> &IndirectFontRef {
        match style {
            FontStyle::Regular => &self.regular,
            FontStyle::Bold => &self.bold,
            FontStyle::Italic => &self.italic,
        }
    }

    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    fn ensure_space(&mut self, height_mm: f32) {
        if self.y - height_mm < MARGIN_MM {
            self.new_page();
        }
    }

    pub fn gap(&mut self, height_mm: f32) {
        self.y -= height_mm;
        if self.y < MARGIN_MM {
            self.new_page();
        }
    }

    /// One line of text occupying a cell of `height_mm`.
    pub fn cell(&mut self, text: &str, style: FontStyle, size_pt: f32, height_mm: f32, align: Align) {
        self.ensure_space(height_mm);
        let x = match align {
            Align::Left => MARGIN_MM,
            Align::Center => {
                ((PAGE_WIDTH_MM - text_width_mm(text, size_pt)) / 2.0).max(MARGIN_MM)
            }
        };
        let baseline = self.y - height_mm * 0.7;
        let font = self.font(style).clone();
        self.layer
            .use_text(text, size_pt, Mm(x), Mm(baseline), &font);
        self.y -= height_mm;
    }

    pub fn paragraph(&mut self, text: &str, style: FontStyle, size_pt: f32, line_mm: f32, align: Align) {
        for line in wrap_text(text, size_pt, CONTENT_WIDTH_MM) {
            self.cell(&line, style, size_pt, line_mm, align);
        }
    }

    pub fn set_grey(&mut self, level: f32) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(level, level, level, None)));
    }

    pub fn reset_color(&mut self) {
        self.set_grey(0.0);
    }

    /// Embeds a raster image scaled to `width_mm`, keeping its aspect ratio.
    pub fn image(&mut self, path: &Path, width_mm: f32) -> Result<(), ReportError> {
        let decoded = image::open(path).map_err(|e| ReportError::Image {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let (px_w, px_h) = decoded.dimensions();
        let (px_w, px_h) = (px_w as f32, px_h as f32);
        if px_w == 0.0 || px_h == 0.0 {
            return Err(ReportError::Image {
                path: path.to_path_buf(),
                reason: "empty image".to_string(),
            });
        }

        let dpi = px_w * 25.4 / width_mm;
        let height_mm = (px_h * 25.4 / dpi).min(PAGE_HEIGHT_MM - 2.0 * MARGIN_MM);
        self.ensure_space(height_mm);

        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm((PAGE_WIDTH_MM - width_mm) / 2.0)),
                translate_y: Some(Mm(self.y - height_mm)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.y -= height_mm;
        Ok(())
    }

    pub fn save(self, path: &Path) -> Result<(), ReportError> {
        let bytes = self.doc.save_to_bytes().map_err(pdf_error)?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_respects_width_and_keeps_words() {
        let text = "Maintain a healthy lifestyle with regular exercise and a balanced diet. \
                    Monitor blood sugar levels periodically and consult a doctor.";
        let lines = wrap_text(text, 12.0, 60.0);
        let max_chars = (60.0 / (12.0 * AVG_GLYPH_EM * PT_TO_MM)).floor() as usize;
        assert!(lines.len() > 1);
        assert!(lines.iter().all(|l| l.chars().count() <= max_chars));
        assert_eq!(lines.join(" "), text.split_whitespace().collect::<Vec<_>>().join(" "));
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap_text(&"a".repeat(100), 12.0, 20.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat().len(), 100);
    }

    #[test]
    fn wrap_of_blank_text_is_empty() {
        assert!(wrap_text("   ", 12.0, 100.0).is_empty());
    }

    #[test]
    fn long_content_breaks_pages() {
        let mut writer = PdfWriter::new("test").unwrap();
        for i in 0..60 {
            writer.cell(&format!("line {i}"), FontStyle::Regular, 12.0, 8.0, Align::Left);
        }
        assert!(writer.pages() >= 2);
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out.pdf");
        writer.save(&path).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
