//! Repeating page decoration: logo, institution name, separator rule and page number.

use crate::styling::Rgb;
use crate::typography::TextRole;
use genpdfi_extended::elements::{Image, Paragraph};
use genpdfi_extended::error::Error;
use genpdfi_extended::render::Area;
use genpdfi_extended::style::{Color, LineStyle, Style as PdfStyle};
use genpdfi_extended::{Alignment, Context, Element, Margins, Mm, PageDecorator, Position};
use log::warn;
use std::fs;
use std::io::Cursor;
use std::path::Path;

/// Height reserved at the top of every page for the letterhead.
pub const HEADER_BAND_MM: f32 = 24.0;
/// Height reserved at the bottom of every page for the page number.
pub const FOOTER_BAND_MM: f32 = 10.0;

const NAME_OFFSET_MM: f32 = 8.0;
const RULE_OFFSET_MM: f32 = HEADER_BAND_MM - 3.0;
const FOOTER_TEXT_OFFSET_MM: f32 = 3.0;
const LOGO_PAGE_FRACTION: f32 = 0.12;

/// Page decorator drawing the institution letterhead on every page.
///
/// The content flow starts below [`HEADER_BAND_MM`] and stops above [`FOOTER_BAND_MM`], inside
/// the page margins; nothing else about the flow changes.
pub struct Letterhead {
    margins: [f32; 4],
    logo: Option<Image>,
    institution: String,
    name_role: TextRole,
    footer_role: TextRole,
    rule_color: Rgb,
    page: usize,
}

impl Letterhead {
    /// Creates a letterhead. The logo is decoded once here; one that cannot be read or decoded
    /// is logged and left out.
    ///
    /// # Arguments
    /// * `logo_path` - Image file drawn at the top-left of each page
    /// * `institution` - Name centered in the header band
    /// * `name_role` / `footer_role` - Text treatment for the name and the page number
    /// * `rule_color` - Color of the separator rule
    pub fn new(
        logo_path: &Path,
        institution: impl Into<String>,
        name_role: TextRole,
        footer_role: TextRole,
        rule_color: Rgb,
    ) -> Letterhead {
        let logo = match fs::read(logo_path) {
            Ok(bytes) => match Image::from_reader(Cursor::new(bytes)) {
                Ok(image) => Some(image.resizing_page_with(LOGO_PAGE_FRACTION)),
                Err(e) => {
                    warn!("Failed to decode logo {}: {}", logo_path.display(), e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to read logo {}: {}", logo_path.display(), e);
                None
            }
        };

        Letterhead {
            margins: [0.0; 4],
            logo,
            institution: institution.into(),
            name_role,
            footer_role,
            rule_color,
            page: 0,
        }
    }

    /// Page margins applied before the bands are reserved (top, right, bottom, left in mm).
    pub fn with_margins(mut self, top: f32, right: f32, bottom: f32, left: f32) -> Letterhead {
        self.margins = [top, right, bottom, left];
        self
    }

    pub fn has_logo(&self) -> bool {
        self.logo.is_some()
    }

    fn render_text(
        &self,
        context: &Context,
        area: Area<'_>,
        style: PdfStyle,
        text: String,
        role: &TextRole,
        alignment: Alignment,
    ) -> Result<(), Error> {
        let mut paragraph = Paragraph::default();
        paragraph.set_alignment(alignment);
        paragraph.push_styled(text, role.pdf_style());
        paragraph.render(context, area, style)?;
        Ok(())
    }
}

impl PageDecorator for Letterhead {
    fn decorate_page<'a>(
        &mut self,
        context: &Context,
        mut area: Area<'a>,
        style: PdfStyle,
    ) -> Result<Area<'a>, Error> {
        self.page += 1;
        let [top, right, bottom, left] = self.margins;
        area.add_margins(Margins::trbl(top, right, bottom, left));
        let size = area.size();

        let mut header = area.clone();
        header.set_height(Mm::from(HEADER_BAND_MM));

        if let Some(image) = self.logo.as_mut() {
            image.render(context, header.clone(), style.clone())?;
        }

        let mut name_area = header.clone();
        name_area.add_offset(Position::new(0.0, NAME_OFFSET_MM));
        self.render_text(
            context,
            name_area,
            style.clone(),
            self.institution.clone(),
            &self.name_role,
            Alignment::Center,
        )?;

        let rule = LineStyle::new().with_thickness(0.3).with_color(Color::Rgb(
            self.rule_color.0,
            self.rule_color.1,
            self.rule_color.2,
        ));
        header.draw_line(
            vec![
                Position::new(Mm::from(0.0), Mm::from(RULE_OFFSET_MM)),
                Position::new(size.width, Mm::from(RULE_OFFSET_MM)),
            ],
            rule,
        );

        let mut footer = area.clone();
        footer.add_offset(Position::new(
            Mm::from(0.0),
            size.height - Mm::from(FOOTER_BAND_MM - FOOTER_TEXT_OFFSET_MM),
        ));
        self.render_text(
            context,
            footer,
            style,
            format!("Página {}", self.page),
            &self.footer_role,
            Alignment::Right,
        )?;

        area.add_offset(Position::new(0.0, HEADER_BAND_MM));
        area.set_height(size.height - Mm::from(HEADER_BAND_MM + FOOTER_BAND_MM));
        Ok(area)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::styling::Style;
    use crate::typography::Typography;

    #[test]
    fn test_unreadable_logo_is_skipped() {
        let t = Typography::derive(&Style::default());
        let letterhead = Letterhead::new(
            Path::new("/definitely/not/here.png"),
            "Universidad X",
            t.subtitle,
            t.footer,
            t.border,
        );
        assert!(!letterhead.has_logo());
    }

    /// A one-pixel RGB PNG.
    const PNG_PIXEL: &[u8] = &[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
        0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x02, 0x00, 0x00, 0x00, 0x90,
        0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9C, 0x63, 0x90,
        0x2A, 0x7E, 0x01, 0x00, 0x02, 0x20, 0x01, 0x76, 0x66, 0x36, 0xE2, 0xB5, 0x00, 0x00, 0x00,
        0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
    ];

    #[test]
    fn test_logo_is_decoded_up_front() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, PNG_PIXEL).unwrap();
        let t = Typography::derive(&Style::default());
        let letterhead = Letterhead::new(&path, "Universidad X", t.subtitle, t.footer, t.border);
        assert!(letterhead.has_logo());

        // The decoded image is kept, so the file is no longer needed while pages are drawn.
        fs::remove_file(&path).unwrap();
        assert!(letterhead.has_logo());
    }

    #[test]
    fn test_undecodable_logo_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"not an image").unwrap();
        let t = Typography::derive(&Style::default());
        let letterhead = Letterhead::new(&path, "Universidad X", t.subtitle, t.footer, t.border);
        assert!(!letterhead.has_logo());
    }
}
