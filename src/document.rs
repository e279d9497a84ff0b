//! Lecture document assembly.
//!
//! Builds a minimal WordprocessingML package (`.docx`) for one theme:
//! optional illustration, bold centered title, localized month line,
//! italic teaser, body paragraphs, and a branded footer. Only the parts
//! Word needs to open the file are written.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::CompressionMethod;

use crate::images::ThemeImage;
use crate::models::{Language, ThemeRecord};

const NS_W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_WP: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_PIC: &str = "http://schemas.openxmlformats.org/drawingml/2006/picture";

/// Image width on the page: 6 inches in EMU.
pub const IMAGE_WIDTH_EMU: u64 = 6 * 914_400;
/// 1 inch page margins, in twentieths of a point.
const MARGIN_TWIPS: &str = "1440";

const TITLE_HALF_POINTS: &str = "48";
const FOOTER_HALF_POINTS: &str = "16";

const FOOTER_REL_ID: &str = "rIdFooter1";
const IMAGE_REL_ID: &str = "rIdImage1";

const DEFAULT_TEXT_EN: &str = "The algorithm of your soul is the invisible pattern that shapes your thoughts, behaviors, and perceptions. Just as digital algorithms influence what you see online, internal algorithms determine how you experience life.";
const DEFAULT_TEXT_PT: &str = "O algoritmo da sua alma é o padrão invisível que molda seus pensamentos, comportamentos e percepções. Assim como os algoritmos digitais influenciam o que você vê online, os algoritmos internos determinam como você experimenta a vida.";

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n\s*\n").unwrap_or_else(|e| panic!("paragraph regex: {e}")));
static OUTLINE_POINT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-•*]\s|\d+\.\s)").unwrap_or_else(|e| panic!("outline regex: {e}"))
});

/// Title shown when a theme has none.
pub fn placeholder_title(language: Language) -> &'static str {
    match language {
        Language::English => "Theme Title",
        Language::Portuguese => "Título do Tema",
    }
}

fn default_text(language: Language) -> &'static str {
    match language {
        Language::English => DEFAULT_TEXT_EN,
        Language::Portuguese => DEFAULT_TEXT_PT,
    }
}

/// `MONTH YYYY`, upper-cased, month localized.
pub fn date_line(language: Language, date: NaiveDate) -> String {
    format!("{} {}", language.month_name(date.month()), date.year()).to_uppercase()
}

/// Split full text into body paragraphs. Blank chunks and outline points
/// (`- `, `• `, `* `, `1. `) are dropped.
pub fn body_paragraphs(full_text: &str) -> Vec<String> {
    PARAGRAPH_BREAK
        .split(full_text)
        .map(str::trim)
        .filter(|p| !p.is_empty() && !OUTLINE_POINT.is_match(p))
        .map(str::to_string)
        .collect()
}

/// Rendered height for an image scaled to [`IMAGE_WIDTH_EMU`].
fn image_height_emu(image: &ThemeImage) -> u64 {
    if image.width == 0 {
        return IMAGE_WIDTH_EMU / 2;
    }
    IMAGE_WIDTH_EMU * u64::from(image.height) / u64::from(image.width)
}

/// Paragraph alignment and run formatting.
#[derive(Default, Clone, Copy)]
struct Style {
    centered: bool,
    bold: bool,
    italic: bool,
    size: Option<&'static str>,
}

struct XmlPart {
    writer: Writer<Vec<u8>>,
}

impl XmlPart {
    fn new() -> Result<Self> {
        let mut writer = Writer::new(Vec::new());
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
        Ok(Self { writer })
    }

    fn open(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Start(start))?;
        Ok(())
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<()> {
        let mut start = BytesStart::new(name);
        for attr in attrs {
            start.push_attribute(*attr);
        }
        self.writer.write_event(Event::Empty(start))?;
        Ok(())
    }

    fn paragraph(&mut self, text: &str, style: Style) -> Result<()> {
        self.open("w:p", &[])?;
        if style.centered {
            self.open("w:pPr", &[])?;
            self.empty("w:jc", &[("w:val", "center")])?;
            self.close("w:pPr")?;
        }
        if !text.is_empty() {
            self.open("w:r", &[])?;
            if style.bold || style.italic || style.size.is_some() {
                self.open("w:rPr", &[])?;
                if style.bold {
                    self.empty("w:b", &[])?;
                }
                if style.italic {
                    self.empty("w:i", &[])?;
                }
                if let Some(size) = style.size {
                    self.empty("w:sz", &[("w:val", size)])?;
                }
                self.close("w:rPr")?;
            }
            self.open("w:t", &[("xml:space", "preserve")])?;
            self.writer.write_event(Event::Text(BytesText::new(text)))?;
            self.close("w:t")?;
            self.close("w:r")?;
        }
        self.close("w:p")
    }

    fn blank(&mut self) -> Result<()> {
        self.paragraph("", Style::default())
    }

    fn picture(&mut self, image: &ThemeImage) -> Result<()> {
        let cx = IMAGE_WIDTH_EMU.to_string();
        let cy = image_height_emu(image).to_string();

        self.open("w:p", &[])?;
        self.open("w:pPr", &[])?;
        self.empty("w:jc", &[("w:val", "center")])?;
        self.close("w:pPr")?;
        self.open("w:r", &[])?;
        self.open("w:drawing", &[])?;
        self.open(
            "wp:inline",
            &[("distT", "0"), ("distB", "0"), ("distL", "0"), ("distR", "0")],
        )?;
        self.empty("wp:extent", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        self.empty("wp:docPr", &[("id", "1"), ("name", "Picture 1")])?;
        self.open("a:graphic", &[("xmlns:a", NS_A)])?;
        self.open("a:graphicData", &[("uri", NS_PIC)])?;
        self.open("pic:pic", &[("xmlns:pic", NS_PIC)])?;

        self.open("pic:nvPicPr", &[])?;
        self.empty("pic:cNvPr", &[("id", "0"), ("name", "image1.jpeg")])?;
        self.empty("pic:cNvPicPr", &[])?;
        self.close("pic:nvPicPr")?;

        self.open("pic:blipFill", &[])?;
        self.empty("a:blip", &[("r:embed", IMAGE_REL_ID)])?;
        self.open("a:stretch", &[])?;
        self.empty("a:fillRect", &[])?;
        self.close("a:stretch")?;
        self.close("pic:blipFill")?;

        self.open("pic:spPr", &[])?;
        self.open("a:xfrm", &[])?;
        self.empty("a:off", &[("x", "0"), ("y", "0")])?;
        self.empty("a:ext", &[("cx", cx.as_str()), ("cy", cy.as_str())])?;
        self.close("a:xfrm")?;
        self.open("a:prstGeom", &[("prst", "rect")])?;
        self.empty("a:avLst", &[])?;
        self.close("a:prstGeom")?;
        self.close("pic:spPr")?;

        self.close("pic:pic")?;
        self.close("a:graphicData")?;
        self.close("a:graphic")?;
        self.close("wp:inline")?;
        self.close("w:drawing")?;
        self.close("w:r")?;
        self.close("w:p")
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner()
    }
}

fn document_xml(
    theme: &ThemeRecord,
    language: Language,
    image: Option<&ThemeImage>,
    date: NaiveDate,
) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.open(
        "w:document",
        &[
            ("xmlns:w", NS_W),
            ("xmlns:r", NS_R),
            ("xmlns:wp", NS_WP),
        ],
    )?;
    xml.open("w:body", &[])?;

    if let Some(image) = image {
        xml.picture(image)?;
        xml.blank()?;
    }

    let title = theme.title().unwrap_or_else(|| placeholder_title(language));
    xml.paragraph(
        title,
        Style {
            centered: true,
            bold: true,
            size: Some(TITLE_HALF_POINTS),
            ..Default::default()
        },
    )?;
    xml.paragraph(
        &date_line(language, date),
        Style {
            centered: true,
            bold: true,
            ..Default::default()
        },
    )?;

    let teaser = theme.teaser.as_deref().unwrap_or("");
    if !teaser.is_empty() {
        xml.blank()?;
        xml.paragraph(
            teaser,
            Style {
                centered: true,
                italic: true,
                ..Default::default()
            },
        )?;
    }

    xml.blank()?;
    let full_text = theme
        .full_text
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| default_text(language));
    for paragraph in body_paragraphs(full_text) {
        xml.paragraph(&paragraph, Style::default())?;
    }

    xml.open("w:sectPr", &[])?;
    xml.empty(
        "w:footerReference",
        &[("w:type", "default"), ("r:id", FOOTER_REL_ID)],
    )?;
    xml.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    xml.empty(
        "w:pgMar",
        &[
            ("w:top", MARGIN_TWIPS),
            ("w:right", MARGIN_TWIPS),
            ("w:bottom", MARGIN_TWIPS),
            ("w:left", MARGIN_TWIPS),
            ("w:header", "720"),
            ("w:footer", "720"),
            ("w:gutter", "0"),
        ],
    )?;
    xml.close("w:sectPr")?;

    xml.close("w:body")?;
    xml.close("w:document")?;
    Ok(xml.finish())
}

fn footer_xml(branding: &str) -> Result<Vec<u8>> {
    let mut xml = XmlPart::new()?;
    xml.open("w:ftr", &[("xmlns:w", NS_W)])?;
    xml.paragraph(
        branding,
        Style {
            centered: true,
            size: Some(FOOTER_HALF_POINTS),
            ..Default::default()
        },
    )?;
    xml.close("w:ftr")?;
    Ok(xml.finish())
}

fn content_types(has_image: bool) -> String {
    let jpeg = if has_image {
        r#"<Default Extension="jpeg" ContentType="image/jpeg"/>"#
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{jpeg}<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/footer1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml"/></Types>"#
    )
}

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

fn document_rels(has_image: bool) -> String {
    let image = if has_image {
        format!(
            r#"<Relationship Id="{IMAGE_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/image" Target="media/image1.jpeg"/>"#
        )
    } else {
        String::new()
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="{FOOTER_REL_ID}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer" Target="footer1.xml"/>{image}</Relationships>"#
    )
}

/// Assemble one theme into `.docx` bytes.
pub fn assemble(
    theme: &ThemeRecord,
    language: Language,
    image: Option<&ThemeImage>,
    date: NaiveDate,
    branding: &str,
) -> Result<Vec<u8>> {
    let has_image = image.is_some();
    let document = document_xml(theme, language, image, date)?;
    let footer = footer_xml(branding)?;

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut parts: Vec<(&str, &[u8])> = Vec::new();
    let content_types = content_types(has_image);
    let document_rels = document_rels(has_image);
    parts.push(("[Content_Types].xml", content_types.as_bytes()));
    parts.push(("_rels/.rels", PACKAGE_RELS.as_bytes()));
    parts.push(("word/document.xml", document.as_slice()));
    parts.push(("word/_rels/document.xml.rels", document_rels.as_bytes()));
    parts.push(("word/footer1.xml", footer.as_slice()));
    if let Some(image) = image {
        parts.push(("word/media/image1.jpeg", image.jpeg.as_slice()));
    }

    for (name, bytes) in parts {
        zip.start_file(name, options)
            .with_context(|| format!("Failed to add {} to document", name))?;
        zip.write_all(bytes)?;
    }

    let cursor = zip.finish().context("Failed to finish document")?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(docx: &[u8], name: &str) -> Option<String> {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut file = archive.by_name(name).ok()?;
        let mut out = String::new();
        file.read_to_string(&mut out).unwrap();
        Some(out)
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn body_paragraphs_drop_outline_points() {
        let text = "First idea.\n\n- a bullet\n\n  \n\n2. numbered step\n\nSecond idea.\n  \n• dot\n\n*emphasis* stays";
        assert_eq!(
            body_paragraphs(text),
            vec!["First idea.", "Second idea.", "*emphasis* stays"]
        );
    }

    #[test]
    fn date_line_is_localized_and_upper_case() {
        assert_eq!(date_line(Language::English, march()), "MARCH 2026");
        assert_eq!(date_line(Language::Portuguese, march()), "MARÇO 2026");
    }

    #[test]
    fn assembles_title_date_teaser_body_and_footer() {
        let theme = ThemeRecord {
            title: Some("Silence & Light".to_string()),
            teaser: Some("Find the quiet.".to_string()),
            full_text: Some("Para one.\n\nPara two.".to_string()),
            ..Default::default()
        };
        let docx = assemble(&theme, Language::English, None, march(), "BRAND").unwrap();

        let document = read_part(&docx, "word/document.xml").unwrap();
        assert!(document.contains("Silence &amp; Light"));
        assert!(document.contains("MARCH 2026"));
        assert!(document.contains("<w:i/>"));
        assert!(document.contains("<w:sz w:val=\"48\"/>"));
        let title_at = document.find("Silence").unwrap();
        let date_at = document.find("MARCH 2026").unwrap();
        let teaser_at = document.find("Find the quiet.").unwrap();
        let body_at = document.find("Para one.").unwrap();
        assert!(title_at < date_at && date_at < teaser_at && teaser_at < body_at);
        assert!(document.contains("Para two."));
        assert!(!document.contains("w:drawing"));

        let footer = read_part(&docx, "word/footer1.xml").unwrap();
        assert!(footer.contains("BRAND"));
        assert!(footer.contains("<w:sz w:val=\"16\"/>"));
        assert!(read_part(&docx, "word/media/image1.jpeg").is_none());
        assert!(!read_part(&docx, "[Content_Types].xml").unwrap().contains("jpeg"));
    }

    #[test]
    fn missing_fields_use_localized_defaults() {
        let docx = assemble(
            &ThemeRecord::default(),
            Language::Portuguese,
            None,
            march(),
            "BRAND",
        )
        .unwrap();
        let document = read_part(&docx, "word/document.xml").unwrap();
        assert!(document.contains("Título do Tema"));
        assert!(document.contains("O algoritmo da sua alma"));
        assert!(!document.contains("<w:i/>"));
    }

    #[test]
    fn image_is_embedded_at_six_inches() {
        let image = ThemeImage {
            jpeg: vec![0xFF, 0xD8, 0xFF, 0xD9],
            width: 1200,
            height: 600,
        };
        let theme = ThemeRecord::from_title("Pictured");
        let docx = assemble(&theme, Language::English, Some(&image), march(), "B").unwrap();

        let document = read_part(&docx, "word/document.xml").unwrap();
        assert!(document.contains(r#"<wp:extent cx="5486400" cy="2743200"/>"#));
        assert!(document.find("w:drawing").unwrap() < document.find("Pictured").unwrap());
        let rels = read_part(&docx, "word/_rels/document.xml.rels").unwrap();
        assert!(rels.contains("media/image1.jpeg"));

        let mut archive = zip::ZipArchive::new(Cursor::new(docx.as_slice())).unwrap();
        let mut media = Vec::new();
        archive
            .by_name("word/media/image1.jpeg")
            .unwrap()
            .read_to_end(&mut media)
            .unwrap();
        assert_eq!(media, image.jpeg);
    }
}
