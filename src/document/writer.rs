/*!
 * `.docx` writer for translated runs.
 *
 * Produces a minimal WordprocessingML package (content types, package
 * relationships and the main document part). Each output run gets a fresh
 * `w:r` with every defined attribute of its format applied; unset attributes
 * are omitted so the application default applies.
 *
 * The package is assembled in a temporary file next to the destination and
 * moved into place only once complete, so a failed write never leaves a
 * partial document behind.
 */

use std::io::{Seek, Write};
use std::path::Path;

use log::debug;
use tempfile::NamedTempFile;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::errors::DocumentError;

use super::model::{FormatDescriptor, OutputRun};
use super::reader::{DOCUMENT_PART, W_NS};

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// How output runs are grouped into paragraphs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphLayout {
    /// Every run in its own paragraph
    OnePerRun,
    /// Consecutive runs from the same source paragraph share one paragraph
    Preserve,
}

impl ParagraphLayout {
    pub fn from_preserve_flag(preserve: bool) -> Self {
        if preserve { Self::Preserve } else { Self::OnePerRun }
    }
}

/// Writer for translated documents
#[derive(Debug, Clone, Copy)]
pub struct DocxWriter {
    layout: ParagraphLayout,
}

impl Default for DocxWriter {
    fn default() -> Self {
        Self::new(ParagraphLayout::Preserve)
    }
}

impl DocxWriter {
    pub fn new(layout: ParagraphLayout) -> Self {
        Self { layout }
    }

    /// Write `runs` to `path`, replacing any existing file atomically.
    ///
    /// Returns the number of runs written.
    pub fn write<P: AsRef<Path>>(&self, path: P, runs: &[OutputRun]) -> Result<usize, DocumentError> {
        let path = path.as_ref();
        let write_error = |reason: String| DocumentError::Write {
            path: path.to_path_buf(),
            reason,
        };

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| write_error(e.to_string()))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| write_error(e.to_string()))?;
        self.write_package(temp.as_file_mut(), runs)
            .map_err(|e| write_error(e.to_string()))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| write_error(e.to_string()))?;
        temp.persist(path).map_err(|e| write_error(e.error.to_string()))?;

        debug!("Wrote {} runs to {:?}", runs.len(), path);
        Ok(runs.len())
    }

    /// Serialize the package into any seekable sink
    pub fn write_package<W: Write + Seek>(&self, sink: W, runs: &[OutputRun]) -> Result<(), DocumentError> {
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let mut zip = ZipWriter::new(sink);

        let parts = [
            ("[Content_Types].xml", CONTENT_TYPES.to_string()),
            ("_rels/.rels", PACKAGE_RELS.to_string()),
            (DOCUMENT_PART, self.document_xml(runs)),
        ];
        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes()).map_err(zip::result::ZipError::Io)?;
        }
        zip.finish()?;
        Ok(())
    }

    /// Render the main document part
    pub fn document_xml(&self, runs: &[OutputRun]) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push('\n');
        xml.push_str(&format!(r#"<w:document xmlns:w="{}"><w:body>"#, W_NS));

        for group in self.paragraphs(runs) {
            xml.push_str("<w:p>");
            for run in group {
                push_run(&mut xml, run);
            }
            xml.push_str("</w:p>");
        }

        xml.push_str("</w:body></w:document>");
        xml
    }

    fn paragraphs<'a>(&self, runs: &'a [OutputRun]) -> Vec<&'a [OutputRun]> {
        match self.layout {
            ParagraphLayout::OnePerRun => runs.chunks(1).collect(),
            ParagraphLayout::Preserve => runs
                .chunk_by(|a, b| a.paragraph.is_some() && a.paragraph == b.paragraph)
                .collect(),
        }
    }
}

/// Write already paired output runs to `path`
pub fn write_docx<P: AsRef<Path>>(path: P, runs: &[OutputRun], layout: ParagraphLayout) -> Result<usize, DocumentError> {
    DocxWriter::new(layout).write(path, runs)
}

fn push_run(xml: &mut String, run: &OutputRun) {
    xml.push_str("<w:r>");
    push_properties(xml, &run.format);

    let mut segment = String::new();
    for ch in run.text.chars() {
        match ch {
            '\n' | '\t' => {
                push_text(xml, &segment);
                segment.clear();
                xml.push_str(if ch == '\n' { "<w:br/>" } else { "<w:tab/>" });
            }
            _ => segment.push(ch),
        }
    }
    push_text(xml, &segment);
    xml.push_str("</w:r>");
}

fn push_text(xml: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    xml.push_str(r#"<w:t xml:space="preserve">"#);
    xml.push_str(&escape(text));
    xml.push_str("</w:t>");
}

fn push_properties(xml: &mut String, format: &FormatDescriptor) {
    if format.is_plain() {
        return;
    }

    xml.push_str("<w:rPr>");
    if let Some(font) = &format.font_name {
        let font = escape(font);
        xml.push_str(&format!(
            r#"<w:rFonts w:ascii="{0}" w:hAnsi="{0}" w:cs="{0}"/>"#,
            font
        ));
    }
    for (tag, value) in [("b", format.bold), ("i", format.italic)] {
        match value {
            Some(true) => xml.push_str(&format!("<w:{}/>", tag)),
            Some(false) => xml.push_str(&format!(r#"<w:{} w:val="0"/>"#, tag)),
            None => {}
        }
    }
    if let Some(color) = format.font_color {
        xml.push_str(&format!(r#"<w:color w:val="{}"/>"#, color.to_hex()));
    }
    if let Some(size) = format.font_size_pt {
        let half_points = (size * 2.0).round().max(1.0) as u32;
        xml.push_str(&format!(r#"<w:sz w:val="{}"/>"#, half_points));
    }
    if let Some(underline) = format.underline {
        let val = if underline { "single" } else { "none" };
        xml.push_str(&format!(r#"<w:u w:val="{}"/>"#, val));
    }
    xml.push_str("</w:rPr>");
}

/// Escape markup and drop characters XML 1.0 cannot carry
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\t' | '\n' | '\r' => out.push(ch),
            c if (c as u32) < 0x20 || c == '\u{FFFE}' || c == '\u{FFFF}' => {}
            c => out.push(c),
        }
    }
    out
}
