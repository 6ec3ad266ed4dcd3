/*!
 * Run extraction from `.docx` containers.
 *
 * Only body-level paragraphs and their direct runs are visited, in document
 * order. Every run becomes one slot, including runs whose text is empty, so
 * the slot list can be matched back positionally after translation.
 */

use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use log::debug;
use roxmltree::{Document, Node};

use crate::errors::DocumentError;

use super::model::{ExtractedDocument, FormatDescriptor, RgbColor, TextRun};

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Location of the main document part inside the container
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Read all text runs of the document at `path`
pub fn read_docx<P: AsRef<Path>>(path: P) -> Result<ExtractedDocument, DocumentError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| DocumentError::Open {
        path: path.to_path_buf(),
        source,
    })?;
    let document = read_from(file)?;
    debug!("Extracted {} runs from {:?}", document.len(), path);
    Ok(document)
}

/// Read all text runs from any seekable `.docx` byte source
pub fn read_from<R: Read + Seek>(reader: R) -> Result<ExtractedDocument, DocumentError> {
    let mut archive = zip::ZipArchive::new(reader)?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|_| DocumentError::MissingPart(DOCUMENT_PART.to_string()))?;

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| DocumentError::Xml(e.to_string()))?;

    extract_runs(&xml)
}

/// Extract runs from the XML of a main document part
pub fn extract_runs(xml: &str) -> Result<ExtractedDocument, DocumentError> {
    let doc = Document::parse(xml)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| n.has_tag_name((W_NS, "body")))
        .ok_or_else(|| DocumentError::Xml("document has no w:body".to_string()))?;

    let runs = body
        .children()
        .filter(|n| n.has_tag_name((W_NS, "p")))
        .enumerate()
        .flat_map(|(index, paragraph)| {
            paragraph
                .children()
                .filter(|n| n.has_tag_name((W_NS, "r")))
                .map(move |run| TextRun {
                    text: run_text(run),
                    format: run_format(run),
                    paragraph: Some(index),
                })
        })
        .collect();

    Ok(ExtractedDocument::new(runs))
}

fn run_text(run: Node<'_, '_>) -> String {
    let mut text = String::new();
    for child in run.children().filter(|n| n.is_element()) {
        if child.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        match child.tag_name().name() {
            "t" => text.push_str(child.text().unwrap_or_default()),
            "tab" => text.push('\t'),
            "br" | "cr" => text.push('\n'),
            "noBreakHyphen" => text.push('-'),
            _ => {}
        }
    }
    text
}

fn run_format(run: Node<'_, '_>) -> FormatDescriptor {
    let Some(props) = run.children().find(|n| n.has_tag_name((W_NS, "rPr"))) else {
        return FormatDescriptor::default();
    };

    let mut format = FormatDescriptor::default();
    for prop in props.children().filter(|n| n.is_element()) {
        if prop.tag_name().namespace() != Some(W_NS) {
            continue;
        }
        let val = prop.attribute((W_NS, "val"));
        match prop.tag_name().name() {
            "b" => format.bold = Some(toggle(val)),
            "i" => format.italic = Some(toggle(val)),
            "u" => format.underline = Some(!matches!(val, Some("none"))),
            "rFonts" => {
                format.font_name = prop
                    .attribute((W_NS, "ascii"))
                    .or_else(|| prop.attribute((W_NS, "hAnsi")))
                    .map(str::to_string);
            }
            "sz" => {
                // Half-points
                format.font_size_pt = val.and_then(|v| v.parse::<f64>().ok()).map(|half| half / 2.0);
            }
            "color" => format.font_color = val.and_then(RgbColor::from_hex),
            _ => {}
        }
    }
    format
}

/// On/off property: absent `w:val` means on
fn toggle(val: Option<&str>) -> bool {
    !matches!(val, Some("0") | Some("false") | Some("off"))
}
