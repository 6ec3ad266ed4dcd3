/*!
 * Document model for run-level translation.
 *
 * A document is reduced to an ordered list of text runs, each carrying the
 * subset of character formatting that survives the round trip. Position in
 * the list is the only link between a run, its block in the packed request,
 * and its block in the model response.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

/// An RGB text colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a six digit hex value such as `FF0000` (a leading `#` is accepted)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Uppercase hex without `#`, as stored in WordprocessingML
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

/// Preserved character formatting.
///
/// Every attribute is optional: `None` means the run inherits whatever the
/// style or application default is, while `Some(false)` explicitly switches
/// a toggle off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub font_name: Option<String>,
    pub font_size_pt: Option<f64>,
    pub font_color: Option<RgbColor>,
}

impl FormatDescriptor {
    /// True when no attribute is set
    pub fn is_plain(&self) -> bool {
        *self == Self::default()
    }
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        for (name, value) in [("bold", self.bold), ("italic", self.italic), ("underline", self.underline)] {
            if let Some(value) = value {
                parts.push(format!("{}={}", name, value));
            }
        }
        if let Some(font) = &self.font_name {
            parts.push(format!("font={}", font));
        }
        if let Some(size) = self.font_size_pt {
            parts.push(format!("size={}pt", size));
        }
        if let Some(color) = self.font_color {
            parts.push(format!("color={}", color));
        }
        if parts.is_empty() {
            f.write_str("(default)")
        } else {
            f.write_str(&parts.join(", "))
        }
    }
}

/// One uniformly formatted piece of source text
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    pub format: FormatDescriptor,
    /// Index of the source paragraph, when known
    pub paragraph: Option<usize>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, format: FormatDescriptor) -> Self {
        Self {
            text: text.into(),
            format,
            paragraph: None,
        }
    }

    pub fn in_paragraph(mut self, paragraph: usize) -> Self {
        self.paragraph = Some(paragraph);
        self
    }
}

/// Formatting slot kept aside while the text travels through the model
#[derive(Debug, Clone, PartialEq)]
pub struct FormatSlot {
    pub format: FormatDescriptor,
    pub paragraph: Option<usize>,
}

/// Runs of a source document, in document order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    pub runs: Vec<TextRun>,
}

impl ExtractedDocument {
    pub fn new(runs: Vec<TextRun>) -> Self {
        Self { runs }
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    /// Run texts, index-aligned with [`Self::slots`]
    pub fn texts(&self) -> Vec<&str> {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Formatting slots, index-aligned with [`Self::texts`]
    pub fn slots(&self) -> Vec<FormatSlot> {
        self.runs
            .iter()
            .map(|r| FormatSlot {
                format: r.format.clone(),
                paragraph: r.paragraph,
            })
            .collect()
    }

    /// Number of distinct source paragraphs
    pub fn paragraph_count(&self) -> usize {
        let mut count = 0;
        let mut last = None;
        for run in &self.runs {
            if run.paragraph != last || run.paragraph.is_none() {
                count += 1;
                last = run.paragraph;
            }
        }
        count
    }
}

/// A translated block re-attached to its original formatting
#[derive(Debug, Clone, PartialEq)]
pub struct OutputRun {
    pub text: String,
    pub format: FormatDescriptor,
    pub paragraph: Option<usize>,
}

/// Pair blocks with formatting slots by index.
///
/// The result has `min(blocks.len(), slots.len())` entries; anything past
/// the shorter side is dropped.
pub fn pair_blocks<S: AsRef<str>>(blocks: &[S], slots: &[FormatSlot]) -> Vec<OutputRun> {
    blocks
        .iter()
        .zip(slots)
        .map(|(text, slot)| OutputRun {
            text: text.as_ref().to_string(),
            format: slot.format.clone(),
            paragraph: slot.paragraph,
        })
        .collect()
}
