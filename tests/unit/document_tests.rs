/*!
 * Tests for run extraction, pairing and document writing
 */

use std::fs;

use anyhow::Result;
use docx_translate::document::{
    DocxWriter, ExtractedDocument, FormatDescriptor, FormatSlot, OutputRun, ParagraphLayout, RgbColor, TextRun,
    pair_blocks, read_docx, write_docx,
};
use docx_translate::errors::DocumentError;

use crate::common::{self, SAMPLE_TEXTS};

fn bold_slots(n: usize) -> Vec<FormatSlot> {
    (0..n)
        .map(|i| FormatSlot {
            format: FormatDescriptor {
                bold: Some(true),
                font_size_pt: Some(10.0 + i as f64),
                ..Default::default()
            },
            paragraph: Some(i),
        })
        .collect()
}

#[test]
fn test_readDocx_withSampleDocument_shouldExtractRunsInOrder() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = common::write_sample_docx(dir.path())?;

    let document = read_docx(&path)?;

    assert_eq!(document.texts(), SAMPLE_TEXTS.to_vec());
    assert_eq!(document.paragraph_count(), 2);

    let heading = &document.runs[0].format;
    assert_eq!(heading.bold, Some(true));
    assert_eq!(heading.font_name.as_deref(), Some("Arial"));
    assert_eq!(heading.font_size_pt, Some(16.0));
    assert_eq!(heading.font_color, RgbColor::from_hex("C00000"));
    assert_eq!(document.runs[1].format.italic, Some(true));
    assert_eq!(document.runs[2].format.underline, Some(true));
    Ok(())
}

#[test]
fn test_readDocx_withMissingFile_shouldFailToOpen() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let result = read_docx(dir.path().join("missing.docx"));
    assert!(matches!(result, Err(DocumentError::Open { .. })));
    Ok(())
}

#[test]
fn test_readDocx_withPlainTextFile_shouldFailAsZip() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("notes.docx");
    fs::write(&path, "just some text")?;

    assert!(matches!(read_docx(&path), Err(DocumentError::Zip(_))));
    Ok(())
}

#[test]
fn test_pairBlocks_withMoreSlotsThanBlocks_shouldTruncateToBlocks() {
    let runs = pair_blocks(&["a", "b", "c"], &bold_slots(5));

    assert_eq!(runs.len(), 3);
    assert_eq!(runs[2].text, "c");
    assert_eq!(runs[2].format.font_size_pt, Some(12.0));
    assert_eq!(runs[2].paragraph, Some(2));
}

#[test]
fn test_pairBlocks_withMoreBlocksThanSlots_shouldDropExtraBlocks() {
    let runs = pair_blocks(&["a", "b", "c", "d", "e"], &bold_slots(3));

    assert_eq!(runs.len(), 3);
    assert_eq!(runs.iter().map(|r| r.text.as_str()).collect::<Vec<_>>(), vec!["a", "b", "c"]);
}

#[test]
fn test_formatDescriptor_display_shouldListSetAttributes() {
    let format = FormatDescriptor {
        bold: Some(true),
        font_size_pt: Some(11.5),
        font_color: Some(RgbColor::new(255, 0, 0)),
        ..Default::default()
    };

    assert_eq!(format.to_string(), "bold=true, size=11.5pt, color=#FF0000");
    assert_eq!(FormatDescriptor::default().to_string(), "(default)");
}

#[test]
fn test_writeDocx_thenRead_shouldKeepTextAndFormatting() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let source = read_docx(common::write_sample_docx(dir.path())?)?;
    let translated = ["Šviesolaidžiai", "Šviesolaidinės sistemos <susideda> iš trijų & dalių...", "Labas!\tAr\nspausdina?"];
    let runs = pair_blocks(&translated, &source.slots());
    let out = dir.path().join("nested").join("out.docx");

    let written = write_docx(&out, &runs, ParagraphLayout::Preserve)?;

    assert_eq!(written, 3);
    let reread = read_docx(&out)?;
    assert_eq!(reread.texts(), translated.to_vec());
    assert_eq!(reread.slots(), source.slots());
    Ok(())
}

#[test]
fn test_writer_withOnePerRunLayout_shouldPlaceEachRunInOwnParagraph() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let runs: Vec<OutputRun> = ["one", "two", "three"]
        .iter()
        .map(|text| OutputRun {
            text: text.to_string(),
            format: FormatDescriptor::default(),
            paragraph: Some(0),
        })
        .collect();

    let path = dir.path().join("flat.docx");
    DocxWriter::new(ParagraphLayout::OnePerRun).write(&path, &runs)?;
    assert_eq!(read_docx(&path)?.paragraph_count(), 3);

    DocxWriter::default().write(&path, &runs)?;
    assert_eq!(read_docx(&path)?.paragraph_count(), 1);
    Ok(())
}

#[test]
fn test_writer_shouldReplaceExistingFile() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let path = dir.path().join("out.docx");
    fs::write(&path, b"old contents")?;
    let runs = vec![OutputRun {
        text: "new".to_string(),
        format: FormatDescriptor::default(),
        paragraph: None,
    }];

    DocxWriter::default().write(&path, &runs)?;

    assert_eq!(read_docx(&path)?.texts(), vec!["new"]);
    Ok(())
}

#[test]
fn test_extractedDocument_paragraphCount_shouldCountRunsWithoutParagraphSeparately() {
    let document = ExtractedDocument::new(vec![
        TextRun::new("a", FormatDescriptor::default()).in_paragraph(0),
        TextRun::new("b", FormatDescriptor::default()).in_paragraph(0),
        TextRun::new("c", FormatDescriptor::default()),
        TextRun::new("d", FormatDescriptor::default()),
        TextRun::new("e", FormatDescriptor::default()).in_paragraph(3),
    ]);

    assert_eq!(document.paragraph_count(), 4);
}
