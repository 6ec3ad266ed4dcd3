use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

// @module: File and directory utilities

/// Local file header signature of a zip container
const ZIP_MAGIC: [u8; 4] = *b"PK\x03\x04";

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @generates: Output path for a translated document
    // @params: input_file, output_dir, suffix
    //
    // The base name is everything before the first dot of the file name,
    // so `report.v2.docx` becomes `<output_dir>/report_translated.docx`.
    pub fn generate_output_path<P1: AsRef<Path>, P2: AsRef<Path>>(
        input_file: P1,
        output_dir: P2,
        suffix: &str,
    ) -> PathBuf {
        let input_file = input_file.as_ref();
        let file_name = input_file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let base = match file_name.split_once('.') {
            Some((base, _)) if !base.is_empty() => base.to_string(),
            _ => file_name,
        };

        output_dir.as_ref().join(format!("{}{}.docx", base, suffix))
    }

    /// Detect whether a file looks like a `.docx` container
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let mut header = [0u8; 4];
        let mut file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
        let is_zip = file.read_exact(&mut header).is_ok() && header == ZIP_MAGIC;

        let has_docx_ext = path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("docx"));

        Ok(match (is_zip, has_docx_ext) {
            (true, true) => FileType::Docx,
            (true, false) => FileType::Archive,
            _ => FileType::Unknown,
        })
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Word-processor document
    Docx,
    /// Some other zip container
    Archive,
    /// Unknown file type
    Unknown,
}
