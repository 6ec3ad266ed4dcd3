/*!
 * Word-processor document handling.
 *
 * - `model`: runs, formatting descriptors and output pairing
 * - `reader`: extraction of runs from a `.docx` container
 * - `writer`: serialization of translated runs into a new `.docx`
 */

pub mod model;
pub mod reader;
pub mod writer;

pub use self::model::{ExtractedDocument, FormatDescriptor, FormatSlot, OutputRun, RgbColor, TextRun, pair_blocks};
pub use self::reader::{extract_runs, read_docx};
pub use self::writer::{DocxWriter, ParagraphLayout, write_docx};
