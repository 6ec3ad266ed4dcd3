/*!
 * Common test utilities for the docx-translate test suite
 */

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use docx_translate::app_config::Config;
use docx_translate::app_controller::Controller;
use docx_translate::confirmation::{ConfirmationProvider, ScriptedConfirmation};
use docx_translate::document::reader::W_NS;
use docx_translate::providers::mock::MockProvider;
use docx_translate::secrets::StaticSecretStore;
use docx_translate::translation::PriceList;

/// Texts used throughout the pipeline tests
pub const SAMPLE_TEXTS: [&str; 3] = [
    "Fiber Optics",
    "Fiber optic systems consist of three main components...",
    "Hello! Is this printing?",
];

/// Initialize env_logger once for tests that want log output
pub fn init_test_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// One `w:r` element with optional run properties
pub fn run_xml(text: &str, properties: &str) -> String {
    let props = if properties.is_empty() {
        String::new()
    } else {
        format!("<w:rPr>{}</w:rPr>", properties)
    };
    format!(r#"<w:r>{}<w:t xml:space="preserve">{}</w:t></w:r>"#, props, text)
}

/// One `w:p` element containing the given runs
pub fn paragraph_xml(runs: &[String]) -> String {
    format!("<w:p>{}</w:p>", runs.concat())
}

/// Write a minimal `.docx` whose body is `body_xml`
pub fn write_docx_fixture(path: &Path, body_xml: &str) -> Result<PathBuf> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="{}"><w:body>{}</w:body></w:document>"#,
        W_NS, body_xml
    );

    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default();
    zip.start_file("[Content_Types].xml", options)?;
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#)?;
    zip.start_file("word/document.xml", options)?;
    zip.write_all(document.as_bytes())?;
    zip.finish()?;

    Ok(path.to_path_buf())
}

/// Sample document: a bold red heading paragraph, then two plain runs in one paragraph
pub fn write_sample_docx(dir: &Path) -> Result<PathBuf> {
    let body = [
        paragraph_xml(&[run_xml(
            SAMPLE_TEXTS[0],
            r#"<w:rFonts w:ascii="Arial"/><w:b/><w:color w:val="C00000"/><w:sz w:val="32"/>"#,
        )]),
        paragraph_xml(&[
            run_xml(SAMPLE_TEXTS[1], r#"<w:i/>"#),
            run_xml(SAMPLE_TEXTS[2], r#"<w:u w:val="single"/>"#),
        ]),
    ]
    .concat();
    write_docx_fixture(&dir.join("sample.docx"), &body)
}

/// Document with `n` plain runs, one per paragraph
pub fn write_numbered_docx(dir: &Path, n: usize) -> Result<PathBuf> {
    let body: String = (0..n)
        .map(|i| paragraph_xml(&[run_xml(&format!("Block {}", i), "")]))
        .collect();
    write_docx_fixture(&dir.join(format!("numbered_{}.docx", n)), &body)
}

/// Confirmation provider whose answers and transcript are visible to the test
#[derive(Debug, Clone)]
pub struct SharedConfirmation(pub Arc<ScriptedConfirmation>);

impl SharedConfirmation {
    pub fn new(answers: &[&str]) -> Self {
        Self(Arc::new(ScriptedConfirmation::new(answers.iter().copied())))
    }
}

impl ConfirmationProvider for SharedConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        self.0.confirm(prompt)
    }

    fn present(&self, text: &str) {
        self.0.present(text)
    }
}

/// Controller wired to a mock provider, a static API key and scripted answers
pub struct TestHarness {
    pub controller: Controller<MockProvider>,
    pub provider: MockProvider,
    pub confirmation: SharedConfirmation,
}

impl TestHarness {
    pub fn new(config: Config, provider: MockProvider, answers: &[&str]) -> Self {
        Self::with_secrets(
            config,
            provider,
            answers,
            StaticSecretStore::new().with("openai_api_key", "sk-test"),
        )
    }

    pub fn with_secrets(config: Config, provider: MockProvider, answers: &[&str], secrets: StaticSecretStore) -> Self {
        let confirmation = SharedConfirmation::new(answers);
        let connected = provider.clone();
        let controller = Controller::new(
            config,
            PriceList::builtin().expect("built-in price list"),
            Box::new(move |_api_key: &str| connected.clone()),
            Box::new(secrets),
            Box::new(confirmation.clone()),
        );
        Self {
            controller,
            provider,
            confirmation,
        }
    }
}

/// Default configuration writing into `dir`, with fast retries
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.document.output_dir = dir.join("output");
    config.translation.common.retry_backoff_ms = 1;
    config.translation.common.timeout_secs = 5;
    config
}
