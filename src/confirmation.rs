/*!
 * Operator confirmation.
 *
 * The pipeline asks the operator twice at most: before replacing an existing
 * output file, and whether to show the block comparison after a structural
 * mismatch. Both questions go through `ConfirmationProvider` so runs can be
 * automated (`--yes`, `--non-interactive`) and tested without a console.
 * Verbose dumps and the comparison table are shown through the same seam.
 */

use std::collections::VecDeque;
use std::fmt::Debug;
use std::io::{self, BufRead, Write};
use std::sync::Mutex;

use log::debug;
use tokio::runtime::{Handle, RuntimeFlavor};

/// Source of operator answers
pub trait ConfirmationProvider: Send + Sync + Debug {
    /// Ask a yes/no question; only an explicit yes returns `true`
    fn confirm(&self, prompt: &str) -> bool;

    /// Show diagnostic text to the operator
    fn present(&self, text: &str);
}

/// Whether an answer counts as yes
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}

/// Read one answer line; end of input or a read error counts as no
pub fn read_answer<R: BufRead>(mut reader: R) -> bool {
    let mut answer = String::new();
    match reader.read_line(&mut answer) {
        Ok(0) => false,
        Ok(_) => is_affirmative(&answer),
        Err(e) => {
            debug!("Failed to read answer: {}", e);
            false
        }
    }
}

/// Interactive prompts on stdin/stdout
#[derive(Debug, Default)]
pub struct ConsoleConfirmation;

impl ConfirmationProvider for ConsoleConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        let mut stdout = io::stdout();
        let _ = write!(stdout, "{} (y/n): ", prompt);
        let _ = stdout.flush();

        // The stdin read blocks; keep it off the async worker threads
        let read = || read_answer(io::stdin().lock());
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => tokio::task::block_in_place(read),
            _ => read(),
        }
    }

    fn present(&self, text: &str) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Answers every question with the same fixed answer without reading input
#[derive(Debug, Clone, Copy)]
pub struct FixedConfirmation {
    answer: bool,
}

impl FixedConfirmation {
    /// `--yes`: accept every prompt
    pub fn yes() -> Self {
        Self { answer: true }
    }

    /// `--non-interactive`: take the default (no) for every prompt
    pub fn no() -> Self {
        Self { answer: false }
    }
}

impl ConfirmationProvider for FixedConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        debug!("{} -> {}", prompt, if self.answer { "y" } else { "n" });
        self.answer
    }

    fn present(&self, text: &str) {
        let mut stdout = io::stdout();
        let _ = stdout.write_all(text.as_bytes());
        let _ = stdout.flush();
    }
}

/// Replays scripted answers and records everything it was asked or shown
#[derive(Debug, Default)]
pub struct ScriptedConfirmation {
    answers: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<String>>,
    presented: Mutex<Vec<String>>,
}

impl ScriptedConfirmation {
    /// Answers are consumed in order; once exhausted every prompt gets "n"
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
            presented: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn presented(&self) -> Vec<String> {
        self.presented.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl ConfirmationProvider for ScriptedConfirmation {
    fn confirm(&self, prompt: &str) -> bool {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        self.answers
            .lock()
            .ok()
            .and_then(|mut answers| answers.pop_front())
            .is_some_and(|answer| is_affirmative(&answer))
    }

    fn present(&self, text: &str) {
        if let Ok(mut presented) = self.presented.lock() {
            presented.push(text.to_string());
        }
    }
}
