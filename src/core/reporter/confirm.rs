//! Interactive yes/no confirmation of candidate pairs.

use crate::core::comparator::ScoredPair;
use crate::core::tools::PreviewComposer;
use crate::error::{ReportError, ToolError};
use console::Term;
use std::io::{self, BufRead, ErrorKind};
use std::sync::Arc;
use tempfile::{Builder, NamedTempFile};

const PROMPT: &str = "Are these the same images? [y/n] ";

/// Decides whether an above-threshold pair really is a duplicate
pub trait Confirmer {
    fn confirm(&mut self, pair: &ScoredPair) -> Result<bool, ReportError>;
}

impl<F> Confirmer for F
where
    F: FnMut(&ScoredPair) -> bool,
{
    fn confirm(&mut self, pair: &ScoredPair) -> Result<bool, ReportError> {
        Ok(self(pair))
    }
}

/// Asks on the terminal, optionally after opening a side-by-side preview
pub struct TerminalConfirmer {
    term: Term,
    input: Box<dyn BufRead>,
    preview: Option<Arc<dyn PreviewComposer>>,
    // Viewers open previews asynchronously, so the files outlive each prompt.
    previews: Vec<NamedTempFile>,
}

impl TerminalConfirmer {
    pub fn new(term: Term) -> Self {
        Self {
            term,
            input: Box::new(io::stdin().lock()),
            preview: None,
            previews: Vec::new(),
        }
    }

    /// Read answers from `input` instead of stdin
    pub fn with_input(mut self, input: impl BufRead + 'static) -> Self {
        self.input = Box::new(input);
        self
    }

    pub fn with_preview(mut self, composer: Arc<dyn PreviewComposer>) -> Self {
        self.preview = Some(composer);
        self
    }

    fn show_preview(&mut self, pair: &ScoredPair) -> Result<(), ReportError> {
        let Some(composer) = &self.preview else {
            return Ok(());
        };

        let file = Builder::new()
            .prefix("preview-")
            .suffix(".jpg")
            .tempfile()
            .map_err(|source| {
                ReportError::Preview(ToolError::Io {
                    path: pair.first.clone(),
                    source,
                })
            })?;
        composer
            .compose(&pair.first, &pair.second, file.path())
            .map_err(ReportError::Preview)?;
        composer.show(file.path()).map_err(ReportError::Preview)?;
        self.previews.push(file);
        Ok(())
    }
}

impl Confirmer for TerminalConfirmer {
    fn confirm(&mut self, pair: &ScoredPair) -> Result<bool, ReportError> {
        self.show_preview(pair)?;

        loop {
            self.term.write_str(PROMPT).map_err(ReportError::Prompt)?;
            let mut answer = String::new();
            let read = self
                .input
                .read_line(&mut answer)
                .map_err(ReportError::Prompt)?;
            if read == 0 {
                return Err(ReportError::Prompt(io::Error::new(
                    ErrorKind::UnexpectedEof,
                    "input closed before an answer was given",
                )));
            }
            if let Some(decision) = parse_answer(&answer) {
                return Ok(decision);
            }
        }
    }
}

/// `y` or `n`, ignoring surrounding whitespace and case
fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" => Some(true),
        "n" => Some(false),
        _ => None,
    }
}
