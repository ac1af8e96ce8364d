//! Copying answers to the system clipboard.
//!
//! The clipboard is an outside capability: the engine only needs "copy this
//! exact string, tell me if it worked", so hosts plug in their own
//! implementation and tests use an in-memory one.

use thiserror::Error;
use xyprompt_types::CombinationResult;

#[derive(Debug, Error)]
#[error("clipboard unavailable: {0}")]
pub struct ClipboardError(pub String);

pub trait Clipboard {
    fn set_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CopyOutcome {
    Copied,
    Failed(String),
}

impl CopyOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Copied => "Copied".to_string(),
            Self::Failed(reason) => format!("Copy failed: {reason}"),
        }
    }
}

/// Copies the answer of `result` verbatim.
pub fn copy_result(clipboard: &mut impl Clipboard, result: &CombinationResult) -> CopyOutcome {
    match clipboard.set_text(&result.answer) {
        Ok(()) => {
            tracing::debug!(id = %result.result_id(), "Copied answer to clipboard");
            CopyOutcome::Copied
        }
        Err(err) => {
            tracing::warn!(id = %result.result_id(), %err, "Clipboard copy failed");
            CopyOutcome::Failed(err.0)
        }
    }
}

/// Looks a result up by id (`copy_0_1`), also accepting the bare `0_1` or `0 1`.
#[must_use]
pub fn find_result<'a>(results: &'a [CombinationResult], id: &str) -> Option<&'a CombinationResult> {
    let id = id.trim();
    let id = id.strip_prefix('[').and_then(|s| s.strip_suffix(']')).unwrap_or(id);
    let id = id.strip_prefix("copy_").unwrap_or(id);
    let (x, y) = id.split_once(['_', ' '])?;
    let x_index: usize = x.trim().parse().ok()?;
    let y_index: usize = y.trim().parse().ok()?;
    results
        .iter()
        .find(|result| result.x_index == x_index && result.y_index == y_index)
}
