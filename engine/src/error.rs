use thiserror::Error;
use xyprompt_providers::BackendError;
use xyprompt_types::ListSide;

/// Reasons a run stops early.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(
        "Gemini API key is missing: pass --api-key, set GEMINI_API_KEY, or add [api_keys] google to the config"
    )]
    MissingCredential,
    #[error("{0}_list is empty; check the list settings")]
    EmptyList(ListSide),
    #[error("backend call failed: {0}")]
    Backend(#[from] BackendError),
    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),
}
