//! Run orchestration for xyprompt: list resolution, the X × Y query loop,
//! and rendering.
//!
//! This crate has no terminal or clipboard dependencies; hosts supply a
//! [`LanguageModel`], a [`present::Presenter`], and optionally a
//! [`clipboard::Clipboard`].

pub mod clipboard;
pub mod present;
pub mod resolver;
pub mod runner;
pub mod session;

mod error;
#[cfg(test)]
mod test_support;

pub use error::RunError;
pub use session::{RunSettings, RunSummary, execute, require_api_key};

// Re-export from crates for public API
pub use xyprompt_providers::{
    self, BackendError, GeminiClient, LanguageModel, RawListResponse,
};
pub use xyprompt_types::{
    ApiKey, CombinationResult, ListMode, ListSide, ModelName, ModelParseError, NonEmptyString,
    PlaceholderStyle, QueryTemplate, RunProgress, TopicList,
};
