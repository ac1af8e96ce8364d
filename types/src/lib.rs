//! Core domain types for xyprompt.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

#![allow(clippy::missing_errors_doc)]

use serde::Deserialize;
use std::borrow::Cow;
use thiserror::Error;

// ============================================================================
// NonEmpty String Types
// ============================================================================

/// A trimmed string guaranteed to be non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("value must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    /// Trims `value` and rejects it when nothing is left.
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Err(EmptyStringError)
        } else if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Credential & Model Types
// ============================================================================

/// Environment variable consulted for the Gemini credential.
pub const API_KEY_ENV_VAR: &str = "GEMINI_API_KEY";

/// Gemini API key.
///
/// `Debug` is manually implemented to redact the key value, preventing accidental
/// credential disclosure in logs or error messages.
#[derive(Clone)]
pub struct ApiKey(String);

#[derive(Debug, Error)]
#[error("API key must not be empty")]
pub struct MissingApiKey;

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, MissingApiKey> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(MissingApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(<redacted>)")
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelParseError {
    #[error("model name cannot be empty")]
    Empty,
    #[error("model name contains {0:?}; use letters, digits, '-', '.' or '_'")]
    InvalidCharacter(char),
}

/// Gemini model identifier.
///
/// Any non-empty name is accepted so new models work without a release. The
/// name becomes a URL path segment, so it is limited to the characters Gemini
/// model ids use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelName(Cow<'static, str>);

impl ModelName {
    pub const DEFAULT: &'static str = "gemini-2.5-flash";

    pub fn parse(raw: &str) -> Result<Self, ModelParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ModelParseError::Empty);
        }
        if let Some(bad) = trimmed
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_')))
        {
            return Err(ModelParseError::InvalidCharacter(bad));
        }
        Ok(Self(Cow::Owned(trimmed.to_string())))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }
}

impl Default for ModelName {
    fn default() -> Self {
        Self(Cow::Borrowed(Self::DEFAULT))
    }
}

impl std::fmt::Display for ModelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

// ============================================================================
// Run Inputs
// ============================================================================

/// How the X and Y lists are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListMode {
    /// Ask the model for each list using a free-text prompt.
    #[default]
    Generated,
    /// Newline-separated lists typed by the user.
    Manual,
}

impl ListMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Generated => "generated",
            Self::Manual => "manual",
        }
    }
}

/// Which of the two lists a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSide {
    X,
    Y,
}

impl ListSide {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::X => "X",
            Self::Y => "Y",
        }
    }
}

impl std::fmt::Display for ListSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Topic Lists
// ============================================================================

/// Ordered list of non-empty, trimmed labels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicList(Vec<NonEmptyString>);

impl TopicList {
    /// Trims every item and drops the ones that end up empty.
    pub fn from_items<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(
            items
                .into_iter()
                .filter_map(|item| NonEmptyString::new(item).ok())
                .collect(),
        )
    }

    /// Splits on line breaks, keeping trimmed non-empty lines in order.
    #[must_use]
    pub fn from_lines(text: &str) -> Self {
        Self::from_items(text.lines())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(NonEmptyString::as_str)
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(NonEmptyString::as_str)
    }

    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.iter().map(str::to_string).collect()
    }
}

// ============================================================================
// Query Templates
// ============================================================================

/// Placeholder syntax recognised by [`QueryTemplate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceholderStyle {
    /// Every literal `X` and `Y` in the template is a placeholder.
    #[default]
    Literal,
    /// Only `{X}` and `{Y}` are placeholders.
    Braced,
}

impl PlaceholderStyle {
    const fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Self::Literal => ("X", "Y"),
            Self::Braced => ("{X}", "{Y}"),
        }
    }
}

/// Question template with X and Y placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTemplate {
    text: String,
    style: PlaceholderStyle,
}

impl QueryTemplate {
    #[must_use]
    pub fn new(text: impl Into<String>, style: PlaceholderStyle) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    #[must_use]
    pub fn literal(text: impl Into<String>) -> Self {
        Self::new(text, PlaceholderStyle::Literal)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn style(&self) -> PlaceholderStyle {
        self.style
    }

    /// Substitutes `x` and `y` in a single left-to-right pass.
    ///
    /// Inserted values are never scanned again, so a label containing the
    /// other placeholder is kept intact.
    #[must_use]
    pub fn render(&self, x: &str, y: &str) -> String {
        let (x_token, y_token) = self.style.tokens();
        let mut out = String::with_capacity(self.text.len() + x.len() + y.len());
        let mut rest = self.text.as_str();

        while !rest.is_empty() {
            if let Some(tail) = rest.strip_prefix(x_token) {
                out.push_str(x);
                rest = tail;
            } else if let Some(tail) = rest.strip_prefix(y_token) {
                out.push_str(y);
                rest = tail;
            } else if let Some(ch) = rest.chars().next() {
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }

        out
    }
}

// ============================================================================
// Run Output
// ============================================================================

/// Answer for one (x, y) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CombinationResult {
    pub x_index: usize,
    pub y_index: usize,
    pub x: String,
    pub y: String,
    pub query: String,
    pub answer: String,
}

impl CombinationResult {
    /// Identifier unique within a run, e.g. `copy_0_2`.
    #[must_use]
    pub fn result_id(&self) -> String {
        format!("copy_{}_{}", self.x_index, self.y_index)
    }
}

/// Completed-pair counter for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunProgress {
    done: usize,
    total: usize,
}

impl RunProgress {
    #[must_use]
    pub const fn new(total: usize) -> Self {
        Self { done: 0, total }
    }

    /// Records one finished pair. Saturates at `total`.
    pub fn advance(&mut self) {
        if self.done < self.total {
            self.done += 1;
        }
    }

    #[must_use]
    pub const fn done(&self) -> usize {
        self.done
    }

    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.done == self.total
    }

    /// Whole-number percentage, 100 for an empty run.
    #[must_use]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.done * 100) / self.total) as u8
    }
}

impl std::fmt::Display for RunProgress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.done, self.total)
    }
}
