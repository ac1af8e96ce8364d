//! Turning user input or model output into a [`TopicList`].
//!
//! Models do not always honour a request for structured output, so a
//! generated list is decoded by an ordered set of [`ListParser`] strategies,
//! each more lenient than the previous one. The first strategy that produces a
//! non-empty list wins.

use serde_json::Value;
use xyprompt_providers::{BackendError, LanguageModel, RawListResponse};
use xyprompt_types::{ListMode, ModelName, TopicList};

/// Result of one parsing strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The response does not have the shape this strategy reads.
    NotApplicable,
    /// The shape matched but held no usable items.
    Empty,
    Parsed(TopicList),
}

pub trait ListParser {
    fn name(&self) -> &'static str;
    fn parse(&self, response: &RawListResponse) -> ParseOutcome;
}

/// Uses the list the backend already decoded. Strings are kept verbatim,
/// other values become their JSON text and `null` entries are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuredItems;

/// Decodes the raw text as a JSON array, stringifying items like
/// [`StructuredItems`].
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonText;

/// Reads the raw text as one item per line, dropping bullet markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct FreeformLines;

/// Strategies in the order they are tried.
pub const DEFAULT_PARSERS: [&dyn ListParser; 3] = [&StructuredItems, &JsonText, &FreeformLines];

/// Text form of a JSON item.
///
/// Strings are taken verbatim and numbers and booleans use their JSON text
/// (`2`, `true`). `null` counts as an empty item and is dropped like a blank
/// string, so a sparse array never yields a literal "null" topic.
fn stringify_item(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn outcome_from_items(items: &[Value]) -> ParseOutcome {
    let list = TopicList::from_items(items.iter().filter_map(stringify_item));
    if list.is_empty() {
        ParseOutcome::Empty
    } else {
        ParseOutcome::Parsed(list)
    }
}

impl ListParser for StructuredItems {
    fn name(&self) -> &'static str {
        "structured"
    }

    fn parse(&self, response: &RawListResponse) -> ParseOutcome {
        match &response.parsed {
            Some(items) => outcome_from_items(items),
            None => ParseOutcome::NotApplicable,
        }
    }
}

impl ListParser for JsonText {
    fn name(&self) -> &'static str {
        "json-text"
    }

    fn parse(&self, response: &RawListResponse) -> ParseOutcome {
        let Some(text) = response.text.as_deref() else {
            return ParseOutcome::NotApplicable;
        };
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Array(items)) => outcome_from_items(&items),
            _ => ParseOutcome::NotApplicable,
        }
    }
}

const BULLET_MARKERS: [char; 3] = ['-', '•', '*'];

impl ListParser for FreeformLines {
    fn name(&self) -> &'static str {
        "freeform"
    }

    fn parse(&self, response: &RawListResponse) -> ParseOutcome {
        let text = response.text();
        if text.trim().is_empty() {
            return ParseOutcome::NotApplicable;
        }
        // A JSON array with no usable items is empty, not a line of text.
        if serde_json::from_str::<Vec<Value>>(text.trim()).is_ok() {
            return ParseOutcome::Empty;
        }

        let list = TopicList::from_items(text.lines().map(|line| {
            line.trim_start_matches(|c: char| BULLET_MARKERS.contains(&c) || c.is_whitespace())
        }));
        if list.is_empty() {
            ParseOutcome::Empty
        } else {
            ParseOutcome::Parsed(list)
        }
    }
}

/// Runs `parsers` in order and returns the first non-empty list.
pub fn parse_list_response(response: &RawListResponse, parsers: &[&dyn ListParser]) -> TopicList {
    for parser in parsers {
        match parser.parse(response) {
            ParseOutcome::Parsed(list) => {
                tracing::debug!(parser = parser.name(), items = list.len(), "List parsed");
                return list;
            }
            outcome => {
                tracing::debug!(parser = parser.name(), ?outcome, "List parser fell through");
            }
        }
    }
    tracing::warn!("No list could be read from the model response");
    TopicList::default()
}

/// Resolves one side's input into a [`TopicList`].
#[derive(Debug)]
pub struct ListResolver<'a, M> {
    client: &'a M,
    model: &'a ModelName,
}

impl<'a, M: LanguageModel> ListResolver<'a, M> {
    pub fn new(client: &'a M, model: &'a ModelName) -> Self {
        Self { client, model }
    }

    /// In manual mode `input` is the newline-separated list; in generated mode
    /// it is the prompt sent to the model. Blank input yields an empty list
    /// without contacting the backend.
    pub async fn resolve(&self, mode: ListMode, input: &str) -> Result<TopicList, BackendError> {
        if input.trim().is_empty() {
            return Ok(TopicList::default());
        }

        match mode {
            ListMode::Manual => Ok(TopicList::from_lines(input)),
            ListMode::Generated => {
                let response = self
                    .client
                    .generate_structured_list(self.model, input.trim())
                    .await?;
                Ok(parse_list_response(&response, &DEFAULT_PARSERS))
            }
        }
    }
}
