use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use xyprompt_providers::{BackendError, LanguageModel, RawListResponse};
use xyprompt_types::ModelName;

/// In-memory model answering `answer to {query}` and serving canned lists.
#[derive(Debug, Default)]
pub(crate) struct ScriptedModel {
    lists: HashMap<String, RawListResponse>,
    fail_on_call: Option<usize>,
    text_calls: Cell<usize>,
    list_calls: Cell<usize>,
    grounding: RefCell<Vec<bool>>,
}

impl ScriptedModel {
    pub(crate) fn echo() -> Self {
        Self::default()
    }

    /// Makes the `n`th text call (1-based) fail.
    pub(crate) fn failing_on_call(mut self, n: usize) -> Self {
        self.fail_on_call = Some(n);
        self
    }

    pub(crate) fn with_list(mut self, prompt: &str, response: RawListResponse) -> Self {
        self.lists.insert(prompt.to_string(), response);
        self
    }

    pub(crate) fn text_calls(&self) -> usize {
        self.text_calls.get()
    }

    pub(crate) fn list_calls(&self) -> usize {
        self.list_calls.get()
    }

    pub(crate) fn grounding_flags(&self) -> Vec<bool> {
        self.grounding.borrow().clone()
    }
}

impl LanguageModel for ScriptedModel {
    async fn generate_text(
        &self,
        _model: &ModelName,
        query: &str,
        grounding: bool,
    ) -> Result<String, BackendError> {
        let call = self.text_calls.get() + 1;
        self.text_calls.set(call);
        self.grounding.borrow_mut().push(grounding);
        if self.fail_on_call == Some(call) {
            return Err(BackendError::Api("scripted failure".to_string()));
        }
        Ok(format!("answer to {query}"))
    }

    async fn generate_structured_list(
        &self,
        _model: &ModelName,
        prompt: &str,
    ) -> Result<RawListResponse, BackendError> {
        self.list_calls.set(self.list_calls.get() + 1);
        Ok(self.lists.get(prompt).cloned().unwrap_or_default())
    }
}
