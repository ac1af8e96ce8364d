//! The X × Y combination loop.
//!
//! [`CombinationRun`] walks the Cartesian product of two lists in row-major
//! order (X outer, Y inner), sending one query per pair. Results are pulled
//! one at a time with [`CombinationRun::next`]; the run is finite and cannot
//! be restarted. Requests never overlap, and the first backend error ends the
//! run.

use crate::RunError;
use xyprompt_providers::{BackendError, LanguageModel};
use xyprompt_types::{CombinationResult, ListSide, ModelName, QueryTemplate, RunProgress, TopicList};

/// Position of the next pair to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCursor<'a> {
    pub x_index: usize,
    pub y_index: usize,
    pub x: &'a str,
    pub y: &'a str,
}

#[derive(Debug)]
pub struct CombinationRun<'a, M> {
    client: &'a M,
    model: &'a ModelName,
    grounding: bool,
    x_list: &'a TopicList,
    y_list: &'a TopicList,
    template: &'a QueryTemplate,
    x_index: usize,
    y_index: usize,
    progress: RunProgress,
    failed: bool,
}

impl<'a, M: LanguageModel> CombinationRun<'a, M> {
    /// Refuses to start when either list is empty.
    pub fn new(
        client: &'a M,
        model: &'a ModelName,
        x_list: &'a TopicList,
        y_list: &'a TopicList,
        template: &'a QueryTemplate,
    ) -> Result<Self, RunError> {
        if x_list.is_empty() {
            return Err(RunError::EmptyList(ListSide::X));
        }
        if y_list.is_empty() {
            return Err(RunError::EmptyList(ListSide::Y));
        }

        Ok(Self {
            client,
            model,
            grounding: true,
            x_list,
            y_list,
            template,
            x_index: 0,
            y_index: 0,
            progress: RunProgress::new(x_list.len() * y_list.len()),
            failed: false,
        })
    }

    #[must_use]
    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }

    #[must_use]
    pub fn progress(&self) -> RunProgress {
        self.progress
    }

    /// The pair [`next`](Self::next) will process, if any.
    #[must_use]
    pub fn peek(&self) -> Option<PairCursor<'a>> {
        if self.failed {
            return None;
        }
        let x_list: &'a TopicList = self.x_list;
        let y_list: &'a TopicList = self.y_list;
        Some(PairCursor {
            x_index: self.x_index,
            y_index: self.y_index,
            x: x_list.get(self.x_index)?,
            y: y_list.get(self.y_index)?,
        })
    }

    /// Queries the next pair. Returns `None` once every pair is done or after
    /// an error has been returned.
    pub async fn next(&mut self) -> Option<Result<CombinationResult, BackendError>> {
        let cursor = self.peek()?;
        let query = self.template.render(cursor.x, cursor.y);

        tracing::debug!(
            x = cursor.x,
            y = cursor.y,
            progress = %self.progress,
            "Querying pair"
        );

        let answer = match self
            .client
            .generate_text(self.model, &query, self.grounding)
            .await
        {
            Ok(answer) => answer,
            Err(err) => {
                self.failed = true;
                tracing::warn!(x = cursor.x, y = cursor.y, %err, "Pair failed; stopping run");
                return Some(Err(err));
            }
        };

        self.y_index += 1;
        if self.y_index == self.y_list.len() {
            self.y_index = 0;
            self.x_index += 1;
        }
        self.progress.advance();

        Some(Ok(CombinationResult {
            x_index: cursor.x_index,
            y_index: cursor.y_index,
            x: cursor.x.to_string(),
            y: cursor.y.to_string(),
            query,
            answer,
        }))
    }
}
