//! One complete run: resolve both lists, then query every pair.

use crate::present::Presenter;
use crate::resolver::ListResolver;
use crate::runner::CombinationRun;
use crate::RunError;
use xyprompt_providers::LanguageModel;
use xyprompt_types::{
    ApiKey, CombinationResult, ListMode, ListSide, ModelName, QueryTemplate, RunProgress, TopicList,
};

/// Everything a run needs, gathered up front and dropped when the run ends.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub mode: ListMode,
    /// Prompt (generated mode) or newline-separated items (manual mode).
    pub x_input: String,
    pub y_input: String,
    pub template: QueryTemplate,
    pub model: ModelName,
    pub grounding: bool,
}

#[derive(Debug)]
pub struct RunSummary {
    pub x_list: TopicList,
    pub y_list: TopicList,
    pub results: Vec<CombinationResult>,
    pub progress: RunProgress,
}

/// Fails with [`RunError::MissingCredential`] when no key was supplied.
pub fn require_api_key(key: Option<ApiKey>) -> Result<ApiKey, RunError> {
    key.ok_or(RunError::MissingCredential)
}

/// Resolves the lists, runs every pair through `client`, and streams the
/// output into `presenter`.
///
/// On failure the presenter is told why via [`Presenter::abort`]; whatever it
/// already rendered is left as is.
pub async fn execute<M, P>(
    settings: &RunSettings,
    client: &M,
    presenter: &mut P,
) -> Result<RunSummary, RunError>
where
    M: LanguageModel,
    P: Presenter,
{
    match run_inner(settings, client, presenter).await {
        Ok(summary) => Ok(summary),
        Err(err) => {
            if let Err(io_err) = presenter.abort(&err.to_string()) {
                tracing::warn!(%io_err, "Failed to report abort");
            }
            Err(err)
        }
    }
}

async fn run_inner<M, P>(
    settings: &RunSettings,
    client: &M,
    presenter: &mut P,
) -> Result<RunSummary, RunError>
where
    M: LanguageModel,
    P: Presenter,
{
    let resolver = ListResolver::new(client, &settings.model);

    tracing::info!(mode = settings.mode.as_str(), model = %settings.model, "Resolving lists");
    let x_list = resolver.resolve(settings.mode, &settings.x_input).await?;
    let y_list = resolver.resolve(settings.mode, &settings.y_input).await?;

    if x_list.is_empty() {
        return Err(RunError::EmptyList(ListSide::X));
    }
    if y_list.is_empty() {
        return Err(RunError::EmptyList(ListSide::Y));
    }

    presenter.begin(&x_list, &y_list)?;

    let mut run = CombinationRun::new(
        client,
        &settings.model,
        &x_list,
        &y_list,
        &settings.template,
    )?
    .with_grounding(settings.grounding);

    tracing::info!(
        x = x_list.len(),
        y = y_list.len(),
        total = run.progress().total(),
        "Starting combination run"
    );

    let mut results = Vec::with_capacity(run.progress().total());
    while let Some(cursor) = run.peek() {
        if cursor.y_index == 0 {
            presenter.group(cursor.x_index, cursor.x)?;
        }
        presenter.pending(cursor.x, cursor.y)?;

        let Some(result) = run.next().await else {
            break;
        };
        let result = result?;
        presenter.result(&result)?;
        presenter.progress(run.progress())?;
        results.push(result);
    }

    let progress = run.progress();
    presenter.finish(progress)?;
    tracing::info!(done = progress.done(), "Combination run finished");

    Ok(RunSummary {
        x_list,
        y_list,
        results,
        progress,
    })
}
