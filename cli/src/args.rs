//! Command-line arguments and their merge with the config file.
//!
//! Precedence for every setting: flag, then `[run]`/`[app]` in the config
//! file, then the built-in default.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};

use xyprompt_config::{XyConfig, api_key_from_env};
use xyprompt_engine::{ApiKey, ListMode, ModelName, PlaceholderStyle, QueryTemplate, RunSettings};

pub const DEFAULT_X_PROMPT: &str = "List 3 industries. Answer as a JSON array.";
pub const DEFAULT_Y_PROMPT: &str =
    "List 3 points for evaluating generative AI adoption. Answer as a JSON array.";
pub const DEFAULT_X_LIST: &str = "Manufacturing\nRetail\nFinance";
pub const DEFAULT_Y_LIST: &str = "Cost reduction\nQuality improvement\nOperational efficiency";
pub const DEFAULT_TEMPLATE: &str =
    "Search for case studies where generative AI adoption in X succeeded in Y, and write them up.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    Generated,
    Manual,
}

impl From<ModeArg> for ListMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Generated => ListMode::Generated,
            ModeArg::Manual => ListMode::Manual,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Html,
}

/// Ask Gemini one question for every pair of items from two lists.
#[derive(Debug, Parser)]
#[command(name = "xyprompt", version)]
pub struct Cli {
    /// How the X and Y lists are obtained.
    #[arg(long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Prompt that generates the X list (generated mode).
    #[arg(long)]
    pub x_prompt: Option<String>,

    /// Prompt that generates the Y list (generated mode).
    #[arg(long)]
    pub y_prompt: Option<String>,

    /// Newline-separated X items (manual mode).
    #[arg(long, conflicts_with = "x_file")]
    pub x_list: Option<String>,

    /// Newline-separated Y items (manual mode).
    #[arg(long, conflicts_with = "y_file")]
    pub y_list: Option<String>,

    /// Read the X items from a file, one per line (manual mode).
    #[arg(long)]
    pub x_file: Option<PathBuf>,

    /// Read the Y items from a file, one per line (manual mode).
    #[arg(long)]
    pub y_file: Option<PathBuf>,

    /// Question template; X and Y are replaced by each pair.
    #[arg(long)]
    pub template: Option<String>,

    /// Only substitute `{X}` and `{Y}` in the template.
    #[arg(long)]
    pub braced_placeholders: bool,

    /// Answer without Google Search grounding.
    #[arg(long)]
    pub no_grounding: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// After the run, prompt for result ids to copy to the clipboard.
    #[arg(long)]
    pub copy: bool,

    /// Store the model used for this run as the default.
    #[arg(long)]
    pub save_model: bool,

    /// Gemini API key (overrides the config file and GEMINI_API_KEY).
    #[arg(long)]
    pub api_key: Option<String>,

    #[arg(long)]
    pub model: Option<String>,
}

impl Cli {
    pub fn mode(&self, config: Option<&XyConfig>) -> ListMode {
        self.mode
            .map(ListMode::from)
            .or_else(|| config.and_then(|cfg| cfg.run.as_ref()).and_then(|run| run.mode))
            .unwrap_or_default()
    }

    pub fn model(&self, config: Option<&XyConfig>) -> Result<ModelName> {
        let raw = self
            .model
            .as_deref()
            .or_else(|| config.and_then(XyConfig::model));
        match raw {
            Some(raw) => ModelName::parse(raw).context("invalid model name"),
            None => Ok(ModelName::default()),
        }
    }

    pub fn api_key(&self, config: Option<&XyConfig>) -> Option<ApiKey> {
        self.api_key
            .as_deref()
            .and_then(|raw| ApiKey::new(raw).ok())
            .or_else(|| config.map_or_else(api_key_from_env, XyConfig::api_key))
    }

    pub fn grounding(&self, config: Option<&XyConfig>) -> bool {
        !self.no_grounding && config.is_none_or(XyConfig::grounding)
    }

    /// Builds the per-run settings, reading list files if given.
    pub fn run_settings(&self, config: Option<&XyConfig>) -> Result<RunSettings> {
        let run = config.and_then(|cfg| cfg.run.as_ref());
        let mode = self.mode(config);

        let (x_input, y_input) = match mode {
            ListMode::Generated => (
                pick(
                    self.x_prompt.clone(),
                    run.and_then(|r| r.x_prompt.clone()),
                    DEFAULT_X_PROMPT,
                ),
                pick(
                    self.y_prompt.clone(),
                    run.and_then(|r| r.y_prompt.clone()),
                    DEFAULT_Y_PROMPT,
                ),
            ),
            ListMode::Manual => (
                pick(
                    manual_input(self.x_list.as_deref(), self.x_file.as_deref())?,
                    run.and_then(|r| r.x_list.as_ref()).map(|items| items.join("\n")),
                    DEFAULT_X_LIST,
                ),
                pick(
                    manual_input(self.y_list.as_deref(), self.y_file.as_deref())?,
                    run.and_then(|r| r.y_list.as_ref()).map(|items| items.join("\n")),
                    DEFAULT_Y_LIST,
                ),
            ),
        };

        let style = if self.braced_placeholders {
            PlaceholderStyle::Braced
        } else {
            run.and_then(|r| r.placeholders).unwrap_or_default()
        };
        let template = pick(
            self.template.clone(),
            run.and_then(|r| r.template.clone()),
            DEFAULT_TEMPLATE,
        );

        Ok(RunSettings {
            mode,
            x_input,
            y_input,
            template: QueryTemplate::new(template, style),
            model: self.model(config)?,
            grounding: self.grounding(config),
        })
    }
}

fn pick(flag: Option<String>, config: Option<String>, default: &str) -> String {
    flag.or(config).unwrap_or_else(|| default.to_string())
}

fn manual_input(inline: Option<&str>, file: Option<&Path>) -> Result<Option<String>> {
    if let Some(path) = file {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read list file {}", path.display()))?;
        return Ok(Some(text));
    }
    Ok(inline.map(str::to_string))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use xyprompt_config::{AppConfig, ApiKeys, RunConfig};

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["xyprompt"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    fn config_with_run(run: RunConfig) -> XyConfig {
        XyConfig {
            run: Some(run),
            ..Default::default()
        }
    }

    #[test]
    fn defaults_without_flags_or_config() {
        let cli = parse(&[]);
        let settings = cli.run_settings(None).unwrap();
        assert_eq!(settings.mode, ListMode::Generated);
        assert_eq!(settings.x_input, DEFAULT_X_PROMPT);
        assert_eq!(settings.y_input, DEFAULT_Y_PROMPT);
        assert_eq!(settings.template.as_str(), DEFAULT_TEMPLATE);
        assert_eq!(settings.template.style(), PlaceholderStyle::Literal);
        assert_eq!(settings.model.as_str(), ModelName::DEFAULT);
        assert!(settings.grounding);
    }

    #[test]
    fn manual_defaults_are_the_sample_lists() {
        let settings = parse(&["--mode", "manual"]).run_settings(None).unwrap();
        assert_eq!(settings.x_input, DEFAULT_X_LIST);
        assert_eq!(settings.y_input, DEFAULT_Y_LIST);
    }

    #[test]
    fn flags_override_config() {
        let config = XyConfig {
            app: Some(AppConfig {
                model: Some("gemini-2.5-pro".to_string()),
                grounding: true,
                request_timeout_secs: None,
            }),
            run: Some(RunConfig {
                mode: Some(ListMode::Manual),
                x_list: Some(vec!["A".to_string(), "B".to_string()]),
                y_list: Some(vec!["C".to_string()]),
                template: Some("config X Y".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let settings = parse(&[]).run_settings(Some(&config)).unwrap();
        assert_eq!(settings.mode, ListMode::Manual);
        assert_eq!(settings.x_input, "A\nB");
        assert_eq!(settings.template.as_str(), "config X Y");
        assert_eq!(settings.model.as_str(), "gemini-2.5-pro");

        let cli = parse(&[
            "--x-list",
            "Q\nR",
            "--template",
            "flag {X} {Y}",
            "--braced-placeholders",
            "--model",
            "gemini-3-flash-preview",
            "--no-grounding",
        ]);
        let settings = cli.run_settings(Some(&config)).unwrap();
        assert_eq!(settings.x_input, "Q\nR");
        assert_eq!(settings.y_input, "C");
        assert_eq!(settings.template.render("1", "2"), "flag 1 2");
        assert_eq!(settings.model.as_str(), "gemini-3-flash-preview");
        assert!(!settings.grounding);
    }

    #[test]
    fn config_placeholder_style_applies() {
        let config = config_with_run(RunConfig {
            placeholders: Some(PlaceholderStyle::Braced),
            ..Default::default()
        });
        let settings = parse(&[]).run_settings(Some(&config)).unwrap();
        assert_eq!(settings.template.style(), PlaceholderStyle::Braced);
    }

    #[test]
    fn list_file_is_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "One\n\n  Two  ").unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let settings = parse(&["--mode", "manual", "--x-file", &path])
            .run_settings(None)
            .unwrap();
        assert_eq!(settings.x_input, "One\n\n  Two  \n");
    }

    #[test]
    fn missing_list_file_is_an_error() {
        let cli = parse(&["--mode", "manual", "--y-file", "/nonexistent/xyprompt/list.txt"]);
        let err = cli.run_settings(None).unwrap_err();
        assert!(err.to_string().contains("failed to read list file"));
    }

    #[test]
    fn inline_list_conflicts_with_file() {
        let result = Cli::try_parse_from(["xyprompt", "--x-list", "a", "--x-file", "f.txt"]);
        assert!(result.is_err());
    }

    #[test]
    fn api_key_flag_wins_over_config() {
        let config = XyConfig {
            api_keys: Some(ApiKeys {
                google: Some("from-config".to_string()),
            }),
            ..Default::default()
        };
        let cli = parse(&["--api-key", "from-flag"]);
        assert_eq!(
            cli.api_key(Some(&config)).unwrap().expose_secret(),
            "from-flag"
        );

        let cli = parse(&[]);
        assert_eq!(
            cli.api_key(Some(&config)).unwrap().expose_secret(),
            "from-config"
        );
    }

    #[test]
    fn blank_model_is_rejected() {
        let cli = parse(&["--model", "  "]);
        assert!(cli.model(None).is_err());
    }

    #[test]
    fn model_with_url_characters_is_rejected() {
        let cli = parse(&["--model", "gemini-2.5-flash?alt=sse"]);
        let err = cli.run_settings(None).unwrap_err();
        assert!(format!("{err:#}").contains("invalid model name"));
    }
}
