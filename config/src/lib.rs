//! Configuration loading and persistence for xyprompt.
//!
//! The configuration file lives at `~/.xyprompt/config.toml`. Every section is
//! optional and a missing file is not an error.
//!
//! ```toml
//! [app]
//! model = "gemini-2.5-flash"
//! grounding = true
//! request_timeout_secs = 120
//!
//! [api_keys]
//! google = "${GEMINI_API_KEY}"
//!
//! [run]
//! mode = "manual"
//! x_list = ["Manufacturing", "Retail"]
//! y_list = ["Cost reduction"]
//! template = "In {X}, find a case study about {Y}."
//! placeholders = "braced"
//! ```

use serde::Deserialize;
use std::io::Write;
use std::{env, fs, path::Path, path::PathBuf};
use xyprompt_types::{API_KEY_ENV_VAR, ApiKey, ListMode, PlaceholderStyle};

#[derive(Debug, Default, Deserialize)]
pub struct XyConfig {
    pub app: Option<AppConfig>,
    pub api_keys: Option<ApiKeys>,
    pub run: Option<RunConfig>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

// Default value function for serde (bool::default() is false, so only true needs a fn)
const fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub model: Option<String>,
    /// Let the model consult Google Search while answering. Default: true.
    #[serde(default = "default_true")]
    pub grounding: bool,
    /// Overall per-request timeout. Unset means no limit beyond the connect timeout.
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: None,
            grounding: true,
            request_timeout_secs: None,
        }
    }
}

#[derive(Default, Deserialize)]
pub struct ApiKeys {
    pub google: Option<String>,
}

// Manual Debug impl to prevent leaking API keys in logs.
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let google = if self.google.is_some() {
            "[REDACTED]"
        } else {
            "None"
        };
        f.debug_struct("ApiKeys").field("google", &google).finish()
    }
}

/// Defaults for the run inputs; command-line flags take precedence.
#[derive(Debug, Default, Deserialize)]
pub struct RunConfig {
    pub mode: Option<ListMode>,
    pub x_prompt: Option<String>,
    pub y_prompt: Option<String>,
    pub x_list: Option<Vec<String>>,
    pub y_list: Option<Vec<String>>,
    pub template: Option<String>,
    pub placeholders: Option<PlaceholderStyle>,
}

/// Replaces `${VAR}` references with the variable's value (empty if unset).
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("${")
            && let Some(end) = after.find('}')
        {
            let var = &after[..end];
            if !var.is_empty() {
                out.push_str(&env::var(var).unwrap_or_default());
            }
            rest = &after[end + 1..];
            continue;
        }

        let Some(ch) = rest.chars().next() else { break };
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }

    out
}

impl XyConfig {
    pub fn load() -> Result<Option<Self>, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(None),
        }
    }

    pub fn load_from(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                tracing::warn!("Failed to read config at {:?}: {}", path, err);
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
        };

        match toml::from_str(&content) {
            Ok(config) => Ok(Some(config)),
            Err(err) => {
                tracing::warn!("Failed to parse config at {:?}: {}", path, err);
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        }
    }

    #[must_use]
    pub fn path() -> Option<PathBuf> {
        config_path()
    }

    /// Credential from `[api_keys] google` (after `${VAR}` expansion), falling
    /// back to the `GEMINI_API_KEY` environment variable.
    #[must_use]
    pub fn api_key(&self) -> Option<ApiKey> {
        self.api_keys
            .as_ref()
            .and_then(|keys| keys.google.as_deref())
            .map(expand_env_vars)
            .and_then(|raw| ApiKey::new(raw).ok())
            .or_else(api_key_from_env)
    }

    #[must_use]
    pub fn model(&self) -> Option<&str> {
        self.app.as_ref().and_then(|app| app.model.as_deref())
    }

    #[must_use]
    pub fn grounding(&self) -> bool {
        self.app.as_ref().is_none_or(|app| app.grounding)
    }

    #[must_use]
    pub fn request_timeout_secs(&self) -> Option<u64> {
        self.app.as_ref().and_then(|app| app.request_timeout_secs)
    }

    /// Persist the model to the config file at the default location.
    pub fn persist_model(model: &str) -> std::io::Result<()> {
        let path = config_path().ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config path",
            )
        })?;
        persist_model_at(&path, model)
    }
}

/// Credential from the `GEMINI_API_KEY` environment variable.
#[must_use]
pub fn api_key_from_env() -> Option<ApiKey> {
    env::var(API_KEY_ENV_VAR)
        .ok()
        .and_then(|raw| ApiKey::new(raw).ok())
}

/// Write `[app] model` into the config at `path`.
///
/// Uses `toml_edit` to preserve comments and formatting. Creates the file and
/// parent directory if they don't exist; the write is atomic.
pub fn persist_model_at(path: &Path, model: &str) -> std::io::Result<()> {
    // A bare file name lives in the working directory, which is not ours to
    // restrict.
    let config_dir = config_dir_of(path);
    if let Some(dir) = config_dir {
        fs::create_dir_all(dir)?;
        restrict_permissions(dir, 0o700)?;
    }

    let content = if path.exists() {
        fs::read_to_string(path)?
    } else {
        String::new()
    };

    let mut doc = content
        .parse::<toml_edit::DocumentMut>()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

    if !doc.contains_key("app") {
        doc["app"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    doc["app"]["model"] = toml_edit::value(model);

    let mut tmp = tempfile::NamedTempFile::new_in(config_dir.unwrap_or_else(|| Path::new(".")))?;
    tmp.write_all(doc.to_string().as_bytes())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;

    // The file may hold a literal API key.
    restrict_permissions(path, 0o600)?;

    tracing::info!(path = %path.display(), model, "Persisted model to config");
    Ok(())
}

/// Directory holding `path`, if it names one.
fn config_dir_of(path: &Path) -> Option<&Path> {
    path.parent().filter(|parent| !parent.as_os_str().is_empty())
}

#[cfg(unix)]
fn restrict_permissions(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::{MetadataExt, PermissionsExt};
    let metadata = fs::metadata(path)?;
    // Only modify permissions if we own the entry
    let our_uid = unsafe { libc::getuid() };
    if metadata.uid() == our_uid {
        let current = metadata.permissions().mode() & 0o777;
        if current & 0o077 != 0 {
            fs::set_permissions(path, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".xyprompt").join("config.toml"))
}
