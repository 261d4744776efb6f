use std::{
    fmt,
    io::{self, BufRead, IsTerminal, Write},
    path::{Path, PathBuf},
};

use serde_json::Value;
use url::Url;

use crate::{constants::*, error::ConfigError};

const INSTANCE_URL_FIELDS: &[&str] = &["instance_url", "instanceUrl"];
const ACCESS_TOKEN_FIELDS: &[&str] = &["access_token", "accessToken"];
const API_VERSION_FIELDS: &[&str] = &["apiVersion", "api_version"];
const NESTED_RESULT_FIELD: &str = "result";

/// A way of pulling credentials out of one layout of the credentials file.
type ExtractionStrategy = fn(&Value) -> Option<Credentials>;

/// Credential file layouts, in the order they are tried.
const EXTRACTION_STRATEGIES: &[(&str, ExtractionStrategy)] =
    &[("flat", extract_flat), ("result", extract_nested)];

/// The instance URL and bearer token used to authenticate every request of a run.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl Credentials {
    /// Both values must be non-empty. An instance URL without a scheme is
    /// assumed to be `https`. The token is kept exactly as given.
    pub fn new(instance_url: &str, access_token: &str) -> Result<Self, ConfigError> {
        let instance_url = instance_url.trim();
        if instance_url.is_empty() || access_token.trim().is_empty() {
            return Err(ConfigError::MissingFields);
        }
        let instance_url =
            if instance_url.starts_with("http://") || instance_url.starts_with("https://") {
                instance_url.to_string()
            } else {
                format!("{DEFAULT_SCHEME}{instance_url}")
            };
        Ok(Self {
            instance_url,
            access_token: access_token.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
        })
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        let api_version = api_version.trim().trim_start_matches('v');
        if !api_version.is_empty() {
            self.api_version = api_version.to_string();
        }
        self
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Resolve `path` against the instance URL. Fully qualified URLs are returned as-is.
    pub fn endpoint(&self, path: &str) -> Result<Url, url::ParseError> {
        match Url::parse(path) {
            Ok(url) => Ok(url),
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(&self.instance_url)?.join(path),
            Err(e) => Err(e),
        }
    }

    /// Whether `url` points at the instance itself (same scheme, host and port).
    pub fn is_same_origin(&self, url: &Url) -> bool {
        Url::parse(&self.instance_url).is_ok_and(|instance| instance.origin() == url.origin())
    }
}

// Keeps the token out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"<redacted>")
            .field("api_version", &self.api_version)
            .finish()
    }
}

fn first_present<'a>(object: &'a Value, names: &[&str]) -> Option<&'a str> {
    names.iter().find_map(|name| {
        object
            .get(*name)
            .and_then(Value::as_str)
            .filter(|value| !value.trim().is_empty())
    })
}

fn extract_fields(object: &Value) -> Option<Credentials> {
    let instance_url = first_present(object, INSTANCE_URL_FIELDS)?;
    let access_token = first_present(object, ACCESS_TOKEN_FIELDS)?;
    let credentials = Credentials::new(instance_url, access_token).ok()?;
    Some(match first_present(object, API_VERSION_FIELDS) {
        Some(api_version) => credentials.with_api_version(api_version),
        None => credentials,
    })
}

fn extract_flat(content: &Value) -> Option<Credentials> {
    extract_fields(content)
}

fn extract_nested(content: &Value) -> Option<Credentials> {
    content.get(NESTED_RESULT_FIELD).and_then(extract_fields)
}

/// Extract credentials from parsed credentials file content.
pub fn from_value(content: &Value) -> Result<Credentials, ConfigError> {
    EXTRACTION_STRATEGIES
        .iter()
        .find_map(|(name, strategy)| {
            let credentials = strategy(content)?;
            tracing::debug!("credentials found using the {} layout", name);
            Some(credentials)
        })
        .ok_or(ConfigError::MissingFields)
}

pub fn parse(content: &str) -> Result<Credentials, ConfigError> {
    let parsed: Value = serde_json::from_str(content).map_err(ConfigError::ParseError)?;
    from_value(&parsed)
}

/// Read and interpret the credentials file at `path`.
pub async fn load<P: AsRef<Path>>(path: P) -> Result<Credentials, ConfigError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
    parse(&content)
}

/// Source of a credentials file path when none was given up front.
pub trait Prompt {
    /// Ask once. `None` means no answer was given.
    fn ask(&mut self, message: &str) -> Result<Option<String>, ConfigError>;
}

/// Asks on the terminal, writing the question to stderr so stdout stays clean.
#[derive(Clone, Copy, Debug, Default)]
pub struct TerminalPrompt;

impl Prompt for TerminalPrompt {
    fn ask(&mut self, message: &str) -> Result<Option<String>, ConfigError> {
        let stdin = io::stdin();
        if !stdin.is_terminal() {
            return Err(ConfigError::NotInteractive);
        }
        let mut stderr = io::stderr();
        write!(stderr, "{message}").map_err(ConfigError::PromptError)?;
        stderr.flush().map_err(ConfigError::PromptError)?;
        let mut answer = String::new();
        stdin
            .lock()
            .read_line(&mut answer)
            .map_err(ConfigError::PromptError)?;
        let answer = answer.trim();
        Ok((!answer.is_empty()).then(|| answer.to_string()))
    }
}

/// Never asks. For callers that must not block on input.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPrompt;

impl Prompt for NoPrompt {
    fn ask(&mut self, _message: &str) -> Result<Option<String>, ConfigError> {
        Ok(None)
    }
}

/// The explicit path wins; otherwise ask once, with no default and no retry.
pub fn resolve_path<P: Prompt>(hint: Option<&Path>, prompt: &mut P) -> Result<PathBuf, ConfigError> {
    if let Some(path) = hint {
        return Ok(path.to_path_buf());
    }
    prompt
        .ask(AUTH_FILE_PROMPT)?
        .map(PathBuf::from)
        .ok_or(ConfigError::MissingPath)
}

/// Locate, read and interpret the credentials file.
pub async fn resolve<P: Prompt>(hint: Option<&Path>, prompt: &mut P) -> Result<Credentials, ConfigError> {
    let path = resolve_path(hint, prompt)?;
    tracing::debug!("loading credentials from {}", path.display());
    load(&path).await
}
