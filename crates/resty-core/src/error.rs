use std::path::PathBuf;

use thiserror::Error;

/// Failures while locating, reading or interpreting the credentials file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no credentials file path was provided")]
    MissingPath,
    #[error("no credentials file path was provided and standard input is not a terminal")]
    NotInteractive,
    #[error("unable to read the prompt answer: {0}")]
    PromptError(#[source] std::io::Error),
    #[error("unable to read the credentials file at {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse the credentials file: {0}")]
    ParseError(#[source] serde_json::Error),
    #[error("missing required credentials (instance URL and access token) in the credentials file")]
    MissingFields,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("unable to build the request URL: {0}")]
    UrlError(#[from] url::ParseError),
    #[error("the request failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("the request failed with status code {status}: {body}")]
    Http {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("refusing to follow a next-page link to another host: {0}")]
    ForeignNextLink(url::Url),
    #[error("invalid fetch options: {0}")]
    Options(#[from] crate::pagination::FetchOptionsBuilderError),
    #[error("unable to write CSV output: {0}")]
    Csv(#[from] csv::Error),
    #[error("unable to write output: {0}")]
    Io(#[from] std::io::Error),
    #[error("the query has no FROM clause: {0}")]
    InvalidQuery(String),
    #[error("unable to parse the response body: {0}")]
    Parse(#[from] serde_json::Error),
}
