use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;
use url::Url;

use crate::{
    client::Client,
    constants::*,
    credentials::Credentials,
    error::Error,
    pagination::{Continuation, FetchOptions, FetchOptionsBuilderError},
};

const FROM_CLAUSE_PATTERN: &str = r"(?i)\bFROM\s+([A-Za-z_][A-Za-z0-9_]*)";
static FROM_CLAUSE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(FROM_CLAUSE_PATTERN).expect("Invalid regex pattern"));

/// The object a SOQL statement selects from, ignoring subqueries.
pub fn resource_name(soql: &str) -> Option<&str> {
    FROM_CLAUSE_REGEX.captures_iter(soql).find_map(|captures| {
        let clause = captures.get(0)?;
        let depth = soql[..clause.start()]
            .chars()
            .fold(0i32, |depth, c| match c {
                '(' => depth + 1,
                ')' => depth - 1,
                _ => depth,
            });
        (depth == 0).then(|| captures.get(1).map(|m| m.as_str())).flatten()
    })
}

/// The query endpoint URL for `soql`, using the API version of the credentials.
pub fn query_url(credentials: &Credentials, soql: &str) -> Result<Url, Error> {
    let path = QUERY_PATH_FORMAT.replace(QUERY_PATH_REPLACE_TOKEN, credentials.api_version());
    let mut url = credentials.endpoint(&path)?;
    url.query_pairs_mut().append_pair("q", soql);
    Ok(url)
}

/// Query options that follow `nextRecordsUrl` until the result set is exhausted
/// or `DEFAULT_MAX_PAGES` pages were read.
pub fn all_pages() -> Result<FetchOptions, FetchOptionsBuilderError> {
    FetchOptions::builder()
        .continuation(Continuation::Field(NEXT_RECORDS_URL_FIELD.to_string()))
        .max_pages(DEFAULT_MAX_PAGES)
        .build()
}

impl Client {
    /// Run a SOQL query and return its records.
    ///
    /// Records are read from `records` unless the options name another key.
    pub async fn query(&self, soql: &str, options: &FetchOptions) -> Result<Vec<Value>, Error> {
        let soql = soql.trim();
        let resource = resource_name(soql).ok_or_else(|| Error::InvalidQuery(soql.to_string()))?;
        tracing::debug!("querying {}", resource);
        let url = query_url(self.credentials(), soql)?;
        let mut builder = FetchOptions::builder();
        builder
            .record_key(options.record_key().unwrap_or(DEFAULT_RECORD_KEY))
            .resource_name(resource)
            .continuation(options.continuation().clone());
        if let Some(max_pages) = options.max_pages() {
            builder.max_pages(max_pages);
        }
        let options = builder.build()?;
        self.fetch_all(url.as_str(), &options).await
    }
}
