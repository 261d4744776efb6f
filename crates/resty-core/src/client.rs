use std::{collections::BTreeMap, fmt, str::FromStr};

use serde_json::Value;
use url::Url;

use crate::{
    constants::*,
    credentials::Credentials,
    error::{ConfigError, Error},
    pagination::FetchOptions,
    records,
    util::sanitize_for_log,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

#[derive(Debug, thiserror::Error, PartialEq)]
#[error("unsupported HTTP method: {0}")]
pub struct UnsupportedMethod(String);

impl FromStr for Method {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "DELETE" => Ok(Method::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        })
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One authenticated call, fully resolved.
#[derive(Clone, PartialEq)]
pub struct RequestSpec {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<&'static str, String>,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(
        credentials: &Credentials,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Self, Error> {
        let headers = BTreeMap::from([
            (
                AUTHORIZATION_HEADER,
                format!("Bearer {}", credentials.access_token()),
            ),
            (CONTENT_TYPE_HEADER, JSON_CONTENT_TYPE.to_string()),
        ]);
        Ok(Self {
            method,
            url: credentials.endpoint(path)?,
            headers,
            body,
        })
    }
}

impl fmt::Debug for RequestSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSpec")
            .field("method", &self.method)
            .field("url", &self.url.as_str())
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("body", &self.body)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Client {
    http_client: reqwest::Client,
    credentials: Credentials,
}

impl Client {
    pub fn new(http_client: reqwest::Client, credentials: Credentials) -> Self {
        Self {
            http_client,
            credentials,
        }
    }

    /// Build a client from the outcome of credential resolution.
    ///
    /// A resolution failure is returned before `build_client` runs, so no
    /// request can be made without credentials. `api_version` overrides the
    /// version read from the credentials file.
    pub fn connect<F>(
        resolved: Result<Credentials, ConfigError>,
        api_version: Option<&str>,
        build_client: F,
    ) -> Result<Self, Error>
    where
        F: FnOnce(Credentials) -> Result<Self, Error>,
    {
        let credentials = match api_version {
            Some(api_version) => resolved?.with_api_version(api_version),
            None => resolved?,
        };
        build_client(credentials)
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// Next links may be relative or absolute, but must stay on the instance
    /// so the bearer token is never sent elsewhere.
    fn next_page_url(&self, link: &str) -> Result<Url, Error> {
        let url = self.credentials.endpoint(link)?;
        if !self.credentials.is_same_origin(&url) {
            tracing::error!("next-page link leaves the instance: {}", url);
            return Err(Error::ForeignNextLink(url));
        }
        Ok(url)
    }

    /// Issue exactly one authenticated request and decode the JSON response.
    ///
    /// `path` is joined to the instance URL unless it is already absolute. An
    /// empty success body decodes to `Value::Null`.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, Error> {
        let spec = RequestSpec::new(&self.credentials, method, path, body.cloned())?;
        self.execute(spec).await
    }

    pub async fn execute(&self, spec: RequestSpec) -> Result<Value, Error> {
        tracing::debug!("{} {}", spec.method, spec.url);
        let mut request = self
            .http_client
            .request(spec.method.into(), spec.url.clone());
        for (name, value) in &spec.headers {
            request = request.header(*name, value);
        }
        if let Some(body) = &spec.body {
            request = request.body(body.to_string());
        }
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&body));
            return Err(Error::Http { status, body });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// Collect the records of a list endpoint.
    ///
    /// Pages are followed only as far as the options' continuation allows; by
    /// default exactly one request is made.
    pub async fn fetch_all(&self, path: &str, options: &FetchOptions) -> Result<Vec<Value>, Error> {
        let resource_name = options
            .resource_name()
            .or_else(|| records::resource_name_from_path(path))
            .map(str::to_string);
        let mut next = Some(self.credentials.endpoint(path)?);
        let mut all_records = Vec::new();
        let mut pages = 0;
        while let Some(url) = next.take() {
            if options.max_pages().is_some_and(|max| pages >= max) {
                tracing::debug!("stopping after {} pages", pages);
                break;
            }
            let mut page = self.send(Method::Get, url.as_str(), None).await?;
            pages += 1;
            let record_key =
                records::resolve_record_key(&page, options.record_key(), resource_name.as_deref())
                    .map(str::to_string);
            next = options
                .continuation()
                .next_link(&page)
                .map(|link| self.next_page_url(&link))
                .transpose()?;
            if let Some(record_key) = record_key {
                all_records.extend(records::take_records(&mut page, &record_key));
            }
        }
        tracing::debug!("fetched {} records in {} pages", all_records.len(), pages);
        Ok(all_records)
    }
}
