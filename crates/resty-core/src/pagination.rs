use std::fmt;

use derive_builder::Builder;
use serde_json::Value;

/// Pulls the next page's URL out of a response page.
pub type NextLinkHook = fn(&Value) -> Option<String>;

/// How `fetch_all` finds the next page.
///
/// The default performs a single request and ignores any next link the server
/// sends. Following pages is opt-in.
#[derive(Clone, Default)]
pub enum Continuation {
    #[default]
    SinglePage,
    /// Follow the string found under this top-level field.
    Field(String),
    Hook(NextLinkHook),
}

impl Continuation {
    pub fn next_link(&self, page: &Value) -> Option<String> {
        match self {
            Continuation::SinglePage => None,
            Continuation::Field(name) => page
                .get(name)
                .and_then(Value::as_str)
                .filter(|link| !link.is_empty())
                .map(str::to_string),
            Continuation::Hook(hook) => hook(page),
        }
    }
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Continuation::SinglePage => f.write_str("SinglePage"),
            Continuation::Field(name) => f.debug_tuple("Field").field(name).finish(),
            Continuation::Hook(_) => f.write_str("Hook(..)"),
        }
    }
}

/// Parameters of a record fetch.
#[derive(Builder, Clone, Debug, Default)]
#[builder(default)]
pub struct FetchOptions {
    /// Key of the record array. When set, no other key is considered.
    #[builder(setter(into, strip_option))]
    record_key: Option<String>,
    /// Overrides the resource name taken from the last path segment.
    #[builder(setter(into, strip_option))]
    resource_name: Option<String>,
    continuation: Continuation,
    /// Upper bound on requests when a continuation is followed.
    #[builder(setter(strip_option))]
    max_pages: Option<usize>,
}

impl FetchOptions {
    pub fn builder() -> FetchOptionsBuilder {
        FetchOptionsBuilder::default()
    }

    pub fn record_key(&self) -> Option<&str> {
        self.record_key.as_deref()
    }

    pub fn resource_name(&self) -> Option<&str> {
        self.resource_name.as_deref()
    }

    pub fn continuation(&self) -> &Continuation {
        &self.continuation
    }

    pub fn max_pages(&self) -> Option<usize> {
        self.max_pages
    }
}
