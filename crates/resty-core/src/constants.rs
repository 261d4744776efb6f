/// The API version used when the credentials file does not carry one
pub const DEFAULT_API_VERSION: &str = "60.0";

/// The scheme prefixed to instance URLs that were saved without one
pub const DEFAULT_SCHEME: &str = "https://";

/// The prompt shown when no credentials file path was supplied
pub const AUTH_FILE_PROMPT: &str = "Enter the path to auth.json: ";

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// The record array key used by query responses and as the last-resort fallback
pub const DEFAULT_RECORD_KEY: &str = "records";

/// The next-link field of query responses
pub const NEXT_RECORDS_URL_FIELD: &str = "nextRecordsUrl";

/// The next-link field of list endpoints
pub const NEXT_PAGE_URL_FIELD: &str = "nextPageUrl";

/// Page limit applied when following next-page links without an explicit limit
pub const DEFAULT_MAX_PAGES: usize = 100;

/// The query endpoint path format
pub const QUERY_PATH_FORMAT: &str = "/services/data/v$api_version/query";
pub const QUERY_PATH_REPLACE_TOKEN: &str = "$api_version";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_path_format_has_token() {
        assert!(QUERY_PATH_FORMAT.contains(QUERY_PATH_REPLACE_TOKEN));
    }
}
