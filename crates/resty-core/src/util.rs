use std::time::Duration;

/// Longest response body excerpt written to the log.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Build the HTTP client used for API calls. `timeout` bounds each request; nothing is retried.
pub fn http_client(timeout: Option<Duration>) -> Result<reqwest::Client, reqwest::Error> {
    let mut builder = reqwest::Client::builder().gzip(true).brotli(true);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build()
}

/// Truncate a response body for logging and drop control characters.
pub(crate) fn sanitize_for_log(body: &str) -> String {
    let truncated = match body.char_indices().nth(MAX_LOG_BODY_LENGTH) {
        Some((cut, _)) => format!("{}... [truncated, {} bytes total]", &body[..cut], body.len()),
        None => body.to_string(),
    };
    truncated.replace(|c: char| c.is_control(), "")
}
