use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum HostingError {
    #[error("hosting client has an invalid endpoint {endpoint:?}")]
    InvalidEndpoint { endpoint: String },
    #[error("http transport error calling hosting API: {source}")]
    HttpTransport {
        #[source]
        source: reqwest::Error,
    },
    #[error("hosting API returned {status} for {url}: {snippet}")]
    HttpStatus {
        status: StatusCode,
        url: String,
        snippet: String,
    },
    #[error("failed to decode hosting API response: {reason}")]
    Decode { reason: String },
}

/// First N characters of a response body, for error messages.
pub fn make_snippet(text: &str) -> String {
    const MAX: usize = 300;
    if text.chars().count() <= MAX {
        text.to_string()
    } else {
        format!("{}…", text.chars().take(MAX).collect::<String>())
    }
}
