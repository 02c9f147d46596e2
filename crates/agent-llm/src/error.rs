use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("provider {provider} requires an API key but none was configured")]
    MissingApiKey { provider: &'static str },
    #[error("provider {provider} has an invalid endpoint {endpoint:?}")]
    InvalidEndpoint {
        provider: &'static str,
        endpoint: String,
    },
    #[error("http transport error calling {provider}: {source}")]
    HttpTransport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned {status} for {url}: {snippet}")]
    HttpStatus {
        provider: &'static str,
        status: StatusCode,
        url: String,
        snippet: String,
    },
    #[error("failed to decode {provider} response: {reason}")]
    Decode {
        provider: &'static str,
        reason: String,
    },
    #[error("{provider} returned no completion choices")]
    EmptyChoices { provider: &'static str },
    #[error("{provider} response did not validate against the requested schema: {errors:?}")]
    SchemaInvalid {
        provider: &'static str,
        errors: Vec<String>,
    },
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_at_a_char_boundary_through_multibyte_text() {
        let text = "é".repeat(400);
        let snippet = make_snippet(&text);
        assert_eq!(snippet.chars().count(), 301);
    }
}
