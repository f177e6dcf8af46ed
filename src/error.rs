use thiserror::Error;

pub type Result<T> = std::result::Result<T, FetchError>;

/// Failure taxonomy for the fetch pipeline.
///
/// Each stage maps its own transport and parsing failures into exactly one
/// variant and re-raises; no stage retries on its own.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not resolve {location:?} to coordinates")]
    Resolution { location: String },
    #[error("response is not valid JSON: {snippet}")]
    Parse { snippet: String },
    #[error("{0}")]
    Validation(String),
    #[error("network failure: {0}")]
    Network(String),
    #[error("config invalid: {0}")]
    Config(String),
}

const MAX_SNIPPET_CHARS: usize = 160;

fn excerpt(input: &str) -> String {
    let clean: String = input.chars().filter(|c| !c.is_control()).collect();
    if clean.chars().count() > MAX_SNIPPET_CHARS {
        let mut s: String = clean.chars().take(MAX_SNIPPET_CHARS).collect();
        s.push('…');
        s
    } else {
        clean
    }
}

impl FetchError {
    /// Parse failure carrying an excerpt of the offending text for diagnostics.
    pub fn parse(candidate: &str) -> Self {
        FetchError::Parse {
            snippet: excerpt(candidate),
        }
    }

    /// The single message each stage surfaces to the user; internals stay in
    /// the `Display` form and the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Resolution { .. } => {
                "Failed to find coordinates for that place. Please try a more specific location."
            }
            _ => "Could not fetch astronomical data. Please try a different location or date.",
        }
    }

    /// Transport-level failures (timeouts included) are safe to reissue.
    pub fn is_retriable(&self) -> bool {
        matches!(self, FetchError::Network(_))
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Network(format!("request timed out: {err}"))
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{FetchError, MAX_SNIPPET_CHARS, excerpt};

    #[test]
    fn excerpt_truncates_and_strips_control_chars() {
        let noisy = format!("a\tb\n{}", "X".repeat(400));
        let got = excerpt(&noisy);
        assert!(got.starts_with("ab"));
        assert!(got.ends_with('…'));
        assert!(got.chars().count() <= MAX_SNIPPET_CHARS + 1);
    }

    #[test]
    fn parse_error_carries_offending_text() {
        let err = FetchError::parse("not json at all");
        assert!(err.to_string().contains("not json at all"));
    }

    #[test]
    fn only_network_errors_are_retriable() {
        assert!(FetchError::Network("timeout".to_string()).is_retriable());
        assert!(!FetchError::Validation("missing field".to_string()).is_retriable());
    }

    #[test]
    fn resolution_failures_get_location_guidance() {
        let err = FetchError::Resolution {
            location: "Atlantis".to_string(),
        };
        assert!(err.user_message().contains("more specific location"));
    }
}
