/// Errors from the backend REST layer.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request itself failed (network, DNS, connection refused).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend returned a non-2xx status code.
    #[error("API error ({status}): {detail}")]
    Api {
        status: u16,
        /// `detail` from the error body, or the raw body text.
        detail: String,
    },

    /// The configured base URL cannot carry path segments.
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),

    /// A 2xx response whose body did not match the expected schema.
    #[error("Unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    /// Message suitable for showing inline next to a form.
    pub fn user_message(&self) -> String {
        match self {
            Self::Api { detail, .. } => detail.clone(),
            other => other.to_string(),
        }
    }
}

/// Errors reported by a media element.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// `play()` was refused, typically by an autoplay policy.
    #[error("Playback rejected: {0}")]
    Rejected(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ClientError::Api {
            status: 401,
            detail: "Invalid username or password".into(),
        };
        assert_eq!(err.user_message(), "Invalid username or password");
        assert!(err.to_string().contains("401"));

        let err = ClientError::Decode("expected array".into());
        assert_eq!(err.user_message(), "Unexpected response body: expected array");
    }
}
