use std::str::FromStr;

use lus_core::frames::DEFAULT_FPS;

/// What to do with a sequence list that arrives after a newer one was
/// requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StaleResponsePolicy {
    /// Apply every response in arrival order. A slow response for an older
    /// selection overwrites the newer one.
    #[default]
    Accept,
    /// Drop responses whose request token is not the latest.
    Discard,
}

impl FromStr for StaleResponsePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accept" => Ok(Self::Accept),
            "discard" => Ok(Self::Discard),
            other => Err(format!(
                "Invalid stale response policy '{other}'. Must be 'accept' or 'discard'"
            )),
        }
    }
}

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without a trailing slash.
    pub api_base_url: String,
    /// Frame rate used for the frame slider.
    pub fps: f64,
    pub stale_responses: StaleResponsePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            fps: DEFAULT_FPS,
            stale_responses: StaleResponsePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var               | Default                 |
    /// |-----------------------|-------------------------|
    /// | `LUS_API_BASE_URL`    | `http://localhost:8000` |
    /// | `LUS_FPS`             | `30`                    |
    /// | `LUS_STALE_RESPONSES` | `accept`                |
    pub fn from_env() -> Self {
        let api_base_url = std::env::var("LUS_API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000".into())
            .trim_end_matches('/')
            .to_string();

        let fps: f64 = std::env::var("LUS_FPS")
            .unwrap_or_else(|_| DEFAULT_FPS.to_string())
            .parse()
            .expect("LUS_FPS must be a number");
        assert!(fps > 0.0, "LUS_FPS must be positive");

        let stale_responses = std::env::var("LUS_STALE_RESPONSES")
            .map(|v| v.parse().unwrap_or_else(|e: String| panic!("{e}")))
            .unwrap_or_default();

        Self {
            api_base_url,
            fps,
            stale_responses,
        }
    }
}
