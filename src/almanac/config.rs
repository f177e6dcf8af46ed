use std::env;
use std::time::Duration;

use crate::almanac::apod;
use crate::gemini::client;

/// How the facts and photograph fetches are composed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompositionStrategy {
    /// Facts first; the photograph is requested only after facts succeed,
    /// and its failure never disturbs the facts already on display.
    #[default]
    Dependent,
    /// Both at once; each slot loads, settles, and fails on its own.
    ParallelIndependent,
    /// Both at once; if either fails, both results are discarded and one
    /// combined error is surfaced.
    ParallelJoined,
}

/// Where the photograph comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PhotoSource {
    #[default]
    Model,
    ImageOfTheDay,
}

/// What to do with illumination values outside 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IlluminationPolicy {
    /// Keep the raw value; the 0-100 range is advisory.
    #[default]
    PassThrough,
    Clamp,
    Reject,
}

#[derive(Debug, Clone)]
pub struct AlmanacConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub strategy: CompositionStrategy,
    pub photo_source: PhotoSource,
    pub illumination: IlluminationPolicy,
    /// Ask the model to ground lunar facts with its web-search tool.
    pub web_search: bool,
    /// Prefer schema-constrained responses over fence extraction.
    pub response_schema: bool,
    pub request_timeout: Duration,
    pub apod_url: String,
    pub apod_api_key: String,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            model: client::DEFAULT_MODEL.to_string(),
            api_key: None,
            strategy: CompositionStrategy::default(),
            photo_source: PhotoSource::default(),
            illumination: IlluminationPolicy::default(),
            web_search: true,
            response_schema: false,
            request_timeout: Duration::from_secs(15),
            apod_url: apod::APOD_URL.to_string(),
            apod_api_key: apod::DEMO_API_KEY.to_string(),
        }
    }
}

fn env_non_empty(var: &str) -> Option<String> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Some(v.trim().to_string()),
        _ => None,
    }
}

impl AlmanacConfig {
    /// Defaults plus the model credential (and optional model override) from
    /// the environment.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        cfg.api_key = env_non_empty("GEMINI_API_KEY").or_else(|| env_non_empty("AI_API_KEY"));
        if let Some(model) = env_non_empty("GEMINI_MODEL") {
            cfg.model = model;
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::{AlmanacConfig, CompositionStrategy, IlluminationPolicy, PhotoSource};
    use std::time::Duration;

    #[test]
    fn defaults_are_dependent_model_sourced_pass_through() {
        let cfg = AlmanacConfig::default();
        assert_eq!(cfg.strategy, CompositionStrategy::Dependent);
        assert_eq!(cfg.photo_source, PhotoSource::Model);
        assert_eq!(cfg.illumination, IlluminationPolicy::PassThrough);
        assert!(cfg.web_search);
        assert!(!cfg.response_schema);
        assert_eq!(cfg.request_timeout, Duration::from_secs(15));
        assert_eq!(cfg.apod_api_key, "DEMO_KEY");
    }
}
