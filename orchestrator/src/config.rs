use crate::agents::gemini::DEFAULT_BASE_URL;
use crate::agents::{GeminiConfig, ModelTiers};
use crate::pipeline::PipelineSettings;
use anyhow::{bail, Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub google_api_key: String,
    pub gemini_base_url: String,
    pub fast_model: String,
    pub robust_model: String,
    pub stage_timeout_secs: u64,
    pub cors_origin: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Reads the process environment. `.env` is loaded once by `main` beforehand.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup; `from_env` passes the
    /// process environment.
    pub fn from_lookup<F>(get: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let google_api_key = get("GOOGLE_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .context("GOOGLE_API_KEY is not set; the model provider cannot be reached without it")?;

        let cors_origin = get("CORS_ORIGIN").filter(|o| !o.trim().is_empty());
        if let Some(origin) = &cors_origin {
            if !(origin.starts_with("http://") || origin.starts_with("https://")) {
                bail!("CORS_ORIGIN must be an http(s) origin, got '{}'", origin);
            }
        }

        Ok(Config {
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            google_api_key,
            gemini_base_url: get("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            fast_model: get("FAST_MODEL")
                .unwrap_or_else(|| "gemini-2.0-flash".to_string()),
            robust_model: get("ROBUST_MODEL")
                .unwrap_or_else(|| "gemini-2.5-pro".to_string()),
            stage_timeout_secs: get("STAGE_TIMEOUT_SECS")
                .unwrap_or_else(|| "180".to_string())
                .parse()
                .context("STAGE_TIMEOUT_SECS must be a whole number of seconds")?,
            cors_origin,
            log_level: get("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }

    pub fn gemini_config(&self) -> GeminiConfig {
        GeminiConfig::new(self.google_api_key.clone()).with_base_url(self.gemini_base_url.clone())
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            models: ModelTiers::new(self.fast_model.clone(), self.robust_model.clone()),
            stage_timeout: Duration::from_secs(self.stage_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "k")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.gemini_base_url, DEFAULT_BASE_URL);
        assert_eq!(config.stage_timeout_secs, 180);
        assert_eq!(config.cors_origin, None);
        assert_eq!(config.log_level, "info");

        let settings = config.pipeline_settings();
        assert_eq!(settings.models.fast, "gemini-2.0-flash");
        assert_eq!(settings.models.robust, "gemini-2.5-pro");
        assert_eq!(settings.stage_timeout, Duration::from_secs(180));
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        assert!(Config::from_lookup(lookup(&[])).is_err());
        assert!(Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "  ")])).is_err());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("GOOGLE_API_KEY", "k"),
            ("PORT", "9000"),
            ("FAST_MODEL", "flash-x"),
            ("ROBUST_MODEL", "pro-x"),
            ("STAGE_TIMEOUT_SECS", "30"),
            ("GEMINI_BASE_URL", "http://localhost:1234"),
            ("CORS_ORIGIN", "https://app.example"),
            ("LOG_LEVEL", "debug"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9000);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.cors_origin.as_deref(), Some("https://app.example"));
        assert_eq!(config.gemini_config().base_url, "http://localhost:1234");
        assert_eq!(config.gemini_config().api_key, "k");
        assert_eq!(config.pipeline_settings().models.resolve(crate::agents::ModelTier::Robust), "pro-x");
    }

    #[test]
    fn test_malformed_values() {
        assert!(Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "k"), ("PORT", "http")])).is_err());
        assert!(
            Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "k"), ("STAGE_TIMEOUT_SECS", "-1")]))
                .is_err()
        );
        assert!(
            Config::from_lookup(lookup(&[("GOOGLE_API_KEY", "k"), ("CORS_ORIGIN", "example.com")]))
                .is_err()
        );
    }
}
