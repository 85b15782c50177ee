use crate::config::*;
use crate::utils::error::Result;
use crate::utils::validation::Validate;
use std::env;

/// Settings read from the function's environment variables.
#[derive(Debug, Clone)]
pub struct EnvConfig {
    pub qloo_api_key: Option<String>,
    pub qloo_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_base_url: String,
    pub gemini_model: String,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub generation: GenerationSettings,
    pub request_timeout_secs: u64,
    pub mock_insights_fallback: bool,
    pub cors_allow_origin: String,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            qloo_api_key: None,
            qloo_base_url: DEFAULT_QLOO_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            openai_model: DEFAULT_OPENAI_MODEL.to_string(),
            generation: GenerationSettings::default(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECONDS,
            mock_insights_fallback: true,
            cors_allow_origin: DEFAULT_CORS_ORIGIN.to_string(),
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 以任意查詢函式建立配置，方便測試時不必修改行程環境變數
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let text = |key: &str, default: String| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or(default)
        };

        let request_timeout_secs = parse_or(
            "REQUEST_TIMEOUT_SECONDS",
            lookup("REQUEST_TIMEOUT_SECONDS"),
            defaults.request_timeout_secs,
        )?;
        let mock_insights_fallback = match lookup("MOCK_INSIGHTS_FALLBACK") {
            Some(v) => parse_bool("MOCK_INSIGHTS_FALLBACK", &v)?,
            None => defaults.mock_insights_fallback,
        };

        Ok(Self {
            qloo_api_key: normalize_secret(lookup("QLOO_API_KEY")),
            qloo_base_url: text("QLOO_API_URL", defaults.qloo_base_url),
            gemini_api_key: normalize_secret(lookup("GEMINI_API_KEY")),
            gemini_base_url: text("GEMINI_API_URL", defaults.gemini_base_url),
            gemini_model: text("GEMINI_MODEL", defaults.gemini_model),
            openai_api_key: normalize_secret(lookup("OPENAI_API_KEY")),
            openai_base_url: text("OPENAI_API_URL", defaults.openai_base_url),
            openai_model: text("OPENAI_MODEL", defaults.openai_model),
            generation: defaults.generation,
            request_timeout_secs,
            mock_insights_fallback,
            cors_allow_origin: text("CORS_ALLOW_ORIGIN", defaults.cors_allow_origin),
        })
    }
}

fn parse_or<T: std::str::FromStr>(field: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(v) => v
            .parse()
            .map_err(|_| crate::utils::error::OrchestratorError::InvalidConfigValueError {
                field: field.to_string(),
                value: v.clone(),
                reason: "Value is not a valid number".to_string(),
            }),
        None => Ok(default),
    }
}

fn parse_bool(field: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(
            crate::utils::error::OrchestratorError::InvalidConfigValueError {
                field: field.to_string(),
                value: other.to_string(),
                reason: "Expected true or false".to_string(),
            },
        ),
    }
}

impl ConfigProvider for EnvConfig {
    fn qloo_api_key(&self) -> Option<&str> {
        self.qloo_api_key.as_deref()
    }

    fn qloo_base_url(&self) -> &str {
        &self.qloo_base_url
    }

    fn gemini_api_key(&self) -> Option<&str> {
        self.gemini_api_key.as_deref()
    }

    fn gemini_base_url(&self) -> &str {
        &self.gemini_base_url
    }

    fn gemini_model(&self) -> &str {
        &self.gemini_model
    }

    fn openai_api_key(&self) -> Option<&str> {
        self.openai_api_key.as_deref()
    }

    fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }

    fn openai_model(&self) -> &str {
        &self.openai_model
    }

    fn generation(&self) -> GenerationSettings {
        self.generation
    }

    fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    fn mock_insights_fallback(&self) -> bool {
        self.mock_insights_fallback
    }

    fn cors_allow_origin(&self) -> &str {
        &self.cors_allow_origin
    }
}

impl Validate for EnvConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)?;
        tracing::debug!("✅ Environment configuration validation passed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_environment() {
        let config = EnvConfig::from_lookup(|_| None).unwrap();

        assert_eq!(config.qloo_base_url(), DEFAULT_QLOO_BASE_URL);
        assert_eq!(config.gemini_model(), "gemini-1.5-flash");
        assert!(config.gemini_api_key().is_none());
        assert!(config.mock_insights_fallback());
        assert_eq!(config.request_timeout_secs(), 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_reads_keys_and_overrides() {
        let config = EnvConfig::from_lookup(lookup_from(&[
            ("QLOO_API_KEY", "q-key"),
            ("GEMINI_API_KEY", ""),
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_MODEL", "gpt-4o-mini"),
            ("REQUEST_TIMEOUT_SECONDS", "12"),
            ("MOCK_INSIGHTS_FALLBACK", "false"),
        ]))
        .unwrap();

        assert_eq!(config.qloo_api_key(), Some("q-key"));
        assert_eq!(config.gemini_api_key(), None);
        assert_eq!(config.openai_api_key(), Some("sk-test"));
        assert_eq!(config.openai_model(), "gpt-4o-mini");
        assert_eq!(config.request_timeout_secs(), 12);
        assert!(!config.mock_insights_fallback());
    }

    #[test]
    fn test_invalid_values_are_reported() {
        let err = EnvConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECONDS", "soon")]))
            .unwrap_err();
        assert!(err.to_string().contains("REQUEST_TIMEOUT_SECONDS"));

        assert!(
            EnvConfig::from_lookup(lookup_from(&[("MOCK_INSIGHTS_FALLBACK", "maybe")])).is_err()
        );

        let config = EnvConfig::from_lookup(lookup_from(&[("QLOO_API_URL", "not a url")])).unwrap();
        assert!(config.validate().is_err());
    }
}
