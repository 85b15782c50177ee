#[cfg(feature = "cli")]
pub mod cli;
pub mod env;
pub mod toml_config;

pub use crate::domain::ports::{ConfigProvider, GenerationSettings};

pub const DEFAULT_QLOO_BASE_URL: &str = "https://hackathon.api.qloo.com";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;
pub const DEFAULT_CORS_ORIGIN: &str = "*";

/// 空字串或未替換的 `${VAR}` 佔位符都視為未設定
pub(crate) fn normalize_secret(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && !(v.starts_with("${") && v.ends_with('}')))
}

pub(crate) fn validate_provider<C: ConfigProvider + ?Sized>(
    config: &C,
) -> crate::utils::error::Result<()> {
    use crate::utils::validation::*;

    validate_url("qloo.base_url", config.qloo_base_url())?;
    validate_url("gemini.base_url", config.gemini_base_url())?;
    validate_url("openai.base_url", config.openai_base_url())?;
    validate_non_empty_string("gemini.model", config.gemini_model())?;
    validate_non_empty_string("openai.model", config.openai_model())?;
    validate_non_empty_string("http.allow_origin", config.cors_allow_origin())?;

    let generation = config.generation();
    validate_range("generation.temperature", generation.temperature, 0.0, 2.0)?;
    validate_range("generation.top_p", generation.top_p, 0.0, 1.0)?;
    validate_range("generation.top_k", generation.top_k, 1, 1000)?;
    validate_range(
        "generation.max_output_tokens",
        generation.max_output_tokens,
        1,
        32768,
    )?;
    validate_range("http.timeout_seconds", config.request_timeout_secs(), 1, 300)?;

    if config.gemini_api_key().is_none() && config.openai_api_key().is_none() {
        tracing::warn!("⚠️ No LLM API key configured; onboarding will use canned replies");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_secret() {
        assert_eq!(normalize_secret(Some(" abc ".to_string())), Some("abc".to_string()));
        assert_eq!(normalize_secret(Some("".to_string())), None);
        assert_eq!(normalize_secret(Some("${QLOO_API_KEY}".to_string())), None);
        assert_eq!(normalize_secret(None), None);
    }
}
