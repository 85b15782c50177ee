use crate::config::*;
use crate::utils::error::{OrchestratorError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub qloo: QlooSection,
    #[serde(default)]
    pub gemini: ModelSection,
    #[serde(default)]
    pub openai: ModelSection,
    pub generation: Option<GenerationSection>,
    pub http: Option<HttpSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QlooSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub mock_fallback: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelSection {
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSection {
    pub temperature: Option<f32>,
    pub top_k: Option<u32>,
    pub top_p: Option<f32>,
    pub max_output_tokens: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpSection {
    pub timeout_seconds: Option<u64>,
    pub allow_origin: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(OrchestratorError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        let mut config: TomlConfig =
            toml::from_str(&processed_content).map_err(|e| OrchestratorError::ConfigError {
                message: format!("TOML parsing error: {}", e),
            })?;

        config.qloo.api_key = normalize_secret(config.qloo.api_key.take());
        config.gemini.api_key = normalize_secret(config.gemini.api_key.take());
        config.openai.api_key = normalize_secret(config.openai.api_key.take());

        Ok(config)
    }

    /// 替換環境變數 (例如 ${API_KEY})；找不到的變數保留原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| OrchestratorError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }
}

impl ConfigProvider for TomlConfig {
    fn qloo_api_key(&self) -> Option<&str> {
        self.qloo.api_key.as_deref()
    }

    fn qloo_base_url(&self) -> &str {
        self.qloo.base_url.as_deref().unwrap_or(DEFAULT_QLOO_BASE_URL)
    }

    fn gemini_api_key(&self) -> Option<&str> {
        self.gemini.api_key.as_deref()
    }

    fn gemini_base_url(&self) -> &str {
        self.gemini
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_GEMINI_BASE_URL)
    }

    fn gemini_model(&self) -> &str {
        self.gemini.model.as_deref().unwrap_or(DEFAULT_GEMINI_MODEL)
    }

    fn openai_api_key(&self) -> Option<&str> {
        self.openai.api_key.as_deref()
    }

    fn openai_base_url(&self) -> &str {
        self.openai
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    fn openai_model(&self) -> &str {
        self.openai.model.as_deref().unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    fn generation(&self) -> GenerationSettings {
        let defaults = GenerationSettings::default();
        match &self.generation {
            Some(g) => GenerationSettings {
                temperature: g.temperature.unwrap_or(defaults.temperature),
                top_k: g.top_k.unwrap_or(defaults.top_k),
                top_p: g.top_p.unwrap_or(defaults.top_p),
                max_output_tokens: g.max_output_tokens.unwrap_or(defaults.max_output_tokens),
            },
            None => defaults,
        }
    }

    fn request_timeout_secs(&self) -> u64 {
        self.http
            .as_ref()
            .and_then(|h| h.timeout_seconds)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    fn mock_insights_fallback(&self) -> bool {
        self.qloo.mock_fallback.unwrap_or(true)
    }

    fn cors_allow_origin(&self) -> &str {
        self.http
            .as_ref()
            .and_then(|h| h.allow_origin.as_deref())
            .unwrap_or(DEFAULT_CORS_ORIGIN)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        validate_provider(self)
    }
}
