use crate::utils::error::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const API_KEY_ENV: &str = "OMICSAGENT_API_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub general: GeneralConfig,
    pub llm: LlmConfig,
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    pub upload_dir: PathBuf,
    pub results_dir: PathBuf,
    pub test_data_dir: PathBuf,
    #[serde(default)]
    pub prompt_dir: Option<PathBuf>,
    pub color: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub api_base: String,
    pub model: String,
    /// Model for image-bearing requests; falls back to the logic model
    #[serde(default)]
    pub vision_model: Option<String>,
    #[serde(
        default,
        serialize_with = "crate::utils::format::serialize_option_string",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub api_key: Option<String>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// External analysis runner; receives the serialized plan
    pub runner_cmd: String,
    #[serde(default)]
    pub cellranger_reference: Option<PathBuf>,
}

fn default_timeout() -> u64 {
    120
}

fn default_temperature() -> f32 {
    0.7
}

impl LlmConfig {
    /// Vision model when configured, otherwise the logic model
    pub fn resolve_vision_model(&self) -> &str {
        self.vision_model
            .as_deref()
            .filter(|m| !m.trim().is_empty())
            .unwrap_or(&self.model)
    }

    /// Config value first, environment variable second
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|k| !k.trim().is_empty())
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("omicsagent");

        Self {
            general: GeneralConfig {
                upload_dir: data_dir.join("uploads"),
                results_dir: data_dir.join("results"),
                test_data_dir: data_dir.join("test_data"),
                prompt_dir: None,
                color: true,
            },
            llm: LlmConfig {
                api_base: "https://api.siliconflow.cn/v1".to_string(),
                model: "deepseek-ai/DeepSeek-V3".to_string(),
                vision_model: None,
                api_key: None,
                timeout_secs: default_timeout(),
                temperature: default_temperature(),
            },
            tools: ToolsConfig {
                runner_cmd: "scanpy-runner".to_string(),
                cellranger_reference: None,
            },
        }
    }
}

/// Substitute `${VAR}` / `${VAR:default}` references in a string value
pub fn substitute_env_vars(value: &str) -> String {
    // Panics only on a malformed literal pattern, which is fixed at compile time
    let pattern = Regex::new(r"\$\{([^}:]+)(?::([^}]*))?\}").unwrap();
    pattern
        .replace_all(value, |caps: &regex::Captures| {
            let var_name = &caps[1];
            let default_value = caps.get(2).map(|m| m.as_str()).unwrap_or("");
            std::env::var(var_name).unwrap_or_else(|_| default_value.to_string())
        })
        .into_owned()
}

impl Config {
    pub fn load() -> AppResult<Self> {
        Self::load_custom(&Self::config_file_path())
    }

    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
        }
        Ok(())
    }

    pub fn load_custom(config_path: &std::path::Path) -> AppResult<Self> {
        if !config_path.exists() {
            let default_config = Config::default();
            default_config.save()?;
            return Ok(default_config);
        }

        let content =
            std::fs::read_to_string(config_path).map_err(|e| AppError::Io(e.to_string()))?;
        let content = substitute_env_vars(&content);

        let config: Config = toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.llm.api_base.is_empty() {
            return Err(AppError::Config("LLM api_base cannot be empty".to_string()));
        }

        if self.llm.model.is_empty() {
            return Err(AppError::Config("LLM model cannot be empty".to_string()));
        }

        if self.tools.runner_cmd.is_empty() {
            return Err(AppError::Config(
                "Runner command cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Fails when no API key can be resolved; called before any LLM use,
    /// not on plain config commands
    pub fn require_api_key(&self) -> AppResult<()> {
        if self.llm.resolve_api_key().is_none() {
            return Err(AppError::Config(format!(
                "API key is not set. Set it in the config file or export {}='your_api_key_here'",
                API_KEY_ENV
            )));
        }
        Ok(())
    }

    pub fn save(&self) -> AppResult<()> {
        let config_path = Self::config_file_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Io(e.to_string()))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(&config_path, content).map_err(|e| AppError::Io(e.to_string()))?;

        Ok(())
    }

    pub fn config_file_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("omicsagent")
            .join("config.toml")
    }
}
