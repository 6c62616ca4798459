use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LOGIN_URL: &str = "https://www.naukri.com/nlogin/login";
pub const DEFAULT_PROFILE_URL: &str = "https://www.naukri.com/mnjuser/profile";
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Missing credentials: set JOBUP_USERNAME and JOBUP_PASSWORD or fill the config file")]
    MissingCredentials,
}

/// Immutable run configuration, assembled once at startup and passed into the
/// orchestrator. Secrets normally arrive through the environment overrides
/// rather than the YAML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub login_url: String,
    pub profile_url: String,
    pub webdriver_url: String,
    pub headless: bool,
    pub username: String,
    pub password: String,
    /// Enables the basic-details step when present.
    pub mobile: Option<String>,
    pub resume: ResumeConfig,
    pub webhook_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeConfig {
    pub source: PathBuf,
    pub output: PathBuf,
    /// When false the source document is uploaded untouched.
    pub mutate: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            profile_url: DEFAULT_PROFILE_URL.to_string(),
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            username: String::new(),
            password: String::new(),
            mobile: None,
            resume: ResumeConfig::default(),
            webhook_url: None,
        }
    }
}

impl Default for ResumeConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("resume.pdf"),
            output: PathBuf::from("resume-updated.pdf"),
            mutate: true,
        }
    }
}

impl RunConfig {
    /// Environment variables take precedence over file values.
    pub fn apply_env(&mut self) {
        if let Ok(v) = std::env::var("JOBUP_USERNAME") {
            self.username = v;
        }
        if let Ok(v) = std::env::var("JOBUP_PASSWORD") {
            self.password = v;
        }
        if let Ok(v) = std::env::var("JOBUP_MOBILE") {
            self.mobile = Some(v);
        }
        if let Ok(v) = std::env::var("JOBUP_RESUME") {
            self.resume.source = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("JOBUP_RESUME_OUT") {
            self.resume.output = PathBuf::from(v);
        }
        if let Ok(v) = std::env::var("JOBUP_WEBHOOK_URL") {
            self.webhook_url = Some(v);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.username.is_empty() || self.password.is_empty() {
            return Err(ConfigError::MissingCredentials);
        }
        Ok(())
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load from default locations:
    /// 1. ./jobup.yaml
    /// 2. ~/.jobup/config.yaml
    /// 3. Default configuration
    pub async fn load_default() -> Result<RunConfig, ConfigError> {
        let local_config = PathBuf::from("./jobup.yaml");
        if local_config.exists() {
            return Self::load_from(&local_config).await;
        }

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".jobup").join("config.yaml");
            if home_config.exists() {
                return Self::load_from(&home_config).await;
            }
        }

        Ok(RunConfig::default())
    }

    pub async fn load_from(path: &Path) -> Result<RunConfig, ConfigError> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: RunConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}
