use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::ScoringConfig;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub mail: MailConfig,
    pub llm: LlmConfig,
    pub server: ServerConfig,
    pub demo: DemoConfig,
    pub scoring: ScoringConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct MailConfig {
    /// Base URL of the email-API provider, without a trailing slash.
    pub base_url: String,
    pub api_key: SecretString,
    /// Shared secret for webhook HMAC verification. Unset means unsigned
    /// payloads are accepted (local demos without provider configuration).
    pub webhook_secret: Option<String>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub provider: LlmProvider,
    pub api_key: Option<SecretString>,
    pub base_url: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DemoConfig {
    /// Externally reachable base URL registered as the webhook target.
    /// Unset degrades to poll-only mode (no inbound-triggered replies).
    pub public_base_url: Option<String>,
    pub max_exchanges: u32,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    OpenAi,
    Anthropic,
    Ollama,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub database_url: Option<String>,
    pub log_level: Option<String>,
    pub llm_provider: Option<LlmProvider>,
    pub llm_model: Option<String>,
    pub mail_base_url: Option<String>,
    pub mail_api_key: Option<String>,
    pub public_base_url: Option<String>,
    pub max_exchanges: Option<u32>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                url: "sqlite://mailduet.db".to_string(),
                max_connections: 5,
                timeout_secs: 30,
            },
            mail: MailConfig {
                base_url: "https://api.inboxrelay.io/v1".to_string(),
                api_key: String::new().into(),
                webhook_secret: None,
                timeout_secs: 15,
            },
            llm: LlmConfig {
                provider: LlmProvider::Ollama,
                api_key: None,
                base_url: Some("http://localhost:11434".to_string()),
                model: "llama3.1".to_string(),
                timeout_secs: 45,
            },
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 8080 },
            demo: DemoConfig { public_base_url: None, max_exchanges: 6 },
            scoring: ScoringConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LlmProvider {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            other => Err(ConfigError::Validation(format!(
                "unsupported llm provider `{other}` (expected openai|anthropic|ollama)"
            ))),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("mailduet.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(database) = patch.database {
            if let Some(url) = database.url {
                self.database.url = url;
            }
            if let Some(max_connections) = database.max_connections {
                self.database.max_connections = max_connections;
            }
            if let Some(timeout_secs) = database.timeout_secs {
                self.database.timeout_secs = timeout_secs;
            }
        }

        if let Some(mail) = patch.mail {
            if let Some(base_url) = mail.base_url {
                self.mail.base_url = base_url;
            }
            if let Some(mail_api_key_value) = mail.api_key {
                self.mail.api_key = secret_value(mail_api_key_value);
            }
            if let Some(webhook_secret) = mail.webhook_secret {
                self.mail.webhook_secret = Some(webhook_secret);
            }
            if let Some(timeout_secs) = mail.timeout_secs {
                self.mail.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(provider) = llm.provider {
                self.llm.provider = provider;
            }
            if let Some(llm_api_key_value) = llm.api_key {
                self.llm.api_key = Some(secret_value(llm_api_key_value));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = Some(base_url);
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(demo) = patch.demo {
            if let Some(public_base_url) = demo.public_base_url {
                self.demo.public_base_url = Some(public_base_url);
            }
            if let Some(max_exchanges) = demo.max_exchanges {
                self.demo.max_exchanges = max_exchanges;
            }
        }

        if let Some(scoring) = patch.scoring {
            if let Some(weight) = scoring.industry_match {
                self.scoring.weights.industry_match = weight;
            }
            if let Some(weight) = scoring.company_size {
                self.scoring.weights.company_size = weight;
            }
            if let Some(weight) = scoring.geographic_match {
                self.scoring.weights.geographic_match = weight;
            }
            if let Some(weight) = scoring.need_intent {
                self.scoring.weights.need_intent = weight;
            }
            if let Some(weight) = scoring.timing {
                self.scoring.weights.timing = weight;
            }
            if let Some(weight) = scoring.budget_range {
                self.scoring.weights.budget_range = weight;
            }
            if let Some(weight) = scoring.authority {
                self.scoring.weights.authority = weight;
            }
            if let Some(weight) = scoring.stack_compatibility {
                self.scoring.weights.stack_compatibility = weight;
            }
            if let Some(threshold) = scoring.propose_threshold {
                self.scoring.propose_threshold = threshold;
            }
            if let Some(threshold) = scoring.clarify_threshold {
                self.scoring.clarify_threshold = threshold;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("MAILDUET_DATABASE_URL") {
            self.database.url = value;
        }
        if let Some(value) = read_env("MAILDUET_DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_u32("MAILDUET_DATABASE_MAX_CONNECTIONS", &value)?;
        }
        if let Some(value) = read_env("MAILDUET_DATABASE_TIMEOUT_SECS") {
            self.database.timeout_secs = parse_u64("MAILDUET_DATABASE_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MAILDUET_MAIL_BASE_URL") {
            self.mail.base_url = value;
        }
        if let Some(value) = read_env("MAILDUET_MAIL_API_KEY") {
            self.mail.api_key = secret_value(value);
        }
        if let Some(value) = read_env("MAILDUET_MAIL_WEBHOOK_SECRET") {
            self.mail.webhook_secret = Some(value);
        }
        if let Some(value) = read_env("MAILDUET_MAIL_TIMEOUT_SECS") {
            self.mail.timeout_secs = parse_u64("MAILDUET_MAIL_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MAILDUET_LLM_PROVIDER") {
            self.llm.provider = value.parse()?;
        }
        if let Some(value) = read_env("MAILDUET_LLM_API_KEY") {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("MAILDUET_LLM_BASE_URL") {
            self.llm.base_url = Some(value);
        }
        if let Some(value) = read_env("MAILDUET_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("MAILDUET_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("MAILDUET_LLM_TIMEOUT_SECS", &value)?;
        }

        if let Some(value) = read_env("MAILDUET_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("MAILDUET_SERVER_PORT") {
            self.server.port = parse_u16("MAILDUET_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("MAILDUET_DEMO_PUBLIC_BASE_URL") {
            self.demo.public_base_url = Some(value);
        }
        if let Some(value) = read_env("MAILDUET_DEMO_MAX_EXCHANGES") {
            self.demo.max_exchanges = parse_u32("MAILDUET_DEMO_MAX_EXCHANGES", &value)?;
        }

        let log_level =
            read_env("MAILDUET_LOGGING_LEVEL").or_else(|| read_env("MAILDUET_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("MAILDUET_LOGGING_FORMAT").or_else(|| read_env("MAILDUET_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(database_url) = overrides.database_url {
            self.database.url = database_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(llm_provider) = overrides.llm_provider {
            self.llm.provider = llm_provider;
        }
        if let Some(llm_model) = overrides.llm_model {
            self.llm.model = llm_model;
        }
        if let Some(mail_base_url) = overrides.mail_base_url {
            self.mail.base_url = mail_base_url;
        }
        if let Some(mail_api_key) = overrides.mail_api_key {
            self.mail.api_key = secret_value(mail_api_key);
        }
        if let Some(public_base_url) = overrides.public_base_url {
            self.demo.public_base_url = Some(public_base_url);
        }
        if let Some(max_exchanges) = overrides.max_exchanges {
            self.demo.max_exchanges = max_exchanges;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_database(&self.database)?;
        validate_mail(&self.mail)?;
        validate_llm(&self.llm)?;
        validate_server(&self.server)?;
        validate_demo(&self.demo)?;
        self.scoring.validate().map_err(|error| ConfigError::Validation(error.to_string()))?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("mailduet.toml"), PathBuf::from("config/mailduet.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_database(database: &DatabaseConfig) -> Result<(), ConfigError> {
    let url = database.url.trim();
    let sqlite_url =
        url.starts_with("sqlite://") || url.starts_with("sqlite::") || url == ":memory:";
    if !sqlite_url {
        return Err(ConfigError::Validation(
            "database.url must be a sqlite URL (`sqlite://...`, `sqlite::...`, or `:memory:`)"
                .to_string(),
        ));
    }

    if database.max_connections == 0 {
        return Err(ConfigError::Validation(
            "database.max_connections must be greater than zero".to_string(),
        ));
    }

    if database.timeout_secs == 0 || database.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "database.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    Ok(())
}

fn validate_mail(mail: &MailConfig) -> Result<(), ConfigError> {
    if !mail.base_url.starts_with("http://") && !mail.base_url.starts_with("https://") {
        return Err(ConfigError::Validation(
            "mail.base_url must start with http:// or https://".to_string(),
        ));
    }

    if mail.api_key.expose_secret().trim().is_empty() {
        return Err(ConfigError::Validation(
            "mail.api_key is required. Create one in your email-API provider dashboard"
                .to_string(),
        ));
    }

    if mail.timeout_secs == 0 || mail.timeout_secs > 120 {
        return Err(ConfigError::Validation(
            "mail.timeout_secs must be in range 1..=120".to_string(),
        ));
    }

    Ok(())
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    if llm.timeout_secs == 0 || llm.timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "llm.timeout_secs must be in range 1..=300".to_string(),
        ));
    }

    if llm.model.trim().is_empty() {
        return Err(ConfigError::Validation("llm.model must not be empty".to_string()));
    }

    match llm.provider {
        LlmProvider::OpenAi | LlmProvider::Anthropic => {
            let missing = llm
                .api_key
                .as_ref()
                .map(|value| value.expose_secret().trim().is_empty())
                .unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.api_key is required for openai/anthropic providers".to_string(),
                ));
            }
        }
        LlmProvider::Ollama => {
            let missing =
                llm.base_url.as_ref().map(|value| value.trim().is_empty()).unwrap_or(true);
            if missing {
                return Err(ConfigError::Validation(
                    "llm.base_url is required for ollama provider".to_string(),
                ));
            }
        }
    }

    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation(
            "server.bind_address must not be empty".to_string(),
        ));
    }

    Ok(())
}

fn validate_demo(demo: &DemoConfig) -> Result<(), ConfigError> {
    if demo.max_exchanges == 0 || demo.max_exchanges > 50 {
        return Err(ConfigError::Validation(
            "demo.max_exchanges must be in range 1..=50".to_string(),
        ));
    }

    if let Some(base_url) = &demo.public_base_url {
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(ConfigError::Validation(
                "demo.public_base_url must start with http:// or https://".to_string(),
            ));
        }
    }

    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    database: Option<DatabasePatch>,
    mail: Option<MailPatch>,
    llm: Option<LlmPatch>,
    server: Option<ServerPatch>,
    demo: Option<DemoPatch>,
    scoring: Option<ScoringPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabasePatch {
    url: Option<String>,
    max_connections: Option<u32>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct MailPatch {
    base_url: Option<String>,
    api_key: Option<String>,
    webhook_secret: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    provider: Option<LlmProvider>,
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DemoPatch {
    public_base_url: Option<String>,
    max_exchanges: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct ScoringPatch {
    industry_match: Option<u8>,
    company_size: Option<u8>,
    geographic_match: Option<u8>,
    need_intent: Option<u8>,
    timing: Option<u8>,
    budget_range: Option<u8>,
    authority: Option<u8>,
    stack_compatibility: Option<u8>,
    propose_threshold: Option<u8>,
    clarify_threshold: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_MAIL_API_KEY", "ir-key-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("mailduet.toml");
            fs::write(
                &path,
                r#"
[mail]
api_key = "${TEST_MAIL_API_KEY}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.mail.api_key.expose_secret() == "ir-key-from-env",
                "mail api key should be loaded from environment",
            )?;
            Ok(())
        })();

        clear_vars(&["TEST_MAIL_API_KEY"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MAILDUET_MAIL_API_KEY", "ir-test-key");
        env::set_var("MAILDUET_LOG_LEVEL", "warn");
        env::set_var("MAILDUET_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["MAILDUET_MAIL_API_KEY", "MAILDUET_LOG_LEVEL", "MAILDUET_LOG_FORMAT"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MAILDUET_DATABASE_URL", "sqlite://from-env.db");
        env::set_var("MAILDUET_MAIL_API_KEY", "ir-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("mailduet.toml");
            fs::write(
                &path,
                r#"
[database]
url = "sqlite://from-file.db"

[mail]
api_key = "ir-from-file"

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    database_url: Some("sqlite://from-override.db".to_string()),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.database.url == "sqlite://from-override.db",
                "override database url should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(
                config.mail.api_key.expose_secret() == "ir-from-env",
                "env mail api key should win over file and defaults",
            )?;
            Ok(())
        })();

        clear_vars(&["MAILDUET_DATABASE_URL", "MAILDUET_MAIL_API_KEY"]);
        result
    }

    #[test]
    fn validation_fails_fast_with_actionable_error() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        clear_vars(&["MAILDUET_MAIL_API_KEY"]);

        let result = (|| -> Result<(), String> {
            let error = match AppConfig::load(LoadOptions::default()) {
                Ok(_) => {
                    return Err("expected validation failure but config load succeeded".to_string())
                }
                Err(error) => error,
            };
            let has_message = matches!(
                error,
                ConfigError::Validation(ref message) if message.contains("mail.api_key")
            );
            ensure(has_message, "validation failure should mention mail.api_key")
        })();

        result
    }

    #[test]
    fn unbalanced_scoring_weights_fail_validation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MAILDUET_MAIL_API_KEY", "ir-test-key");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("mailduet.toml");
            fs::write(
                &path,
                r#"
[scoring]
industry_match = 40
"#,
            )
            .map_err(|err| err.to_string())?;

            let error = match AppConfig::load(LoadOptions {
                config_path: Some(path),
                ..LoadOptions::default()
            }) {
                Ok(_) => return Err("expected weight-sum validation failure".to_string()),
                Err(error) => error,
            };
            ensure(
                matches!(error, ConfigError::Validation(ref message) if message.contains("sum to 100")),
                "validation failure should mention the weight sum",
            )
        })();

        clear_vars(&["MAILDUET_MAIL_API_KEY"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("MAILDUET_MAIL_API_KEY", "ir-secret-value");
        env::set_var("MAILDUET_LLM_API_KEY", "llm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("ir-secret-value"),
                "debug output should not contain the mail api key",
            )?;
            ensure(
                !debug.contains("llm-secret-value"),
                "debug output should not contain the llm api key",
            )?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["MAILDUET_MAIL_API_KEY", "MAILDUET_LLM_API_KEY"]);
        result
    }
}
