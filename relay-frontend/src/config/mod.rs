use anyhow::{bail, Context};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Session keys are derived from this secret; anything shorter is guessable.
pub const MIN_SESSION_SECRET_LEN: usize = 32;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub session: SessionSettings,
    pub auth: AuthSettings,
    pub inference: InferenceSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Relative paths are resolved against the crate directory.
    #[serde(default = "default_static_dir")]
    pub static_dir: String,
    /// Base64 images are roughly a third larger than the camera frame they carry.
    /// Larger bodies are answered with 413.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
    /// `"*"` allows any origin.
    #[serde(default)]
    pub cors_allowed_origins: Vec<String>,
}

fn default_static_dir() -> String {
    "static".to_string()
}

fn default_max_body_bytes() -> usize {
    20 * 1024 * 1024
}

#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    pub secret: Secret<String>,
    /// Set to true when served over HTTPS.
    #[serde(default)]
    pub secure: bool,
    #[serde(default = "default_session_expiry_hours")]
    pub expiry_hours: i64,
}

fn default_session_expiry_hours() -> i64 {
    24
}

/// The single operator account allowed to use the relay.
#[derive(Deserialize, Clone)]
pub struct AuthSettings {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Deserialize, Clone)]
pub struct InferenceSettings {
    /// Base URL of the inference service, e.g. `http://inference:8000`.
    pub base_url: String,
    /// Unset keeps the HTTP client default of waiting indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize, Clone)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
            otlp_endpoint: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl ServerSettings {
    /// Anchor a relative `static_dir` at `crate_dir`, leaving absolute paths alone.
    pub fn resolve_static_dir(&mut self, crate_dir: &Path) {
        let static_dir = Path::new(&self.static_dir);
        if static_dir.is_relative() {
            self.static_dir = crate_dir.join(static_dir).to_string_lossy().into_owned();
        }
    }
}

impl Settings {
    /// Rejects settings that would start a server with no usable login or upstream.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.auth.username.trim().is_empty() {
            bail!("auth.username must not be empty");
        }
        if self.auth.password.expose_secret().is_empty() {
            bail!("auth.password must not be empty");
        }
        if self.session.secret.expose_secret().len() < MIN_SESSION_SECRET_LEN {
            bail!(
                "session.secret must be at least {} bytes",
                MIN_SESSION_SECRET_LEN
            );
        }
        if self.session.expiry_hours <= 0 {
            bail!("session.expiry_hours must be positive");
        }

        let url = reqwest::Url::parse(&self.inference.base_url)
            .with_context(|| format!("inference.base_url '{}' is not a URL", self.inference.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("inference.base_url must use http or https");
        }
        if self.inference.timeout_secs == Some(0) {
            bail!("inference.timeout_secs must be positive when set");
        }

        Ok(())
    }
}

fn crate_directory() -> anyhow::Result<PathBuf> {
    let base_path =
        std::env::current_dir().context("Failed to determine the current directory")?;

    // Allow running from the workspace root or from inside the crate.
    if base_path.ends_with("relay-frontend") {
        Ok(base_path)
    } else {
        Ok(base_path.join("relay-frontend"))
    }
}

pub fn get_configuration() -> anyhow::Result<Settings> {
    let crate_directory = crate_directory()?;
    let configuration_directory = crate_directory.join("config");

    let settings = config::Config::builder()
        .add_source(config::File::from(configuration_directory.join("base.yaml")).required(true))
        .add_source(
            config::Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("server.cors_allowed_origins")
                .try_parsing(true),
        )
        .build()?;

    let mut settings = settings.try_deserialize::<Settings>()?;
    settings.server.resolve_static_dir(&crate_directory);
    settings.validate()?;
    Ok(settings)
}
