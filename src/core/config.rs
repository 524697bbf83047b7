use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::env;
use url::Url;

/// Production API endpoint
pub const DEFAULT_API_URL: &str = "https://anypay.io/api";

/// Hosted payment page used for merchant links
pub const DEFAULT_MERCHANT_URL: &str = "https://anypay.io/merchant";

#[derive(Clone)]
pub struct AnyPayConfig {
    pub api_id: String,
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub project_id: Option<u64>,
    pub api_url: Option<String>,
    pub merchant_url: Option<String>,
}

impl std::fmt::Debug for AnyPayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnyPayConfig")
            .field("api_id", &self.api_id)
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("project_id", &self.project_id)
            .field("api_url", &self.api_url)
            .field("merchant_url", &self.merchant_url)
            .finish()
    }
}

// Secrets never leave the process through serialization
impl Serialize for AnyPayConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("AnyPayConfig", 6)?;
        state.serialize_field("api_id", &self.api_id)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field("project_id", &self.project_id)?;
        state.serialize_field("api_url", &self.api_url)?;
        state.serialize_field("merchant_url", &self.merchant_url)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for AnyPayConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct AnyPayConfigHelper {
            api_id: String,
            api_key: String,
            secret_key: String,
            #[serde(default)]
            project_id: Option<u64>,
            #[serde(default)]
            api_url: Option<String>,
            #[serde(default)]
            merchant_url: Option<String>,
        }

        let helper = AnyPayConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_id: helper.api_id,
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            project_id: helper.project_id,
            api_url: helper.api_url,
            merchant_url: helper.merchant_url,
        })
    }
}

impl AnyPayConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(
        api_id: impl Into<String>,
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            api_id: api_id.into(),
            api_key: Secret::new(api_key.into()),
            secret_key: Secret::new(secret_key.into()),
            project_id: None,
            api_url: None,
            merchant_url: None,
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{PREFIX}_API_ID`
    /// - `{PREFIX}_API_KEY`
    /// - `{PREFIX}_SECRET_KEY`
    /// - `{PREFIX}_PROJECT_ID` (optional)
    /// - `{PREFIX}_API_URL` (optional)
    /// - `{PREFIX}_MERCHANT_URL` (optional)
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let prefix = prefix.to_uppercase();
        let required = |name: &str| {
            let var = format!("{}_{}", prefix, name);
            env::var(&var).map_err(|_| ConfigError::MissingEnvironmentVariable(var))
        };
        let optional = |name: &str| env::var(format!("{}_{}", prefix, name)).ok();

        let api_id = required("API_ID")?;
        let api_key = required("API_KEY")?;
        let secret_key = required("SECRET_KEY")?;

        let project_id = optional("PROJECT_ID")
            .map(|raw| {
                raw.trim().parse::<u64>().map_err(|e| {
                    ConfigError::InvalidConfiguration(format!(
                        "{}_PROJECT_ID is not a project number: {}",
                        prefix, e
                    ))
                })
            })
            .transpose()?;

        Ok(Self {
            api_id,
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            project_id,
            api_url: optional("API_URL"),
            merchant_url: optional("MERCHANT_URL"),
        })
    }

    /// Create configuration from a `.env` file and environment variables
    ///
    /// A missing `.env` file is not an error; system variables are used instead.
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(prefix, ".env")
    }

    /// Create configuration from a specific `.env` file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(prefix: &str, env_file_path: &str) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(prefix)
    }

    /// Set the project used by project-scoped methods when no id is passed explicitly
    #[must_use]
    pub const fn project_id(mut self, project_id: u64) -> Self {
        self.project_id = Some(project_id);
        self
    }

    /// Override the API base URL
    #[must_use]
    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    /// Override the merchant payment page URL
    #[must_use]
    pub fn merchant_url(mut self, merchant_url: impl Into<String>) -> Self {
        self.merchant_url = Some(merchant_url.into());
        self
    }

    /// Check that every credential is present and every URL parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("api_id"));
        }
        if self.api_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingCredential("api_key"));
        }
        if self.secret_key.expose_secret().is_empty() {
            return Err(ConfigError::MissingCredential("secret_key"));
        }

        for (name, value) in [
            ("api_url", self.resolved_api_url()),
            ("merchant_url", self.resolved_merchant_url()),
        ] {
            Url::parse(value).map_err(|e| {
                ConfigError::InvalidConfiguration(format!("{} '{}' is not a URL: {}", name, value, e))
            })?;
        }

        Ok(())
    }

    /// API base URL without a trailing slash
    pub fn resolved_api_url(&self) -> &str {
        self.api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    pub fn resolved_merchant_url(&self) -> &str {
        self.merchant_url.as_deref().unwrap_or(DEFAULT_MERCHANT_URL)
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}
