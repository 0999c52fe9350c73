//! Configuration types for the `routekit` server.

use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Errors raised while assembling configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("authentication secret must not be empty")]
    MissingSecret,
    #[error("request timeout must be at least one second")]
    ZeroTimeout,
}

// ---------------------------------------------------------------------------
// AuthConfig
// ---------------------------------------------------------------------------

/// Settings shared by every bearer-authenticated route.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC secret used to verify (and, in tests, sign) HS256 tokens.
    pub secret_key: String,
    /// Expected `iss` claim. `None` disables issuer checking.
    pub issuer: Option<String>,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub leeway_secs: u64,
}

impl AuthConfig {
    /// Creates a config with the given secret, no issuer, and default leeway.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            issuer: None,
            leeway_secs: 30,
        }
    }

    /// Checks the invariants the verifier relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSecret`] if the secret is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.is_empty() {
            return Err(ConfigError::MissingSecret);
        }
        Ok(())
    }
}

// The secret never reaches logs.
impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret_key", &"<redacted>")
            .field("issuer", &self.issuer)
            .field("leeway_secs", &self.leeway_secs)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// NetworkConfig
// ---------------------------------------------------------------------------

/// Listener and transport-level settings.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Bind address for the server.
    pub host: String,
    /// Port to listen on. 0 means OS-assigned.
    pub port: u16,
    /// Allowed CORS origins. `"*"` allows any origin.
    pub cors_origins: Vec<String>,
    /// Maximum time to wait for a request to complete.
    pub request_timeout: Duration,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 0,
            cors_origins: vec!["*".to_string()],
            request_timeout: Duration::from_secs(30),
        }
    }
}

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable, multi-field lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

/// Command-line and environment configuration for the demo server.
#[derive(Debug, Clone, Parser)]
#[command(name = "routekit-demo", about = "Serve the routekit demo API")]
pub struct ServerArgs {
    /// Bind address.
    #[arg(long, env = "ROUTEKIT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Listen port (0 picks a free port).
    #[arg(long, env = "ROUTEKIT_PORT", default_value_t = 8080)]
    pub port: u16,

    /// HS256 secret for bearer tokens.
    #[arg(long, env = "ROUTEKIT_AUTH_SECRET", hide_env_values = true)]
    pub auth_secret: String,

    /// Expected token issuer.
    #[arg(long, env = "ROUTEKIT_AUTH_ISSUER")]
    pub auth_issuer: Option<String>,

    /// Allowed CORS origins, comma separated.
    #[arg(long, env = "ROUTEKIT_CORS_ORIGINS", value_delimiter = ',', default_value = "*")]
    pub cors_origins: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "ROUTEKIT_REQUEST_TIMEOUT_SECS", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Log output format.
    #[arg(long, env = "ROUTEKIT_LOG_FORMAT", value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,
}

impl ServerArgs {
    /// Splits the arguments into validated network and auth configs.
    ///
    /// # Errors
    ///
    /// Returns an error if the secret is empty or the timeout is zero.
    pub fn into_configs(self) -> Result<(NetworkConfig, AuthConfig), ConfigError> {
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let auth = AuthConfig {
            issuer: self.auth_issuer,
            ..AuthConfig::new(self.auth_secret)
        };
        auth.validate()?;

        let network = NetworkConfig {
            host: self.host,
            port: self.port,
            cors_origins: self.cors_origins,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
        };
        Ok((network, auth))
    }
}
