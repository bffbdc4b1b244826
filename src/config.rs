//! Application configuration management.
//!
//! Configuration is loaded from a YAML file with environment variable
//! overrides. The file path defaults to `config.yaml` but can be specified
//! via `-f` flag or the `REELHUB_CONFIG` environment variable.
//!
//! ## Loading Priority
//!
//! Sources are merged in order (later sources override earlier ones):
//!
//! 1. **YAML config file** - base configuration (default: `config.yaml`)
//! 2. **Environment variables** - variables prefixed with `REELHUB_`
//!
//! For nested values, use double underscores: `REELHUB_AUTH__SESSION__COOKIE_NAME=jwt`
//! sets `auth.session.cookie_name`.
//!
//! ## Example
//!
//! ```yaml
//! host: 0.0.0.0
//! port: 3200
//! secret_key: change-me
//! auth:
//!   allow_registration: true
//!   tokens:
//!     access_token_ttl: 15m
//!     refresh_token_ttl: 7d
//!   session:
//!     cookie_name: jwt
//!     cookie_secure: true
//!     cookie_same_site: none
//! cors:
//!   allowed_origins:
//!     - https://watch.reelhub.example
//!   allow_credentials: true
//! ```

use clap::Parser;
use figment::{
    Figment,
    providers::{Env, Format, Yaml},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use crate::errors::Error;

/// Simple CLI args - just for specifying the config file
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file
    #[arg(short = 'f', long, env = "REELHUB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Validate configuration and exit without starting the server.
    #[arg(long)]
    pub validate: bool,
}

/// Main application configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server host to bind to (e.g., "0.0.0.0" for all interfaces)
    pub host: String,
    /// HTTP server port to bind to
    pub port: u16,
    /// Secret key for JWT signing (required)
    pub secret_key: Option<String>,
    /// Email address for the initial admin account (created on first startup)
    pub admin_email: Option<String>,
    /// Password for the initial admin account
    pub admin_password: Option<String>,
    /// Authentication configuration
    pub auth: AuthConfig,
    /// CORS configuration for browser clients
    pub cors: CorsConfig,
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Allow new users to self-register
    pub allow_registration: bool,
    /// Password validation rules and hashing cost
    pub password: PasswordConfig,
    /// Token lifetimes
    pub tokens: TokenConfig,
    /// Renewal cookie attributes
    pub session: SessionConfig,
}

/// Token lifetime configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct TokenConfig {
    /// Access token lifetime
    #[serde(with = "humantime_serde")]
    pub access_token_ttl: Duration,
    /// Renewal token lifetime (also the renewal cookie max-age)
    #[serde(with = "humantime_serde")]
    pub refresh_token_ttl: Duration,
}

/// Renewal cookie configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Cookie name for the renewal token
    pub cookie_name: String,
    /// Set Secure flag on the cookie (HTTPS only)
    pub cookie_secure: bool,
    /// SameSite cookie attribute ("strict", "lax", or "none")
    pub cookie_same_site: String,
}

/// Password validation rules and Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PasswordConfig {
    /// Minimum password length
    pub min_length: usize,
    /// Maximum password length
    pub max_length: usize,
    /// Argon2 memory cost in KiB
    pub argon2_memory_kib: u32,
    /// Argon2 iterations
    pub argon2_iterations: u32,
    /// Argon2 parallelism
    pub argon2_parallelism: u32,
}

/// CORS (Cross-Origin Resource Sharing) configuration.
///
/// The web client and this API are served from different origins, which is
/// why the renewal cookie carries `SameSite=None` and why `allow_credentials`
/// defaults to true.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct CorsConfig {
    /// Allowed origins for CORS requests
    pub allowed_origins: Vec<Url>,
    /// Allow credentials (cookies) in CORS requests
    pub allow_credentials: bool,
    /// Cache preflight requests for this many seconds
    pub max_age: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3200,
            secret_key: None,
            admin_email: None,
            admin_password: None,
            auth: AuthConfig::default(),
            cors: CorsConfig::default(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            password: PasswordConfig::default(),
            tokens: TokenConfig::default(),
            session: SessionConfig::default(),
        }
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            access_token_ttl: Duration::from_secs(15 * 60),          // 15 minutes
            refresh_token_ttl: Duration::from_secs(7 * 24 * 60 * 60), // 7 days
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "jwt".to_string(),
            cookie_secure: true,
            // The web client and API live on different origins, so the
            // renewal cookie must be sent cross-site.
            cookie_same_site: "none".to_string(),
        }
    }
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 64,
            // Argon2id RFC recommendations
            argon2_memory_kib: 19456, // 19 MB
            argon2_iterations: 2,
            argon2_parallelism: 1,
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![
                Url::parse("http://localhost:3001").unwrap(), // Development frontend
            ],
            allow_credentials: true,
            max_age: Some(3600),
        }
    }
}

impl Config {
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Self::figment(args).extract()?;
        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    pub fn figment(args: &Args) -> Figment {
        Figment::new()
            // Load base config file
            .merge(Yaml::file(&args.config))
            // Environment variables override specific values
            .merge(Env::prefixed("REELHUB_").split("__"))
    }

    /// Validate the configuration for consistency and required fields
    pub fn validate(&self) -> Result<(), Error> {
        if self.secret_key.is_none() {
            return Err(Error::Internal {
                operation: "Config validation: secret_key is not configured. \
                     Please set REELHUB_SECRET_KEY or add secret_key to the config file."
                    .to_string(),
            });
        }

        if self.auth.password.min_length > self.auth.password.max_length {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: password min_length ({}) cannot be greater than max_length ({})",
                    self.auth.password.min_length, self.auth.password.max_length
                ),
            });
        }

        // Browsers reject SameSite=None cookies without the Secure flag, and
        // a clear call whose flags mismatch the set call silently fails to
        // remove the cookie. Refuse the combination outright.
        let same_site = self.auth.session.cookie_same_site.to_ascii_lowercase();
        if !matches!(same_site.as_str(), "strict" | "lax" | "none") {
            return Err(Error::Internal {
                operation: format!(
                    "Config validation: cookie_same_site must be one of strict/lax/none, got {:?}",
                    self.auth.session.cookie_same_site
                ),
            });
        }
        if same_site == "none" && !self.auth.session.cookie_secure {
            return Err(Error::Internal {
                operation: "Config validation: cookie_same_site=none requires cookie_secure=true".to_string(),
            });
        }

        Ok(())
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    fn args_for(path: &str) -> Args {
        Args {
            config: path.to_string(),
            validate: false,
        }
    }

    #[test]
    fn test_defaults_match_contract() {
        let config = Config::default();
        assert_eq!(config.auth.session.cookie_name, "jwt");
        assert_eq!(config.auth.session.cookie_same_site, "none");
        assert!(config.auth.session.cookie_secure);
        assert_eq!(config.auth.tokens.access_token_ttl, Duration::from_secs(15 * 60));
        assert_eq!(config.auth.tokens.refresh_token_ttl, Duration::from_secs(7 * 24 * 60 * 60));
    }

    #[test]
    fn test_load_from_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "test.yaml",
                r#"
secret_key: hello
port: 9999
auth:
  tokens:
    access_token_ttl: 5m
"#,
            )?;

            let config = Config::load(&args_for("test.yaml"))?;

            assert_eq!(config.port, 9999);
            assert_eq!(config.secret_key.as_deref(), Some("hello"));
            assert_eq!(config.auth.tokens.access_token_ttl, Duration::from_secs(5 * 60));
            // Untouched sections keep their defaults
            assert_eq!(config.auth.tokens.refresh_token_ttl, Duration::from_secs(7 * 24 * 60 * 60));
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_yaml() {
        Jail::expect_with(|jail| {
            jail.create_file("test.yaml", "secret_key: from-file\n")?;
            jail.set_env("REELHUB_SECRET_KEY", "from-env");
            jail.set_env("REELHUB_AUTH__SESSION__COOKIE_NAME", "renewal");

            let config = Config::load(&args_for("test.yaml"))?;

            assert_eq!(config.secret_key.as_deref(), Some("from-env"));
            assert_eq!(config.auth.session.cookie_name, "renewal");
            Ok(())
        });
    }

    #[test]
    fn test_missing_secret_key_rejected() {
        let config = Config::default();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_same_site_none_requires_secure() {
        let mut config = Config {
            secret_key: Some("s".to_string()),
            ..Default::default()
        };
        config.auth.session.cookie_secure = false;
        assert!(config.validate().is_err());

        config.auth.session.cookie_same_site = "lax".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_same_site_rejected() {
        let mut config = Config {
            secret_key: Some("s".to_string()),
            ..Default::default()
        };
        config.auth.session.cookie_same_site = "sometimes".to_string();
        assert!(config.validate().is_err());
    }
}
