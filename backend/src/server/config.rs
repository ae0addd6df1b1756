//! Environment-driven server configuration.
//!
//! All settings come from the process environment, read through
//! [`mockable::Env`] so parsing is unit testable. Release builds require the
//! secure settings to be explicit; debug builds fall back to development
//! defaults with a warning.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::Key;
use chrono::Duration;
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

use backend::outbound::mail::MailConfig;

const BIND_ADDR_ENV: &str = "BIND_ADDR";
const APP_URL_ENV: &str = "APP_URL";
const DATABASE_URL_ENV: &str = "DATABASE_URL";
const ACTIVATION_TTL_ENV: &str = "ACTIVATION_TTL_HOURS";
const ASSET_ROOT_ENV: &str = "ASSET_ROOT";
const MAIL_ENDPOINT_ENV: &str = "MAIL_ENDPOINT";
const MAIL_API_KEY_ENV: &str = "MAIL_API_KEY";
const MAIL_SENDER_EMAIL_ENV: &str = "MAIL_SENDER_EMAIL";
const MAIL_SENDER_NAME_ENV: &str = "MAIL_SENDER_NAME";
const SESSION_KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const SESSION_COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SESSION_ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_APP_URL: &str = "http://localhost:8080";
const DEFAULT_ACTIVATION_TTL_HOURS: i64 = 24;
const DEFAULT_ASSET_ROOT: &str = "data/assets";
const DEFAULT_SESSION_KEY_PATH: &str = "/var/run/secrets/session_key";

/// Build mode for configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    Debug,
    Release,
}

impl BuildMode {
    pub fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Errors raised while validating the environment.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable: {name}")]
    MissingEnv { name: &'static str },
    #[error("invalid value for {name}='{value}'")]
    InvalidEnv { name: &'static str, value: String },
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Fully resolved server settings.
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub app_url: String,
    pub database_url: Option<String>,
    pub activation_ttl: Duration,
    pub asset_root: PathBuf,
    pub mail: Option<MailConfig>,
    pub session_key: Key,
    pub cookie_secure: bool,
}

/// Load and validate the configuration from the environment.
pub fn load<E: Env>(env: &E, mode: BuildMode) -> Result<ServerConfig, ConfigError> {
    let bind_addr = parse_or_default(env, BIND_ADDR_ENV, DEFAULT_BIND_ADDR)?;
    let app_url = app_url(env, mode)?;
    let database_url = env.string(DATABASE_URL_ENV);
    if database_url.is_none() {
        warn!("DATABASE_URL not set; running on volatile in-memory storage");
    }
    let activation_ttl = activation_ttl(env)?;
    let asset_root = env
        .string(ASSET_ROOT_ENV)
        .map_or_else(|| PathBuf::from(DEFAULT_ASSET_ROOT), PathBuf::from);
    let mail = mail_config(env, &app_url);
    let cookie_secure = cookie_secure(env, mode)?;
    let session_key = session_key(env, mode)?;

    Ok(ServerConfig {
        bind_addr,
        app_url,
        database_url,
        activation_ttl,
        asset_root,
        mail,
        session_key,
        cookie_secure,
    })
}

fn parse_or_default<E: Env>(
    env: &E,
    name: &'static str,
    default: &str,
) -> Result<SocketAddr, ConfigError> {
    let value = env.string(name).unwrap_or_else(|| default.to_owned());
    value
        .parse()
        .map_err(|_| ConfigError::InvalidEnv { name, value })
}

fn app_url<E: Env>(env: &E, mode: BuildMode) -> Result<String, ConfigError> {
    match env.string(APP_URL_ENV) {
        Some(url) => Ok(url),
        None if mode.is_debug() => {
            warn!("APP_URL not set; activation links will point at localhost");
            Ok(DEFAULT_APP_URL.to_owned())
        }
        None => Err(ConfigError::MissingEnv { name: APP_URL_ENV }),
    }
}

fn activation_ttl<E: Env>(env: &E) -> Result<Duration, ConfigError> {
    let Some(value) = env.string(ACTIVATION_TTL_ENV) else {
        return Ok(Duration::hours(DEFAULT_ACTIVATION_TTL_HOURS));
    };
    match value.parse::<i64>() {
        Ok(hours) if hours > 0 => Ok(Duration::hours(hours)),
        _ => Err(ConfigError::InvalidEnv {
            name: ACTIVATION_TTL_ENV,
            value,
        }),
    }
}

/// Mail is optional: without a relay the server logs confirmation mails
/// instead of sending them.
fn mail_config<E: Env>(env: &E, app_url: &str) -> Option<MailConfig> {
    let endpoint = env.string(MAIL_ENDPOINT_ENV);
    let api_key = env.string(MAIL_API_KEY_ENV);
    let sender_email = env.string(MAIL_SENDER_EMAIL_ENV);
    match (endpoint, api_key, sender_email) {
        (Some(endpoint), Some(api_key), Some(sender_email)) => Some(MailConfig {
            endpoint,
            api_key,
            sender_email,
            sender_name: env.string(MAIL_SENDER_NAME_ENV),
            app_url: app_url.to_owned(),
        }),
        (None, None, None) => {
            warn!("no mail relay configured; confirmation mails will only be logged");
            None
        }
        _ => {
            warn!(
                "incomplete mail relay settings ({MAIL_ENDPOINT_ENV}, {MAIL_API_KEY_ENV}, \
                 {MAIL_SENDER_EMAIL_ENV} must all be set); mails will only be logged"
            );
            None
        }
    }
}

fn cookie_secure<E: Env>(env: &E, mode: BuildMode) -> Result<bool, ConfigError> {
    match env.string(SESSION_COOKIE_SECURE_ENV) {
        Some(value) => match parse_bool(&value) {
            Some(flag) => Ok(flag),
            None => Err(ConfigError::InvalidEnv {
                name: SESSION_COOKIE_SECURE_ENV,
                value,
            }),
        },
        None if mode.is_debug() => {
            warn!("SESSION_COOKIE_SECURE not set; defaulting to secure");
            Ok(true)
        }
        None => Err(ConfigError::MissingEnv {
            name: SESSION_COOKIE_SECURE_ENV,
        }),
    }
}

fn session_key<E: Env>(env: &E, mode: BuildMode) -> Result<Key, ConfigError> {
    let path = PathBuf::from(
        env.string(SESSION_KEY_FILE_ENV)
            .unwrap_or_else(|| DEFAULT_SESSION_KEY_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) => {
            let allow_ephemeral = env
                .string(SESSION_ALLOW_EPHEMERAL_ENV)
                .and_then(|value| parse_bool(&value))
                .unwrap_or(false);
            if mode.is_debug() || allow_ephemeral {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(ConfigError::KeyRead {
                    path,
                    source: error,
                })
            }
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    //! Environment parsing against a mocked process environment.
    use mockable::MockEnv;
    use rstest::rstest;

    use super::*;

    fn env_with(values: Vec<(&'static str, &'static str)>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string().returning(move |key| {
            values
                .iter()
                .find(|(name, _)| *name == key)
                .map(|(_, value)| (*value).to_owned())
        });
        env
    }

    #[test]
    fn debug_mode_tolerates_an_empty_environment() {
        let config = load(&env_with(vec![]), BuildMode::Debug).expect("debug defaults");
        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().expect("addr"));
        assert_eq!(config.app_url, "http://localhost:8080");
        assert!(config.database_url.is_none());
        assert_eq!(config.activation_ttl, Duration::hours(24));
        assert!(config.mail.is_none());
        assert!(config.cookie_secure);
    }

    #[test]
    fn release_mode_requires_the_app_url() {
        let env = env_with(vec![("SESSION_COOKIE_SECURE", "1")]);
        // ServerConfig holds a session Key and has no Debug impl, so unwrap
        // the error side by hand.
        let Err(error) = load(&env, BuildMode::Release) else {
            panic!("loading without APP_URL must fail");
        };
        assert!(matches!(error, ConfigError::MissingEnv { name: "APP_URL" }));
    }

    #[rstest]
    #[case("0")]
    #[case("-3")]
    #[case("soon")]
    fn rejects_bad_activation_ttls(#[case] value: &'static str) {
        let env = env_with(vec![("ACTIVATION_TTL_HOURS", value)]);
        let Err(error) = load(&env, BuildMode::Debug) else {
            panic!("ttl '{value}' must be rejected");
        };
        assert!(matches!(
            error,
            ConfigError::InvalidEnv {
                name: "ACTIVATION_TTL_HOURS",
                ..
            }
        ));
    }

    #[test]
    fn complete_relay_settings_enable_mail() {
        let env = env_with(vec![
            ("MAIL_ENDPOINT", "https://relay.example.com/v3/smtp/email"),
            ("MAIL_API_KEY", "key"),
            ("MAIL_SENDER_EMAIL", "noreply@example.com"),
        ]);
        let config = load(&env, BuildMode::Debug).expect("config loads");
        let mail = config.mail.expect("mail configured");
        assert_eq!(mail.sender_email, "noreply@example.com");
        assert_eq!(mail.app_url, config.app_url);
    }

    #[test]
    fn incomplete_relay_settings_fall_back_to_logging() {
        let env = env_with(vec![("MAIL_ENDPOINT", "https://relay.example.com")]);
        let config = load(&env, BuildMode::Debug).expect("config loads");
        assert!(config.mail.is_none());
    }
}
