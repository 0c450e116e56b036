use std::time::Duration;

use stockroom_core::inventory::DEFAULT_THRESHOLD;
use stockroom_db::StoreConfig;
use stockroom_notify::{EmailConfig, NotificationOptions};

use crate::auth::jwt::{JwtConfig, DEFAULT_ACCESS_EXPIRY_MINS};

/// Default pool size when `DATABASE_MAX_CONNECTIONS` is not set.
const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Error raised while reading configuration from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{var} has invalid value '{value}'")]
    Invalid { var: &'static str, value: String },
}

/// Default `ALERT_DELIVERY_DEADLINE_SECS`.
const DEFAULT_DELIVERY_DEADLINE_SECS: u64 = 20;

/// Where low-stock notifications go by default.
#[derive(Debug, Clone)]
pub struct AlertConfig {
    /// Target for the webhook channel (`ALERT_WEBHOOK_URL`).
    pub webhook_url: Option<String>,
    /// Recipients for the email channel (`ALERT_EMAIL_RECIPIENTS`).
    pub email_recipients: Vec<String>,
    /// SMTP settings; `None` disables the email channel.
    pub email: Option<EmailConfig>,
    /// Upper bound on one webhook delivery, retries included. Always below
    /// the request timeout.
    pub delivery_deadline_secs: u64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            webhook_url: None,
            email_recipients: Vec::new(),
            email: None,
            delivery_deadline_secs: DEFAULT_DELIVERY_DEADLINE_SECS,
        }
    }
}

impl AlertConfig {
    pub fn delivery_deadline(&self) -> Duration {
        Duration::from_secs(self.delivery_deadline_secs)
    }

    pub fn notification_options(&self) -> NotificationOptions {
        NotificationOptions {
            webhook_url: self.webhook_url.clone(),
            email_recipients: self.email_recipients.clone(),
        }
    }
}

/// Server configuration loaded from environment variables.
///
/// Built once in `main` and passed down explicitly.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    pub database_url: String,
    pub database_max_connections: u32,
    /// JWT validation settings.
    pub jwt: JwtConfig,
    /// Inventory store behaviour.
    pub inventory: StoreConfig,
    pub alerts: AlertConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default                 |
    /// |--------------------------------|-------------------------|
    /// | `HOST`                         | `0.0.0.0`               |
    /// | `PORT`                         | `3000`                  |
    /// | `CORS_ORIGINS`                 | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`         | `30`                    |
    /// | `DATABASE_URL`                 | **required**            |
    /// | `DATABASE_MAX_CONNECTIONS`     | `20`                    |
    /// | `JWT_SECRET`                   | **required**            |
    /// | `JWT_ACCESS_EXPIRY_MINS`       | `15`                    |
    /// | `INVENTORY_VALIDATE_LOCATIONS` | `false`                 |
    /// | `INVENTORY_DEFAULT_THRESHOLD`  | `5`                     |
    /// | `ALERT_WEBHOOK_URL`            | unset                   |
    /// | `ALERT_EMAIL_RECIPIENTS`       | unset (comma-separated) |
    /// | `ALERT_DELIVERY_DEADLINE_SECS` | `20`, below the timeout |
    ///
    /// SMTP variables are documented on [`EmailConfig::from_env`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let default_threshold = parse_or(&lookup, "INVENTORY_DEFAULT_THRESHOLD", DEFAULT_THRESHOLD)?;
        if default_threshold < 0 {
            return Err(ConfigError::Invalid {
                var: "INVENTORY_DEFAULT_THRESHOLD",
                value: default_threshold.to_string(),
            });
        }

        let request_timeout_secs: u64 = parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 30)?;
        let delivery_deadline_secs = parse_or(
            &lookup,
            "ALERT_DELIVERY_DEADLINE_SECS",
            DEFAULT_DELIVERY_DEADLINE_SECS.min(request_timeout_secs.saturating_sub(1)),
        )?;
        if delivery_deadline_secs >= request_timeout_secs {
            return Err(ConfigError::Invalid {
                var: "ALERT_DELIVERY_DEADLINE_SECS",
                value: delivery_deadline_secs.to_string(),
            });
        }

        let jwt_secret = lookup("JWT_SECRET")
            .filter(|s| !s.is_empty())
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "PORT", 3000)?,
            cors_origins: split_list(
                &lookup("CORS_ORIGINS").unwrap_or_else(|| "http://localhost:5173".into()),
            ),
            request_timeout_secs,
            database_url: lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?,
            database_max_connections: parse_or(
                &lookup,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_MAX_CONNECTIONS,
            )?,
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expiry_mins: parse_or(
                    &lookup,
                    "JWT_ACCESS_EXPIRY_MINS",
                    DEFAULT_ACCESS_EXPIRY_MINS,
                )?,
            },
            inventory: StoreConfig {
                validate_locations: parse_or(&lookup, "INVENTORY_VALIDATE_LOCATIONS", false)?,
                default_threshold,
            },
            alerts: AlertConfig {
                webhook_url: lookup("ALERT_WEBHOOK_URL").filter(|u| !u.is_empty()),
                email_recipients: lookup("ALERT_EMAIL_RECIPIENTS")
                    .map(|r| split_list(&r))
                    .unwrap_or_default(),
                email: EmailConfig::from_lookup(&lookup),
                delivery_deadline_secs,
            },
        })
    }
}

fn parse_or<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(var) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid { var, value }),
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/stockroom"),
        ("JWT_SECRET", "secret"),
    ];

    #[test]
    fn defaults_apply() {
        let config = load(&REQUIRED).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, ["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.database_max_connections, 20);
        assert!(!config.inventory.validate_locations);
        assert_eq!(config.inventory.default_threshold, 5);
        assert!(config.alerts.webhook_url.is_none());
        assert!(config.alerts.email_recipients.is_empty());
        assert!(config.alerts.email.is_none());
        assert_eq!(config.alerts.delivery_deadline_secs, 20);
    }

    #[test]
    fn delivery_deadline_must_fit_in_request_timeout() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("REQUEST_TIMEOUT_SECS", "10"));
        assert_eq!(load(&vars).unwrap().alerts.delivery_deadline_secs, 9);

        vars.push(("ALERT_DELIVERY_DEADLINE_SECS", "10"));
        assert_matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                var: "ALERT_DELIVERY_DEADLINE_SECS",
                ..
            })
        );
    }

    #[test]
    fn missing_secret_is_an_error() {
        let result = load(&[("DATABASE_URL", "postgres://localhost/stockroom")]);
        assert_matches!(result, Err(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn invalid_number_is_an_error() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("PORT", "http"));
        assert_matches!(load(&vars), Err(ConfigError::Invalid { var: "PORT", .. }));
    }

    #[test]
    fn negative_default_threshold_is_rejected() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("INVENTORY_DEFAULT_THRESHOLD", "-1"));
        assert_matches!(
            load(&vars),
            Err(ConfigError::Invalid {
                var: "INVENTORY_DEFAULT_THRESHOLD",
                ..
            })
        );
    }

    #[test]
    fn alert_destinations_are_parsed() {
        let mut vars = REQUIRED.to_vec();
        vars.push(("ALERT_WEBHOOK_URL", "https://hooks.example.com/stock"));
        vars.push(("ALERT_EMAIL_RECIPIENTS", "ops@example.com, , buyer@example.com"));
        vars.push(("INVENTORY_VALIDATE_LOCATIONS", "true"));
        let config = load(&vars).unwrap();

        assert!(config.inventory.validate_locations);
        let options = config.alerts.notification_options();
        assert_eq!(
            options.webhook_url.as_deref(),
            Some("https://hooks.example.com/stock")
        );
        assert_eq!(
            options.email_recipients,
            ["ops@example.com", "buyer@example.com"]
        );
    }
}
