//! Server configuration.
//!
//! Defaults suit local play; deployments override them through the
//! environment:
//!
//! | Variable                      | Effect                                  |
//! |-------------------------------|-----------------------------------------|
//! | `DUELGRID_BIND`               | full listen address, e.g. `[::]:9000`   |
//! | `PORT`                        | listen on `0.0.0.0:<PORT>`              |
//! | `DUELGRID_IDLE_TIMEOUT_SECS`  | close connections unanswered this long  |
//!
//! `DUELGRID_BIND` wins over `PORT` when both are set.

use std::time::Duration;

use crate::DuelgridError;

/// Listen port used when nothing else is configured.
pub const DEFAULT_PORT: u16 = 3001;

/// Runtime settings for a [`DuelgridServer`](crate::DuelgridServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,
    /// A connection that sends nothing for this long is closed. The
    /// server pings every third of this, and pongs count, so only peers
    /// that stopped answering are dropped.
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: format!("0.0.0.0:{DEFAULT_PORT}"),
            idle_timeout: Duration::from_secs(60),
        }
    }
}

impl ServerConfig {
    /// Defaults overridden by whatever the process environment sets.
    ///
    /// # Errors
    /// Returns [`DuelgridError::Config`] if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, DuelgridError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, DuelgridError> {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT") {
            let port: u16 = port
                .trim()
                .parse()
                .map_err(|_| DuelgridError::Config(format!("PORT={port} is not a port number")))?;
            config.bind_addr = format!("0.0.0.0:{port}");
        }
        if let Some(addr) = lookup("DUELGRID_BIND") {
            if addr.trim().is_empty() {
                return Err(DuelgridError::Config("DUELGRID_BIND is empty".into()));
            }
            config.bind_addr = addr;
        }
        if let Some(secs) = lookup("DUELGRID_IDLE_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                DuelgridError::Config(format!(
                    "DUELGRID_IDLE_TIMEOUT_SECS={secs} is not a number of seconds"
                ))
            })?;
            if secs == 0 {
                return Err(DuelgridError::Config(
                    "DUELGRID_IDLE_TIMEOUT_SECS must be at least 1".into(),
                ));
            }
            config.idle_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr, "0.0.0.0:3001");
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
    }

    #[test]
    fn test_port_override() {
        let config = ServerConfig::from_lookup(lookup(&[("PORT", "8080")])).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
    }

    #[test]
    fn test_bind_wins_over_port() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("PORT", "8080"),
            ("DUELGRID_BIND", "127.0.0.1:9000"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
    }

    #[test]
    fn test_idle_timeout_override() {
        let config =
            ServerConfig::from_lookup(lookup(&[("DUELGRID_IDLE_TIMEOUT_SECS", "5")])).unwrap();
        assert_eq!(config.idle_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_malformed_values_are_config_errors() {
        for vars in [
            [("PORT", "abc")],
            [("PORT", "70000")],
            [("DUELGRID_BIND", " ")],
            [("DUELGRID_IDLE_TIMEOUT_SECS", "soon")],
            [("DUELGRID_IDLE_TIMEOUT_SECS", "0")],
        ] {
            let err = ServerConfig::from_lookup(lookup(&vars)).unwrap_err();
            assert!(matches!(err, DuelgridError::Config(_)), "{vars:?}");
        }
    }
}
