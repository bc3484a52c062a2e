use std::net::{IpAddr, SocketAddr};

/// Errors raised while reading [`ServerConfig`] from the environment.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} is not valid: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// Listener settings for the panels process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    /// Requests running longer than this are answered with 408.
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// | Env Var                | Default    |
    /// |------------------------|------------|
    /// | `HOST`                 | `0.0.0.0`  |
    /// | `PORT`                 | `3000`     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            host: parse_var("HOST", "0.0.0.0")?,
            port: parse_var("PORT", "3000")?,
            request_timeout_secs: parse_var("REQUEST_TIMEOUT_SECS", "30")?,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn parse_var<T: std::str::FromStr>(var: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = std::env::var(var).unwrap_or_else(|_| default.to_string());
    value
        .parse()
        .map_err(|_| ConfigError::Invalid { var, value })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_var_falls_back_to_default() {
        let port: u16 = parse_var("PANELS_TEST_UNSET_PORT", "3000").unwrap();
        assert_eq!(port, 3000);
    }

    #[test]
    fn parse_var_reports_the_bad_value() {
        let err = parse_var::<u16>("PANELS_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "PANELS_TEST_UNSET_PORT", ref value } if value == "not-a-port"
        ));
    }

    #[test]
    fn bind_addr_joins_host_and_port() {
        let config = ServerConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8080,
            request_timeout_secs: 30,
        };
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:8080");
    }
}
