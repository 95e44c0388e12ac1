use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use formloom_core::AppError;
use tracing_subscriber::EnvFilter;

/// Runtime configuration for the web frontend.
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub web_host: String,
    pub web_port: u16,
    pub site_title: String,
}

impl WebConfig {
    /// Loads the configuration from the environment.
    pub fn load() -> Result<Self, AppError> {
        let web_host = env::var("WEB_HOST").unwrap_or_else(|_| "127.0.0.1".to_owned());
        let web_port = env::var("WEB_PORT")
            .ok()
            .and_then(|value| value.parse::<u16>().ok())
            .unwrap_or(3005);
        let site_title = env::var("SITE_TITLE").unwrap_or_else(|_| "Formloom".to_owned());

        Ok(Self {
            web_host,
            web_port,
            site_title,
        })
    }

    /// Returns the socket address to bind to.
    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.web_host).map_err(|error| {
            AppError::Internal(format!("invalid WEB_HOST '{}': {error}", self.web_host))
        })?;
        Ok(SocketAddr::from((host, self.web_port)))
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use super::WebConfig;

    #[test]
    fn defaults_apply_without_environment() {
        let config = WebConfig {
            web_host: "127.0.0.1".to_owned(),
            web_port: 3005,
            site_title: "Formloom".to_owned(),
        };
        let address = config.socket_address().unwrap_or_else(|_| unreachable!());
        assert_eq!(address.port(), 3005);
    }
}
