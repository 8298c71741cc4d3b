//! `[api]`: the PostgREST gateway.

use serde::{Deserialize, Serialize};

/// PostgREST settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Serve the REST API.
    pub enabled: bool,
    /// Local API port.
    pub port: u16,
    /// Schemas exposed through the API.
    pub schemas: Vec<String>,
    /// Schemas appended to the search path.
    pub extra_search_path: Vec<String>,
    /// Row cap per request.
    pub max_rows: u32,
    /// Public URL; derived from hostname, port and TLS when empty.
    pub external_url: String,
    /// TLS termination for the API gateway.
    pub tls: TlsConfig,
}

/// `[api.tls]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsConfig {
    /// Terminate TLS locally.
    pub enabled: bool,
}

impl ApiConfig {
    /// Fill `external_url` from the hostname when the user left it empty.
    pub fn resolve_external_url(&mut self, hostname: &str) {
        if !self.external_url.is_empty() {
            return;
        }
        let scheme = if self.tls.enabled { "https" } else { "http" };
        self.external_url = format!("{scheme}://{hostname}:{}", self.port);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn external_url_follows_tls() {
        let mut api = ApiConfig {
            port: 54321,
            ..ApiConfig::default()
        };
        api.resolve_external_url("127.0.0.1");
        assert_eq!(api.external_url, "http://127.0.0.1:54321");

        let mut api = ApiConfig {
            port: 443,
            tls: TlsConfig { enabled: true },
            ..ApiConfig::default()
        };
        api.resolve_external_url("example.com");
        assert_eq!(api.external_url, "https://example.com:443");
    }

    #[test]
    fn explicit_external_url_is_kept() {
        let mut api = ApiConfig {
            external_url: "https://api.example.com".to_string(),
            ..ApiConfig::default()
        };
        api.resolve_external_url("127.0.0.1");
        assert_eq!(api.external_url, "https://api.example.com");
    }
}
