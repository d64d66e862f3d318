use serde::{Deserialize, Serialize};

/// `modules.api_ingress` section of the application config.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ApiIngressConfig {
    /// `host:port` to listen on; empty means "use server.host and server.port".
    pub bind_addr: String,
    /// Serve the interactive API reference at `/docs`.
    pub enable_docs: bool,
    pub cors_enabled: bool,
    pub request_timeout_sec: u64,
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: String::new(),
            enable_docs: false,
            cors_enabled: false,
            request_timeout_sec: 30,
            body_limit_bytes: 16 * 1024 * 1024,
        }
    }
}

impl ApiIngressConfig {
    /// Fills an empty `bind_addr` from the server section.
    pub fn with_fallback_bind(mut self, host: &str, port: u16) -> Self {
        if self.bind_addr.trim().is_empty() {
            self.bind_addr = format!("{host}:{port}");
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_section_keeps_defaults() {
        let cfg: ApiIngressConfig =
            serde_json::from_value(serde_json::json!({ "cors_enabled": true })).unwrap();
        assert!(cfg.cors_enabled);
        assert_eq!(cfg.request_timeout_sec, 30);
        assert_eq!(cfg.body_limit_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn fallback_bind_only_when_empty() {
        let cfg = ApiIngressConfig::default().with_fallback_bind("0.0.0.0", 9000);
        assert_eq!(cfg.bind_addr, "0.0.0.0:9000");

        let cfg = ApiIngressConfig {
            bind_addr: "127.0.0.1:1234".into(),
            ..Default::default()
        }
        .with_fallback_bind("0.0.0.0", 9000);
        assert_eq!(cfg.bind_addr, "127.0.0.1:1234");
    }
}
