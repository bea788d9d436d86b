//! Client endpoint configuration.

/// The production match server.
pub const DEFAULT_HOST: &str = "131.159.222.93";

/// The production match server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Where to reach the match server.
///
/// The endpoint is fixed in production; the overrides exist so tests can
/// point the client at a loopback server.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server hostname or IP.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// URL path of the WebSocket endpoint.
    pub path: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: "/".to_string(),
        }
    }
}

impl ClientConfig {
    /// A config pointing at a specific host and port (path `/`).
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    /// The full connection URL for the given role token.
    ///
    /// The token is the only thing the client ever sends that the server
    /// acts on: it requests a player role during the upgrade handshake.
    pub fn url(&self, token: &str) -> String {
        format!(
            "ws://{}:{}{}?token={}",
            self.host, self.port, self.path, token
        )
    }
}

// =========================================================================
// Tests
// =========================================================================
