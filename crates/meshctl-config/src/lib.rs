//! Shared configuration for the meshctl control-plane client.
//!
//! Configuration merges three layers with ascending precedence: an optional
//! TOML file (`--config-path`), `MESHCTL_*` environment variables, and CLI
//! flags. The heavy lifting is delegated to `ortho_config`; this crate owns
//! the schema, the defaults, and the admin endpoint grammar.

use std::ffi::OsString;
use std::sync::Arc;

use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};

mod endpoint;
mod logging;

pub use endpoint::{AdminEndpoint, EndpointParseError};
pub use logging::{LogFormat, LogFormatParseError};
pub use ortho_config::OrthoError;

/// Default admin socket endpoint used when no layer overrides it.
#[must_use]
pub fn default_admin_endpoint() -> AdminEndpoint {
    #[cfg(unix)]
    {
        AdminEndpoint::unix("/var/run/meshd/admin.sock")
    }
    #[cfg(not(unix))]
    {
        AdminEndpoint::tcp("127.0.0.1", 9001)
    }
}

/// Default tracing filter directive.
#[must_use]
pub fn default_log_filter() -> String {
    String::from("warn")
}

/// Default logging output format.
#[must_use]
pub fn default_log_format() -> LogFormat {
    LogFormat::default()
}

/// Layered configuration consumed by the CLI runtime.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, OrthoConfig)]
#[ortho_config(prefix = "MESHCTL")]
pub struct Config {
    /// Endpoint of the daemon admin socket.
    #[ortho_config(default = default_admin_endpoint())]
    pub admin_socket: AdminEndpoint,
    /// Tracing filter directive applied to diagnostic output.
    #[ortho_config(default = default_log_filter())]
    pub log_filter: String,
    /// Rendering of diagnostic output.
    #[ortho_config(default = default_log_format())]
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            admin_socket: default_admin_endpoint(),
            log_filter: default_log_filter(),
            log_format: default_log_format(),
        }
    }
}

impl Config {
    /// Loads configuration from the provided CLI arguments plus the
    /// environment and optional configuration file layers.
    ///
    /// # Errors
    ///
    /// Returns the underlying loader error when any layer fails to parse.
    pub fn load_from_iter<I>(args: I) -> Result<Self, Arc<OrthoError>>
    where
        I: IntoIterator<Item = OsString>,
    {
        <Self as OrthoConfig>::load_from_iter(args)
    }

    /// Endpoint of the daemon admin socket.
    #[must_use]
    pub fn admin_socket(&self) -> &AdminEndpoint {
        &self.admin_socket
    }
}
