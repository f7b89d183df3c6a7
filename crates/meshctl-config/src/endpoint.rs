//! Admin socket endpoint addressing.
//!
//! The daemon listens on either a Unix domain socket or a TCP socket.
//! Operators spell the endpoint as `unix:<path>`, `tcp:<host:port>`, or a
//! bare `<host:port>` which is treated as TCP.

use std::fmt;
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Declarative address of the daemon admin socket.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "transport", rename_all = "snake_case")]
pub enum AdminEndpoint {
    /// Unix domain socket endpoint.
    Unix {
        /// Filesystem path of the socket.
        path: Utf8PathBuf,
    },
    /// TCP socket endpoint.
    Tcp {
        /// Host name or address.
        host: String,
        /// TCP port.
        port: u16,
    },
}

impl AdminEndpoint {
    /// Builds a Unix domain socket endpoint.
    #[must_use]
    pub fn unix(path: impl Into<Utf8PathBuf>) -> Self {
        Self::Unix { path: path.into() }
    }

    /// Builds a TCP socket endpoint.
    #[must_use]
    pub fn tcp(host: impl Into<String>, port: u16) -> Self {
        Self::Tcp {
            host: host.into(),
            port,
        }
    }

    /// Returns the socket path when the endpoint uses the Unix transport.
    #[must_use]
    pub fn unix_path(&self) -> Option<&Utf8Path> {
        match self {
            Self::Unix { path } => Some(path.as_ref()),
            Self::Tcp { .. } => None,
        }
    }
}

impl fmt::Display for AdminEndpoint {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unix { path } => write!(formatter, "unix:{path}"),
            Self::Tcp { host, port } => write!(formatter, "tcp:{host}:{port}"),
        }
    }
}

impl FromStr for AdminEndpoint {
    type Err = EndpointParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        if let Some(rest) = input.strip_prefix("unix:") {
            // Accept both `unix:/path` and the URL spelling `unix:///path`.
            let path = rest.strip_prefix("//").unwrap_or(rest);
            if path.is_empty() {
                return Err(EndpointParseError::MissingUnixPath(input.to_owned()));
            }
            return Ok(Self::unix(path));
        }

        if input.starts_with("tcp://") {
            return parse_tcp_url(input);
        }
        if let Some(rest) = input.strip_prefix("tcp:") {
            return parse_host_port(input, rest);
        }

        if let Some((scheme, _)) = input.split_once("://") {
            return Err(EndpointParseError::UnsupportedScheme(scheme.to_owned()));
        }

        // A scheme-less `host:port` dials TCP, matching historic client
        // behaviour.
        parse_host_port(input, input)
    }
}

fn parse_tcp_url(input: &str) -> Result<AdminEndpoint, EndpointParseError> {
    let url = Url::parse(input).map_err(|_| EndpointParseError::MissingHost(input.to_owned()))?;
    let host = url
        .host_str()
        .ok_or_else(|| EndpointParseError::MissingHost(input.to_owned()))?;
    let port = url
        .port()
        .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
    Ok(AdminEndpoint::tcp(host, port))
}

fn parse_host_port(input: &str, host_port: &str) -> Result<AdminEndpoint, EndpointParseError> {
    let (host, port_text) = host_port
        .rsplit_once(':')
        .ok_or_else(|| EndpointParseError::MissingPort(input.to_owned()))?;
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(EndpointParseError::MissingHost(input.to_owned()));
    }
    let port: u16 = port_text
        .parse()
        .map_err(|_| EndpointParseError::MissingPort(input.to_owned()))?;
    Ok(AdminEndpoint::tcp(host, port))
}

/// Errors encountered while parsing an [`AdminEndpoint`] from text.
#[derive(Debug, Error)]
pub enum EndpointParseError {
    /// Scheme was not recognised.
    #[error("unsupported endpoint scheme '{0}'")]
    UnsupportedScheme(String),
    /// TCP host name was missing.
    #[error("missing TCP host in '{0}'")]
    MissingHost(String),
    /// TCP port was missing or invalid.
    #[error("missing or invalid TCP port in '{0}'")]
    MissingPort(String),
    /// Unix socket path was absent.
    #[error("missing Unix socket path in '{0}'")]
    MissingUnixPath(String),
}
