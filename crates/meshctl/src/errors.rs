//! Error types for the CLI runtime.
//!
//! The variants follow the invocation lifecycle: configuration loading, CLI
//! parsing, transport, codec, and finally the admin protocol itself. Shape
//! mismatches inside formatters are deliberately NOT represented here; those
//! degrade per-field through `Option` accessors instead of failing the run.

use std::io;
use std::sync::Arc;

use meshctl_config::OrthoError;
use thiserror::Error;

#[derive(Debug, Error)]
pub(crate) enum AppError {
    #[error("failed to load configuration: {0}")]
    LoadConfiguration(Arc<OrthoError>),
    #[error("{0}")]
    CliUsage(clap::Error),
    #[error("the admin command must be provided")]
    MissingCommand,
    #[error("failed to resolve admin socket address {endpoint}: {source}")]
    Resolve { endpoint: String, source: io::Error },
    #[error("failed to connect to admin socket at {endpoint}: {source}")]
    Connect { endpoint: String, source: io::Error },
    #[cfg(not(unix))]
    #[error("platform does not support Unix sockets: {0}")]
    UnsupportedUnixTransport(String),
    #[error("failed to serialise admin request: {0}")]
    SerialiseRequest(serde_json::Error),
    #[error("failed to send request to admin socket: {0}")]
    SendRequest(io::Error),
    #[error("failed to parse admin response: {0}")]
    ParseResponse(serde_json::Error),
    #[error("admin socket closed before a complete response arrived")]
    TruncatedResponse,
    #[error("admin socket response was not a JSON object")]
    UnexpectedPayload,
    #[error("Admin socket returned an error: {}", .message.as_deref().unwrap_or("unspecified error"))]
    AdminError { message: Option<String> },
    #[error("missing request echo in response (malformed response?)")]
    MissingRequestEcho,
    #[error("missing response body (malformed response?)")]
    MissingResponseBody,
    #[error("failed to write rendered output: {0}")]
    RenderOutput(io::Error),
}
