//! Socket transport for the admin client.
//!
//! Dialing produces a [`Connection`], an opaque bidirectional byte stream,
//! so the protocol code never learns which transport carried it. Connecting
//! is bounded by a deadline; reads and writes are deliberately unbounded, so
//! a daemon that accepts the connection but never replies blocks the
//! invocation.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use meshctl_config::AdminEndpoint;

use crate::AppError;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

trait Stream: Read + Write {}

impl<T: Read + Write> Stream for T {}

/// An established admin socket connection.
pub(crate) struct Connection {
    stream: Box<dyn Stream>,
}

impl Connection {
    fn new(stream: impl Read + Write + 'static) -> Self {
        Self {
            stream: Box::new(stream),
        }
    }
}

impl Read for Connection {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for Connection {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stream.flush()
    }
}

pub(crate) fn connect(endpoint: &AdminEndpoint) -> Result<Connection, AppError> {
    match endpoint {
        AdminEndpoint::Tcp { host, port } => dial_tcp(endpoint, host, *port),
        AdminEndpoint::Unix { path } => dial_unix(endpoint, path.as_str()),
    }
}

/// Tries every address the host resolves to, keeping the last failure for
/// the diagnostic. Dual-stack hosts commonly resolve to an unreachable
/// family first.
fn dial_tcp(endpoint: &AdminEndpoint, host: &str, port: u16) -> Result<Connection, AppError> {
    let candidates: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .map_err(|source| AppError::Resolve {
            endpoint: endpoint.to_string(),
            source,
        })?
        .collect();

    let mut last_error = io::Error::new(io::ErrorKind::AddrNotAvailable, "no resolved addresses");
    for address in candidates {
        match TcpStream::connect_timeout(&address, CONNECT_TIMEOUT) {
            Ok(stream) => return Ok(Connection::new(stream)),
            Err(error) => last_error = error,
        }
    }
    Err(AppError::Connect {
        endpoint: endpoint.to_string(),
        source: last_error,
    })
}

#[cfg(unix)]
fn dial_unix(endpoint: &AdminEndpoint, path: &str) -> Result<Connection, AppError> {
    use socket2::{Domain, SockAddr, Socket, Type};
    use std::os::unix::net::UnixStream;

    let attempt = || -> io::Result<UnixStream> {
        let socket = Socket::new(Domain::UNIX, Type::STREAM, None)?;
        socket.connect_timeout(&SockAddr::unix(path)?, CONNECT_TIMEOUT)?;
        Ok(socket.into())
    };
    attempt()
        .map(Connection::new)
        .map_err(|source| AppError::Connect {
            endpoint: endpoint.to_string(),
            source,
        })
}

#[cfg(not(unix))]
fn dial_unix(endpoint: &AdminEndpoint, _path: &str) -> Result<Connection, AppError> {
    Err(AppError::UnsupportedUnixTransport(endpoint.to_string()))
}
