//! CLI entrypoint for the meshd admin client.
//!
//! The binary delegates to [`meshctl::run`], which loads configuration,
//! parses command-line arguments, and performs a single request/response
//! round trip against the configured admin socket.

use std::io::{self, StderrLock, StdoutLock};
use std::process::ExitCode;

fn main() -> ExitCode {
    let mut stdout: StdoutLock<'_> = io::stdout().lock();
    let mut stderr: StderrLock<'_> = io::stderr().lock();
    meshctl::run(std::env::args_os(), &mut stdout, &mut stderr)
}
