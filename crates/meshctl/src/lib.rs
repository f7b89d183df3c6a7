//! Command-line runtime for the meshd admin socket.
//!
//! The module owns argument parsing, configuration bootstrapping, request
//! serialisation, and the single request/response round trip against the
//! daemon. The interface is designed to be exercised both from the binary
//! entrypoint and from tests where configuration loading and IO streams can
//! be substituted.

use std::ffi::OsString;
use std::io::Write;
use std::process::ExitCode;

use clap::Parser;
use clap::error::ErrorKind;
use meshctl_config::Config;

mod config;
mod errors;
mod logging;
mod protocol;
mod render;
mod request;
mod transport;

use config::{ConfigArgumentSplit, split_config_arguments};
pub(crate) use config::{ConfigLoader, OrthoConfigLoader};
pub(crate) use errors::AppError;
use protocol::read_response;
use render::{OutputFormat, RenderOptions, render_response};
use request::{AdminRequest, CommandInvocation};
use transport::connect;

/// CLI flags recognised by the configuration loader.
///
/// MAINTENANCE: This list must be kept in sync with the configuration flags
/// defined in `meshctl-config`. When adding new configuration options, update
/// this array accordingly.
const CONFIG_CLI_FLAGS: &[&str] = &[
    "--config-path",
    "--admin-socket",
    "--log-filter",
    "--log-format",
];

/// Bundles the IO streams provided to the CLI runtime.
pub(crate) struct IoStreams<'a, W: Write, E: Write> {
    pub(crate) stdout: &'a mut W,
    pub(crate) stderr: &'a mut E,
}

impl<'a, W: Write, E: Write> IoStreams<'a, W, E> {
    pub(crate) fn new(stdout: &'a mut W, stderr: &'a mut E) -> Self {
        Self { stdout, stderr }
    }
}

struct CliRunner<'a, 'io, W: Write, E: Write, L: ConfigLoader> {
    io: &'a mut IoStreams<'io, W, E>,
    loader: &'a L,
}

impl<'a, 'io, W, E, L> CliRunner<'a, 'io, W, E, L>
where
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    fn new(io: &'a mut IoStreams<'io, W, E>, loader: &'a L) -> Self {
        Self { io, loader }
    }

    fn run<I>(&mut self, args: I) -> ExitCode
    where
        I: IntoIterator<Item = OsString>,
    {
        let args: Vec<OsString> = args.into_iter().collect();
        let split = split_config_arguments(&args);
        let cli_arguments = prepare_cli_arguments(&args, &split);

        let result = Cli::try_parse_from(cli_arguments)
            .map_err(AppError::CliUsage)
            .and_then(|cli| {
                self.loader
                    .load(&split.config_arguments)
                    .map(|config| (cli, config))
            })
            .and_then(|(cli, config)| {
                logging::init(&config);
                let format = cli.output;
                let options = RenderOptions {
                    verbose: cli.verbose,
                };
                let invocation = CommandInvocation::try_from(cli)?;
                execute_admin_command(invocation, &config, self.io, format, &options)
            });

        match result {
            Ok(exit_code) => exit_code,
            Err(AppError::CliUsage(error))
                if matches!(
                    error.kind(),
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
                ) =>
            {
                let _ = write!(self.io.stdout, "{error}");
                ExitCode::SUCCESS
            }
            Err(error) => {
                let _ = writeln!(self.io.stderr, "{error}");
                ExitCode::FAILURE
            }
        }
    }
}

/// Runs the CLI using the provided arguments and IO handles.
#[must_use]
pub fn run<I, W, E>(args: I, stdout: &mut W, stderr: &mut E) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
{
    let mut io = IoStreams::new(stdout, stderr);
    run_with_loader(args, &mut io, &OrthoConfigLoader)
}

/// Runs the CLI with a custom configuration loader.
#[must_use]
pub(crate) fn run_with_loader<I, W, E, L>(
    args: I,
    io: &mut IoStreams<'_, W, E>,
    loader: &L,
) -> ExitCode
where
    I: IntoIterator<Item = OsString>,
    W: Write,
    E: Write,
    L: ConfigLoader,
{
    CliRunner::new(io, loader).run(args)
}

fn prepare_cli_arguments(args: &[OsString], split: &ConfigArgumentSplit) -> Vec<OsString> {
    let mut cli_arguments: Vec<OsString> = Vec::new();
    if let Some(first) = args.first() {
        cli_arguments.push(first.clone());
    }
    if split.command_start < args.len() {
        cli_arguments.extend(args[split.command_start..].iter().cloned());
    }
    cli_arguments
}

fn execute_admin_command<W, E>(
    invocation: CommandInvocation,
    config: &Config,
    io: &mut IoStreams<'_, W, E>,
    format: OutputFormat,
    options: &RenderOptions,
) -> Result<ExitCode, AppError>
where
    W: Write,
    E: Write,
{
    let request = AdminRequest::from(invocation);
    tracing::debug!(
        command = %request.name,
        endpoint = %config.admin_socket(),
        "sending admin request"
    );
    let mut connection = connect(config.admin_socket())?;
    request.write_json(&mut connection)?;
    let response = read_response(&mut connection)?;
    tracing::debug!(status = %response.status, "received admin response");
    render_response(&response, format, options, &mut *io.stdout)?;
    io.stdout.flush().map_err(AppError::RenderOutput)?;
    // Any status other than "success" is a failed invocation, even when the
    // body rendered cleanly.
    if response.is_success() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}

/// Parsed command line. Configuration flags are stripped before parsing, so
/// only the output controls and the admin command itself appear here.
#[derive(Parser, Debug)]
#[command(name = "meshctl", version, disable_help_subcommand = true)]
pub(crate) struct Cli {
    /// Controls how the response body is rendered.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub(crate) output: OutputFormat,
    /// Shows hidden columns and identity key material.
    #[arg(short, long)]
    pub(crate) verbose: bool,
    /// The admin command to invoke (for example `getPeers`).
    #[arg(value_name = "COMMAND")]
    pub(crate) command: Option<String>,
    /// `key[=value]` parameters forwarded with the request.
    #[arg(
        value_name = "PARAM",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    pub(crate) arguments: Vec<String>,
}
