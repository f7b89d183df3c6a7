//! Response rendering: envelope validation, formatter dispatch, and the
//! shared output options.

mod detail;
mod table;
pub(crate) mod value;

use std::io::{self, Write};

use clap::ValueEnum;
use serde_json::Value;

use crate::errors::AppError;
use crate::protocol::AdminResponse;

/// How the response body is presented on stdout.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Command-specific human-readable rendering.
    #[default]
    Human,
    /// The raw response body, pretty-printed.
    Json,
}

/// Flags threaded through every formatter.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct RenderOptions {
    pub(crate) verbose: bool,
}

type Formatter = fn(&Value, &RenderOptions, &mut dyn Write) -> io::Result<()>;

/// Command families sharing a formatter. Dispatch keys are the command
/// names echoed back by the daemon, compared case-insensitively.
const FORMATTERS: &[(&[&str], Formatter)] = &[
    (&["dot"], detail::render_graph_export),
    (
        &[
            "list",
            "getpeers",
            "getswitchpeers",
            "getdht",
            "getsessions",
            "dhtping",
        ],
        table::render_table,
    ),
    (&["getself"], detail::render_self_info),
    (&["gettuntap", "settuntap"], detail::render_tunnel_interface),
    (&["getswitchqueues"], detail::render_switch_queues),
    (
        &[
            "addpeer",
            "removepeer",
            "addallowedencryptionpublickey",
            "removeallowedencryptionpublickey",
            "addsourcesubnet",
            "removesourcesubnet",
            "addroute",
            "removeroute",
        ],
        detail::render_add_remove_report,
    ),
    (
        &["getallowedencryptionpublickeys"],
        detail::render_allowed_keys,
    ),
    (
        &["getmulticastinterfaces"],
        detail::render_multicast_interfaces,
    ),
    (&["getsourcesubnets"], detail::render_source_subnets),
    (&["getroutes"], detail::render_routes),
    (
        &["gettunnelrouting", "settunnelrouting"],
        detail::render_tunnel_routing,
    ),
];

fn lookup_formatter(command: &str) -> Option<Formatter> {
    FORMATTERS
        .iter()
        .find(|(names, _)| names.contains(&command))
        .map(|(_, formatter)| *formatter)
}

/// Validates the response envelope and renders the body to `out`.
///
/// An `error` status aborts rendering; a success envelope that is missing
/// the echoed request or the body is reported as malformed. Commands the
/// registry does not know fall back to pretty-printed JSON so new daemon
/// operations remain usable without a client upgrade.
pub(crate) fn render_response(
    response: &AdminResponse,
    format: OutputFormat,
    options: &RenderOptions,
    out: &mut dyn Write,
) -> Result<(), AppError> {
    if response.status == "error" {
        return Err(AppError::AdminError {
            message: response.error.clone(),
        });
    }
    if response.request.is_none() {
        return Err(AppError::MissingRequestEcho);
    }
    let Some(body) = response.response.as_ref() else {
        return Err(AppError::MissingResponseBody);
    };

    // An echo object without a usable command name renders like an unknown
    // command rather than failing: the envelope itself was well-formed.
    let formatter = response
        .echoed_command()
        .and_then(|command| lookup_formatter(&command));
    let outcome = match format {
        OutputFormat::Json => write_pretty(body, out),
        OutputFormat::Human => match formatter {
            Some(formatter) => formatter(body, options, out),
            None => write_pretty(body, out),
        },
    };
    outcome.map_err(AppError::RenderOutput)
}

fn write_pretty(body: &Value, out: &mut dyn Write) -> io::Result<()> {
    let rendered = serde_json::to_string_pretty(body).unwrap_or_default();
    writeln!(out, "{rendered}")
}
