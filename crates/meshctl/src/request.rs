//! Admin request modelling.
//!
//! Converts parsed CLI tokens into the key/value request document exchanged
//! with the daemon. The wire schema is not fixed, so parameter values are
//! coerced from their textual form: bare tokens become boolean flags,
//! `key=value` pairs try integers and booleans before falling back to text.

use serde_json::{Map, Value};

use crate::{AppError, Cli};

/// The command name plus its raw argument tokens, as typed by the operator.
#[derive(Debug)]
pub(crate) struct CommandInvocation {
    pub(crate) name: String,
    pub(crate) arguments: Vec<String>,
}

impl TryFrom<Cli> for CommandInvocation {
    type Error = AppError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let name = cli.command.ok_or(AppError::MissingCommand)?.trim().to_owned();
        if name.is_empty() {
            return Err(AppError::MissingCommand);
        }
        Ok(Self {
            name,
            arguments: cli.arguments,
        })
    }
}

/// One admin request: built once per invocation, consumed by the codec.
#[derive(Debug)]
pub(crate) struct AdminRequest {
    pub(crate) name: String,
    pub(crate) params: Map<String, Value>,
}

impl From<CommandInvocation> for AdminRequest {
    fn from(invocation: CommandInvocation) -> Self {
        let mut params = Map::new();
        for token in &invocation.arguments {
            let (key, value) = coerce_parameter(token);
            params.insert(key.to_owned(), value);
        }
        Self {
            name: invocation.name,
            params,
        }
    }
}

/// Splits a `key[=value]` token and coerces its value.
///
/// A token with more than one `=` keeps everything after the first `=` as an
/// uncoerced string; only single `key=value` pairs go through the integer
/// and boolean coercion. That asymmetry matches the daemon's expectations
/// for parameters whose values legitimately contain `=` (keys, subnets).
fn coerce_parameter(token: &str) -> (&str, Value) {
    let Some((key, rest)) = token.split_once('=') else {
        return (token, Value::Bool(true));
    };
    if rest.contains('=') {
        return (key, Value::String(rest.to_owned()));
    }
    if let Ok(number) = rest.parse::<i64>() {
        return (key, Value::from(number));
    }
    match rest.to_ascii_lowercase().as_str() {
        "true" => (key, Value::Bool(true)),
        "false" => (key, Value::Bool(false)),
        _ => (key, Value::String(rest.to_owned())),
    }
}
