//! Wire codec for the admin protocol.
//!
//! One JSON document travels in each direction per invocation. The request
//! is a flat object whose `request` key names the command and whose other
//! keys are the parameters; the response is an envelope carrying a status, an
//! echo of the request, an optional error string, and the response body.

use std::io::{Read, Write};

use serde_json::{Map, Value};

use crate::AppError;
use crate::request::AdminRequest;

impl AdminRequest {
    /// Flattens the request into its wire document: parameters are siblings
    /// of the `request` key, not nested beneath it.
    pub(crate) fn to_document(&self) -> Value {
        let mut document = Map::new();
        document.insert(String::from("request"), Value::String(self.name.clone()));
        for (key, value) in &self.params {
            document.insert(key.clone(), value.clone());
        }
        Value::Object(document)
    }

    /// Serialises the request document followed by a newline and flushes.
    pub(crate) fn write_json<W>(&self, writer: &mut W) -> Result<(), AppError>
    where
        W: Write,
    {
        serde_json::to_writer(&mut *writer, &self.to_document())
            .map_err(AppError::SerialiseRequest)?;
        writer.write_all(b"\n").map_err(AppError::SendRequest)?;
        writer.flush().map_err(AppError::SendRequest)
    }
}

/// Decoded response envelope. Read-only once decoded.
#[derive(Debug)]
pub(crate) struct AdminResponse {
    pub(crate) status: String,
    pub(crate) request: Option<Value>,
    pub(crate) error: Option<String>,
    pub(crate) response: Option<Value>,
}

impl AdminResponse {
    pub(crate) fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// The echoed command name, lower-cased for dispatch.
    pub(crate) fn echoed_command(&self) -> Option<String> {
        self.request
            .as_ref()?
            .get("request")?
            .as_str()
            .map(str::to_ascii_lowercase)
    }
}

/// Reads exactly one JSON value from the stream and lifts the envelope
/// fields out of it.
///
/// The daemon may keep the connection open after replying, so this must not
/// read to end-of-stream; a `StreamDeserializer` stops after the first
/// complete value.
pub(crate) fn read_response<R>(reader: R) -> Result<AdminResponse, AppError>
where
    R: Read,
{
    let mut stream = serde_json::Deserializer::from_reader(reader).into_iter::<Value>();
    let document = match stream.next() {
        None => return Err(AppError::TruncatedResponse),
        Some(Err(error)) if error.is_eof() => return Err(AppError::TruncatedResponse),
        Some(Err(error)) => return Err(AppError::ParseResponse(error)),
        Some(Ok(document)) => document,
    };
    let Value::Object(mut envelope) = document else {
        return Err(AppError::UnexpectedPayload);
    };
    // An absent status means success; a present one is kept verbatim so the
    // exit code can reflect any non-success value the daemon reports.
    let status = match envelope.get("status") {
        None => String::from("success"),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };
    let error = envelope
        .get("error")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Ok(AdminResponse {
        status,
        request: envelope.remove("request"),
        error,
        response: envelope.remove("response"),
    })
}
