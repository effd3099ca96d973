//! JSON envelope written to stdout.

use std::io::Write;

use serde::Serialize;
use serde_json::Value;

use crate::error::CliError;

/// A request-level failure with its stable code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
}

impl EnvelopeError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// `{data, warnings, errors}` as printed by every command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl Envelope {
    /// Process exit code: 3 when the request failed, 0 otherwise.
    pub fn exit_code(&self) -> u8 {
        if self.errors.is_empty() {
            0
        } else {
            3
        }
    }
}

pub fn render(envelope: &Envelope, pretty: bool) -> Result<(), CliError> {
    let rendered = to_json(envelope, pretty)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{rendered}")?;
    Ok(())
}

fn to_json(envelope: &Envelope, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(envelope)
    } else {
        serde_json::to_string(envelope)
    }
}
