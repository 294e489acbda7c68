//! Purpose: Turn a byte stream of JSON values into records for the CLI helpers.
//! Exports: `read_json_stream`, `parse_json_arg`, `read_json_file`.
//! Role: Input boundary for `least`; keeps decode errors mapped to stable kinds.
//! Invariants: Records are handed over in input order with a zero-based index.
//! Invariants: The first malformed record stops the stream with a usage error.

use std::fs;
use std::io::{self, Read};
use std::path::Path;

use least::api::{Error, ErrorKind};
use serde_json::Value;

/// Accepts JSON Lines as well as whitespace-separated concatenated JSON.
pub fn read_json_stream<R, F>(reader: R, mut on_value: F) -> Result<u64, Error>
where
    R: Read,
    F: FnMut(u64, Value) -> Result<(), Error>,
{
    let mut count = 0u64;
    let stream =
        serde_json::Deserializer::from_reader(io::BufReader::new(reader)).into_iter::<Value>();
    for item in stream {
        let value = item.map_err(|err| decode_error(err, count))?;
        on_value(count, value)?;
        count += 1;
    }
    Ok(count)
}

pub fn parse_json_arg(text: &str, what: &str) -> Result<Value, Error> {
    serde_json::from_str(text).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("{what} is not valid JSON"))
            .with_hint(format!(
                "line {}, column {}. Quote strings, e.g. '\"text\"'.",
                err.line(),
                err.column()
            ))
            .with_source(err)
    })
}

pub fn read_json_file(path: &Path) -> Result<Value, Error> {
    let text = fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message(format!("failed to read {}", path.display()))
            .with_source(err)
    })?;
    parse_json_arg(&text, "target file")
}

fn decode_error(err: serde_json::Error, index: u64) -> Error {
    if err.is_io() {
        return Error::new(ErrorKind::Io)
            .with_message("failed to read input")
            .with_source(err);
    }
    Error::new(ErrorKind::Usage)
        .with_message(format!("invalid json in input record {index}"))
        .with_hint(format!(
            "line {}, column {}. Input must be JSON values separated by whitespace or newlines.",
            err.line(),
            err.column()
        ))
        .with_source(err)
}
