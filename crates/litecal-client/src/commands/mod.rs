//! Command implementations.

pub mod canonicalize;
pub mod config;
pub mod payload;

use std::io::Read;
use std::path::Path;

use litecal_core::EventFieldsRaw;

use crate::error::{ClientError, ClientResult};

/// Reads a file, or stdin when `path` is `None` or `-`.
pub(crate) fn read_input(path: Option<&Path>) -> ClientResult<String> {
    match path {
        Some(path) if path != Path::new("-") => Ok(std::fs::read_to_string(path)?),
        _ => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Parses extracted event fields from JSON.
pub(crate) fn parse_fields(json: &str) -> ClientResult<EventFieldsRaw> {
    if json.trim().is_empty() {
        return Err(ClientError::Input("no event fields given".to_string()));
    }
    Ok(serde_json::from_str(json)?)
}
