//! Payload inspection commands.

use litecal_core::codec::{self, strip_data_url};
use litecal_core::ics::{InterchangeDocument, parse_event, validate};
use litecal_core::{EncodedPayload, PayloadRejected};
use tracing::debug;

use crate::error::{ClientError, ClientResult};

/// Reads a payload from the argument, or stdin when it is absent or `-`.
fn read_payload(payload: Option<&str>) -> ClientResult<String> {
    match payload {
        Some(payload) if payload != "-" => Ok(payload.to_string()),
        _ => super::read_input(None),
    }
}

/// Decodes a payload to document text without judging its structure.
pub fn decode_text(payload: &str) -> ClientResult<String> {
    let payload = strip_data_url(payload.trim());
    debug!(len = payload.len(), "Decoding payload");
    codec::decode(payload).map_err(|e| ClientError::Payload(PayloadRejected::Codec(e)))
}

/// Prints the decoded document, or its event fields as JSON.
pub fn decode(payload: Option<&str>, fields: bool) -> ClientResult<()> {
    let text = decode_text(&read_payload(payload)?)?;

    if fields {
        let document = InterchangeDocument::from_text(&text);
        validate(&document).map_err(PayloadRejected::from)?;
        let event = parse_event(&document).unwrap_or_default();
        println!("{}", serde_json::to_string_pretty(&event)?);
    } else {
        print!("{}", text);
    }
    Ok(())
}

/// Checks that a payload decodes to a valid calendar document.
pub fn validate_payload(payload: &str) -> ClientResult<EncodedPayload> {
    Ok(EncodedPayload::parse(payload)?)
}

/// Validates a payload, failing with the reason it was rejected.
pub fn run_validate(payload: Option<&str>) -> ClientResult<()> {
    validate_payload(&read_payload(payload)?)?;
    println!("Payload is valid.");
    Ok(())
}
