//! Canonicalize and show commands.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use litecal_core::{
    CanonicalEvent, Canonicalized, DeviceCalendarRequest, DisplayOptions, EncodedPayload,
    EventCanonicalizer, EventDisplay, NormalizationOutcome, PayloadRejected, PayloadSource,
};
use serde::Serialize;
use tracing::{debug, info};

use super::{parse_fields, read_input};
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// Everything the canonicalize command reports.
#[derive(Debug, Serialize)]
pub struct CanonicalizeReport<'a> {
    pub event: &'a CanonicalEvent,
    pub display: EventDisplay,
    pub device_calendar: DeviceCalendarRequest,
    pub payload: &'a EncodedPayload,
    pub normalization: String,
    pub payload_source: String,
    pub filename: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_to: Option<PathBuf>,
}

impl<'a> CanonicalizeReport<'a> {
    pub fn new(
        result: &'a Canonicalized,
        display: &DisplayOptions,
        reminder_minutes: u32,
        exported_to: Option<PathBuf>,
    ) -> Self {
        Self {
            event: &result.event,
            display: EventDisplay::from_event_with(&result.event, display),
            device_calendar: result.event.device_calendar_request(reminder_minutes),
            payload: &result.payload,
            normalization: describe_outcome(&result.outcome),
            payload_source: describe_source(&result.payload_source),
            filename: result.event.suggested_filename(),
            exported_to,
        }
    }

    /// Plain-text rendering: the card, the payload, then any notes.
    pub fn render(&self) -> String {
        let mut out = render_card(&self.display);
        out.push('\n');
        let _ = writeln!(out, "payload: {}", self.payload);
        if self.normalization != "normalized" {
            let _ = writeln!(out, "note: {}", self.normalization);
        }
        if self.payload_source.starts_with("replaced") {
            let _ = writeln!(out, "note: {}", self.payload_source);
        }
        if let Some(ref path) = self.exported_to {
            let _ = writeln!(out, "exported: {}", path.display());
        }
        out
    }
}

pub fn describe_outcome(outcome: &NormalizationOutcome) -> String {
    match outcome {
        NormalizationOutcome::Normalized => "normalized".to_string(),
        NormalizationOutcome::DefaultEnd(err) => format!("default duration applied ({})", err),
        NormalizationOutcome::Synthetic(err) => format!("placeholder event used ({})", err),
    }
}

pub fn describe_source(source: &PayloadSource) -> String {
    match source {
        PayloadSource::Regenerated => "regenerated".to_string(),
        PayloadSource::Upstream => "upstream".to_string(),
        PayloadSource::Replaced(err) => format!("replaced upstream payload ({})", err),
    }
}

/// Renders the confirmation card, one field per line.
pub fn render_card(display: &EventDisplay) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", display.title);
    let _ = writeln!(out, "{}", display.date);
    let _ = writeln!(out, "{}", display.time_range);
    if let Some(ref location) = display.location {
        let _ = writeln!(out, "{}", location);
    }
    if let Some(ref description) = display.description {
        let _ = writeln!(out, "{}", description);
    }
    out
}

/// Writes the decoded document to `dir`, named after the event title.
pub fn export_document(dir: &Path, result: &Canonicalized) -> ClientResult<PathBuf> {
    let text = result
        .payload
        .decode()
        .map_err(|e| ClientError::Payload(PayloadRejected::Codec(e)))?;

    std::fs::create_dir_all(dir)?;
    let path = dir.join(result.event.suggested_filename());
    std::fs::write(&path, text)?;

    info!(path = %path.display(), "Exported calendar document");
    Ok(path)
}

fn canonicalizer(config: &ClientConfig) -> ClientResult<EventCanonicalizer> {
    let options = config
        .calendar
        .to_options()
        .map_err(ClientError::Config)?;
    Ok(EventCanonicalizer::new(options))
}

/// Canonicalizes extracted fields and prints the result.
pub fn canonicalize(
    input: Option<&Path>,
    payload: Option<&str>,
    export: Option<&Path>,
    json: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let raw = parse_fields(&read_input(input)?)?;
    let canonicalizer = canonicalizer(config)?;
    debug!(upstream = payload.is_some(), "Canonicalizing event fields");

    let result = canonicalizer.canonicalize_with_upstream(&raw, payload);
    let exported_to = export.map(|dir| export_document(dir, &result)).transpose()?;
    let report = CanonicalizeReport::new(
        &result,
        &config.display.to_options(),
        canonicalizer.options().reminder_minutes,
        exported_to,
    );

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render());
    }
    Ok(())
}

/// Prints the confirmation card for extracted fields.
pub fn show(
    input: Option<&Path>,
    max_title_length: Option<usize>,
    json: bool,
    config: &ClientConfig,
) -> ClientResult<()> {
    let raw = parse_fields(&read_input(input)?)?;
    let result = canonicalizer(config)?.canonicalize(&raw);

    let mut options = config.display.to_options();
    if max_title_length.is_some() {
        options.max_title_length = max_title_length;
    }
    let display = EventDisplay::from_event_with(&result.event, &options);

    if json {
        println!("{}", serde_json::to_string_pretty(&display)?);
    } else {
        print!("{}", render_card(&display));
    }
    Ok(())
}
