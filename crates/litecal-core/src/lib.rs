//! Core types: event canonicalization, calendar documents, payload codec,
//! display formatting

pub mod canonicalize;
pub mod codec;
pub mod error;
pub mod event;
pub mod format;
pub mod ics;
pub mod normalize;
pub mod time;
pub mod tracing;

pub use canonicalize::{
    Canonicalized, CanonicalizerOptions, EventCanonicalizer, NormalizationOutcome, PayloadSource,
    canonicalize,
};
pub use codec::EncodedPayload;
pub use error::{CodecError, DocumentInvalid, NormalizationError, PayloadRejected};
pub use event::{CanonicalEvent, DeviceCalendarRequest, EventFieldsRaw};
pub use format::{DisplayOptions, EventDisplay, format_date, format_time, title_case};
pub use ics::{CalendarDocumentEncoder, InterchangeDocument, ParsedEvent};
pub use normalize::DateTimeNormalizer;
pub use time::LocalInstant;
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
