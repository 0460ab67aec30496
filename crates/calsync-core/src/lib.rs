//! Core types: events, identifiers, descriptions, timestamps

pub mod description;
pub mod error;
pub mod event;
pub mod id;
pub mod time;
pub mod tracing;

pub use description::{DescriptionEntry, ParsedDescription, extract_urls, parse_description};
pub use error::{CoreError, CoreResult};
pub use event::{Event, EventDraft};
pub use id::{is_event_id, new_event_id};
pub use time::{events_on_day, format_compact, parse_compact, parse_instant, sort_chronologically};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
