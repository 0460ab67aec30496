//! iCalendar codec.
//!
//! [`decode`] turns raw iCalendar text (one or more concatenated
//! `VCALENDAR` documents) into events, expanding recurrence rules up to
//! [`MAX_OCCURRENCES`]. [`encode`] renders one event as a minimal
//! single-event document, the body of every PUT.

mod decode;
mod encode;
mod recurrence;
mod text;

pub use decode::decode;
pub use encode::{PRODID, encode, encode_at};
pub use recurrence::{Expansion, MAX_OCCURRENCES, expand_rule};
pub use text::escape_text;
