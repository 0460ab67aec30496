//! iCalendar codec and the remote event store.
//!
//! - [`ics`]: decoding and encoding of iCalendar text
//! - [`store`]: the [`EventStore`] trait the replica layer talks to
//! - [`caldav`]: the HTTP implementation of that trait

pub mod caldav;
pub mod error;
pub mod ics;
pub mod store;

pub use caldav::{CalDavEventStore, FetchMode, StoreConfig};
pub use error::{StoreError, StoreErrorCode, StoreResult};
pub use store::{BoxFuture, DeleteStatus, EventStore};
