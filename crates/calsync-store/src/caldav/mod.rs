//! CalDAV implementation of the event store.
//!
//! # Features
//!
//! - HTTP Basic authentication
//! - Collection fetch by GET or by `calendar-query` REPORT
//! - PUT/DELETE of one `{id}.ics` resource per event
//! - TLS configuration (can be disabled for testing)
//!
//! # Example
//!
//! ```ignore
//! use calsync_store::caldav::{CalDavEventStore, StoreConfig};
//!
//! let config = StoreConfig::new("https://dav.example.com/calendars/user/work/")?
//!     .with_credentials("user", "password");
//!
//! let store = CalDavEventStore::new(config)?;
//! let events = store.fetch_all().await?;
//! ```

mod auth;
mod client;
mod config;
mod store;
mod xml;

pub use auth::basic_auth;
pub use client::CALENDAR_CONTENT_TYPE;
pub use config::{FetchMode, StoreConfig};
pub use store::CalDavEventStore;
