//! The local replica and the reconciler that keeps it consistent with a
//! remote [`EventStore`](calsync_store::EventStore).

pub mod guard;
pub mod outcome;
pub mod reconciler;
pub mod replica;

pub use guard::{IdClaim, InFlightIds};
pub use outcome::{Operation, Outcome, Severity};
pub use reconciler::{Reconciler, ReconcilerConfig};
pub use replica::{Replica, Snapshot};
