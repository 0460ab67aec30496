//! Per-id claims on in-flight mutations.

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Set of event ids with a mutation currently in flight.
#[derive(Debug, Default)]
pub struct InFlightIds {
    ids: Mutex<HashSet<String>>,
}

impl InFlightIds {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `id`, or returns `None` if it is already claimed.
    ///
    /// The claim is released when the returned guard is dropped.
    pub fn try_claim(&self, id: &str) -> Option<IdClaim<'_>> {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if !ids.insert(id.to_string()) {
            return None;
        }
        Some(IdClaim {
            owner: self,
            id: id.to_string(),
        })
    }

    /// Returns true if `id` is currently claimed.
    pub fn is_claimed(&self, id: &str) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }
}

/// A held claim on one id.
#[derive(Debug)]
pub struct IdClaim<'a> {
    owner: &'a InFlightIds,
    id: String,
}

impl Drop for IdClaim<'_> {
    fn drop(&mut self) {
        self.owner
            .ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
