use std::collections::HashMap;

use crate::model::{Identity, PendingItem, StagedEntry};

/// Mutable reconciliation state for one resolution pass, constructed and
/// owned by the caller.
///
/// Invariant: a given identity appears in at most one of the confirmed
/// cache and the pending queue; `defer` refuses duplicates and already
/// confirmed identities.
#[derive(Debug, Default)]
pub struct ReconState {
    confirmed: HashMap<Identity, Identity>,
    pending: Vec<PendingItem>,
    /// Terminal rows that exhausted matching with no viable candidate.
    pub unresolved: Vec<StagedEntry>,
    /// Terminal rows whose only evidence is the remote lookup.
    pub external_only: Vec<StagedEntry>,
}

impl ReconState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Previously confirmed candidate for this identity, if any.
    pub fn confirmed(&self, identity: &Identity) -> Option<&Identity> {
        self.confirmed.get(identity)
    }

    /// Record a confirmed identity -> candidate mapping.
    pub fn confirm(&mut self, identity: Identity, candidate: Identity) {
        self.confirmed.insert(identity, candidate);
    }

    pub fn is_pending(&self, identity: &Identity) -> bool {
        self.pending.iter().any(|p| p.key.identity() == *identity)
    }

    /// Enqueue a line for manual adjudication. An identity is enqueued at
    /// most once; returns whether the item was accepted.
    pub fn defer(&mut self, item: PendingItem) -> bool {
        let identity = item.key.identity();
        if self.confirmed.contains_key(&identity) || self.is_pending(&identity) {
            return false;
        }
        self.pending.push(item);
        true
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Drain the pending queue in input order for adjudication.
    pub fn take_pending(&mut self) -> Vec<PendingItem> {
        std::mem::take(&mut self.pending)
    }
}
