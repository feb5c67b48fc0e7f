//! Change notification.
//!
//! The store itself has no cross-view consistency: two views over one
//! storage scope overwrite each other silently. Receivers obtained from
//! [`crate::RecordStore::subscribe`] hear about every successful local
//! write, and an embedding can forward changes it observes from other views
//! through [`crate::RecordStore::notify_external_change`]. Dropping the
//! receiver ends the subscription.

use crate::keys::StorageKey;

/// Events buffered per receiver before the oldest are dropped and the
/// receiver sees `RecvError::Lagged`.
pub const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Written,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOrigin {
    /// Written through this store instance
    Local,
    /// Reported by another view sharing the storage scope
    External,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreEvent {
    pub key: StorageKey,
    pub change: ChangeKind,
    pub origin: ChangeOrigin,
}
