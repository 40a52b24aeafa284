//! Append-only journal of domain events.
//!
//! The [`EventJournal`] is where the execution context stores the events
//! returned in each [`Receipt`](crate::event::Receipt). Every
//! [`JournalEntry`] carries a global sequence number plus the caller and
//! time of the call that produced it.
//!
//! # Query API
//!
//! - **Zombie**: [`EventJournal::events_for_zombie`]
//! - **Kind**: [`EventJournal::events_of_kind`]
//! - **Caller**: [`EventJournal::events_by_caller`]
//!
//! # Example
//!
//! ```
//! use zombie_core::account::{Account, CallContext, Timestamp};
//! use zombie_core::entity::{Dna, ZombieId};
//! use zombie_core::event::{DomainEvent, EventKind};
//! use zombie_core::journal::EventJournal;
//!
//! let mut journal = EventJournal::new();
//! let ctx = CallContext::new(Account::derive("alice"), Timestamp(0));
//! journal.record(&ctx, vec![DomainEvent::Creation {
//!     id: ZombieId(0),
//!     name: "Zombie 1".to_owned(),
//!     dna: Dna::from_raw(7),
//! }]);
//!
//! assert_eq!(journal.len(), 1);
//! assert_eq!(journal.events_of_kind(EventKind::Creation).count(), 1);
//! ```

use serde::{Deserialize, Serialize};

use crate::account::{Account, CallContext, Timestamp};
use crate::entity::ZombieId;
use crate::event::{DomainEvent, EventKind};

// ---------------------------------------------------------------------------
// JournalEntry
// ---------------------------------------------------------------------------

/// One recorded event with its call metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// Position in the journal, starting at 0, never reused.
    pub sequence: u64,
    /// Time of the call that emitted the event.
    pub timestamp: Timestamp,
    /// Account that made the call.
    pub caller: Account,
    /// The event.
    pub event: DomainEvent,
}

// ---------------------------------------------------------------------------
// EventJournal
// ---------------------------------------------------------------------------

/// Accumulates [`JournalEntry`]s in emission order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
    next_sequence: u64,
}

impl EventJournal {
    /// Create a new, empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append all events of one successful call, preserving their order.
    pub fn record(&mut self, ctx: &CallContext, events: impl IntoIterator<Item = DomainEvent>) {
        for event in events {
            self.entries.push(JournalEntry {
                sequence: self.next_sequence,
                timestamp: ctx.now,
                caller: ctx.caller,
                event,
            });
            self.next_sequence += 1;
        }
    }

    /// Drop all entries. Sequence numbers keep counting from where they were.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no entries are retained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All retained entries in emission order.
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// The most recent entry.
    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    /// Entries whose event names `id` in any role.
    pub fn events_for_zombie(&self, id: ZombieId) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.event.involves(id))
    }

    /// Entries of the given kind.
    pub fn events_of_kind(&self, kind: EventKind) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.event.kind() == kind)
    }

    /// Entries produced by calls from `caller`.
    pub fn events_by_caller(&self, caller: Account) -> impl Iterator<Item = &JournalEntry> {
        self.entries.iter().filter(move |e| e.caller == caller)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
