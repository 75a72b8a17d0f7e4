//! # Audit Events and Receipts
//!
//! Every successful `deposit` or `withdraw` emits exactly one event. Events
//! are sequenced per escrow, appended to the escrow's audit log, delivered
//! to listeners, and returned to the caller inside a [`Receipt`].
//!
//! Failed calls emit nothing.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use escrow_core::{AccountId, Amount, ReceiptId, Timestamp};

/// An audit event emitted by the escrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum EscrowEvent {
    /// `amount` was pulled from the primary and credited to `payee`.
    Deposited {
        /// Beneficiary credited.
        payee: AccountId,
        /// Units credited.
        amount: Amount,
    },
    /// `payee`'s full balance of `amount` was released to them.
    Withdrawn {
        /// Beneficiary paid out.
        payee: AccountId,
        /// Units released.
        amount: Amount,
    },
}

impl EscrowEvent {
    /// The event's kind, without payload.
    pub fn kind(&self) -> EventKind {
        match self {
            Self::Deposited { .. } => EventKind::Deposited,
            Self::Withdrawn { .. } => EventKind::Withdrawn,
        }
    }

    /// The payee the event concerns.
    pub fn payee(&self) -> &AccountId {
        match self {
            Self::Deposited { payee, .. } | Self::Withdrawn { payee, .. } => payee,
        }
    }

    /// The amount moved.
    pub fn amount(&self) -> Amount {
        match self {
            Self::Deposited { amount, .. } | Self::Withdrawn { amount, .. } => *amount,
        }
    }
}

/// Event discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// See [`EscrowEvent::Deposited`].
    Deposited,
    /// See [`EscrowEvent::Withdrawn`].
    Withdrawn,
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Deposited => "Deposited",
            Self::Withdrawn => "Withdrawn",
        })
    }
}

/// An event as stored in the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Position in the escrow's audit log, starting at 0.
    pub sequence: u64,
    /// Receipt of the call that emitted the event.
    pub receipt: ReceiptId,
    /// When the event was recorded.
    pub recorded_at: Timestamp,
    /// The event itself.
    #[serde(flatten)]
    pub event: EscrowEvent,
}

/// Result of one successful mutating call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Unique receipt identifier.
    pub id: ReceiptId,
    /// Identity that made the call.
    pub caller: AccountId,
    /// Events emitted by the call, in order.
    pub events: Vec<EventRecord>,
}

impl Receipt {
    /// First event of `kind` in this receipt.
    pub fn find_event(&self, kind: EventKind) -> Option<&EscrowEvent> {
        self.events
            .iter()
            .map(|record| &record.event)
            .find(|event| event.kind() == kind)
    }
}

/// Callback invoked synchronously for every recorded event, in log order.
pub type EventListener = Arc<dyn Fn(&EventRecord) + Send + Sync>;
