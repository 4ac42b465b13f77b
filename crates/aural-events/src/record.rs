//! Buffered event records and their coalescing keys.
//!
//! Each inbound accessibility event is captured as an [`EventRecord`]: a
//! strong reference to the source element, a per-kind payload, and a
//! [`CoalescingKey`] computed once at construction. Records are plain
//! values; classifying, merging and emitting them is the sink's job, which
//! keeps this module free of locking concerns.
//!
//! # Coalescing keys
//!
//! The key is an ordered integer sequence: the element's runtime id
//! followed by kind-specific discriminators. Two records with equal keys
//! describe successive versions of the same logical update, so only the
//! newest needs to reach the real handler. Kinds where every individual
//! event matters (focus moves, notifications, text-position changes) carry
//! no key and pass through unconsolidated.

use std::fmt;
use std::sync::Arc;

use crate::element::{AccessibleElement, AccessibleTextRange};
use crate::value::PropertyValue;

/// OS-defined identifier of an automation event type.
pub type EventId = i32;

/// OS-defined identifier of an element property.
pub type PropertyId = i32;

/// Event id the OS reserves for property-change notifications.
///
/// Folded into property-change coalescing keys so they can never collide
/// with a plain automation event raised on the same element.
pub const PROPERTY_CHANGED_EVENT_ID: EventId = 20004;

/// The kinds of accessibility event the sink can buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A generic automation event identified by an [`EventId`].
    Automation,
    /// The input focus moved to an element.
    FocusChanged,
    /// A property of an element changed value.
    PropertyChanged,
    /// An application-raised notification with display text.
    Notification,
    /// The active text position moved within a text control.
    ActiveTextPositionChanged,
}

impl EventKind {
    /// Short lowercase name for logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::Automation => "automation",
            Self::FocusChanged => "focus-changed",
            Self::PropertyChanged => "property-changed",
            Self::Notification => "notification",
            Self::ActiveTextPositionChanged => "active-text-position-changed",
        }
    }

    /// Whether successive events of this kind on the same source collapse
    /// into the newest one.
    ///
    /// Focus moves, notifications and text-position changes each matter
    /// individually and are passed through unconsolidated.
    pub const fn is_coalesceable(self) -> bool {
        matches!(self, Self::Automation | Self::PropertyChanged)
    }

    /// Whether an event of this kind asks the consumer for a zero-delay
    /// flush.
    pub const fn forces_flush(self) -> bool {
        !self.is_coalesceable()
    }
}

/// What an application notification announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    /// An item was added to the element's content.
    ItemAdded,
    /// An item was removed from the element's content.
    ItemRemoved,
    /// An action on the element completed.
    ActionCompleted,
    /// An action on the element was aborted.
    ActionAborted,
    /// A notification outside the categories above.
    Other,
}

/// How the screen reader should schedule a notification against output
/// already in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationProcessing {
    /// Speak after current output, never dropping this notification.
    ImportantAll,
    /// Interrupt, keeping only the most recent important notification.
    ImportantMostRecent,
    /// Speak after current output.
    All,
    /// Keep only the most recent notification.
    MostRecent,
    /// Finish the current utterance, then keep only the most recent.
    CurrentThenMostRecent,
}

/// Identity of a coalescing class.
///
/// Records with equal keys are successive versions of the same logical
/// update; only the newest survives to the flush. A key whose element
/// yielded no runtime id holds just the kind discriminators, so
/// identity-less records of the same kind share one degraded bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CoalescingKey(Vec<i32>);

impl CoalescingKey {
    fn automation(element: &dyn AccessibleElement, event_id: EventId) -> Self {
        let mut parts = runtime_id_parts(element);
        parts.push(event_id);
        Self(parts)
    }

    fn property_changed(element: &dyn AccessibleElement, property_id: PropertyId) -> Self {
        let mut parts = runtime_id_parts(element);
        parts.push(PROPERTY_CHANGED_EVENT_ID);
        parts.push(property_id);
        Self(parts)
    }

    /// The key as an integer slice.
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

fn runtime_id_parts(element: &dyn AccessibleElement) -> Vec<i32> {
    element
        .runtime_id()
        .map(|id| id.into_parts())
        .unwrap_or_default()
}

/// Per-kind payload of an [`EventRecord`].
pub enum EventPayload {
    /// Payload of a generic automation event.
    Automation {
        /// The OS event id.
        event_id: EventId,
    },
    /// Focus changes carry no payload beyond the element.
    FocusChanged,
    /// Payload of a property-change event.
    PropertyChanged {
        /// The property that changed.
        property_id: PropertyId,
        /// The property's new value.
        value: PropertyValue,
    },
    /// Payload of an application notification.
    Notification {
        /// What the notification announces.
        kind: NotificationKind,
        /// How to schedule it against output in progress.
        processing: NotificationProcessing,
        /// Text to present to the user.
        display: String,
        /// Application-defined activity identifier.
        activity_id: String,
    },
    /// Payload of an active-text-position change.
    ActiveTextPositionChanged {
        /// The text span the position moved within.
        range: Arc<dyn AccessibleTextRange>,
    },
}

/// One buffered accessibility event.
///
/// Captures everything needed to re-emit the event to the matching upstream
/// handler. The coalescing key is fixed at construction; merging a
/// superseded record only accumulates its count. Records are not cloneable
/// (they own strong element and value references) and move through the sink
/// by value.
pub struct EventRecord {
    element: Arc<dyn AccessibleElement>,
    payload: EventPayload,
    key: Option<CoalescingKey>,
    coalesce_count: u32,
}

impl EventRecord {
    /// Record a generic automation event.
    ///
    /// The coalescing key is computed here, before the record ever reaches
    /// the sink's lock, because obtaining the runtime id may cost an OS
    /// round trip.
    pub fn automation(element: Arc<dyn AccessibleElement>, event_id: EventId) -> Self {
        let key = CoalescingKey::automation(element.as_ref(), event_id);
        Self {
            element,
            payload: EventPayload::Automation { event_id },
            key: Some(key),
            coalesce_count: 1,
        }
    }

    /// Record a focus change.
    pub fn focus_changed(element: Arc<dyn AccessibleElement>) -> Self {
        Self {
            element,
            payload: EventPayload::FocusChanged,
            key: None,
            coalesce_count: 1,
        }
    }

    /// Record a property change.
    pub fn property_changed(
        element: Arc<dyn AccessibleElement>,
        property_id: PropertyId,
        value: PropertyValue,
    ) -> Self {
        let key = CoalescingKey::property_changed(element.as_ref(), property_id);
        Self {
            element,
            payload: EventPayload::PropertyChanged { property_id, value },
            key: Some(key),
            coalesce_count: 1,
        }
    }

    /// Record an application notification.
    pub fn notification(
        element: Arc<dyn AccessibleElement>,
        kind: NotificationKind,
        processing: NotificationProcessing,
        display: String,
        activity_id: String,
    ) -> Self {
        Self {
            element,
            payload: EventPayload::Notification {
                kind,
                processing,
                display,
                activity_id,
            },
            key: None,
            coalesce_count: 1,
        }
    }

    /// Record an active-text-position change.
    pub fn active_text_position_changed(
        element: Arc<dyn AccessibleElement>,
        range: Arc<dyn AccessibleTextRange>,
    ) -> Self {
        Self {
            element,
            payload: EventPayload::ActiveTextPositionChanged { range },
            key: None,
            coalesce_count: 1,
        }
    }

    /// The kind of event this record captures.
    pub fn kind(&self) -> EventKind {
        match self.payload {
            EventPayload::Automation { .. } => EventKind::Automation,
            EventPayload::FocusChanged => EventKind::FocusChanged,
            EventPayload::PropertyChanged { .. } => EventKind::PropertyChanged,
            EventPayload::Notification { .. } => EventKind::Notification,
            EventPayload::ActiveTextPositionChanged { .. } => {
                EventKind::ActiveTextPositionChanged
            }
        }
    }

    /// The element the event concerns.
    pub fn element(&self) -> &Arc<dyn AccessibleElement> {
        &self.element
    }

    /// The record's payload.
    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    /// The record's coalescing identity; `None` for kinds that pass through
    /// unconsolidated.
    pub fn coalescing_key(&self) -> Option<&CoalescingKey> {
        self.key.as_ref()
    }

    /// How many raw intakes this record stands for.
    pub fn coalesce_count(&self) -> u32 {
        self.coalesce_count
    }

    /// Whether this record asks the consumer for a zero-delay flush.
    pub fn forces_flush(&self) -> bool {
        self.kind().forces_flush()
    }

    /// Fold a superseded record of the same class into this one.
    ///
    /// This record's element and payload (the newest state) win; only the
    /// intake count accumulates, preserving burst visibility for
    /// diagnostics.
    pub(crate) fn absorb(&mut self, superseded: EventRecord) {
        debug_assert_eq!(self.key, superseded.key);
        self.coalesce_count += superseded.coalesce_count;
    }

    /// Split the record into the parts emission needs.
    pub(crate) fn into_parts(self) -> (Arc<dyn AccessibleElement>, EventPayload) {
        (self.element, self.payload)
    }
}

impl fmt::Debug for EventRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut debug = f.debug_struct("EventRecord");
        debug.field("kind", &self.kind().name());
        if let Some(key) = &self.key {
            debug.field("key", &key.as_slice());
        }
        debug.field("coalesce_count", &self.coalesce_count).finish()
    }
}
