//! Upstream handler capabilities.
//!
//! The sink defers to the screen reader's real event handlers at flush
//! time. A single upstream handle is supplied at construction; which of the
//! five capabilities it exposes is discovered through [`UpstreamHandler`]'s
//! adapter views, so a handler may implement any subset. Intakes for a kind
//! the handle does not expose fail with
//! [`HandlerError::UnsupportedCapability`](crate::HandlerError::UnsupportedCapability)
//! and never touch the buffer.
//!
//! The split into one trait per capability mirrors how the OS accessibility
//! client registers handlers: the same object may serve several
//! registrations, each seen through a narrower interface.

use std::sync::Arc;

use crate::element::{AccessibleElement, AccessibleTextRange};
use crate::error::HandlerResult;
use crate::record::{EventId, NotificationKind, NotificationProcessing, PropertyId};
use crate::value::PropertyValue;

/// Receiver for generic automation events.
pub trait AutomationEventHandler: Send + Sync {
    /// Handle one automation event raised on `element`.
    fn handle_automation_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        event_id: EventId,
    ) -> HandlerResult;
}

/// Receiver for focus-change events.
pub trait FocusChangedEventHandler: Send + Sync {
    /// Handle the input focus moving to `element`.
    fn handle_focus_changed_event(&self, element: Arc<dyn AccessibleElement>) -> HandlerResult;
}

/// Receiver for property-change events.
pub trait PropertyChangedEventHandler: Send + Sync {
    /// Handle `property_id` on `element` taking a new value.
    fn handle_property_changed_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        property_id: PropertyId,
        value: PropertyValue,
    ) -> HandlerResult;
}

/// Receiver for application notifications.
pub trait NotificationEventHandler: Send + Sync {
    /// Handle a notification raised on `element`.
    fn handle_notification_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        kind: NotificationKind,
        processing: NotificationProcessing,
        display: String,
        activity_id: String,
    ) -> HandlerResult;
}

/// Receiver for active-text-position changes.
pub trait ActiveTextPositionChangedEventHandler: Send + Sync {
    /// Handle the active text position moving within `range` on `element`.
    fn handle_active_text_position_changed_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        range: Arc<dyn AccessibleTextRange>,
    ) -> HandlerResult;
}

/// A single upstream handle exposing any subset of the event capabilities.
///
/// This is the discovery seam between the sink and the real handlers. Every
/// method defaults to `None`, so an implementation only overrides the views
/// it actually supports:
///
/// ```
/// use aural_events::{
///     AccessibleElement, FocusChangedEventHandler, HandlerResult, UpstreamHandler,
/// };
/// use std::sync::Arc;
///
/// struct FocusOnly;
///
/// impl FocusChangedEventHandler for FocusOnly {
///     fn handle_focus_changed_event(
///         &self,
///         _element: Arc<dyn AccessibleElement>,
///     ) -> HandlerResult {
///         Ok(())
///     }
/// }
///
/// impl UpstreamHandler for FocusOnly {
///     fn as_focus_changed_event_handler(&self) -> Option<&dyn FocusChangedEventHandler> {
///         Some(self)
///     }
/// }
/// ```
///
/// [`RateLimitedSink`](crate::RateLimitedSink) implements this trait too and
/// reports every capability, all views landing on the same shared buffer.
pub trait UpstreamHandler: Send + Sync {
    /// View of this handle as an automation event receiver.
    fn as_automation_event_handler(&self) -> Option<&dyn AutomationEventHandler> {
        None
    }

    /// View of this handle as a focus-change receiver.
    fn as_focus_changed_event_handler(&self) -> Option<&dyn FocusChangedEventHandler> {
        None
    }

    /// View of this handle as a property-change receiver.
    fn as_property_changed_event_handler(&self) -> Option<&dyn PropertyChangedEventHandler> {
        None
    }

    /// View of this handle as a notification receiver.
    fn as_notification_event_handler(&self) -> Option<&dyn NotificationEventHandler> {
        None
    }

    /// View of this handle as an active-text-position receiver.
    fn as_active_text_position_changed_event_handler(
        &self,
    ) -> Option<&dyn ActiveTextPositionChangedEventHandler> {
        None
    }
}
