//! Rate-limited delivery of OS accessibility events for the Aural screen
//! reader.
//!
//! Aural subscribes to UI Automation notifications from the operating
//! system: focus changes, generic automation events, property changes,
//! application notifications, and text-position moves. Under bursty UI
//! activity the raw stream can carry hundreds of notifications per second,
//! most of them redundant — only the latest state of a given
//! (element, event) pair is worth speaking. This crate provides the
//! interposing sink that tames that stream:
//!
//! - **Event records** ([`EventRecord`]): value types capturing one
//!   buffered event together with its [`CoalescingKey`].
//! - **The rate-limited sink** ([`RateLimitedSink`]): the object the OS
//!   registers as its event handler. It buffers intakes, coalesces
//!   redundant ones by key, asks the consumer to schedule a flush, and
//!   re-emits survivors to the real handlers.
//! - **Upstream capabilities** ([`UpstreamHandler`] and the per-kind
//!   handler traits): the seam to the screen reader's real event handlers,
//!   any subset of which may be present.
//!
//! # Data flow
//!
//! ```text
//! ┌────────────┐ intake  ┌──────────────────┐ notify  ┌──────────────┐
//! │ OS worker  │────────▶│ RateLimitedSink  │────────▶│  consumer    │
//! │ threads    │         │ (buffer+coalesce)│         │  event loop  │
//! └────────────┘         └──────────────────┘         └──────┬───────┘
//!                                  ▲         flush()         │
//!                                  └─────────────────────────┘
//!                                  │
//!                                  ▼ emit survivors, FIFO
//!                        ┌──────────────────┐
//!                        │ real handlers    │
//!                        └──────────────────┘
//! ```
//!
//! Focus changes, notifications and text-position moves are never
//! coalesced, and each one asks for a zero-delay flush
//! ([`FlushUrgency::Immediate`]); automation and property-change events
//! coalesce per class and are content to wait out a short debounce window.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use aural_events::{
//!     AccessibleElement, AutomationEventHandler, HandlerResult, RateLimitedSink,
//!     RuntimeId, UpstreamHandler,
//! };
//!
//! // The embedder's element handle...
//! struct Element;
//!
//! impl AccessibleElement for Element {
//!     fn runtime_id(&self) -> Option<RuntimeId> {
//!         Some(RuntimeId::new(vec![42, 1]))
//!     }
//! }
//!
//! // ...and its real event handler.
//! #[derive(Default)]
//! struct Speech {
//!     announced: AtomicUsize,
//! }
//!
//! impl AutomationEventHandler for Speech {
//!     fn handle_automation_event(
//!         &self,
//!         _element: Arc<dyn AccessibleElement>,
//!         _event_id: i32,
//!     ) -> HandlerResult {
//!         self.announced.fetch_add(1, Ordering::SeqCst);
//!         Ok(())
//!     }
//! }
//!
//! impl UpstreamHandler for Speech {
//!     fn as_automation_event_handler(&self) -> Option<&dyn AutomationEventHandler> {
//!         Some(self)
//!     }
//! }
//!
//! let speech = Arc::new(Speech::default());
//! let sink = RateLimitedSink::new(speech.clone(), |_urgency| {
//!     // Post a deferred flush to the consumer's event loop here.
//! });
//!
//! let element: Arc<dyn AccessibleElement> = Arc::new(Element);
//! // A burst of identical events collapses into one...
//! for _ in 0..100 {
//!     sink.handle_automation_event(element.clone(), 20008).unwrap();
//! }
//! sink.flush();
//! // ...and the real handler hears about it exactly once.
//! assert_eq!(speech.announced.load(Ordering::SeqCst), 1);
//! ```
//!
//! # Logging
//!
//! The crate is instrumented with the `tracing` crate; install a
//! subscriber such as `tracing-subscriber` in the embedding application to
//! see the intake/coalesce/flush trail at `debug` level and upstream
//! delivery failures at `warn`.

#![warn(missing_docs)]

mod element;
mod error;
mod handler;
mod record;
mod sink;
mod value;

pub use element::{AccessibleElement, AccessibleTextRange, RuntimeId};
pub use error::{HandlerError, HandlerResult};
pub use handler::{
    ActiveTextPositionChangedEventHandler, AutomationEventHandler, FocusChangedEventHandler,
    NotificationEventHandler, PropertyChangedEventHandler, UpstreamHandler,
};
pub use record::{
    CoalescingKey, EventId, EventKind, EventPayload, EventRecord, NotificationKind,
    NotificationProcessing, PropertyId, PROPERTY_CHANGED_EVENT_ID,
};
pub use sink::{FlushRequestCallback, FlushUrgency, RateLimitedSink};
pub use value::PropertyValue;
