//! The rate-limited event sink.
//!
//! [`RateLimitedSink`] interposes between the OS accessibility layer and
//! the screen reader's real event handlers. Under bursty UI activity (a
//! spinner firing value changes, a list repopulating) the raw stream can
//! carry hundreds of notifications per second, most of them stale by the
//! time they could be spoken; the sink buffers them, collapses redundant
//! ones per [`CoalescingKey`], and hands the survivors to the real handlers
//! in one batched [`flush`](RateLimitedSink::flush).
//!
//! # Data flow
//!
//! ```text
//! OS thread ──intake──▶ [lock: classify, coalesce, append] ──▶ unlock
//!                                   │
//!                    first-of-batch or force-flush?
//!                                   │
//!                            notify(urgency)      (outside the lock)
//!                                   │
//! consumer thread ──later──▶ flush() ──▶ swap state out ──▶ emit each
//!                                                           survivor FIFO
//! ```
//!
//! The notify callback is the only scheduling hook the sink needs: the
//! embedder typically posts a deferred task to its event loop and calls
//! `flush` from there, honoring [`FlushUrgency::suggested_delay`].
//!
//! # Concurrency
//!
//! Intakes arrive on arbitrary OS worker threads; `flush` runs on the
//! consumer's thread. One mutex guards the buffered state, and every
//! critical section is short and allocation-light: runtime ids are fetched
//! before locking, and `flush` swaps the whole state out in O(1) before
//! dispatching, so upstream handlers run lock-free and may safely call back
//! into the OS accessibility API (or even this sink).

use std::collections::HashMap;
use std::mem;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use slotmap::SlotMap;
use tracing::{debug, warn};

use crate::element::{AccessibleElement, AccessibleTextRange};
use crate::error::{HandlerError, HandlerResult};
use crate::handler::{
    ActiveTextPositionChangedEventHandler, AutomationEventHandler, FocusChangedEventHandler,
    NotificationEventHandler, PropertyChangedEventHandler, UpstreamHandler,
};
use crate::record::{
    CoalescingKey, EventId, EventKind, EventPayload, EventRecord, NotificationKind,
    NotificationProcessing, PropertyId,
};
use crate::value::PropertyValue;

slotmap::new_key_type! {
    /// Stable key of a buffered record within one batch.
    struct RecordKey;
}

/// Scheduling hint passed to the flush-request callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushUrgency {
    /// More events of the same class are likely in flight; flushing after a
    /// short debounce window lets them coalesce first.
    Debounced,
    /// The new batch holds an event that must reach its handler with no
    /// added delay, e.g. a focus change.
    Immediate,
}

impl FlushUrgency {
    /// Delay the embedder's scheduler should apply before calling
    /// [`RateLimitedSink::flush`].
    pub const fn suggested_delay(self) -> Duration {
        match self {
            Self::Debounced => Duration::from_millis(30),
            Self::Immediate => Duration::ZERO,
        }
    }
}

/// Callback announcing that at least one record is ready to flush.
///
/// Invoked on whichever OS thread performed the intake, outside the sink's
/// lock, at most once per intake: when the buffer goes from empty to
/// non-empty, and again for every force-flush record. The callback must be
/// cheap and must not block; posting a deferred task to the consumer's
/// event loop is the intended shape. Re-entrant intakes from inside the
/// callback are tolerated.
pub type FlushRequestCallback = Box<dyn Fn(FlushUrgency) + Send + Sync>;

/// Buffered state. One mutex guards all three structures; whenever the
/// lock is not held they are mutually consistent: every coalesceable
/// record has exactly one index entry pointing at it, and non-coalesceable
/// records never appear in the index.
#[derive(Default)]
struct SinkState {
    /// Buffered records, addressed by stable key.
    records: SlotMap<RecordKey, EventRecord>,
    /// Final-enqueue order. A superseded record leaves its entry behind as
    /// a stale key, which `flush` skips.
    order: Vec<RecordKey>,
    /// Coalescing class -> the single live record of that class.
    by_key: HashMap<CoalescingKey, RecordKey>,
}

/// A thread-safe, interposing accessibility event sink.
///
/// The sink implements the same capability traits as the upstream handler
/// it wraps, so the OS registers it exactly as it would register the real
/// handlers. Intakes buffer and coalesce; [`flush`](Self::flush) (driven by
/// the consumer, prompted by the notify callback) re-emits each surviving
/// record to the matching upstream capability.
///
/// A sink is shared by reference count: the OS registration and the
/// creator each hold a strong [`Arc`]. Dropping the last one releases any
/// still-buffered records.
pub struct RateLimitedSink {
    upstream: Arc<dyn UpstreamHandler>,
    notify: FlushRequestCallback,
    state: Mutex<SinkState>,
}

impl RateLimitedSink {
    /// Create a sink deferring to `upstream`, announcing ready batches
    /// through `notify`.
    ///
    /// `upstream` may expose any subset of the event capabilities; intakes
    /// for kinds it does not expose are rejected without buffering.
    pub fn new<F>(upstream: Arc<dyn UpstreamHandler>, notify: F) -> Arc<Self>
    where
        F: Fn(FlushUrgency) + Send + Sync + 'static,
    {
        Arc::new(Self {
            upstream,
            notify: Box::new(notify),
            state: Mutex::new(SinkState::default()),
        })
    }

    /// Number of records waiting for the next flush.
    pub fn pending_count(&self) -> usize {
        self.state.lock().records.len()
    }

    /// Drain the buffer and emit every surviving record, oldest final
    /// enqueue first.
    ///
    /// The buffered state is swapped out under the lock in O(1), so
    /// intakes arriving while the batch is being emitted start a fresh
    /// batch (and trigger a fresh notify). An upstream failure is logged
    /// and does not stop the batch. Flushing an empty sink does nothing.
    pub fn flush(&self) {
        let (mut records, order, _index) = {
            let mut state = self.state.lock();
            (
                mem::take(&mut state.records),
                mem::take(&mut state.order),
                mem::take(&mut state.by_key),
            )
        };
        if records.is_empty() {
            return;
        }
        debug!(surviving = records.len(), "flushing batch");
        for key in order {
            // Stale keys are records that a later enqueue superseded.
            let Some(record) = records.remove(key) else {
                continue;
            };
            let kind = record.kind();
            let coalesced = record.coalesce_count();
            if let Err(err) = self.emit(record) {
                warn!(kind = kind.name(), coalesced, %err, "upstream handler rejected event");
            }
        }
    }

    /// Classify and buffer one record, then notify if this intake started
    /// a batch or demands an immediate flush.
    fn enqueue(&self, mut record: EventRecord) {
        let urgency = if record.forces_flush() {
            FlushUrgency::Immediate
        } else {
            FlushUrgency::Debounced
        };
        let needs_notify;
        {
            let mut state = self.state.lock();
            needs_notify = state.records.is_empty() || record.forces_flush();
            match record.coalescing_key().cloned() {
                Some(class) => {
                    if let Some(&superseded_key) = state.by_key.get(&class) {
                        if let Some(superseded) = state.records.remove(superseded_key) {
                            debug!(
                                kind = record.kind().name(),
                                absorbed = superseded.coalesce_count(),
                                "coalescing with buffered event"
                            );
                            record.absorb(superseded);
                        }
                    }
                    let key = state.records.insert(record);
                    state.order.push(key);
                    state.by_key.insert(class, key);
                }
                None => {
                    let key = state.records.insert(record);
                    state.order.push(key);
                }
            }
        }
        if needs_notify {
            (self.notify)(urgency);
        }
    }

    /// Dispatch one record to the matching upstream capability.
    fn emit(&self, record: EventRecord) -> HandlerResult {
        let (element, payload) = record.into_parts();
        match payload {
            EventPayload::Automation { event_id } => {
                match self.upstream.as_automation_event_handler() {
                    Some(handler) => {
                        debug!(event_id, "emitting automation event");
                        handler.handle_automation_event(element, event_id)
                    }
                    None => Err(HandlerError::UnsupportedCapability(EventKind::Automation)),
                }
            }
            EventPayload::FocusChanged => match self.upstream.as_focus_changed_event_handler() {
                Some(handler) => {
                    debug!("emitting focus-changed event");
                    handler.handle_focus_changed_event(element)
                }
                None => Err(HandlerError::UnsupportedCapability(EventKind::FocusChanged)),
            },
            EventPayload::PropertyChanged { property_id, value } => {
                match self.upstream.as_property_changed_event_handler() {
                    Some(handler) => {
                        debug!(property_id, "emitting property-changed event");
                        handler.handle_property_changed_event(element, property_id, value)
                    }
                    None => Err(HandlerError::UnsupportedCapability(
                        EventKind::PropertyChanged,
                    )),
                }
            }
            EventPayload::Notification {
                kind,
                processing,
                display,
                activity_id,
            } => match self.upstream.as_notification_event_handler() {
                Some(handler) => {
                    debug!("emitting notification event");
                    handler.handle_notification_event(element, kind, processing, display, activity_id)
                }
                None => Err(HandlerError::UnsupportedCapability(EventKind::Notification)),
            },
            EventPayload::ActiveTextPositionChanged { range } => {
                match self.upstream.as_active_text_position_changed_event_handler() {
                    Some(handler) => {
                        debug!("emitting active-text-position-changed event");
                        handler.handle_active_text_position_changed_event(element, range)
                    }
                    None => Err(HandlerError::UnsupportedCapability(
                        EventKind::ActiveTextPositionChanged,
                    )),
                }
            }
        }
    }
}

impl AutomationEventHandler for RateLimitedSink {
    fn handle_automation_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        event_id: EventId,
    ) -> HandlerResult {
        if self.upstream.as_automation_event_handler().is_none() {
            return Err(HandlerError::UnsupportedCapability(EventKind::Automation));
        }
        debug!(event_id, "queueing automation event");
        self.enqueue(EventRecord::automation(element, event_id));
        Ok(())
    }
}

impl FocusChangedEventHandler for RateLimitedSink {
    fn handle_focus_changed_event(&self, element: Arc<dyn AccessibleElement>) -> HandlerResult {
        if self.upstream.as_focus_changed_event_handler().is_none() {
            return Err(HandlerError::UnsupportedCapability(EventKind::FocusChanged));
        }
        debug!("queueing focus-changed event");
        self.enqueue(EventRecord::focus_changed(element));
        Ok(())
    }
}

impl PropertyChangedEventHandler for RateLimitedSink {
    fn handle_property_changed_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        property_id: PropertyId,
        value: PropertyValue,
    ) -> HandlerResult {
        if self.upstream.as_property_changed_event_handler().is_none() {
            return Err(HandlerError::UnsupportedCapability(
                EventKind::PropertyChanged,
            ));
        }
        debug!(property_id, "queueing property-changed event");
        self.enqueue(EventRecord::property_changed(element, property_id, value));
        Ok(())
    }
}

impl NotificationEventHandler for RateLimitedSink {
    fn handle_notification_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        kind: NotificationKind,
        processing: NotificationProcessing,
        display: String,
        activity_id: String,
    ) -> HandlerResult {
        if self.upstream.as_notification_event_handler().is_none() {
            return Err(HandlerError::UnsupportedCapability(EventKind::Notification));
        }
        debug!("queueing notification event");
        self.enqueue(EventRecord::notification(
            element,
            kind,
            processing,
            display,
            activity_id,
        ));
        Ok(())
    }
}

impl ActiveTextPositionChangedEventHandler for RateLimitedSink {
    fn handle_active_text_position_changed_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        range: Arc<dyn AccessibleTextRange>,
    ) -> HandlerResult {
        if self
            .upstream
            .as_active_text_position_changed_event_handler()
            .is_none()
        {
            return Err(HandlerError::UnsupportedCapability(
                EventKind::ActiveTextPositionChanged,
            ));
        }
        debug!("queueing active-text-position-changed event");
        self.enqueue(EventRecord::active_text_position_changed(element, range));
        Ok(())
    }
}

/// A sink is itself a full upstream handler: capability discovery reports
/// every event kind, all views landing on the same shared buffer. This is
/// what lets the OS accessibility client register one object for all of
/// its handler roles.
impl UpstreamHandler for RateLimitedSink {
    fn as_automation_event_handler(&self) -> Option<&dyn AutomationEventHandler> {
        Some(self)
    }

    fn as_focus_changed_event_handler(&self) -> Option<&dyn FocusChangedEventHandler> {
        Some(self)
    }

    fn as_property_changed_event_handler(&self) -> Option<&dyn PropertyChangedEventHandler> {
        Some(self)
    }

    fn as_notification_event_handler(&self) -> Option<&dyn NotificationEventHandler> {
        Some(self)
    }

    fn as_active_text_position_changed_event_handler(
        &self,
    ) -> Option<&dyn ActiveTextPositionChangedEventHandler> {
        Some(self)
    }
}
