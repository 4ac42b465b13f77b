//! End-to-end coalescing behavior through the public API.

use std::sync::Arc;

use parking_lot::Mutex;

use aural_events::{
    AccessibleElement, AutomationEventHandler, FlushUrgency, FocusChangedEventHandler,
    HandlerError, HandlerResult, NotificationEventHandler, PropertyChangedEventHandler,
    PropertyValue, RateLimitedSink, RuntimeId, UpstreamHandler,
};

struct Element {
    runtime_id: Vec<i32>,
}

impl Element {
    fn new(parts: &[i32]) -> Arc<dyn AccessibleElement> {
        Arc::new(Self {
            runtime_id: parts.to_vec(),
        })
    }
}

impl AccessibleElement for Element {
    fn runtime_id(&self) -> Option<RuntimeId> {
        Some(RuntimeId::new(self.runtime_id.clone()))
    }
}

/// One delivered event, reduced to comparable data.
#[derive(Debug, Clone, PartialEq)]
enum Delivery {
    Automation(Vec<i32>, i32),
    Focus(Vec<i32>),
    Property(Vec<i32>, i32, PropertyValue),
}

fn identity(element: &Arc<dyn AccessibleElement>) -> Vec<i32> {
    element
        .runtime_id()
        .map(RuntimeId::into_parts)
        .unwrap_or_default()
}

#[derive(Default)]
struct Recorder {
    deliveries: Mutex<Vec<Delivery>>,
}

impl Recorder {
    fn deliveries(&self) -> Vec<Delivery> {
        self.deliveries.lock().clone()
    }
}

impl AutomationEventHandler for Recorder {
    fn handle_automation_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        event_id: i32,
    ) -> HandlerResult {
        self.deliveries
            .lock()
            .push(Delivery::Automation(identity(&element), event_id));
        Ok(())
    }
}

impl FocusChangedEventHandler for Recorder {
    fn handle_focus_changed_event(&self, element: Arc<dyn AccessibleElement>) -> HandlerResult {
        self.deliveries.lock().push(Delivery::Focus(identity(&element)));
        Ok(())
    }
}

impl PropertyChangedEventHandler for Recorder {
    fn handle_property_changed_event(
        &self,
        element: Arc<dyn AccessibleElement>,
        property_id: i32,
        value: PropertyValue,
    ) -> HandlerResult {
        self.deliveries
            .lock()
            .push(Delivery::Property(identity(&element), property_id, value));
        Ok(())
    }
}

impl UpstreamHandler for Recorder {
    fn as_automation_event_handler(&self) -> Option<&dyn AutomationEventHandler> {
        Some(self)
    }

    fn as_focus_changed_event_handler(&self) -> Option<&dyn FocusChangedEventHandler> {
        Some(self)
    }

    fn as_property_changed_event_handler(&self) -> Option<&dyn PropertyChangedEventHandler> {
        Some(self)
    }
}

fn sink_with_recorder() -> (
    Arc<Recorder>,
    Arc<Mutex<Vec<FlushUrgency>>>,
    Arc<RateLimitedSink>,
) {
    let recorder = Arc::new(Recorder::default());
    let urgencies: Arc<Mutex<Vec<FlushUrgency>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = RateLimitedSink::new(recorder.clone(), {
        let urgencies = urgencies.clone();
        move |urgency| urgencies.lock().push(urgency)
    });
    (recorder, urgencies, sink)
}

#[test]
fn test_burst_delivers_latest_state_once() {
    let (recorder, urgencies, sink) = sink_with_recorder();
    let spinner = Element::new(&[1, 2, 3]);

    // A spinner hammering the same value-change property.
    for step in 0..50 {
        sink.handle_property_changed_event(spinner.clone(), 30005, PropertyValue::Int(step))
            .unwrap();
    }
    sink.flush();

    assert_eq!(
        recorder.deliveries(),
        vec![Delivery::Property(
            vec![1, 2, 3],
            30005,
            PropertyValue::Int(49)
        )]
    );
    assert_eq!(urgencies.lock().len(), 1);
}

#[test]
fn test_distinct_classes_survive_independently() {
    let (recorder, _urgencies, sink) = sink_with_recorder();
    let list = Element::new(&[1, 2, 3]);
    let status = Element::new(&[4, 5, 6]);

    sink.handle_automation_event(list.clone(), 20008).unwrap();
    sink.handle_automation_event(status.clone(), 20008).unwrap();
    sink.handle_automation_event(list.clone(), 20010).unwrap();
    sink.handle_property_changed_event(status, 30001, PropertyValue::from("busy"))
        .unwrap();
    sink.handle_automation_event(list, 20008).unwrap();
    sink.flush();

    // Four classes, each surviving at its final-enqueue position.
    assert_eq!(
        recorder.deliveries(),
        vec![
            Delivery::Automation(vec![4, 5, 6], 20008),
            Delivery::Automation(vec![1, 2, 3], 20010),
            Delivery::Property(vec![4, 5, 6], 30001, PropertyValue::from("busy")),
            Delivery::Automation(vec![1, 2, 3], 20008),
        ]
    );
}

#[test]
fn test_focus_change_is_never_coalesced_away() {
    let (recorder, urgencies, sink) = sink_with_recorder();
    let field = Element::new(&[1, 2, 3]);
    let button = Element::new(&[4, 5, 6]);

    sink.handle_automation_event(field.clone(), 20008).unwrap();
    sink.handle_focus_changed_event(button.clone()).unwrap();
    sink.handle_focus_changed_event(field).unwrap();
    sink.handle_focus_changed_event(button).unwrap();
    sink.flush();

    assert_eq!(
        recorder.deliveries(),
        vec![
            Delivery::Automation(vec![1, 2, 3], 20008),
            Delivery::Focus(vec![4, 5, 6]),
            Delivery::Focus(vec![1, 2, 3]),
            Delivery::Focus(vec![4, 5, 6]),
        ]
    );
    // One debounced notify for the opening automation event, then one
    // immediate notify per focus change.
    assert_eq!(
        urgencies.lock().as_slice(),
        &[
            FlushUrgency::Debounced,
            FlushUrgency::Immediate,
            FlushUrgency::Immediate,
            FlushUrgency::Immediate,
        ]
    );
}

#[test]
fn test_events_after_a_flush_emit_later() {
    let (recorder, _urgencies, sink) = sink_with_recorder();
    let element = Element::new(&[1, 2, 3]);

    sink.handle_property_changed_event(element.clone(), 30005, PropertyValue::Int(1))
        .unwrap();
    sink.flush();
    sink.handle_property_changed_event(element, 30005, PropertyValue::Int(2))
        .unwrap();
    sink.flush();

    assert_eq!(
        recorder.deliveries(),
        vec![
            Delivery::Property(vec![1, 2, 3], 30005, PropertyValue::Int(1)),
            Delivery::Property(vec![1, 2, 3], 30005, PropertyValue::Int(2)),
        ]
    );
}

#[test]
fn test_missing_capability_reports_unsupported() {
    let (_recorder, _urgencies, sink) = sink_with_recorder();
    let element = Element::new(&[1, 2, 3]);

    // The recorder exposes no notification capability.
    let err = sink
        .handle_notification_event(
            element,
            aural_events::NotificationKind::Other,
            aural_events::NotificationProcessing::All,
            "done".to_string(),
            String::new(),
        )
        .unwrap_err();

    assert!(matches!(err, HandlerError::UnsupportedCapability(_)));
    assert_eq!(sink.pending_count(), 0);
}

#[test]
fn test_empty_flush_calls_nothing() {
    let (recorder, urgencies, sink) = sink_with_recorder();

    sink.flush();

    assert!(recorder.deliveries().is_empty());
    assert!(urgencies.lock().is_empty());
}
