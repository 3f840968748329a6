//! Instrumentation emitted with the `tracing` feature enabled.

use std::fmt;
use std::sync::{Arc, Mutex};

use rangelist::{ListError, RangeList};
use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;

#[derive(Clone, Default)]
struct Capture {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<(Level, String)>>>,
}

impl Capture {
    fn spans(&self) -> Vec<String> {
        self.spans.lock().unwrap().clone()
    }

    fn messages_at(&self, level: Level) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{value:?}");
        }
    }
}

impl<S> Layer<S> for Capture
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, _ctx: Context<'_, S>) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        self.events
            .lock()
            .unwrap()
            .push((*event.metadata().level(), message));
    }
}

fn capture(f: impl FnOnce()) -> Capture {
    let capture = Capture::default();
    let subscriber = tracing_subscriber::registry().with(capture.clone());
    tracing::subscriber::with_default(subscriber, f);
    capture
}

#[test]
fn range_operations_open_spans() {
    let captured = capture(|| {
        let list = RangeList::from_vec(vec![1, 2, 3, 4]);
        list.insert_range(0, [0]).unwrap();
        list.replace_range_at(1, 2, [7]).unwrap();
        list.remove_all(|x| *x == 4).unwrap();
    });

    let spans = captured.spans();
    assert!(spans.contains(&"insert_range".to_string()), "{spans:?}");
    assert!(spans.contains(&"replace_range_at".to_string()), "{spans:?}");
    assert!(spans.contains(&"remove_all_in".to_string()), "{spans:?}");
}

#[test]
fn each_dispatched_record_is_traced() {
    let captured = capture(|| {
        let list = RangeList::from_vec(vec![1, 2, 3, 4, 5]);
        let _sub = list.subscribe(|_| {});
        // Two records: Replace at 0, Replace at 2.
        list.replace_range([9, 2, 8, 4, 5]).unwrap();
    });

    let dispatched = captured
        .messages_at(Level::TRACE)
        .into_iter()
        .filter(|m| m == "dispatch collection change")
        .count();
    assert_eq!(dispatched, 2);
    assert!(
        captured
            .messages_at(Level::DEBUG)
            .contains(&"flushing deferred list events".to_string())
    );
}

#[test]
fn rejected_reentrant_mutation_warns() {
    let captured = capture(|| {
        let list = RangeList::<i32>::new();
        let handle = list.clone();
        let _a = list.subscribe(move |_| {
            assert_eq!(handle.push(5), Err(ListError::Reentrancy));
        });
        let _b = list.subscribe(|_| {});
        list.push(1).unwrap();
    });

    assert_eq!(
        captured.messages_at(Level::WARN),
        vec!["rejected list mutation from inside a change handler".to_string()]
    );
}
