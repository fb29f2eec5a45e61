//! Tracing layer that records spans and events for assertions in tests.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::field::{Field, Visit};
use tracing::span::{Attributes, Id, Record};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::Context;
use tracing_subscriber::registry::LookupSpan;

/// Field names mapped to their rendered values.
pub type Fields = BTreeMap<String, String>;

/// A span that has closed, with every field recorded during its lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanRecord {
    /// Span name from the callsite metadata.
    pub name: String,
    /// Fields recorded at creation or later through `Span::record`.
    pub fields: Fields,
}

/// An emitted event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    /// Event level.
    pub level: Level,
    /// Event target, usually the emitting module path.
    pub target: String,
    /// Event fields, including `message`.
    pub fields: Fields,
}

impl EventRecord {
    /// Returns the event's `message` field, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.fields.get("message").map(String::as_str)
    }
}

#[derive(Default)]
struct Recorded {
    spans: Vec<SpanRecord>,
    events: Vec<EventRecord>,
}

/// Layer that captures closed spans and emitted events.
///
/// Clones share storage, so a test keeps one handle and installs the other
/// in a subscriber.
///
/// ```
/// use thredge_test_support::tracing::RecordingLayer;
/// use tracing_subscriber::layer::SubscriberExt;
///
/// let layer = RecordingLayer::default();
/// let subscriber = tracing_subscriber::registry().with(layer.clone());
/// tracing::subscriber::with_default(subscriber, || {
///     let _span = tracing::info_span!("demo", size = 3).entered();
/// });
/// let span = layer.span_named("demo").expect("span closed");
/// assert_eq!(span.fields.get("size").map(String::as_str), Some("3"));
/// ```
#[derive(Clone, Default)]
pub struct RecordingLayer {
    recorded: Arc<Mutex<Recorded>>,
}

impl RecordingLayer {
    fn with_recorded<T>(&self, f: impl FnOnce(&mut Recorded) -> T) -> T {
        let mut guard = self
            .recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    /// Returns closed spans in completion order.
    #[must_use]
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.with_recorded(|recorded| recorded.spans.clone())
    }

    /// Returns events in emission order.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.with_recorded(|recorded| recorded.events.clone())
    }

    /// Returns the first closed span called `name`.
    #[must_use]
    pub fn span_named(&self, name: &str) -> Option<SpanRecord> {
        self.with_recorded(|recorded| {
            recorded
                .spans
                .iter()
                .find(|span| span.name == name)
                .cloned()
        })
    }

    /// Returns the events emitted at `level`.
    #[must_use]
    pub fn events_at(&self, level: Level) -> Vec<EventRecord> {
        self.with_recorded(|recorded| {
            recorded
                .events
                .iter()
                .filter(|event| event.level == level)
                .cloned()
                .collect()
        })
    }
}

struct OpenSpan(SpanRecord);

impl<S> Layer<S> for RecordingLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, id: &Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        let mut record = SpanRecord {
            name: attrs.metadata().name().to_owned(),
            fields: Fields::new(),
        };
        attrs.record(&mut FieldCollector(&mut record.fields));
        span.extensions_mut().insert(OpenSpan(record));
    }

    fn on_record(&self, id: &Id, values: &Record<'_>, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(id) else {
            return;
        };
        if let Some(OpenSpan(record)) = span.extensions_mut().get_mut::<OpenSpan>() {
            values.record(&mut FieldCollector(&mut record.fields));
        }
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        let Some(span) = ctx.span(&id) else {
            return;
        };
        if let Some(OpenSpan(record)) = span.extensions_mut().remove::<OpenSpan>() {
            self.with_recorded(|recorded| recorded.spans.push(record));
        }
    }

    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields::new();
        event.record(&mut FieldCollector(&mut fields));
        let metadata = event.metadata();
        self.with_recorded(|recorded| {
            recorded.events.push(EventRecord {
                level: *metadata.level(),
                target: metadata.target().to_owned(),
                fields,
            });
        });
    }
}

struct FieldCollector<'a>(&'a mut Fields);

impl FieldCollector<'_> {
    fn insert(&mut self, field: &Field, value: String) {
        self.0.insert(field.name().to_owned(), value);
    }
}

impl Visit for FieldCollector<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.insert(field, format!("{value:?}"));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, value.to_owned());
    }

    fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
        self.insert(field, value.to_string());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.insert(field, value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.to_string());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.to_string());
    }
}
