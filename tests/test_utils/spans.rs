//! Span recording layer
//!
//! Counts opened and closed spans by name and records each span's explicit
//! parent, so tests can check that every node span finishes exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::span::{Attributes, Id};
use tracing::Subscriber;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::Layer;

#[derive(Debug, Default)]
struct SpanLog {
    opened: HashMap<String, usize>,
    closed: HashMap<String, usize>,
    parents: Vec<(String, Option<String>)>,
}

#[derive(Debug, Clone, Default)]
pub struct SpanRecorder {
    log: Arc<Mutex<SpanLog>>,
}

impl SpanRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install as the thread's default subscriber until the guard drops
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::registry().with(self.clone());
        tracing::subscriber::set_default(subscriber)
    }

    pub fn opened(&self, name: &str) -> usize {
        self.log.lock().opened.get(name).copied().unwrap_or(0)
    }

    pub fn closed(&self, name: &str) -> usize {
        self.log.lock().closed.get(name).copied().unwrap_or(0)
    }

    /// Parent span name of the first span called `name`
    pub fn parent_of(&self, name: &str) -> Option<String> {
        self.log
            .lock()
            .parents
            .iter()
            .find(|(child, _)| child == name)
            .and_then(|(_, parent)| parent.clone())
    }
}

impl<S> Layer<S> for SpanRecorder
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(&self, attrs: &Attributes<'_>, _id: &Id, ctx: Context<'_, S>) {
        let name = attrs.metadata().name().to_string();
        let parent = attrs
            .parent()
            .and_then(|id| ctx.span(id))
            .map(|span| span.name().to_string());

        let mut log = self.log.lock();
        *log.opened.entry(name.clone()).or_default() += 1;
        log.parents.push((name, parent));
    }

    fn on_close(&self, id: Id, ctx: Context<'_, S>) {
        if let Some(span) = ctx.span(&id) {
            *self
                .log
                .lock()
                .closed
                .entry(span.name().to_string())
                .or_default() += 1;
        }
    }
}
