//! Iterator tracing
//!
//! `TraceSpan` is a finish-once handle over a `tracing::Span`. `SpanIter`
//! ties one to an iterator so the span lives exactly as long as the iterator
//! produces rows.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, Id, Span};

use super::context::Context;
use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;
use super::{OrderableIter, RowIter};
use crate::expression::ExprRef;
use crate::plan::SortField;

/// Span handle that finishes at most once.
///
/// Dropping an unfinished handle finishes it, so a span opened during
/// iterator construction is released on every early return.
#[derive(Debug)]
pub struct TraceSpan {
    span: Option<Span>,
}

impl TraceSpan {
    pub fn new(span: Span) -> Self {
        TraceSpan { span: Some(span) }
    }

    pub fn id(&self) -> Option<Id> {
        self.span.as_ref().and_then(|s| s.id())
    }

    /// Run `f` with the span entered, if still open
    pub fn in_scope<T>(&self, f: impl FnOnce() -> T) -> T {
        match &self.span {
            Some(span) => span.in_scope(f),
            None => f(),
        }
    }

    /// Finish the span. Returns false if it was already finished.
    pub fn finish(&mut self) -> bool {
        self.span.take().is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.span.is_none()
    }
}

#[derive(Debug)]
struct RowTimings {
    total: Duration,
    min: Duration,
    max: Duration,
}

impl RowTimings {
    fn new() -> Self {
        RowTimings {
            total: Duration::ZERO,
            min: Duration::MAX,
            max: Duration::ZERO,
        }
    }

    fn record(&mut self, elapsed: Duration) {
        self.total += elapsed;
        self.min = self.min.min(elapsed);
        self.max = self.max.max(elapsed);
    }

    /// (mean, min, max) in microseconds
    fn summary_us(&self, rows: u64) -> (u64, u64, u64) {
        if rows == 0 {
            return (0, 0, 0);
        }
        let mean = self.total.as_micros() as u64 / rows;
        (mean, self.min.as_micros() as u64, self.max.as_micros() as u64)
    }
}

/// Iterator wrapper whose span finishes on end-of-data, first error, or close
pub struct SpanIter<I> {
    span: TraceSpan,
    iter: I,
    timings: Option<RowTimings>,
    count: u64,
    done: bool,
    failed: bool,
    closed: bool,
}

impl<I: RowIter> SpanIter<I> {
    pub fn new(span: TraceSpan, ctx: &Context, iter: I) -> Self {
        SpanIter {
            span,
            iter,
            timings: ctx.config().record_row_timings.then(RowTimings::new),
            count: 0,
            done: false,
            failed: false,
            closed: false,
        }
    }

    fn finish(&mut self, error: Option<&ExecutorError>) {
        self.done = true;
        let rows = self.count;
        let (mean_us, min_us, max_us) = self
            .timings
            .as_ref()
            .map_or((0, 0, 0), |t| t.summary_us(rows));

        self.span.in_scope(|| match error {
            Some(e) => debug!(rows, mean_us, min_us, max_us, error = %e, "iterator failed"),
            None => debug!(rows, mean_us, min_us, max_us, "iterator finished"),
        });
        self.span.finish();
    }
}

#[async_trait]
impl<I: RowIter> RowIter for SpanIter<I> {
    /// After end-of-data this keeps returning `Ok(None)`. After an error it
    /// returns `IteratorFailed` without pulling the inner iterator again.
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        if self.failed {
            return Err(ExecutorError::IteratorFailed);
        }
        if self.done {
            return Ok(None);
        }

        let start = self.timings.as_ref().map(|_| Instant::now());
        match self.iter.next().await {
            Ok(Some(row)) => {
                self.count += 1;
                if let (Some(timings), Some(start)) = (self.timings.as_mut(), start) {
                    timings.record(start.elapsed());
                }
                Ok(Some(row))
            }
            Ok(None) => {
                self.finish(None);
                Ok(None)
            }
            Err(e) => {
                self.failed = true;
                self.finish(Some(&e));
                Err(e)
            }
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        if !self.done {
            self.finish(None);
        }
        self.iter.close().await
    }
}

impl<I: OrderableIter> OrderableIter for SpanIter<I> {
    fn row_order(&self) -> &[SortField] {
        self.iter.row_order()
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        self.iter.lazy_projections()
    }
}
