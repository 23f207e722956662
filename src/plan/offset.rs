//! OFFSET
//!
//! Skips a fixed number of leading rows of its child and yields the rest
//! unchanged. An offset past the end of the child yields no rows.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug_span;

use super::{fmt_node, single_child, NodeRef, OrderableNode, PlanNode, SortField};
use crate::executor::{
    CancelCheck, Context, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter, SpanIter,
};
use crate::expression::ExprRef;

/// Skips the first `offset` rows of its child
#[derive(Debug)]
pub struct Offset {
    offset: u64,
    child: NodeRef,
}

impl Offset {
    pub fn new(offset: u64, child: NodeRef) -> Self {
        Offset { offset, child }
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn child(&self) -> &NodeRef {
        &self.child
    }
}

#[async_trait]
impl PlanNode for Offset {
    fn name(&self) -> &str {
        "Offset"
    }

    fn resolved(&self) -> bool {
        self.child.resolved()
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        let child = single_child(self.name(), children)?;
        Ok(Arc::new(Offset::new(self.offset, child)))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Offset",
            offset = self.offset
        ));
        // On failure the span handle is dropped, which finishes it
        let child = self.child.row_iter(&ctx).await?;
        let iter = OffsetIter::new(child, self.offset, &ctx);
        Ok(Box::new(SpanIter::new(span, &ctx, iter)))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        Some(self)
    }
}

#[async_trait]
impl OrderableNode for Offset {
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        let child = self.child.as_orderable().ok_or(ExecutorError::Unorderable)?;

        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Offset",
            offset = self.offset
        ));
        let child = child.orderable_iter(&ctx).await?;
        let iter = OffsetIter::new(child, self.offset, &ctx);
        Ok(Box::new(SpanIter::new(span, &ctx, iter)))
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(f, format_args!("Offset({})", self.offset), &[self.child.clone()])
    }
}

/// Discards leading rows of `child`, then passes rows through
pub struct OffsetIter<I> {
    /// Input iterator
    child: I,
    /// Rows still to skip
    remaining: u64,
    /// Rows skipped so far
    skipped: u64,
    /// Cancellation polling for the discard loop
    cancel: CancelCheck,
    /// Child reported end-of-data
    exhausted: bool,
    /// A pull returned an error
    failed: bool,
    /// close() was called
    closed: bool,
}

impl<I: RowIter> OffsetIter<I> {
    pub fn new(child: I, offset: u64, ctx: &Context) -> Self {
        OffsetIter {
            child,
            remaining: offset,
            skipped: 0,
            cancel: ctx.cancel_check(),
            exhausted: false,
            failed: false,
            closed: false,
        }
    }

    async fn advance(&mut self) -> ExecutorResult<Option<Row>> {
        while self.remaining > 0 {
            self.cancel.check(self.skipped)?;
            if self.child.next().await?.is_none() {
                self.exhausted = true;
                return Ok(None);
            }
            self.remaining -= 1;
            self.skipped += 1;
        }

        let row = self.child.next().await?;
        if row.is_none() {
            self.exhausted = true;
        }
        Ok(row)
    }
}

#[async_trait]
impl<I: RowIter> RowIter for OffsetIter<I> {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        if self.failed {
            return Err(ExecutorError::IteratorFailed);
        }
        if self.exhausted {
            return Ok(None);
        }

        let result = self.advance().await;
        self.failed = result.is_err();
        result
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close().await
    }
}

impl<I: OrderableIter> OrderableIter for OffsetIter<I> {
    fn row_order(&self) -> &[SortField] {
        self.child.row_order()
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        self.child.lazy_projections()
    }
}
