//! In-memory rows
//!
//! Leaf node over a fixed set of rows. A `Values` built with `ordered`
//! declares the order its rows are already in and becomes order-aware, like a
//! table scan over a sorted index.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug_span;

use super::{NodeRef, OrderableNode, PlanNode, SortField};
use crate::executor::{
    CancelCheck, Context, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter, SpanIter,
};
use crate::expression::ExprRef;

/// Leaf node yielding `rows` in order
#[derive(Debug, Clone)]
pub struct Values {
    rows: Arc<Vec<Row>>,
    order: Option<Vec<SortField>>,
}

impl Values {
    pub fn new(rows: Vec<Row>) -> Self {
        Values {
            rows: Arc::new(rows),
            order: None,
        }
    }

    /// Rows already sorted by `order`
    pub fn ordered(rows: Vec<Row>, order: Vec<SortField>) -> Self {
        Values {
            rows: Arc::new(rows),
            order: Some(order),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    fn open(&self, ctx: &Context) -> SpanIter<ValuesIter> {
        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Values",
            rows = self.rows.len()
        ));
        let iter = ValuesIter {
            rows: self.rows.clone(),
            order: self.order.clone().unwrap_or_default(),
            position: 0,
            cancel: ctx.cancel_check(),
            closed: false,
        };
        SpanIter::new(span, &ctx, iter)
    }
}

#[async_trait]
impl PlanNode for Values {
    fn name(&self) -> &str {
        "Values"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        if !children.is_empty() {
            return Err(ExecutorError::invalid_children(self.name(), children.len(), 0));
        }
        Ok(Arc::new(self.clone()))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        Ok(Box::new(self.open(ctx)))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        self.order.as_ref().map(|_| self as &dyn OrderableNode)
    }
}

#[async_trait]
impl OrderableNode for Values {
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        if self.order.is_none() {
            return Err(ExecutorError::Unorderable);
        }
        Ok(Box::new(self.open(ctx)))
    }
}

impl fmt::Display for Values {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Values({} rows)", self.rows.len())
    }
}

/// Yields the node's rows in order
pub struct ValuesIter {
    /// Rows shared with the node
    rows: Arc<Vec<Row>>,
    /// Declared order, empty when unordered
    order: Vec<SortField>,
    /// Index of the next row
    position: usize,
    /// Cancellation polling
    cancel: CancelCheck,
    /// close() was called
    closed: bool,
}

#[async_trait]
impl RowIter for ValuesIter {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        self.cancel.check(self.position as u64)?;
        let row = self.rows.get(self.position).cloned();
        if row.is_some() {
            self.position += 1;
        }
        Ok(row)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.closed = true;
        Ok(())
    }
}

impl OrderableIter for ValuesIter {
    fn row_order(&self) -> &[SortField] {
        &self.order
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        &[]
    }
}
