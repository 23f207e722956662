//! Recording plan node
//!
//! `RecordingNode` wraps another node and counts how its iterators are
//! opened, pulled and closed. It is order-aware exactly when the wrapped node
//! is.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use plancore::executor::{
    Context, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter,
};
use plancore::expression::ExprRef;
use plancore::plan::{NodeRef, OrderableNode, PlanNode, SortField};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Calls {
    pub opens: usize,
    pub pulls: usize,
    pub closes: usize,
}

#[derive(Debug, Clone)]
pub struct RecordingNode {
    inner: NodeRef,
    fail_open: bool,
    unresolved: bool,
    calls: Arc<Mutex<Calls>>,
}

impl RecordingNode {
    pub fn new(inner: NodeRef) -> Self {
        RecordingNode {
            inner,
            fail_open: false,
            unresolved: false,
            calls: Arc::new(Mutex::new(Calls::default())),
        }
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn unresolved(mut self) -> Self {
        self.unresolved = true;
        self
    }

    pub fn calls(&self) -> Calls {
        *self.calls.lock()
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn record_open(&self) -> ExecutorResult<()> {
        self.calls.lock().opens += 1;
        if self.fail_open {
            return Err(ExecutorError::Internal("open failed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PlanNode for RecordingNode {
    fn name(&self) -> &str {
        "Recording"
    }

    fn resolved(&self) -> bool {
        !self.unresolved && self.inner.resolved()
    }

    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        if !children.is_empty() {
            return Err(ExecutorError::invalid_children("Recording", children.len(), 0));
        }
        Ok(Arc::new(self.clone()))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        self.record_open()?;
        let inner = self.inner.row_iter(ctx).await?;
        Ok(Box::new(RecordingIter {
            inner,
            calls: self.calls.clone(),
        }))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        self.inner
            .as_orderable()
            .map(|_| self as &dyn OrderableNode)
    }
}

#[async_trait]
impl OrderableNode for RecordingNode {
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        let inner = self.inner.as_orderable().ok_or(ExecutorError::Unorderable)?;
        self.record_open()?;
        let inner = inner.orderable_iter(ctx).await?;
        Ok(Box::new(RecordingIter {
            inner,
            calls: self.calls.clone(),
        }))
    }
}

impl fmt::Display for RecordingNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner)
    }
}

pub struct RecordingIter<I> {
    inner: I,
    calls: Arc<Mutex<Calls>>,
}

#[async_trait]
impl<I: RowIter> RowIter for RecordingIter<I> {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        self.calls.lock().pulls += 1;
        self.inner.next().await
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.calls.lock().closes += 1;
        self.inner.close().await
    }
}

impl<I: OrderableIter> OrderableIter for RecordingIter<I> {
    fn row_order(&self) -> &[SortField] {
        self.inner.row_order()
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        self.inner.lazy_projections()
    }
}
