//! Shared test utilities for plan node tests

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{NodeRef, OrderableNode, PlanNode, SortField};
use crate::executor::{
    Context, Datum, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter, Session,
};
use crate::expression::ExprRef;

/// Context over an anonymous session with the default config
pub fn test_ctx() -> Context {
    Context::new(Arc::new(Session::default()))
}

/// Rows `[0]`, `[1]`, ... `[n - 1]`
pub fn int_rows(n: i64) -> Vec<Row> {
    (0..n).map(|i| Row::new(vec![Datum::Int(i)])).collect()
}

/// Calls observed by a `MockNode` and its iterators
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MockStats {
    pub opens: usize,
    pub pulls: usize,
    pub closes: usize,
}

/// Leaf node over fixed rows that records how it is driven
#[derive(Debug, Clone)]
pub struct MockNode {
    rows: Vec<Row>,
    fail_at: Option<usize>,
    fail_open: bool,
    order: Option<(Vec<SortField>, Vec<ExprRef>)>,
    stats: Arc<Mutex<MockStats>>,
}

impl MockNode {
    pub fn new(rows: Vec<Row>) -> Self {
        MockNode {
            rows,
            fail_at: None,
            fail_open: false,
            order: None,
            stats: Arc::new(Mutex::new(MockStats::default())),
        }
    }

    /// Fail the pull of row `index`
    pub fn fail_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    /// Fail to open
    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Make the node order-aware with the given metadata
    pub fn orderable(mut self, order: Vec<SortField>, lazy: Vec<ExprRef>) -> Self {
        self.order = Some((order, lazy));
        self
    }

    pub fn stats(&self) -> MockStats {
        *self.stats.lock()
    }

    pub fn into_ref(self) -> NodeRef {
        Arc::new(self)
    }

    fn open(&self) -> ExecutorResult<MockIter> {
        self.stats.lock().opens += 1;
        if self.fail_open {
            return Err(ExecutorError::Internal("mock open failed".to_string()));
        }
        let (order, lazy) = self.order.clone().unwrap_or_default();
        Ok(MockIter {
            rows: self.rows.clone(),
            position: 0,
            fail_at: self.fail_at,
            order,
            lazy,
            stats: self.stats.clone(),
        })
    }
}

#[async_trait]
impl PlanNode for MockNode {
    fn name(&self) -> &str {
        "Mock"
    }

    fn resolved(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<NodeRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        if !children.is_empty() {
            return Err(ExecutorError::invalid_children("Mock", children.len(), 0));
        }
        Ok(Arc::new(self.clone()))
    }

    async fn row_iter(&self, _ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        Ok(Box::new(self.open()?))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        self.order.as_ref().map(|_| self as &dyn OrderableNode)
    }
}

#[async_trait]
impl OrderableNode for MockNode {
    async fn orderable_iter(&self, _ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        if self.order.is_none() {
            return Err(ExecutorError::Unorderable);
        }
        Ok(Box::new(self.open()?))
    }
}

impl fmt::Display for MockNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mock({} rows)", self.rows.len())
    }
}

pub struct MockIter {
    rows: Vec<Row>,
    position: usize,
    fail_at: Option<usize>,
    order: Vec<SortField>,
    lazy: Vec<ExprRef>,
    stats: Arc<Mutex<MockStats>>,
}

#[async_trait]
impl RowIter for MockIter {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        self.stats.lock().pulls += 1;
        if self.fail_at == Some(self.position) {
            return Err(ExecutorError::Internal("mock pull failed".to_string()));
        }
        let row = self.rows.get(self.position).cloned();
        self.position += 1;
        Ok(row)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.stats.lock().closes += 1;
        Ok(())
    }
}

impl OrderableIter for MockIter {
    fn row_order(&self) -> &[SortField] {
        &self.order
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        &self.lazy
    }
}
