//! LIMIT
//!
//! Yields at most a fixed number of rows of its child. Once the limit is
//! reached the child is not pulled again.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug_span;

use super::{fmt_node, single_child, NodeRef, OrderableNode, PlanNode, SortField};
use crate::executor::{
    Context, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter, SpanIter,
};
use crate::expression::ExprRef;

/// Passes through the first `limit` rows of its child
#[derive(Debug)]
pub struct Limit {
    limit: u64,
    child: NodeRef,
}

impl Limit {
    pub fn new(limit: u64, child: NodeRef) -> Self {
        Limit { limit, child }
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn child(&self) -> &NodeRef {
        &self.child
    }
}

#[async_trait]
impl PlanNode for Limit {
    fn name(&self) -> &str {
        "Limit"
    }

    fn resolved(&self) -> bool {
        self.child.resolved()
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        let child = single_child(self.name(), children)?;
        Ok(Arc::new(Limit::new(self.limit, child)))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Limit",
            limit = self.limit
        ));
        let child = self.child.row_iter(&ctx).await?;
        Ok(Box::new(SpanIter::new(span, &ctx, LimitIter::new(child, self.limit))))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        Some(self)
    }
}

#[async_trait]
impl OrderableNode for Limit {
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        let child = self.child.as_orderable().ok_or(ExecutorError::Unorderable)?;

        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Limit",
            limit = self.limit
        ));
        let child = child.orderable_iter(&ctx).await?;
        Ok(Box::new(SpanIter::new(span, &ctx, LimitIter::new(child, self.limit))))
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(f, format_args!("Limit({})", self.limit), &[self.child.clone()])
    }
}

/// Stops after `limit` rows
pub struct LimitIter<I> {
    /// Input iterator
    child: I,
    /// Rows still to return
    remaining: u64,
    /// A pull returned an error
    failed: bool,
    /// close() was called
    closed: bool,
}

impl<I: RowIter> LimitIter<I> {
    pub fn new(child: I, limit: u64) -> Self {
        LimitIter {
            child,
            remaining: limit,
            failed: false,
            closed: false,
        }
    }
}

#[async_trait]
impl<I: RowIter> RowIter for LimitIter<I> {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        if self.failed {
            return Err(ExecutorError::IteratorFailed);
        }
        if self.remaining == 0 {
            return Ok(None);
        }

        match self.child.next().await {
            Ok(Some(row)) => {
                self.remaining -= 1;
                Ok(Some(row))
            }
            Ok(None) => {
                self.remaining = 0;
                Ok(None)
            }
            Err(e) => {
                self.failed = true;
                Err(e)
            }
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close().await
    }
}

impl<I: OrderableIter> OrderableIter for LimitIter<I> {
    fn row_order(&self) -> &[SortField] {
        self.child.row_order()
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        self.child.lazy_projections()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::drain;
    use crate::plan::test_utils::{int_rows, test_ctx, MockNode};
    use crate::plan::Offset;

    fn ints(rows: &[Row]) -> Vec<i64> {
        rows.iter()
            .map(|r| r.get(0).unwrap().as_int().unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_limit_only() {
        let mock = MockNode::new(int_rows(10));
        let node = Limit::new(3, mock.clone().into_ref());
        let mut iter = node.row_iter(&test_ctx()).await.unwrap();

        let rows = drain(iter.as_mut()).await.unwrap();
        assert_eq!(ints(&rows), vec![0, 1, 2]);
        assert_eq!(mock.stats().pulls, 3);

        iter.close().await.unwrap();
        assert_eq!(mock.stats().closes, 1);
    }

    #[tokio::test]
    async fn test_limit_zero_never_pulls() {
        let mock = MockNode::new(int_rows(10));
        let node = Limit::new(0, mock.clone().into_ref());
        let mut iter = node.row_iter(&test_ctx()).await.unwrap();

        assert!(iter.next().await.unwrap().is_none());
        assert_eq!(mock.stats().pulls, 0);
        iter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_limit_and_offset() {
        let node = Limit::new(2, Arc::new(Offset::new(5, MockNode::new(int_rows(10)).into_ref())));
        let mut iter = node.row_iter(&test_ctx()).await.unwrap();

        let rows = drain(iter.as_mut()).await.unwrap();
        assert_eq!(ints(&rows), vec![5, 6]);
        iter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_limit_repeats_failure() {
        let mock = MockNode::new(int_rows(5)).fail_at(1);
        let ctx = test_ctx();
        let mut iter = LimitIter::new(mock.row_iter(&ctx).await.unwrap(), 3);

        assert!(iter.next().await.unwrap().is_some());
        assert!(matches!(iter.next().await, Err(ExecutorError::Internal(_))));
        assert!(matches!(iter.next().await, Err(ExecutorError::IteratorFailed)));
        assert_eq!(mock.stats().pulls, 2);
        iter.close().await.unwrap();
        assert_eq!(mock.stats().closes, 1);
    }

    #[tokio::test]
    async fn test_limit_larger_than_input() {
        let node = Limit::new(50, MockNode::new(int_rows(4)).into_ref());
        let mut iter = node.row_iter(&test_ctx()).await.unwrap();
        assert_eq!(drain(iter.as_mut()).await.unwrap().len(), 4);
        iter.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_orderable_limit_over_offset() {
        let lazy = vec![crate::expression::Literal::new(7i64).into_ref()];
        let mock = MockNode::new(int_rows(6)).orderable(vec![], lazy);
        let node = Limit::new(2, Arc::new(Offset::new(1, mock.clone().into_ref())));

        let mut iter = node.orderable_iter(&test_ctx()).await.unwrap();
        assert!(iter.row_order().is_empty());
        assert_eq!(iter.lazy_projections().len(), 1);
        assert_eq!(ints(&drain(iter.as_mut()).await.unwrap()), vec![1, 2]);
        iter.close().await.unwrap();
        assert_eq!(mock.stats().closes, 1);
    }

    #[tokio::test]
    async fn test_orderable_unorderable_child() {
        let node = Limit::new(1, MockNode::new(int_rows(1)).into_ref());
        assert!(matches!(
            node.orderable_iter(&test_ctx()).await.err(),
            Some(ExecutorError::Unorderable)
        ));
    }

    #[test]
    fn test_display() {
        let node = Limit::new(2, Arc::new(Offset::new(1, MockNode::new(int_rows(3)).into_ref())));
        assert_eq!(
            node.to_string(),
            "Limit(2)\n └─ Offset(1)\n     └─ Mock(3 rows)\n"
        );
    }
}
