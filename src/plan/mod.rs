//! Relational plan nodes
//!
//! A plan is an immutable tree of `PlanNode`s. Executing a plan asks the root
//! for a `RowIter`, which opens the iterators of its children in turn.
//!
//! Nodes that can report the order of their output implement
//! `OrderableNode` and return it from `as_orderable()`. Callers check for the
//! capability at runtime; a node without it is normal.

pub mod limit;
pub mod offset;
pub mod printer;
pub mod project;
pub mod sort;
pub mod values;

#[cfg(test)]
pub mod test_utils;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::executor::{Context, ExecutorError, ExecutorResult, OrderableIter, RowIter};

pub use limit::{Limit, LimitIter};
pub use offset::{Offset, OffsetIter};
pub use printer::TreePrinter;
pub use project::{Project, ProjectIter};
pub use sort::{NullOrdering, Sort, SortField, SortIter, SortOrder};
pub use values::{Values, ValuesIter};

/// Shared reference to a plan node
pub type NodeRef = Arc<dyn PlanNode>;

/// Rewrite callback for `transform_up`
pub type NodeTransformFn<'a> = dyn Fn(NodeRef) -> ExecutorResult<NodeRef> + 'a;

/// A relational operator
#[async_trait]
pub trait PlanNode: fmt::Display + fmt::Debug + Send + Sync {
    /// Operator name, as used in spans and errors
    fn name(&self) -> &str;

    /// True iff this node and every child is bound
    fn resolved(&self) -> bool;

    fn children(&self) -> Vec<NodeRef>;

    /// Rebuild this node over new children.
    ///
    /// The number of children must match exactly.
    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef>;

    /// Open an iterator over this node's rows
    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>>;

    /// Order-aware view of this node, if it has one
    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        None
    }
}

/// A plan node whose iterator can report the order of its rows
#[async_trait]
pub trait OrderableNode: PlanNode {
    /// Open an order-aware iterator.
    ///
    /// Fails with `Unorderable` before any row is pulled if the subtree
    /// cannot report its order.
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>>;
}

/// Rewrite a plan bottom-up.
///
/// Children are rewritten first, the node is rebuilt over them and `f` is
/// applied to the result. The first error aborts the rewrite.
pub fn transform_up(node: &NodeRef, f: &NodeTransformFn<'_>) -> ExecutorResult<NodeRef> {
    let children = node
        .children()
        .iter()
        .map(|c| transform_up(c, f))
        .collect::<ExecutorResult<Vec<_>>>()?;
    f(node.with_children(children)?)
}

/// Take the only child out of `children`, or fail with an arity error
pub(crate) fn single_child(node: &str, mut children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
    if children.len() != 1 {
        return Err(ExecutorError::invalid_children(node, children.len(), 1));
    }
    children
        .pop()
        .ok_or_else(|| ExecutorError::invalid_children(node, 0, 1))
}

/// Render a node line followed by its children as a subtree
pub(crate) fn fmt_node(
    f: &mut fmt::Formatter<'_>,
    node: impl fmt::Display,
    children: &[NodeRef],
) -> fmt::Result {
    let mut printer = TreePrinter::new();
    printer.write_node(node);
    printer.write_children(children);
    write!(f, "{}", printer)
}
