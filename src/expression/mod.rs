//! Scalar expressions
//!
//! An expression computes one value from a row. Trees are immutable: a
//! rewrite builds new nodes and may share untouched subtrees, so a tree can
//! be read concurrently while another query rewrites a copy of it.

pub mod datetime;
pub mod get_field;
pub mod literal;
pub mod registry;
pub mod unary;

use std::fmt;
use std::sync::Arc;

use crate::executor::{Datum, ExecutorResult, Row, Session};
use crate::types::DataType;

pub use datetime::{day, day_of_year, hour, minute, month, second, year, DatePart, DatePartKind};
pub use get_field::GetField;
pub use literal::Literal;
pub use registry::{Function, FunctionRegistry};
pub use unary::UnaryExpression;

/// Shared reference to an expression node
pub type ExprRef = Arc<dyn Expression>;

/// Rewrite callback for `Expression::transform_up`
pub type TransformFn<'a> = dyn Fn(ExprRef) -> ExecutorResult<ExprRef> + 'a;

/// A node in a scalar computation tree
pub trait Expression: fmt::Display + fmt::Debug + Send + Sync {
    /// Name used for display and identification
    fn name(&self) -> &str;

    /// Type of the values `eval` returns
    fn data_type(&self) -> DataType;

    /// Whether `eval` may return NULL
    fn is_nullable(&self) -> bool;

    /// Whether all names and types are bound
    fn resolved(&self) -> bool {
        self.children().iter().all(|c| c.resolved())
    }

    /// Direct children, in order
    fn children(&self) -> Vec<ExprRef>;

    /// Rebuild this node with new children.
    ///
    /// Fails with `InvalidChildrenNumber` unless the count matches exactly.
    fn with_children(&self, children: Vec<ExprRef>) -> ExecutorResult<ExprRef>;

    /// Evaluate against a row
    fn eval(&self, session: &Session, row: &Row) -> ExecutorResult<Datum>;

    /// Rewrite the tree bottom-up.
    ///
    /// Children are rewritten first, this node is rebuilt over them, and `f`
    /// is applied to the rebuilt node. The first error aborts the rewrite.
    fn transform_up(&self, f: &TransformFn<'_>) -> ExecutorResult<ExprRef>;
}

/// Generic bottom-up rewrite through `children`/`with_children`.
///
/// Useful for expressions that have no bespoke `transform_up`.
pub fn transform_children_up(
    expr: &dyn Expression,
    f: &TransformFn<'_>,
) -> ExecutorResult<ExprRef> {
    let children = expr
        .children()
        .iter()
        .map(|c| c.transform_up(f))
        .collect::<ExecutorResult<Vec<_>>>()?;
    f(expr.with_children(children)?)
}
