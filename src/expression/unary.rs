//! Building block for single-child expressions

use super::ExprRef;
use crate::executor::{ExecutorError, ExecutorResult};

/// Holds the only child of a unary expression
#[derive(Debug, Clone)]
pub struct UnaryExpression {
    child: ExprRef,
}

impl UnaryExpression {
    pub fn new(child: ExprRef) -> Self {
        UnaryExpression { child }
    }

    pub fn child(&self) -> &ExprRef {
        &self.child
    }

    pub fn children(&self) -> Vec<ExprRef> {
        vec![self.child.clone()]
    }

    pub fn resolved(&self) -> bool {
        self.child.resolved()
    }

    pub fn is_nullable(&self) -> bool {
        self.child.is_nullable()
    }

    /// Take the single child out of `children`, or fail with an arity error
    /// naming `node`
    pub fn single_child(node: &str, mut children: Vec<ExprRef>) -> ExecutorResult<ExprRef> {
        if children.len() != 1 {
            return Err(ExecutorError::invalid_children(node, children.len(), 1));
        }
        children
            .pop()
            .ok_or_else(|| ExecutorError::invalid_children(node, 0, 1))
    }
}
