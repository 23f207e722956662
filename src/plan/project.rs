//! Projection
//!
//! Evaluates a list of expressions against every row of its child. A
//! projection can change the columns the child's order refers to, so it does
//! not report an order.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug_span;

use super::{fmt_node, single_child, NodeRef, PlanNode};
use crate::executor::{Context, ExecutorError, ExecutorResult, Row, RowIter, SpanIter};
use crate::expression::ExprRef;

/// Computes `exprs` for each child row
#[derive(Debug)]
pub struct Project {
    exprs: Vec<ExprRef>,
    child: NodeRef,
}

impl Project {
    pub fn new(exprs: Vec<ExprRef>, child: NodeRef) -> Self {
        Project { exprs, child }
    }

    pub fn exprs(&self) -> &[ExprRef] {
        &self.exprs
    }
}

#[async_trait]
impl PlanNode for Project {
    fn name(&self) -> &str {
        "Project"
    }

    fn resolved(&self) -> bool {
        self.child.resolved() && self.exprs.iter().all(|e| e.resolved())
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        let child = single_child(self.name(), children)?;
        Ok(Arc::new(Project::new(self.exprs.clone(), child)))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Project",
            columns = self.exprs.len()
        ));
        let child = self.child.row_iter(&ctx).await?;
        let iter = ProjectIter {
            child,
            exprs: self.exprs.clone(),
            ctx: ctx.clone(),
            closed: false,
        };
        Ok(Box::new(SpanIter::new(span, &ctx, iter)))
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let exprs: Vec<String> = self.exprs.iter().map(|e| e.to_string()).collect();
        fmt_node(
            f,
            format_args!("Project({})", exprs.join(", ")),
            &[self.child.clone()],
        )
    }
}

pub struct ProjectIter {
    child: Box<dyn RowIter>,
    exprs: Vec<ExprRef>,
    ctx: Context,
    closed: bool,
}

#[async_trait]
impl RowIter for ProjectIter {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        let Some(row) = self.child.next().await? else {
            return Ok(None);
        };
        let values = self
            .exprs
            .iter()
            .map(|e| e.eval(self.ctx.session(), &row))
            .collect::<ExecutorResult<Vec<_>>>()?;
        Ok(Some(Row::new(values)))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.child.close().await
    }
}
