//! ORDER BY
//!
//! Collects all rows of the child on the first pull, sorts them by the
//! evaluated sort keys, then emits them. Sort establishes its own order, so
//! it is order-aware whatever its child is.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::vec::IntoIter;

use async_trait::async_trait;
use tracing::{debug, debug_span};

use super::{fmt_node, single_child, NodeRef, OrderableNode, PlanNode};
use crate::executor::{
    Context, Datum, ExecutorError, ExecutorResult, OrderableIter, Row, RowIter, SpanIter,
};
use crate::expression::ExprRef;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// Placement of NULL keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullOrdering {
    NullsFirst,
    NullsLast,
}

/// One sort key
#[derive(Debug, Clone)]
pub struct SortField {
    pub expr: ExprRef,
    pub order: SortOrder,
    pub nulls: NullOrdering,
}

impl SortField {
    pub fn new(expr: ExprRef, order: SortOrder, nulls: NullOrdering) -> Self {
        SortField { expr, order, nulls }
    }

    /// Ascending, NULLs first
    pub fn asc(expr: ExprRef) -> Self {
        Self::new(expr, SortOrder::Ascending, NullOrdering::NullsFirst)
    }

    /// Descending, NULLs last
    pub fn desc(expr: ExprRef) -> Self {
        Self::new(expr, SortOrder::Descending, NullOrdering::NullsLast)
    }

    fn compare(&self, a: &Datum, b: &Datum) -> Ordering {
        let nulls_first = self.nulls == NullOrdering::NullsFirst;
        match (a.is_null(), b.is_null()) {
            (true, true) => Ordering::Equal,
            (true, false) if nulls_first => Ordering::Less,
            (true, false) => Ordering::Greater,
            (false, true) if nulls_first => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => match self.order {
                SortOrder::Ascending => a.cmp(b),
                SortOrder::Descending => b.cmp(a),
            },
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.expr)?;
        match (self.order, self.nulls) {
            (SortOrder::Ascending, NullOrdering::NullsFirst) => write!(f, " ASC"),
            (SortOrder::Ascending, NullOrdering::NullsLast) => write!(f, " ASC NULLS LAST"),
            (SortOrder::Descending, NullOrdering::NullsLast) => write!(f, " DESC"),
            (SortOrder::Descending, NullOrdering::NullsFirst) => write!(f, " DESC NULLS FIRST"),
        }
    }
}

/// Sorts its child by `fields`
#[derive(Debug)]
pub struct Sort {
    fields: Vec<SortField>,
    child: NodeRef,
}

impl Sort {
    pub fn new(fields: Vec<SortField>, child: NodeRef) -> Self {
        Sort { fields, child }
    }

    pub fn fields(&self) -> &[SortField] {
        &self.fields
    }

    async fn open(&self, ctx: &Context) -> ExecutorResult<SpanIter<SortIter>> {
        let (span, ctx) = ctx.span(debug_span!(
            parent: ctx.parent_span(),
            "plan.Sort",
            fields = self.fields.len()
        ));
        let child = self.child.row_iter(&ctx).await?;
        let iter = SortIter::new(child, self.fields.clone(), &ctx);
        Ok(SpanIter::new(span, &ctx, iter))
    }
}

#[async_trait]
impl PlanNode for Sort {
    fn name(&self) -> &str {
        "Sort"
    }

    fn resolved(&self) -> bool {
        self.child.resolved() && self.fields.iter().all(|f| f.expr.resolved())
    }

    fn children(&self) -> Vec<NodeRef> {
        vec![self.child.clone()]
    }

    fn with_children(&self, children: Vec<NodeRef>) -> ExecutorResult<NodeRef> {
        let child = single_child(self.name(), children)?;
        Ok(Arc::new(Sort::new(self.fields.clone(), child)))
    }

    async fn row_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn RowIter>> {
        Ok(Box::new(self.open(ctx).await?))
    }

    fn as_orderable(&self) -> Option<&dyn OrderableNode> {
        Some(self)
    }
}

#[async_trait]
impl OrderableNode for Sort {
    async fn orderable_iter(&self, ctx: &Context) -> ExecutorResult<Box<dyn OrderableIter>> {
        Ok(Box::new(self.open(ctx).await?))
    }
}

impl fmt::Display for Sort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<String> = self.fields.iter().map(|f| f.to_string()).collect();
        fmt_node(
            f,
            format_args!("Sort({})", fields.join(", ")),
            &[self.child.clone()],
        )
    }
}

/// Materialises and sorts its child on the first pull
pub struct SortIter {
    child: Box<dyn RowIter>,
    fields: Vec<SortField>,
    ctx: Context,
    sorted: Option<IntoIter<Row>>,
    closed: bool,
}

impl SortIter {
    pub fn new(child: Box<dyn RowIter>, fields: Vec<SortField>, ctx: &Context) -> Self {
        SortIter {
            child,
            fields,
            ctx: ctx.clone(),
            sorted: None,
            closed: false,
        }
    }

    async fn materialise(&mut self) -> ExecutorResult<Vec<Row>> {
        let cancel = self.ctx.cancel_check();
        let mut keyed: Vec<(Vec<Datum>, Row)> = Vec::new();
        let mut n = 0;
        while let Some(row) = self.child.next().await? {
            cancel.check(n)?;
            n += 1;
            let keys = self
                .fields
                .iter()
                .map(|f| f.expr.eval(self.ctx.session(), &row))
                .collect::<ExecutorResult<Vec<_>>>()?;
            keyed.push((keys, row));
        }

        let fields = &self.fields;
        keyed.sort_by(|(a, _), (b, _)| {
            fields
                .iter()
                .zip(a.iter().zip(b.iter()))
                .map(|(field, (a, b))| field.compare(a, b))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        debug!(rows = keyed.len(), "sorted");
        Ok(keyed.into_iter().map(|(_, row)| row).collect())
    }
}

#[async_trait]
impl RowIter for SortIter {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.closed {
            return Err(ExecutorError::IteratorClosed);
        }
        if self.sorted.is_none() {
            let rows = self.materialise().await?;
            self.sorted = Some(rows.into_iter());
        }
        Ok(self.sorted.as_mut().and_then(|rows| rows.next()))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.sorted = None;
        self.child.close().await
    }
}

impl OrderableIter for SortIter {
    fn row_order(&self) -> &[SortField] {
        &self.fields
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        &[]
    }
}
