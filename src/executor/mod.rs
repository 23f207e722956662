//! Query executor - pull-based iterator model
//!
//! Plan nodes produce `RowIter`s. The consumer pulls rows one at a time from
//! the root iterator, which in turn pulls from its children:
//!
//! - `next()`: the next row, `Ok(None)` once exhausted
//! - `close()`: release resources, including every owned child iterator
//!
//! Iterators are single-use and not restartable. `close()` must be called
//! exactly once by the owner, also after `next()` failed.

pub mod context;
pub mod datum;
pub mod engine;
pub mod error;
pub mod row;
pub mod span;

pub use context::{CancelCheck, Client, Context, Session};
pub use datum::Datum;
pub use engine::ExecutorEngine;
pub use error::{ExecutorError, ExecutorResult};
pub use row::Row;
pub use span::{SpanIter, TraceSpan};

use async_trait::async_trait;

use crate::expression::ExprRef;
use crate::plan::SortField;

/// Pull-based row producer
#[async_trait]
pub trait RowIter: Send {
    /// Get the next row, or None if exhausted
    async fn next(&mut self) -> ExecutorResult<Option<Row>>;

    /// Release resources held by this iterator and its children
    async fn close(&mut self) -> ExecutorResult<()>;
}

/// Row iterator that also reports the order of the rows it produces
pub trait OrderableIter: RowIter {
    /// Sort keys the produced rows are guaranteed to follow
    fn row_order(&self) -> &[SortField];

    /// Output expressions whose evaluation is deferred past ordering and limiting
    fn lazy_projections(&self) -> &[ExprRef];
}

#[async_trait]
impl<I: RowIter + ?Sized> RowIter for Box<I> {
    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        (**self).next().await
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        (**self).close().await
    }
}

impl<I: OrderableIter + ?Sized> OrderableIter for Box<I> {
    fn row_order(&self) -> &[SortField] {
        (**self).row_order()
    }

    fn lazy_projections(&self) -> &[ExprRef] {
        (**self).lazy_projections()
    }
}

/// Pull every remaining row from an iterator.
///
/// Does not close the iterator.
pub async fn drain<I: RowIter + ?Sized>(iter: &mut I) -> ExecutorResult<Vec<Row>> {
    let mut rows = Vec::new();
    while let Some(row) = iter.next().await? {
        rows.push(row);
    }
    Ok(rows)
}
