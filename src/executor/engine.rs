//! Executor engine
//!
//! Runs a plan tree to completion on behalf of a session.

use std::sync::Arc;

use tracing::debug;

use super::context::Context;
use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;
use super::drain;
use crate::auth::{Auth, Permission};
use crate::plan::NodeRef;

/// Executes plans after checking the session may read
pub struct ExecutorEngine {
    auth: Arc<dyn Auth>,
}

impl ExecutorEngine {
    pub fn new(auth: Arc<dyn Auth>) -> Self {
        ExecutorEngine { auth }
    }

    pub fn auth(&self) -> &Arc<dyn Auth> {
        &self.auth
    }

    /// Execute a plan and collect its rows.
    ///
    /// The root iterator is always closed, also when pulling a row failed.
    /// The first error wins.
    pub async fn query(&self, ctx: &Context, plan: &NodeRef) -> ExecutorResult<Vec<Row>> {
        self.auth.allowed(ctx, Permission::Read)?;

        if !plan.resolved() {
            return Err(ExecutorError::Unresolved(plan.to_string()));
        }

        let mut iter = plan.row_iter(ctx).await?;
        let rows = drain(iter.as_mut()).await;
        let closed = iter.close().await;

        let rows = rows?;
        closed?;
        debug!(
            session = ctx.session().id(),
            rows = rows.len(),
            "query finished"
        );
        Ok(rows)
    }
}
