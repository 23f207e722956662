//! Session and execution context
//!
//! A `Session` identifies who is running queries. A `Context` is created per
//! request and carries the session, the execution config, cancellation and
//! the current parent span. Contexts are cheap to clone; clones share the
//! cancellation token.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{Id, Span};

use super::error::{ExecutorError, ExecutorResult};
use super::span::TraceSpan;
use crate::config::ExecConfig;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Connected client identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Client {
    /// Login user
    pub user: String,
    /// Remote address
    pub address: String,
}

impl Client {
    pub fn new(user: impl Into<String>, address: impl Into<String>) -> Self {
        Client {
            user: user.into(),
            address: address.into(),
        }
    }
}

/// Per-connection session state
#[derive(Debug, Default)]
pub struct Session {
    id: u64,
    client: Client,
}

impl Session {
    /// Create a session for a client, allocating a fresh id
    pub fn new(client: Client) -> Self {
        Session {
            id: NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed),
            client,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Shorthand for the client user
    pub fn user(&self) -> &str {
        &self.client.user
    }
}

/// Execution context for one query
#[derive(Debug, Clone)]
pub struct Context {
    session: Arc<Session>,
    config: Arc<ExecConfig>,
    cancel: CancellationToken,
    parent: Option<Id>,
}

impl Context {
    /// Create a context with the default config
    pub fn new(session: Arc<Session>) -> Self {
        Self::with_config(session, ExecConfig::default())
    }

    pub fn with_config(session: Arc<Session>, config: ExecConfig) -> Self {
        Context {
            session,
            config: Arc::new(config),
            cancel: CancellationToken::new(),
            parent: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn config(&self) -> &ExecConfig {
        &self.config
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel every iterator built from this context or one derived from it
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fail with `Cancelled` if the query was cancelled
    pub fn check_cancelled(&self) -> ExecutorResult<()> {
        if self.cancel.is_cancelled() {
            return Err(ExecutorError::Cancelled);
        }
        Ok(())
    }

    /// Span new spans of this query should be parented to
    pub fn parent_span(&self) -> Option<Id> {
        self.parent.clone()
    }

    /// Enter a node span.
    ///
    /// Returns the handle the caller must finish and a context whose spans
    /// nest under it. The derived context only keeps the span id, so the
    /// span closes with its handle.
    pub fn span(&self, span: Span) -> (TraceSpan, Context) {
        let mut ctx = self.clone();
        if let Some(id) = span.id() {
            ctx.parent = Some(id);
        }
        (TraceSpan::new(span), ctx)
    }

    /// Cancellation poller for row loops
    pub fn cancel_check(&self) -> CancelCheck {
        CancelCheck {
            token: self.cancel.clone(),
            interval: self.config.cancel_check_interval.max(1),
        }
    }
}

/// Polls cancellation every `interval` rows of a loop
#[derive(Debug, Clone)]
pub struct CancelCheck {
    token: CancellationToken,
    interval: u64,
}

impl CancelCheck {
    /// Check at row `n` of a loop (0-based)
    pub fn check(&self, n: u64) -> ExecutorResult<()> {
        if n % self.interval == 0 && self.token.is_cancelled() {
            return Err(ExecutorError::Cancelled);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_ids_are_unique() {
        let a = Session::new(Client::new("alice", "127.0.0.1:3306"));
        let b = Session::new(Client::new("bob", "127.0.0.1:3307"));
        assert_ne!(a.id(), b.id());
        assert_eq!(a.user(), "alice");
    }

    #[test]
    fn test_cancel_is_shared_by_clones() {
        let ctx = Context::new(Arc::new(Session::default()));
        let derived = ctx.clone();
        assert!(derived.check_cancelled().is_ok());

        ctx.cancel();
        assert!(matches!(
            derived.check_cancelled(),
            Err(ExecutorError::Cancelled)
        ));
    }

    #[test]
    fn test_cancel_check_interval() {
        let ctx = Context::with_config(
            Arc::new(Session::default()),
            ExecConfig::new().with_cancel_check_interval(4),
        );
        let check = ctx.cancel_check();
        ctx.cancel();

        assert!(check.check(0).is_err());
        assert!(check.check(3).is_ok());
        assert!(check.check(8).is_err());
    }
}
