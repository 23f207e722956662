//! plancore - expression evaluation and pull-based plan execution
//!
//! Features:
//! - Immutable expression and plan trees with bottom-up rewriting
//! - Async Volcano-style row iterators with order metadata
//! - Per-node tracing spans tied to iterator lifetime
//! - Pluggable authorization with a permit-all and a native-password backend

pub mod auth;
pub mod config;
pub mod executor;
pub mod expression;
pub mod plan;
pub mod types;
