//! Shared test utilities
//!
//! Note: clippy reports false-positive dead_code warnings because it can't
//! trace usage across test binaries. These utilities are used by multiple tests.

#![allow(dead_code)]

pub mod nodes;
pub mod spans;

use std::sync::Arc;

use plancore::executor::{Context, Datum, Row, Session};

/// Context over an anonymous session with the default config
pub fn test_ctx() -> Context {
    Context::new(Arc::new(Session::default()))
}

/// Rows `[0]`, `[1]`, ... `[n - 1]`
pub fn int_rows(n: i64) -> Vec<Row> {
    (0..n).map(|i| Row::new(vec![Datum::Int(i)])).collect()
}

/// First column of each row as an integer
pub fn ints(rows: &[Row]) -> Vec<i64> {
    rows.iter()
        .map(|r| r.get(0).unwrap().as_int().unwrap())
        .collect()
}
