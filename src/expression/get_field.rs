//! Column references

use std::fmt;
use std::sync::Arc;

use super::{transform_children_up, ExprRef, Expression, TransformFn};
use crate::executor::{Datum, ExecutorError, ExecutorResult, Row, Session};
use crate::types::DataType;

/// Reads the column at a fixed index of the input row
#[derive(Debug, Clone)]
pub struct GetField {
    index: usize,
    name: String,
    data_type: DataType,
    nullable: bool,
}

impl GetField {
    pub fn new(index: usize, name: impl Into<String>, data_type: DataType, nullable: bool) -> Self {
        GetField {
            index,
            name: name.into(),
            data_type,
            nullable,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn into_ref(self) -> ExprRef {
        Arc::new(self)
    }
}

impl Expression for GetField {
    fn name(&self) -> &str {
        &self.name
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn is_nullable(&self) -> bool {
        self.nullable
    }

    fn resolved(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> ExecutorResult<ExprRef> {
        if !children.is_empty() {
            return Err(ExecutorError::invalid_children(&self.name, children.len(), 0));
        }
        Ok(Arc::new(self.clone()))
    }

    fn eval(&self, _session: &Session, row: &Row) -> ExecutorResult<Datum> {
        row.get(self.index).cloned()
    }

    fn transform_up(&self, f: &TransformFn<'_>) -> ExecutorResult<ExprRef> {
        transform_children_up(self, f)
    }
}

impl fmt::Display for GetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
