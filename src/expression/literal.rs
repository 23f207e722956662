//! Constant values

use std::fmt;
use std::sync::Arc;

use super::{transform_children_up, ExprRef, Expression, TransformFn};
use crate::executor::{Datum, ExecutorError, ExecutorResult, Row, Session};
use crate::types::DataType;

/// A constant value of a declared type
#[derive(Debug, Clone)]
pub struct Literal {
    value: Datum,
    data_type: DataType,
}

impl Literal {
    /// Create a literal, taking the type from the value.
    ///
    /// NULL literals are typed TEXT; use `typed` to declare another type.
    pub fn new(value: impl Into<Datum>) -> Self {
        let value = value.into();
        let data_type = value.data_type().unwrap_or(DataType::Text);
        Literal { value, data_type }
    }

    /// Create a literal with an explicit type.
    ///
    /// The value is converted to `data_type`.
    pub fn typed(value: impl Into<Datum>, data_type: DataType) -> ExecutorResult<Self> {
        let value = data_type.convert(&value.into())?;
        Ok(Literal { value, data_type })
    }

    pub fn null() -> Self {
        Literal {
            value: Datum::Null,
            data_type: DataType::Text,
        }
    }

    pub fn value(&self) -> &Datum {
        &self.value
    }

    pub fn into_ref(self) -> ExprRef {
        Arc::new(self)
    }
}

impl Expression for Literal {
    fn name(&self) -> &str {
        "literal"
    }

    fn data_type(&self) -> DataType {
        self.data_type
    }

    fn is_nullable(&self) -> bool {
        self.value.is_null()
    }

    fn resolved(&self) -> bool {
        true
    }

    fn children(&self) -> Vec<ExprRef> {
        Vec::new()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> ExecutorResult<ExprRef> {
        if !children.is_empty() {
            return Err(ExecutorError::invalid_children("literal", children.len(), 0));
        }
        Ok(Arc::new(self.clone()))
    }

    fn eval(&self, _session: &Session, _row: &Row) -> ExecutorResult<Datum> {
        Ok(self.value.clone())
    }

    fn transform_up(&self, f: &TransformFn<'_>) -> ExecutorResult<ExprRef> {
        transform_children_up(self, f)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Datum::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Datum::Timestamp(_) | Datum::Date(_) => write!(f, "'{}'", self.value),
            other => write!(f, "{}", other),
        }
    }
}
