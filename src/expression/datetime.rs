//! Date and time part extraction
//!
//! `YEAR`, `MONTH`, `DAY`, `HOUR`, `MINUTE`, `SECOND` and `DAYOFYEAR` share
//! one evaluation: evaluate the child, pass NULL through, read the value as a
//! timestamp (falling back to a date), and extract one calendar field as a
//! 32-bit integer.

use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDateTime, Timelike};

use super::{ExprRef, Expression, TransformFn, UnaryExpression};
use crate::executor::{Datum, ExecutorError, ExecutorResult, Row, Session};
use crate::types::DataType;

/// Calendar field extracted by a `DatePart`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePartKind {
    Year,
    /// 1-12
    Month,
    /// Day of month, 1-31
    Day,
    /// 0-23
    Hour,
    Minute,
    Second,
    /// 1-366
    DayOfYear,
}

impl DatePartKind {
    pub const ALL: [DatePartKind; 7] = [
        DatePartKind::Year,
        DatePartKind::Month,
        DatePartKind::Day,
        DatePartKind::Hour,
        DatePartKind::Minute,
        DatePartKind::Second,
        DatePartKind::DayOfYear,
    ];

    /// Function name
    pub fn name(&self) -> &'static str {
        match self {
            DatePartKind::Year => "year",
            DatePartKind::Month => "month",
            DatePartKind::Day => "day",
            DatePartKind::Hour => "hour",
            DatePartKind::Minute => "minute",
            DatePartKind::Second => "second",
            DatePartKind::DayOfYear => "dayofyear",
        }
    }

    fn extract(&self, ts: &NaiveDateTime) -> i32 {
        match self {
            DatePartKind::Year => ts.year(),
            DatePartKind::Month => ts.month() as i32,
            DatePartKind::Day => ts.day() as i32,
            DatePartKind::Hour => ts.hour() as i32,
            DatePartKind::Minute => ts.minute() as i32,
            DatePartKind::Second => ts.second() as i32,
            DatePartKind::DayOfYear => ts.ordinal() as i32,
        }
    }
}

/// Extracts one calendar field from its child
#[derive(Debug, Clone)]
pub struct DatePart {
    kind: DatePartKind,
    unary: UnaryExpression,
}

impl DatePart {
    pub fn new(kind: DatePartKind, child: ExprRef) -> Self {
        DatePart {
            kind,
            unary: UnaryExpression::new(child),
        }
    }

    pub fn kind(&self) -> DatePartKind {
        self.kind
    }

    pub fn child(&self) -> &ExprRef {
        self.unary.child()
    }
}

/// `YEAR(child)`
pub fn year(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Year, child))
}

/// `MONTH(child)`
pub fn month(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Month, child))
}

/// `DAY(child)`
pub fn day(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Day, child))
}

/// `HOUR(child)`
pub fn hour(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Hour, child))
}

/// `MINUTE(child)`
pub fn minute(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Minute, child))
}

/// `SECOND(child)`
pub fn second(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::Second, child))
}

/// `DAYOFYEAR(child)`
pub fn day_of_year(child: ExprRef) -> ExprRef {
    Arc::new(DatePart::new(DatePartKind::DayOfYear, child))
}

fn get_date_part(
    session: &Session,
    unary: &UnaryExpression,
    row: &Row,
    kind: DatePartKind,
) -> ExecutorResult<Datum> {
    let value = unary.child().eval(session, row)?;
    if value.is_null() {
        return Ok(Datum::Null);
    }

    let converted = match DataType::Timestamp.convert(&value) {
        Ok(ts) => ts,
        Err(_) => DataType::Date.convert(&value)?,
    };
    let ts = converted.as_timestamp().ok_or_else(|| {
        ExecutorError::Internal(format!("{} produced a non-temporal value", kind.name()))
    })?;

    Ok(Datum::Int(kind.extract(&ts) as i64))
}

impl Expression for DatePart {
    fn name(&self) -> &str {
        self.kind.name()
    }

    fn data_type(&self) -> DataType {
        DataType::Int
    }

    fn is_nullable(&self) -> bool {
        self.unary.is_nullable()
    }

    fn resolved(&self) -> bool {
        self.unary.resolved()
    }

    fn children(&self) -> Vec<ExprRef> {
        self.unary.children()
    }

    fn with_children(&self, children: Vec<ExprRef>) -> ExecutorResult<ExprRef> {
        let child = UnaryExpression::single_child(self.kind.name(), children)?;
        Ok(Arc::new(DatePart::new(self.kind, child)))
    }

    fn eval(&self, session: &Session, row: &Row) -> ExecutorResult<Datum> {
        get_date_part(session, &self.unary, row, self.kind)
    }

    fn transform_up(&self, f: &TransformFn<'_>) -> ExecutorResult<ExprRef> {
        let child = self.unary.child().transform_up(f)?;
        f(Arc::new(DatePart::new(self.kind, child)))
    }
}

impl fmt::Display for DatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({})",
            self.kind.name().to_ascii_uppercase(),
            self.unary.child()
        )
    }
}
