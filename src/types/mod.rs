//! SQL types and value conversion
//!
//! `DataType` is the semantic type of an expression result. Converting a
//! `Datum` to a `DataType` either yields a datum of that type or a
//! `TypeError`; malformed input never panics.

pub mod time;

use std::fmt;

use thiserror::Error;

use crate::executor::datum::Datum;

/// Type conversion errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TypeError {
    /// Value cannot be represented as the target type
    #[error("value {value} can not be converted to {target}")]
    Conversion { value: String, target: DataType },

    /// Value parsed, but does not fit the target type
    #[error("value {value} is out of range for {target}")]
    OutOfRange { value: String, target: DataType },
}

/// Result type for conversions
pub type TypeResult<T> = Result<T, TypeError>;

/// Semantic SQL types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    /// Boolean (true/false)
    Boolean,
    /// 32-bit signed integer
    Int,
    /// 64-bit signed integer
    BigInt,
    /// 64-bit floating point
    Double,
    /// Unlimited text
    Text,
    /// Binary data
    Blob,
    /// Date and time of day, no time zone
    Timestamp,
    /// Calendar date
    Date,
}

impl DataType {
    /// Check if this type is numeric
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::BigInt | DataType::Double)
    }

    /// Check if this type carries a calendar date
    pub fn is_temporal(&self) -> bool {
        matches!(self, DataType::Timestamp | DataType::Date)
    }

    /// Convert a value to this type.
    ///
    /// NULL converts to NULL for every type.
    pub fn convert(&self, value: &Datum) -> TypeResult<Datum> {
        if value.is_null() {
            return Ok(Datum::Null);
        }

        match self {
            DataType::Timestamp => time::to_timestamp(value).map(Datum::Timestamp),
            DataType::Date => time::to_date(value).map(Datum::Date),
            DataType::Int => {
                let v = self.to_i64(value)?;
                i32::try_from(v)
                    .map(|v| Datum::Int(v as i64))
                    .map_err(|_| TypeError::OutOfRange {
                        value: value.to_string(),
                        target: *self,
                    })
            }
            DataType::BigInt => self.to_i64(value).map(Datum::Int),
            DataType::Double => match value {
                Datum::Float(f) => Ok(Datum::Float(*f)),
                Datum::Int(i) => Ok(Datum::Float(*i as f64)),
                Datum::Bool(b) => Ok(Datum::Float(if *b { 1.0 } else { 0.0 })),
                Datum::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Datum::Float)
                    .map_err(|_| self.conversion_error(value)),
                _ => Err(self.conversion_error(value)),
            },
            DataType::Boolean => match value {
                Datum::Bool(b) => Ok(Datum::Bool(*b)),
                Datum::Int(i) => Ok(Datum::Bool(*i != 0)),
                Datum::Float(f) => Ok(Datum::Bool(*f != 0.0)),
                Datum::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" | "1" => Ok(Datum::Bool(true)),
                    "false" | "0" => Ok(Datum::Bool(false)),
                    _ => Err(self.conversion_error(value)),
                },
                _ => Err(self.conversion_error(value)),
            },
            DataType::Text => match value {
                Datum::String(s) => Ok(Datum::String(s.clone())),
                Datum::Bytes(b) => String::from_utf8(b.clone())
                    .map(Datum::String)
                    .map_err(|_| self.conversion_error(value)),
                other => Ok(Datum::String(other.to_string())),
            },
            DataType::Blob => match value {
                Datum::Bytes(b) => Ok(Datum::Bytes(b.clone())),
                Datum::String(s) => Ok(Datum::Bytes(s.as_bytes().to_vec())),
                _ => Err(self.conversion_error(value)),
            },
        }
    }

    fn to_i64(&self, value: &Datum) -> TypeResult<i64> {
        match value {
            Datum::Int(i) => Ok(*i),
            Datum::Float(f) if f.is_finite() => Ok(f.trunc() as i64),
            Datum::Bool(b) => Ok(if *b { 1 } else { 0 }),
            Datum::String(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| self.conversion_error(value)),
            _ => Err(self.conversion_error(value)),
        }
    }

    pub(crate) fn conversion_error(&self, value: &Datum) -> TypeError {
        TypeError::Conversion {
            value: value.to_string(),
            target: *self,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Boolean => "BOOLEAN",
            DataType::Int => "INT",
            DataType::BigInt => "BIGINT",
            DataType::Double => "DOUBLE",
            DataType::Text => "TEXT",
            DataType::Blob => "BLOB",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Date => "DATE",
        };
        f.write_str(name)
    }
}
