use std::{
    cmp::Ordering,
    fmt::{self, Display, Formatter},
};

use super::{SerialType, StorageClass};
use crate::error::DecodeError;

/// A single column value of a record.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Value {
    /// Decode a value from exactly the body bytes belonging to `serial_type`.
    pub(crate) fn decode(serial_type: SerialType, bytes: &[u8]) -> Result<Self, DecodeError> {
        Ok(match *serial_type {
            0 => Self::Null,
            1..=6 => Self::Integer(sign_extend(bytes)),
            7 => Self::Float(f64::from_bits(
                bytes.iter().fold(0u64, |n, b| (n << 8) | *b as u64),
            )),
            8 => Self::Integer(0),
            9 => Self::Integer(1),
            10 | 11 => return Err(DecodeError::UnknownSerialType(*serial_type)),
            n if n % 2 == 0 => Self::Blob(bytes.to_vec()),
            _ => Self::Text(String::from_utf8_lossy(bytes).into_owned()),
        })
    }

    pub fn storage_class(&self) -> StorageClass {
        match self {
            Self::Null => StorageClass::Null,
            Self::Integer(_) => StorageClass::Integer,
            Self::Float(_) => StorageClass::Float,
            Self::Text(_) => StorageClass::Text,
            Self::Blob(_) => StorageClass::Blob,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value of integers and floats.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Self::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    /// Total ordering matching SQLite's comparison of values of mixed storage classes:
    /// `NULL` sorts first, then numbers, then text, then blobs.
    pub fn total_cmp(&self, other: &Self) -> Ordering {
        fn rank(value: &Value) -> u8 {
            match value {
                Value::Null => 0,
                Value::Integer(_) | Value::Float(_) => 1,
                Value::Text(_) => 2,
                Value::Blob(_) => 3,
            }
        }

        match (self, other) {
            (Self::Integer(a), Self::Integer(b)) => a.cmp(b),
            (Self::Text(a), Self::Text(b)) => a.cmp(b),
            (Self::Blob(a), Self::Blob(b)) => a.cmp(b),
            (a, b) if rank(a) == 1 && rank(b) == 1 => {
                // Mixed integer and float, both present by the guard.
                let (a, b) = (a.as_float().unwrap_or_default(), b.as_float().unwrap_or_default());
                a.total_cmp(&b)
            }
            (a, b) => rank(a).cmp(&rank(b)),
        }
    }
}

/// Interpret up to 8 big endian bytes as a two's complement integer of that width.
fn sign_extend(bytes: &[u8]) -> i64 {
    debug_assert!((1..=8).contains(&bytes.len()));

    let raw = bytes.iter().fold(0u64, |n, b| (n << 8) | *b as u64);
    let unused = 64 - 8 * bytes.len() as u32;

    ((raw << unused) as i64) >> unused
}

impl Display for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => write!(f, "NULL"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(text) => write!(f, "'{text}'"),
            Self::Blob(blob) => write!(f, "BLOB({} bytes)", blob.len()),
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}
