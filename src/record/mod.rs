//! Records: the row format shared by table and index b-trees.
//!
//! A record is a header (its own length as a varint, followed by one serial type per column)
//! and a body holding the column contents back to back.

mod serial_type;
mod value;

use std::fmt::{self, Display, Formatter};

pub use self::{
    serial_type::{SerialType, StorageClass},
    value::Value,
};
use crate::{
    error::{DecodeError, slice},
    varint::VarInt,
};

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    /// Length of the header, as declared by its leading varint.
    header_size: usize,
    /// Number of body bytes consumed by the columns.
    body_size: usize,
    columns: Vec<(SerialType, Value)>,
}

impl Record {
    /// Decode the record occupying `payload_size` bytes at `payload_offset` in `buf`.
    pub fn decode(
        buf: &[u8],
        payload_offset: usize,
        payload_size: usize,
    ) -> Result<Self, DecodeError> {
        let payload_end = payload_offset + slice(buf, payload_offset, payload_size)?.len();
        // Nothing belonging to another cell may be read.
        let buf = &buf[..payload_end];

        let (header_size, header_size_len) = VarInt::decode(buf, payload_offset)?;
        if *header_size > payload_size as u64 {
            return Err(DecodeError::PayloadOverflow {
                header_size: *header_size,
                payload_size: payload_size as u64,
            });
        }
        let header_end = payload_offset + *header_size as usize;

        let mut serial_types = Vec::new();
        let mut cursor = payload_offset + header_size_len as usize;
        while cursor < header_end {
            let (serial_type, len) = VarInt::decode(buf, cursor)?;
            serial_types.push(SerialType::from(*serial_type));
            cursor += len as usize;
        }

        if cursor != header_end {
            return Err(DecodeError::HeaderOverrun {
                header_size: *header_size,
                consumed: (cursor - payload_offset) as u64,
            });
        }

        let mut columns = Vec::with_capacity(serial_types.len());
        for serial_type in serial_types {
            let content = slice(buf, cursor, serial_type.content_size()?)?;
            cursor += content.len();

            columns.push((serial_type, Value::decode(serial_type, content)?));
        }

        Ok(Self {
            header_size: *header_size as usize,
            body_size: cursor - header_end,
            columns,
        })
    }

    pub fn header_size(&self) -> usize {
        self.header_size
    }

    pub fn body_size(&self) -> usize {
        self.body_size
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn get(&self, column: usize) -> Option<&Value> {
        self.columns.get(column).map(|(_, value)| value)
    }

    pub fn serial_type(&self, column: usize) -> Option<SerialType> {
        self.columns.get(column).map(|(serial_type, _)| *serial_type)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.columns.iter().map(|(_, value)| value)
    }

    pub fn serial_types(&self) -> impl Iterator<Item = SerialType> {
        self.columns.iter().map(|(serial_type, _)| *serial_type)
    }

    /// Text in `column`, if it holds text.
    pub fn text(&self, column: usize) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Integer in `column`, if it holds one.
    pub fn integer(&self, column: usize) -> Option<i64> {
        self.get(column).and_then(Value::as_integer)
    }
}

impl Display for Record {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Record[")?;
        for (i, value) in self.values().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, "]")
    }
}

/// Build the bytes of a record holding `values`. Only used to construct fixtures, so integers
/// always take the 8 byte form unless they are 0 or 1.
#[cfg(test)]
pub(crate) fn encode(values: &[Value]) -> Vec<u8> {
    let mut header = Vec::new();
    let mut body = Vec::new();

    for value in values {
        let serial_type = match value {
            Value::Null => SerialType::NULL,
            Value::Integer(0) => SerialType::ZERO,
            Value::Integer(1) => SerialType::ONE,
            Value::Integer(i) => {
                body.extend_from_slice(&i.to_be_bytes());
                SerialType::from(6)
            }
            Value::Float(f) => {
                body.extend_from_slice(&f.to_be_bytes());
                SerialType::from(7)
            }
            Value::Text(text) => {
                body.extend_from_slice(text.as_bytes());
                SerialType::text(text.len())
            }
            Value::Blob(blob) => {
                body.extend_from_slice(blob);
                SerialType::blob(blob.len())
            }
        };
        header.extend(VarInt::new(*serial_type).encode());
    }

    // Header length includes its own varint, which is a single byte for any fixture.
    let mut bytes = VarInt::new(header.len() as u64 + 1).encode();
    bytes.extend(header);
    bytes.extend(body);
    bytes
}
