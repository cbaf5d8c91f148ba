use thiserror::Error;

use crate::header::PageSizeError;

/// Failure while decoding any structure out of a database buffer.
///
/// Every decoder in this crate is pure, so a [`DecodeError`] always describes corruption (or a
/// wrong offset) in the bytes that were supplied. None of them are worth retrying.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("varint at offset {offset} runs past the end of the buffer")]
    TruncatedVarint { offset: usize },

    #[error("invalid header string (found {0:?})")]
    InvalidMagic([u8; 16]),

    #[error("invalid page size: {0}")]
    InvalidPageSize(#[from] PageSizeError),

    #[error("invalid page type (found 0x{0:02x})")]
    InvalidPageType(u8),

    #[error("record header size {header_size} exceeds payload size {payload_size}")]
    PayloadOverflow { header_size: u64, payload_size: u64 },

    #[error("record header ends at {consumed} but declares {header_size} bytes")]
    HeaderOverrun { header_size: u64, consumed: u64 },

    #[error("unknown serial type (found {0})")]
    UnknownSerialType(u64),

    #[error("{len} bytes at offset {offset} exceed the buffer ({available} bytes)")]
    OutOfBounds {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("payload of {payload_size} bytes spills onto overflow page {overflow_page}")]
    PayloadSpills {
        payload_size: u64,
        local_size: usize,
        overflow_page: u32,
    },
}

/// Borrow `len` bytes at `offset`, reporting [`DecodeError::OutOfBounds`] instead of panicking.
pub(crate) fn slice(buf: &[u8], offset: usize, len: usize) -> Result<&[u8], DecodeError> {
    offset
        .checked_add(len)
        .and_then(|end| buf.get(offset..end))
        .ok_or(DecodeError::OutOfBounds {
            offset,
            len,
            available: buf.len(),
        })
}

/// Read a big endian `u16` at `offset`.
pub(crate) fn read_u16(buf: &[u8], offset: usize) -> Result<u16, DecodeError> {
    let bytes = slice(buf, offset, 2)?;
    Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
}

/// Read a big endian `u32` at `offset`.
pub(crate) fn read_u32(buf: &[u8], offset: usize) -> Result<u32, DecodeError> {
    let bytes = slice(buf, offset, 4)?;
    Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}
