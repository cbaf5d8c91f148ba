use derive_more::Deref;

use crate::error::DecodeError;

/// Longest possible encoding of a varint.
pub const VARINT_MAX_LEN: usize = 9;

/// SQLite variable length integer. Bytes are big endian, with the high bit of each of the first
/// eight bytes acting as a continuation flag. A ninth byte contributes all eight of its bits.
#[derive(Clone, Copy, Debug, Default, Deref, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarInt(u64);

impl VarInt {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Decode the varint starting at `offset`, returning it alongside the number of bytes it
    /// occupied.
    pub fn decode(buf: &[u8], offset: usize) -> Result<(Self, u8), DecodeError> {
        let mut value: u64 = 0;

        for i in 0..VARINT_MAX_LEN {
            let b = *buf
                .get(offset + i)
                .ok_or(DecodeError::TruncatedVarint { offset })?;

            if i == VARINT_MAX_LEN - 1 {
                // Final byte is taken whole.
                value = (value << 8) | b as u64;
                return Ok((Self(value), VARINT_MAX_LEN as u8));
            }

            value = (value << 7) | (b & 0x7f) as u64;

            if b & 0x80 == 0 {
                return Ok((Self(value), i as u8 + 1));
            }
        }

        unreachable!("loop returns on the final byte")
    }

    /// Decode the varint at the start of `buf`, returning the remaining bytes.
    pub fn from_buffer(buf: &[u8]) -> Result<(Self, &[u8]), DecodeError> {
        let (value, len) = Self::decode(buf, 0)?;
        Ok((value, &buf[len as usize..]))
    }

    /// Number of bytes the canonical encoding of this value occupies.
    pub fn encoded_len(self) -> usize {
        match self.0 {
            // Anything needing more than 56 bits uses the 9 byte form.
            n if n >> 56 != 0 => VARINT_MAX_LEN,
            n => (64 - n.leading_zeros() as usize).div_ceil(7).max(1),
        }
    }

    /// Canonical (shortest) encoding of this value.
    pub fn encode(self) -> Vec<u8> {
        let len = self.encoded_len();
        let mut bytes = Vec::with_capacity(len);

        if len == VARINT_MAX_LEN {
            let high = self.0 >> 8;
            for i in (0..8).rev() {
                bytes.push(((high >> (7 * i)) as u8 & 0x7f) | 0x80);
            }
            bytes.push(self.0 as u8);
            return bytes;
        }

        for i in (0..len).rev() {
            let continuation = if i == 0 { 0x00 } else { 0x80 };
            bytes.push(((self.0 >> (7 * i)) as u8 & 0x7f) | continuation);
        }

        bytes
    }
}

impl From<VarInt> for u64 {
    fn from(value: VarInt) -> Self {
        value.0
    }
}

impl From<VarInt> for i64 {
    /// Row ids are stored as the two's complement of the unsigned varint.
    fn from(value: VarInt) -> Self {
        value.0 as i64
    }
}
