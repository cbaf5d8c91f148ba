use std::fmt::{self, Display, Formatter};

use derive_more::{Deref, From};

use crate::error::DecodeError;

/// Tag preceding each column in a record header, describing both the storage class and the number
/// of body bytes the column occupies.
#[derive(Clone, Copy, Debug, Deref, From, PartialEq, Eq, Hash)]
pub struct SerialType(u64);

impl SerialType {
    pub const NULL: Self = Self(0);
    pub const ZERO: Self = Self(8);
    pub const ONE: Self = Self(9);

    /// Serial type of a blob holding `len` bytes.
    pub fn blob(len: usize) -> Self {
        Self(len as u64 * 2 + 12)
    }

    /// Serial type of text holding `len` bytes.
    pub fn text(len: usize) -> Self {
        Self(len as u64 * 2 + 13)
    }

    /// Number of body bytes used by a column of this type.
    pub fn content_size(self) -> Result<usize, DecodeError> {
        let size = match self.0 {
            0 | 8 | 9 => 0,
            1 => 1,
            2 => 2,
            3 => 3,
            4 => 4,
            5 => 6,
            6 | 7 => 8,
            10 | 11 => return Err(DecodeError::UnknownSerialType(self.0)),
            n if n % 2 == 0 => (n - 12) / 2,
            n => (n - 13) / 2,
        };

        usize::try_from(size).map_err(|_| DecodeError::UnknownSerialType(self.0))
    }

    pub fn storage_class(self) -> Result<StorageClass, DecodeError> {
        Ok(match self.0 {
            0 => StorageClass::Null,
            1..=6 | 8 | 9 => StorageClass::Integer,
            7 => StorageClass::Float,
            10 | 11 => return Err(DecodeError::UnknownSerialType(self.0)),
            n if n % 2 == 0 => StorageClass::Blob,
            _ => StorageClass::Text,
        })
    }
}

/// Storage class of a value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StorageClass {
    Null,
    Integer,
    Float,
    Text,
    Blob,
}

impl Display for StorageClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Null => "NULL",
            Self::Integer => "INTEGER",
            Self::Float => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    #[rstest]
    #[case::null(0, 0, StorageClass::Null)]
    #[case::i8(1, 1, StorageClass::Integer)]
    #[case::i24(3, 3, StorageClass::Integer)]
    #[case::i48(5, 6, StorageClass::Integer)]
    #[case::i64(6, 8, StorageClass::Integer)]
    #[case::f64(7, 8, StorageClass::Float)]
    #[case::zero(8, 0, StorageClass::Integer)]
    #[case::one(9, 0, StorageClass::Integer)]
    #[case::empty_blob(12, 0, StorageClass::Blob)]
    #[case::empty_text(13, 0, StorageClass::Text)]
    #[case::blob(20, 4, StorageClass::Blob)]
    #[case::text(23, 5, StorageClass::Text)]
    fn known(#[case] raw: u64, #[case] size: usize, #[case] class: StorageClass) {
        let serial_type = SerialType::from(raw);
        assert_eq!(serial_type.content_size(), Ok(size));
        assert_eq!(serial_type.storage_class(), Ok(class));
    }

    #[rstest]
    #[case(10)]
    #[case(11)]
    fn reserved(#[case] raw: u64) {
        let serial_type = SerialType::from(raw);
        assert_eq!(
            serial_type.content_size(),
            Err(DecodeError::UnknownSerialType(raw))
        );
        assert_eq!(
            serial_type.storage_class(),
            Err(DecodeError::UnknownSerialType(raw))
        );
    }

    #[test]
    fn constructors() {
        assert_eq!(*SerialType::blob(3), 18);
        assert_eq!(*SerialType::text(3), 19);
    }
}
