use derive_more::Deref;
use thiserror::Error;

/// Minimum size of the SQLite page.
const PAGE_SIZE_MIN: u32 = 512;
/// Maximum size of the SQLite page.
const PAGE_SIZE_MAX: u32 = 65536;
/// Stored value standing in for [`PAGE_SIZE_MAX`], which doesn't fit in the 2 byte field.
const PAGE_SIZE_MAX_MARKER: u16 = 1;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PageSizeError {
    #[error("page size must be between 512 and 65536 inclusive (found {0})")]
    NotInRange(u16),
    #[error("page size must be a power of 2 (found {0})")]
    NotPowerOfTwo(u16),
}

/// Size of a database page in bytes.
#[derive(Clone, Copy, Debug, Deref, PartialEq, Eq)]
pub struct PageSize(u32);

impl TryFrom<u16> for PageSize {
    type Error = PageSizeError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        if value == PAGE_SIZE_MAX_MARKER {
            return Ok(Self(PAGE_SIZE_MAX));
        }

        if !(PAGE_SIZE_MIN..PAGE_SIZE_MAX).contains(&(value as u32)) {
            return Err(PageSizeError::NotInRange(value));
        }

        if !value.is_power_of_two() {
            return Err(PageSizeError::NotPowerOfTwo(value));
        }

        Ok(Self(value as u32))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.0 as usize
    }
}
