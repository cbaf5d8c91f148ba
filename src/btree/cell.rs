use super::{PageType, payload::LocalPayload};
use crate::{
    error::{DecodeError, read_u32},
    record::Record,
    varint::VarInt,
};

/// Content of a single cell. The shape is determined by the type of the page holding it.
#[derive(Clone, Debug, PartialEq)]
pub enum Cell {
    TableLeaf(TableLeafCell),
    TableInterior(TableInteriorCell),
    IndexLeaf(IndexLeafCell),
    IndexInterior(IndexInteriorCell),
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableLeafCell {
    pub payload_size: u64,
    pub row_id: i64,
    pub record: Record,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TableInteriorCell {
    /// Page holding keys less than or equal to `row_id`.
    pub left_child: u32,
    pub row_id: i64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexLeafCell {
    pub payload_size: u64,
    /// Indexed columns, followed by the row id of the referenced row.
    pub record: Record,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IndexInteriorCell {
    pub left_child: u32,
    pub payload_size: u64,
    pub record: Record,
}

impl Cell {
    /// Decode the cell at `offset` within `page`, laid out according to the raw page type flag.
    ///
    /// `page` must end at the end of the usable area of the page, as that determines how much of
    /// a payload is stored locally.
    pub fn decode(page: &[u8], offset: usize, page_type: u8) -> Result<Self, DecodeError> {
        let page_type =
            PageType::try_from(page_type).map_err(|e| DecodeError::InvalidPageType(e.input))?;

        Ok(match page_type {
            PageType::LeafTable => {
                let (payload_size, len) = VarInt::decode(page, offset)?;
                let mut cursor = offset + len as usize;

                let (row_id, len) = VarInt::decode(page, cursor)?;
                cursor += len as usize;

                Self::TableLeaf(TableLeafCell {
                    payload_size: *payload_size,
                    row_id: row_id.into(),
                    record: read_payload(page, cursor, *payload_size, page_type)?,
                })
            }
            PageType::InteriorTable => {
                let left_child = read_u32(page, offset)?;
                let (row_id, _) = VarInt::decode(page, offset + 4)?;

                Self::TableInterior(TableInteriorCell {
                    left_child,
                    row_id: row_id.into(),
                })
            }
            PageType::LeafIndex => {
                let (payload_size, len) = VarInt::decode(page, offset)?;

                Self::IndexLeaf(IndexLeafCell {
                    payload_size: *payload_size,
                    record: read_payload(page, offset + len as usize, *payload_size, page_type)?,
                })
            }
            PageType::InteriorIndex => {
                let left_child = read_u32(page, offset)?;
                let (payload_size, len) = VarInt::decode(page, offset + 4)?;

                Self::IndexInterior(IndexInteriorCell {
                    left_child,
                    payload_size: *payload_size,
                    record: read_payload(
                        page,
                        offset + 4 + len as usize,
                        *payload_size,
                        page_type,
                    )?,
                })
            }
        })
    }

    pub fn row_id(&self) -> Option<i64> {
        match self {
            Self::TableLeaf(cell) => Some(cell.row_id),
            Self::TableInterior(cell) => Some(cell.row_id),
            Self::IndexLeaf(_) | Self::IndexInterior(_) => None,
        }
    }

    pub fn left_child(&self) -> Option<u32> {
        match self {
            Self::TableInterior(cell) => Some(cell.left_child),
            Self::IndexInterior(cell) => Some(cell.left_child),
            Self::TableLeaf(_) | Self::IndexLeaf(_) => None,
        }
    }

    pub fn payload_size(&self) -> Option<u64> {
        match self {
            Self::TableLeaf(cell) => Some(cell.payload_size),
            Self::IndexLeaf(cell) => Some(cell.payload_size),
            Self::IndexInterior(cell) => Some(cell.payload_size),
            Self::TableInterior(_) => None,
        }
    }

    pub fn record(&self) -> Option<&Record> {
        match self {
            Self::TableLeaf(cell) => Some(&cell.record),
            Self::IndexLeaf(cell) => Some(&cell.record),
            Self::IndexInterior(cell) => Some(&cell.record),
            Self::TableInterior(_) => None,
        }
    }

    pub fn into_record(self) -> Option<Record> {
        match self {
            Self::TableLeaf(cell) => Some(cell.record),
            Self::IndexLeaf(cell) => Some(cell.record),
            Self::IndexInterior(cell) => Some(cell.record),
            Self::TableInterior(_) => None,
        }
    }
}

/// Decode the payload at `offset`, provided it is stored entirely on this page.
fn read_payload(
    page: &[u8],
    offset: usize,
    payload_size: u64,
    page_type: PageType,
) -> Result<Record, DecodeError> {
    let LocalPayload { local, spills } = LocalPayload::compute(page_type, page.len(), payload_size);

    if spills {
        // Overflow page number follows the locally stored bytes.
        return Err(DecodeError::PayloadSpills {
            payload_size,
            local_size: local,
            overflow_page: read_u32(page, offset + local)?,
        });
    }

    Record::decode(page, offset, local)
}
