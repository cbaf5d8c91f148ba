use std::num::NonZero;

use static_assertions::const_assert_eq;
use tracing::{debug, warn};
use zerocopy::{FromBytes, Immutable, KnownLayout, big_endian::*};

use super::{Cell, PageType};
use crate::{
    error::{DecodeError, read_u16},
    header::HEADER_SIZE,
    record::Record,
};

/// Page header as stored on disk for leaf pages.
#[derive(Clone, Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawLeafPageHeader {
    page_type: u8,
    first_freeblock: U16,
    cell_count: U16,
    cell_content_start: U16,
    fragmented_free_bytes: u8,
}
const_assert_eq!(size_of::<RawLeafPageHeader>(), 8);

/// Interior pages extend the leaf header with the right most child pointer.
#[derive(Clone, Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawInteriorPageHeader {
    header: RawLeafPageHeader,
    right_most_pointer: U32,
}
const_assert_eq!(size_of::<RawInteriorPageHeader>(), 12);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageHeader {
    pub page_type: PageType,
    /// Offset of the first freeblock, if there are any.
    pub first_freeblock: Option<NonZero<u16>>,
    pub cell_count: u16,
    /// Start of the cell content area. A stored value of 0 is read as 65536.
    pub cell_content_start: u32,
    /// Number of fragmented free bytes within the cell content area.
    pub fragmented_free_bytes: u8,
    /// Child page holding keys greater than every cell on the page. Interior pages only.
    pub right_most_pointer: Option<u32>,
}

impl PageHeader {
    /// Decode the page header beginning at `offset` within `page`.
    pub fn decode(page: &[u8], offset: usize) -> Result<Self, DecodeError> {
        let not_enough_bytes = |len| DecodeError::OutOfBounds {
            offset,
            len,
            available: page.len(),
        };

        let bytes = page.get(offset..).ok_or(not_enough_bytes(1))?;
        let page_type = PageType::try_from(*bytes.first().ok_or(not_enough_bytes(1))?)
            .map_err(|e| DecodeError::InvalidPageType(e.input))?;

        let (header, right_most_pointer) = if page_type.is_interior() {
            let (raw, _) = RawInteriorPageHeader::read_from_prefix(bytes)
                .map_err(|_| not_enough_bytes(size_of::<RawInteriorPageHeader>()))?;
            (raw.header, Some(raw.right_most_pointer.get()))
        } else {
            let (raw, _) = RawLeafPageHeader::read_from_prefix(bytes)
                .map_err(|_| not_enough_bytes(size_of::<RawLeafPageHeader>()))?;
            (raw, None)
        };

        Ok(Self {
            page_type,
            first_freeblock: NonZero::new(header.first_freeblock.get()),
            cell_count: header.cell_count.get(),
            cell_content_start: match header.cell_content_start.get() {
                0 => 65536,
                n => n as u32,
            },
            fragmented_free_bytes: header.fragmented_free_bytes,
            right_most_pointer,
        })
    }

    /// Size of the header in bytes.
    pub fn size(&self) -> usize {
        if self.page_type.is_interior() {
            size_of::<RawInteriorPageHeader>()
        } else {
            size_of::<RawLeafPageHeader>()
        }
    }
}

/// Outcome of decoding the cell in one slot of the cell pointer array.
#[derive(Clone, Debug, PartialEq)]
pub struct CellEntry {
    /// Zero based index of the page within the file.
    pub page_index: u32,
    /// Position in the cell pointer array.
    pub slot: usize,
    /// Offset of the cell within the page, if the pointer itself could be read.
    pub offset: Option<usize>,
    pub cell: Result<Cell, DecodeError>,
}

/// Physical placement of a cell within its page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellExtent {
    pub slot: usize,
    pub offset: usize,
    /// Distance to the next cell, or to the end of the page for the last cell.
    pub size: usize,
}

/// A decoded b-tree page.
#[derive(Clone, Debug, PartialEq)]
pub struct PageInfo {
    /// Zero based index of the page within the file.
    pub page_index: u32,
    pub header: PageHeader,
    /// Offset of [`PageInfo::header`] within the page.
    pub header_offset: usize,
    /// Length of the decoded page buffer.
    pub page_len: usize,
    /// One entry per cell, in cell pointer array order.
    pub cells: Vec<CellEntry>,
}

impl PageInfo {
    /// Decode the page header and every cell of `page`.
    ///
    /// A failure to decode the header fails the page. A failure to decode a cell is recorded
    /// against that cell only, so every slot of the cell pointer array yields exactly one entry.
    pub fn decode(page: &[u8], is_first_page: bool, page_index: u32) -> Result<Self, DecodeError> {
        let header_offset = if is_first_page { HEADER_SIZE } else { 0 };
        let header = PageHeader::decode(page, header_offset)?;
        let pointers_offset = header_offset + header.size();

        debug!(
            page = page_index,
            page_type = header.page_type.name(),
            cells = header.cell_count,
            "decoding page"
        );

        let cells = (0..header.cell_count as usize)
            .map(|slot| {
                let offset = read_u16(page, pointers_offset + slot * 2).map(usize::from);
                let cell = offset
                    .clone()
                    .and_then(|offset| Cell::decode(page, offset, header.page_type as u8));

                if let Err(e) = &cell {
                    warn!(page = page_index, slot, error = %e, "failed to decode cell");
                }

                CellEntry {
                    page_index,
                    slot,
                    offset: offset.ok(),
                    cell,
                }
            })
            .collect();

        Ok(Self {
            page_index,
            header,
            header_offset,
            page_len: page.len(),
            cells,
        })
    }

    pub fn page_type(&self) -> PageType {
        self.header.page_type
    }

    pub fn is_table_leaf(&self) -> bool {
        self.header.page_type == PageType::LeafTable
    }

    /// Successfully decoded cells, with their slot.
    pub fn ok_cells(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells
            .iter()
            .filter_map(|entry| entry.cell.as_ref().ok().map(|cell| (entry.slot, cell)))
    }

    /// Cells that failed to decode, with their slot.
    pub fn errors(&self) -> impl Iterator<Item = (usize, &DecodeError)> {
        self.cells
            .iter()
            .filter_map(|entry| entry.cell.as_ref().err().map(|e| (entry.slot, e)))
    }

    /// Row id and record of every decoded cell, if this is a table leaf page.
    pub fn records(&self) -> impl Iterator<Item = (i64, &Record)> {
        self.ok_cells()
            .filter_map(|(_, cell)| match cell {
                Cell::TableLeaf(cell) => Some((cell.row_id, &cell.record)),
                _ => None,
            })
    }

    /// Children referenced by an interior page, left to right.
    pub fn children(&self) -> Vec<u32> {
        self.ok_cells()
            .filter_map(|(_, cell)| cell.left_child())
            .chain(self.header.right_most_pointer)
            .collect()
    }

    /// Cells ordered by their position within the page, as laid out on disk.
    pub fn physical_layout(&self) -> Vec<CellExtent> {
        let mut placed = self
            .cells
            .iter()
            .filter_map(|entry| entry.offset.map(|offset| (entry.slot, offset)))
            .collect::<Vec<_>>();
        placed.sort_by_key(|(_, offset)| *offset);

        let ends = placed
            .iter()
            .skip(1)
            .map(|(_, offset)| *offset)
            .chain([self.page_len]);

        placed
            .iter()
            .zip(ends)
            .map(|(&(slot, offset), end)| CellExtent {
                slot,
                offset,
                size: end.saturating_sub(offset),
            })
            .collect()
    }
}
