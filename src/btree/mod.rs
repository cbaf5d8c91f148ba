//! B-tree pages and the cells they hold.

mod cell;
mod page;
mod page_type;
mod payload;

pub use self::{
    cell::{Cell, IndexInteriorCell, IndexLeafCell, TableInteriorCell, TableLeafCell},
    page::{CellEntry, CellExtent, PageHeader, PageInfo},
    page_type::PageType,
    payload::LocalPayload,
};

/// Builders for page images used across the test suites.
#[cfg(test)]
pub(crate) mod fixture {
    use super::PageType;
    use crate::{
        record::{self, Value},
        varint::VarInt,
    };

    pub(crate) fn table_leaf_cell(row_id: i64, values: &[Value]) -> Vec<u8> {
        let payload = record::encode(values);
        let mut cell = VarInt::new(payload.len() as u64).encode();
        cell.extend(VarInt::new(row_id as u64).encode());
        cell.extend(payload);
        cell
    }

    pub(crate) fn table_interior_cell(left_child: u32, row_id: i64) -> Vec<u8> {
        let mut cell = left_child.to_be_bytes().to_vec();
        cell.extend(VarInt::new(row_id as u64).encode());
        cell
    }

    /// Lay out a page of `size` bytes with the b-tree header at `header_offset`. Cells are packed
    /// against the end of the page in slot order, as SQLite does on a fresh page.
    pub(crate) fn build_page(
        size: usize,
        header_offset: usize,
        page_type: PageType,
        right_most_pointer: Option<u32>,
        cells: &[Vec<u8>],
    ) -> Vec<u8> {
        let mut page = vec![0; size];

        let mut content_start = size;
        let mut pointers = Vec::with_capacity(cells.len());
        for cell in cells {
            content_start -= cell.len();
            page[content_start..content_start + cell.len()].copy_from_slice(cell);
            pointers.push(content_start as u16);
        }

        page[header_offset] = page_type as u8;
        page[header_offset + 3..header_offset + 5]
            .copy_from_slice(&(cells.len() as u16).to_be_bytes());
        page[header_offset + 5..header_offset + 7]
            .copy_from_slice(&(content_start as u16).to_be_bytes());

        let mut cursor = header_offset + 8;
        if let Some(right_most_pointer) = right_most_pointer {
            page[cursor..cursor + 4].copy_from_slice(&right_most_pointer.to_be_bytes());
            cursor += 4;
        }

        for pointer in pointers {
            page[cursor..cursor + 2].copy_from_slice(&pointer.to_be_bytes());
            cursor += 2;
        }

        page
    }

    /// Concatenate `pages` into a database image, writing the file header over the start of the
    /// first page.
    pub(crate) fn database(pages: &[Vec<u8>]) -> Vec<u8> {
        let page_size = pages[0].len();
        let mut bytes = pages.concat();

        let header = crate::header::test::header_bytes(page_size as u16, pages.len() as u32);
        bytes[..header.len()].copy_from_slice(&header);

        bytes
    }
}
