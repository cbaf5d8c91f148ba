//! Whole file passes built on [`Pager`]: page analysis and catalog reconstruction.

use tracing::{info, warn};

use crate::{
    btree::{Cell, PageInfo},
    schema::{Row, RowKind, SchemaCatalog},
    storage::{Pager, PagerError},
};

/// Decode every page of the file. Pages which fail to decode are reported in place.
pub fn analyse_pages(pager: &mut Pager) -> Vec<(u32, Result<PageInfo, PagerError>)> {
    (0..pager.page_count())
        .map(|page_index| (page_index, pager.decode_page(page_index)))
        .collect()
}

/// Build the catalog from the schema table on the first page, then assign the rows of every
/// table leaf page to the table rooted there.
///
/// Only the first page of the schema table is read, and data rows are matched on root page
/// alone. Pages that can't be decoded, such as overflow or freelist pages, are skipped.
pub fn build_catalog(pager: &mut Pager) -> Result<SchemaCatalog, PagerError> {
    let mut catalog = SchemaCatalog::new();

    let schema_page = pager.decode_page(0)?;
    for row in table_rows(schema_page) {
        catalog.add_row(row, RowKind::Schema);
    }

    for page_index in 1..pager.page_count() {
        let page = match pager.decode_page(page_index) {
            Ok(page) => page,
            Err(e) => {
                warn!(page = page_index, error = %e, "skipping page");
                continue;
            }
        };

        if !page.is_table_leaf() {
            continue;
        }

        for row in table_rows(page) {
            catalog.add_row(row, RowKind::Data);
        }
    }

    info!(
        tables = catalog.table_count(),
        unassigned = catalog.unassigned_rows().len(),
        "built catalog"
    );

    Ok(catalog)
}

/// Rows held by a table leaf page. Cells which failed to decode are dropped, having already been
/// reported while decoding the page.
fn table_rows(page: PageInfo) -> impl Iterator<Item = Row> {
    page.cells.into_iter().filter_map(|entry| match entry.cell {
        Ok(Cell::TableLeaf(cell)) => Some(Row {
            page_index: entry.page_index,
            slot: entry.slot,
            row_id: Some(cell.row_id),
            record: cell.record,
        }),
        _ => None,
    })
}
