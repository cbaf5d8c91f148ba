//! Reading raw pages out of a database file. Everything here is I/O; decoding happens in
//! [`crate::header`] and [`crate::btree`].

mod memory;
mod readable;

use thiserror::Error;
use tracing::debug;

pub use self::{memory::MemoryStorage, readable::ReadableStorage};
use crate::{
    btree::PageInfo,
    error::DecodeError,
    header::{FileHeader, HEADER_SIZE},
};

/// Basic functionality required to read pages from some storage location. The implementor is
/// free to implement any caching as required.
pub trait PageStorage {
    /// Read the start `n` bytes from the storage, and return them. There is no expectation to
    /// cache the returned memory.
    fn read_start(&mut self, n: usize) -> Result<Vec<u8>, StorageError>;

    /// Configure storage to use the provided page size.
    fn set_page_size(&mut self, page_size: usize);

    /// Total number of bytes held by the storage.
    fn size(&mut self) -> Result<u64, StorageError>;

    /// Read the page at the zero based `page_index`.
    fn read_page(&mut self, page_index: u32) -> Result<&[u8], StorageError>;
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage page size has not been configured")]
    PageSizeNotConfigured,

    #[error("page {page_index} is past the end of the storage ({page_count} pages)")]
    PageOutOfRange { page_index: u32, page_count: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum PagerError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to decode database header")]
    Header(#[source] DecodeError),

    #[error("failed to decode page {page_index}")]
    Page {
        page_index: u32,
        #[source]
        source: DecodeError,
    },
}

/// Database file opened for inspection. The header is read and validated up front, and sizes
/// every page read afterwards.
pub struct Pager {
    storage: Box<dyn PageStorage>,
    header: FileHeader,
    file_size: u64,
}

impl Pager {
    pub fn new(mut storage: impl 'static + PageStorage) -> Result<Self, PagerError> {
        let header_bytes = storage.read_start(HEADER_SIZE)?;
        let header = FileHeader::decode(&header_bytes).map_err(PagerError::Header)?;

        storage.set_page_size(usize::from(header.page_size));
        let file_size = storage.size()?;

        debug!(page_size = *header.page_size, file_size, "opened database");

        Ok(Self {
            storage: Box::new(storage),
            header,
            file_size,
        })
    }

    pub fn header(&self) -> &FileHeader {
        &self.header
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// Number of whole pages in the file. The header's own page count is only trustworthy when
    /// the file was last written by a recent library, so the file size is used instead.
    pub fn page_count(&self) -> u32 {
        (self.file_size / *self.header.page_size as u64) as u32
    }

    /// Usable bytes of the page at `page_index`, excluding the reserved space at its end.
    pub fn read_page(&mut self, page_index: u32) -> Result<&[u8], PagerError> {
        let usable_size = self.header.usable_size() as usize;
        let page = self.storage.read_page(page_index)?;

        Ok(&page[..usable_size.min(page.len())])
    }

    /// Read and decode the page at `page_index`.
    pub fn decode_page(&mut self, page_index: u32) -> Result<PageInfo, PagerError> {
        let page = self.read_page(page_index)?;

        PageInfo::decode(page, page_index == 0, page_index)
            .map_err(|source| PagerError::Page { page_index, source })
    }
}
