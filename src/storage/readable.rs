use std::{
    collections::{BTreeMap, btree_map::Entry},
    io::{Read, Seek, SeekFrom},
};

use super::{PageStorage, StorageError};

/// Helper trait for anything that implements [`Read`], and [`Seek`].
pub trait Readable: Read + Seek {}
impl<T> Readable for T where T: Read + Seek {}

/// Page storage for anything that implements [`Readable`], such as a [`std::fs::File`].
pub struct ReadableStorage {
    buf: Box<dyn Readable>,

    page_size: Option<usize>,

    /// Pages read so far, keyed by index.
    pages: BTreeMap<u32, Vec<u8>>,
}

impl ReadableStorage {
    pub fn new(buf: impl 'static + Readable) -> Self {
        Self {
            buf: Box::new(buf),
            page_size: None,
            pages: BTreeMap::new(),
        }
    }
}

impl PageStorage for ReadableStorage {
    fn read_start(&mut self, n: usize) -> Result<Vec<u8>, StorageError> {
        self.buf.rewind()?;

        let mut buf = vec![0; n];
        self.buf.read_exact(&mut buf)?;

        Ok(buf)
    }

    fn set_page_size(&mut self, page_size: usize) {
        if self.page_size != Some(page_size) {
            self.pages.clear();
        }

        self.page_size = Some(page_size);
    }

    fn size(&mut self) -> Result<u64, StorageError> {
        Ok(self.buf.seek(SeekFrom::End(0))?)
    }

    fn read_page(&mut self, page_index: u32) -> Result<&[u8], StorageError> {
        let page_size = self.page_size.ok_or(StorageError::PageSizeNotConfigured)?;

        if let Entry::Vacant(entry) = self.pages.entry(page_index) {
            let page_count = self.buf.seek(SeekFrom::End(0))? / page_size as u64;
            if page_index as u64 >= page_count {
                return Err(StorageError::PageOutOfRange {
                    page_index,
                    page_count,
                });
            }

            self.buf
                .seek(SeekFrom::Start(page_index as u64 * page_size as u64))?;

            let mut buf = vec![0; page_size];
            self.buf.read_exact(&mut buf)?;

            entry.insert(buf);
        }

        self.pages
            .get(&page_index)
            .map(Vec::as_slice)
            .ok_or(StorageError::PageOutOfRange {
                page_index,
                page_count: self.pages.len() as u64,
            })
    }
}
