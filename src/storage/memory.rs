use super::{PageStorage, StorageError};

/// Page storage over a database image already held in memory.
#[derive(Clone, Debug)]
pub struct MemoryStorage {
    bytes: Vec<u8>,
    page_size: Option<usize>,
}

impl MemoryStorage {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            page_size: None,
        }
    }
}

impl PageStorage for MemoryStorage {
    fn read_start(&mut self, n: usize) -> Result<Vec<u8>, StorageError> {
        self.bytes.get(..n).map(<[u8]>::to_vec).ok_or_else(|| {
            StorageError::Io(std::io::Error::from(std::io::ErrorKind::UnexpectedEof))
        })
    }

    fn set_page_size(&mut self, page_size: usize) {
        self.page_size = Some(page_size);
    }

    fn size(&mut self) -> Result<u64, StorageError> {
        Ok(self.bytes.len() as u64)
    }

    fn read_page(&mut self, page_index: u32) -> Result<&[u8], StorageError> {
        let page_size = self.page_size.ok_or(StorageError::PageSizeNotConfigured)?;
        let start = page_index as usize * page_size;

        self.bytes
            .get(start..start + page_size)
            .ok_or(StorageError::PageOutOfRange {
                page_index,
                page_count: (self.bytes.len() / page_size) as u64,
            })
    }
}
