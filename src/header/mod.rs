//! The 100 byte database header at the start of the first page.
//!
//! See [SQLite Documentation](https://www.sqlite.org/fileformat2.html#the_database_header).

mod page_size;

use std::{
    fmt::{self, Display, Formatter},
    mem::offset_of,
};

use num_enum::FromPrimitive;
use static_assertions::const_assert_eq;
use zerocopy::{FromBytes, Immutable, KnownLayout, big_endian::*};

pub use self::page_size::{PageSize, PageSizeError};
use crate::error::{DecodeError, slice};

/// Size of the database header in bytes.
pub const HEADER_SIZE: usize = 100;

/// String expected to be present at the beginning of the header.
pub const HEADER_STRING: [u8; 16] = *b"SQLite format 3\0";

/// Header exactly as it is laid out on disk. No field has been validated.
#[derive(Clone, Debug, FromBytes, KnownLayout, Immutable)]
#[repr(C)]
struct RawFileHeader {
    header_string: [u8; HEADER_STRING.len()],
    page_size: U16,
    write_version: u8,
    read_version: u8,
    reserved_space: u8,
    max_payload_fraction: u8,
    min_payload_fraction: u8,
    leaf_payload_fraction: u8,
    file_change_counter: U32,
    page_count: U32,
    freelist_trunk_page: U32,
    freelist_page_count: U32,
    schema_cookie: U32,
    schema_format: U32,
    default_page_cache_size: U32,
    largest_root_btree_page: U32,
    text_encoding: U32,
    user_version: U32,
    incremental_vacuum: U32,
    application_id: U32,
    reserved: [u8; 20],
    version_valid_for: U32,
    sqlite_version: U32,
}
const_assert_eq!(size_of::<RawFileHeader>(), HEADER_SIZE);
const_assert_eq!(offset_of!(RawFileHeader, page_size), 16);
const_assert_eq!(offset_of!(RawFileHeader, reserved_space), 20);
const_assert_eq!(offset_of!(RawFileHeader, file_change_counter), 24);
const_assert_eq!(offset_of!(RawFileHeader, page_count), 28);
const_assert_eq!(offset_of!(RawFileHeader, schema_cookie), 40);
const_assert_eq!(offset_of!(RawFileHeader, text_encoding), 56);
const_assert_eq!(offset_of!(RawFileHeader, user_version), 60);
const_assert_eq!(offset_of!(RawFileHeader, application_id), 68);
const_assert_eq!(offset_of!(RawFileHeader, sqlite_version), 96);

/// Decoded and validated database header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileHeader {
    /// Size of each page.
    pub page_size: PageSize,
    pub write_version: FileFormatVersion,
    pub read_version: FileFormatVersion,
    /// Bytes of unused space at the end of each page.
    pub reserved_space: u8,
    /// Maximum embedded payload fraction. Should be 64.
    pub max_payload_fraction: u8,
    /// Minimum embedded payload fraction. Should be 32.
    pub min_payload_fraction: u8,
    /// Leaf payload fraction. Should be 32.
    pub leaf_payload_fraction: u8,
    pub file_change_counter: u32,
    /// Size of the database in pages, as recorded by the last writer.
    pub page_count: u32,
    pub freelist_trunk_page: u32,
    pub freelist_page_count: u32,
    pub schema_cookie: u32,
    pub schema_format: SchemaFormat,
    pub default_page_cache_size: u32,
    /// Largest root b-tree page in (incremental) auto-vacuum mode, otherwise 0.
    pub largest_root_btree_page: u32,
    pub text_encoding: TextEncoding,
    /// Value of `PRAGMA user_version`.
    pub user_version: u32,
    pub incremental_vacuum: bool,
    /// Value of `PRAGMA application_id`.
    pub application_id: u32,
    pub version_valid_for: u32,
    pub sqlite_version: SqliteVersion,
}

impl FileHeader {
    /// Decode the header from the start of `buf`, which must hold at least [`HEADER_SIZE`] bytes.
    /// The header string is checked before anything else is read.
    pub fn decode(buf: &[u8]) -> Result<Self, DecodeError> {
        let magic = slice(buf, 0, HEADER_STRING.len())?;
        if magic != HEADER_STRING {
            let mut found = [0; 16];
            found.copy_from_slice(magic);
            return Err(DecodeError::InvalidMagic(found));
        }

        let (raw, _) =
            RawFileHeader::read_from_prefix(buf).map_err(|_| DecodeError::OutOfBounds {
                offset: 0,
                len: HEADER_SIZE,
                available: buf.len(),
            })?;

        Ok(Self {
            page_size: PageSize::try_from(raw.page_size.get())?,
            write_version: FileFormatVersion::from_primitive(raw.write_version),
            read_version: FileFormatVersion::from_primitive(raw.read_version),
            reserved_space: raw.reserved_space,
            max_payload_fraction: raw.max_payload_fraction,
            min_payload_fraction: raw.min_payload_fraction,
            leaf_payload_fraction: raw.leaf_payload_fraction,
            file_change_counter: raw.file_change_counter.get(),
            page_count: raw.page_count.get(),
            freelist_trunk_page: raw.freelist_trunk_page.get(),
            freelist_page_count: raw.freelist_page_count.get(),
            schema_cookie: raw.schema_cookie.get(),
            schema_format: SchemaFormat::from_primitive(raw.schema_format.get()),
            default_page_cache_size: raw.default_page_cache_size.get(),
            largest_root_btree_page: raw.largest_root_btree_page.get(),
            text_encoding: TextEncoding::from_primitive(raw.text_encoding.get()),
            user_version: raw.user_version.get(),
            incremental_vacuum: raw.incremental_vacuum.get() != 0,
            application_id: raw.application_id.get(),
            version_valid_for: raw.version_valid_for.get(),
            sqlite_version: SqliteVersion(raw.sqlite_version.get()),
        })
    }

    /// Bytes of each page available to b-tree content.
    pub fn usable_size(&self) -> u32 {
        *self.page_size - self.reserved_space as u32
    }
}

/// File format read or write version.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum FileFormatVersion {
    Legacy = 1,
    Wal = 2,
    #[num_enum(catch_all)]
    Unknown(u8),
}

impl Display for FileFormatVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legacy => write!(f, "1 (legacy)"),
            Self::Wal => write!(f, "2 (WAL)"),
            Self::Unknown(n) => write!(f, "{n} (unknown)"),
        }
    }
}

/// High level schema format number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum SchemaFormat {
    V1 = 1,
    V2 = 2,
    V3 = 3,
    V4 = 4,
    #[num_enum(catch_all)]
    Unknown(u32),
}

impl Display for SchemaFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::V1 => write!(f, "1"),
            Self::V2 => write!(f, "2"),
            Self::V3 => write!(f, "3"),
            Self::V4 => write!(f, "4"),
            Self::Unknown(n) => write!(f, "{n} (unknown)"),
        }
    }
}

/// Encoding of all text stored in the database.
#[derive(Clone, Copy, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u32)]
pub enum TextEncoding {
    Utf8 = 1,
    Utf16Le = 2,
    Utf16Be = 3,
    #[num_enum(catch_all)]
    Unknown(u32),
}

impl Display for TextEncoding {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Utf8 => write!(f, "UTF-8"),
            Self::Utf16Le => write!(f, "UTF-16le"),
            Self::Utf16Be => write!(f, "UTF-16be"),
            Self::Unknown(n) => write!(f, "unknown ({n})"),
        }
    }
}

/// `SQLITE_VERSION_NUMBER` of the library that last wrote the file, encoded as
/// `major * 1_000_000 + minor * 1_000 + patch`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SqliteVersion(pub u32);

impl SqliteVersion {
    pub fn major(&self) -> u32 {
        self.0 / 1_000_000
    }

    pub fn minor(&self) -> u32 {
        self.0 % 1_000_000 / 1_000
    }

    pub fn patch(&self) -> u32 {
        self.0 % 1_000
    }
}

impl Display for SqliteVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major(), self.minor(), self.patch())
    }
}

#[cfg(test)]
pub(crate) mod test {
    use super::*;

    use rstest::*;

    /// Header bytes resembling those written by SQLite 3.45.1.
    pub(crate) fn header_bytes(page_size: u16, page_count: u32) -> Vec<u8> {
        let mut buf = vec![0; HEADER_SIZE];
        buf[..16].copy_from_slice(&HEADER_STRING);
        buf[16..18].copy_from_slice(&page_size.to_be_bytes());
        buf[18] = 1;
        buf[19] = 1;
        buf[21] = 64;
        buf[22] = 32;
        buf[23] = 32;
        buf[24..28].copy_from_slice(&3u32.to_be_bytes());
        buf[28..32].copy_from_slice(&page_count.to_be_bytes());
        buf[40..44].copy_from_slice(&1u32.to_be_bytes());
        buf[44..48].copy_from_slice(&4u32.to_be_bytes());
        buf[56..60].copy_from_slice(&1u32.to_be_bytes());
        buf[92..96].copy_from_slice(&3u32.to_be_bytes());
        buf[96..100].copy_from_slice(&3_045_001u32.to_be_bytes());
        buf
    }

    #[test]
    fn decode_fields() {
        let mut buf = header_bytes(4096, 2);
        buf[20] = 8;
        buf[60..64].copy_from_slice(&7u32.to_be_bytes());
        buf[68..72].copy_from_slice(&0x0f0f_0f0fu32.to_be_bytes());

        let header = FileHeader::decode(&buf).unwrap();

        assert_eq!(*header.page_size, 4096);
        assert_eq!(header.write_version, FileFormatVersion::Legacy);
        assert_eq!(header.read_version, FileFormatVersion::Legacy);
        assert_eq!(header.reserved_space, 8);
        assert_eq!(header.file_change_counter, 3);
        assert_eq!(header.page_count, 2);
        assert_eq!(header.schema_cookie, 1);
        assert_eq!(header.schema_format, SchemaFormat::V4);
        assert_eq!(header.text_encoding, TextEncoding::Utf8);
        assert_eq!(header.user_version, 7);
        assert_eq!(header.application_id, 0x0f0f_0f0f);
        assert_eq!(header.sqlite_version.to_string(), "3.45.1");
        assert_eq!(header.usable_size(), 4088);
    }

    #[rstest]
    #[case::one(1, 65536)]
    #[case::common(4096, 4096)]
    fn page_size(#[case] stored: u16, #[case] expected: u32) {
        let header = FileHeader::decode(&header_bytes(stored, 1)).unwrap();
        assert_eq!(*header.page_size, expected);
    }

    #[test]
    fn longer_buffer() {
        let mut buf = header_bytes(512, 1);
        buf.resize(512, 0xaa);

        assert!(FileHeader::decode(&buf).is_ok());
    }

    #[test]
    fn invalid_magic() {
        // Every other field is garbage, which must not be looked at.
        let mut buf = vec![0xff; HEADER_SIZE];
        buf[..16].copy_from_slice(b"SQLite format 2\0");

        assert_eq!(
            FileHeader::decode(&buf),
            Err(DecodeError::InvalidMagic(*b"SQLite format 2\0"))
        );
    }

    #[test]
    fn invalid_page_size() {
        assert_eq!(
            FileHeader::decode(&header_bytes(1000, 1)),
            Err(DecodeError::InvalidPageSize(PageSizeError::NotPowerOfTwo(
                1000
            )))
        );
    }

    #[rstest]
    #[case::magic_only(16)]
    #[case::nearly(99)]
    fn short_buffer(#[case] len: usize) {
        let buf = &header_bytes(4096, 1)[..len];
        assert!(matches!(
            FileHeader::decode(buf),
            Err(DecodeError::OutOfBounds { .. })
        ));
    }

    #[rstest]
    #[case(1, TextEncoding::Utf8, "UTF-8")]
    #[case(2, TextEncoding::Utf16Le, "UTF-16le")]
    #[case(3, TextEncoding::Utf16Be, "UTF-16be")]
    #[case(9, TextEncoding::Unknown(9), "unknown (9)")]
    fn text_encoding(#[case] raw: u32, #[case] expected: TextEncoding, #[case] name: &str) {
        let encoding = TextEncoding::from_primitive(raw);
        assert_eq!(encoding, expected);
        assert_eq!(encoding.to_string(), name);
    }

    #[rstest]
    #[case(1, FileFormatVersion::Legacy, "1 (legacy)")]
    #[case(2, FileFormatVersion::Wal, "2 (WAL)")]
    #[case(0, FileFormatVersion::Unknown(0), "0 (unknown)")]
    fn file_format_version(
        #[case] raw: u8,
        #[case] expected: FileFormatVersion,
        #[case] name: &str,
    ) {
        let version = FileFormatVersion::from_primitive(raw);
        assert_eq!(version, expected);
        assert_eq!(version.to_string(), name);
    }

    #[rstest]
    #[case(1, SchemaFormat::V1)]
    #[case(4, SchemaFormat::V4)]
    #[case(7, SchemaFormat::Unknown(7))]
    fn schema_format(#[case] raw: u32, #[case] expected: SchemaFormat) {
        assert_eq!(SchemaFormat::from_primitive(raw), expected);
    }

    #[test]
    fn wal_versions_decoded() {
        let mut buf = header_bytes(4096, 1);
        buf[18] = 2;
        buf[19] = 2;

        let header = FileHeader::decode(&buf).unwrap();
        assert_eq!(header.write_version, FileFormatVersion::Wal);
        assert_eq!(header.read_version, FileFormatVersion::Wal);
    }
}
