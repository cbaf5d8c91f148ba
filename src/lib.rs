//! Read-only inspection of SQLite database files.
//!
//! The decoders ([`varint`], [`header`], [`record`], [`btree`]) are pure functions over byte
//! buffers. [`storage`] supplies those buffers from a file, and [`schema`] and [`inspect`]
//! assemble the decoded rows into a catalog of tables.

pub mod btree;
pub mod error;
pub mod header;
pub mod inspect;
pub mod record;
pub mod schema;
pub mod storage;
pub mod varint;

pub use self::{
    btree::{Cell, CellEntry, PageHeader, PageInfo, PageType},
    error::DecodeError,
    header::FileHeader,
    record::{Record, SerialType, Value},
    schema::{SchemaCatalog, TableInfo},
    storage::{Pager, PagerError},
    varint::VarInt,
};
