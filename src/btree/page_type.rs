use derive_more::TryFrom;

/// Flag at the start of every b-tree page header.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, TryFrom)]
#[try_from(repr)]
#[repr(u8)]
pub enum PageType {
    InteriorIndex = 0x02,
    InteriorTable = 0x05,
    LeafIndex = 0x0a,
    LeafTable = 0x0d,
}

impl PageType {
    pub fn is_interior(&self) -> bool {
        matches!(self, Self::InteriorIndex | Self::InteriorTable)
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::LeafIndex | Self::LeafTable)
    }

    pub fn is_table(&self) -> bool {
        matches!(self, Self::InteriorTable | Self::LeafTable)
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Self::InteriorIndex | Self::LeafIndex)
    }

    /// Human readable name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::InteriorIndex => "interior index b-tree page",
            Self::InteriorTable => "interior table b-tree page",
            Self::LeafIndex => "leaf index b-tree page",
            Self::LeafTable => "leaf table b-tree page",
        }
    }
}
