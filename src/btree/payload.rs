use super::PageType;

/// How much of a payload is stored on the b-tree page itself.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LocalPayload {
    /// Bytes of the payload stored on the page.
    pub local: usize,
    /// Whether the remainder continues on an overflow page.
    pub spills: bool,
}

impl LocalPayload {
    /// Apply SQLite's spill rules for a payload of `payload_size` bytes on a page of `page_type`
    /// with `usable_size` usable bytes.
    pub fn compute(page_type: PageType, usable_size: usize, payload_size: u64) -> Self {
        // X: The maximum amount of payload that can be stored directly on the b-tree page without
        // spilling onto an overflow page.
        let max_local = if page_type.is_table() {
            usable_size.saturating_sub(35)
        } else {
            (usable_size.saturating_sub(12) * 64 / 255).saturating_sub(23)
        };

        if payload_size <= max_local as u64 {
            return Self {
                local: payload_size as usize,
                spills: false,
            };
        }

        // M: The minimum amount of payload that must be stored on the b-tree page before spilling
        // is allowed.
        let min_local = (usable_size.saturating_sub(12) * 32 / 255).saturating_sub(23);

        let overflow_capacity = usable_size.saturating_sub(4).max(1) as u64;
        let k = min_local as u64 + (payload_size - min_local as u64) % overflow_capacity;

        Self {
            local: if k <= max_local as u64 {
                k as usize
            } else {
                min_local
            },
            spills: true,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use rstest::*;

    #[rstest]
    #[case::table_fits(PageType::LeafTable, 4096, 4061, 4061, false)]
    #[case::table_spills_m(PageType::LeafTable, 4096, 4062, 489, true)]
    #[case::table_spills_k(PageType::LeafTable, 4096, 8000, 489 + (8000 - 489) % 4092, true)]
    #[case::table_spills_k_max(PageType::LeafTable, 4096, 4092 + 4061, 4061, true)]
    #[case::table_spills_m_wrap(PageType::LeafTable, 4096, 4092 + 4062, 489, true)]
    #[case::index_fits(PageType::LeafIndex, 4096, 1002, 1002, false)]
    #[case::index_spills(PageType::InteriorIndex, 4096, 1003, 489, true)]
    fn compute(
        #[case] page_type: PageType,
        #[case] usable_size: usize,
        #[case] payload_size: u64,
        #[case] local: usize,
        #[case] spills: bool,
    ) {
        assert_eq!(
            LocalPayload::compute(page_type, usable_size, payload_size),
            LocalPayload { local, spills }
        );
    }
}
