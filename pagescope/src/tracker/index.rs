//! Interval index over live regions
//!
//! Live page ranges never overlap, so the only candidate that can contain an
//! address (or intersect a new range) is the live region with the greatest
//! start below it. Both lookups are therefore a single `BTreeMap` probe
//! instead of a scan over every region ever created.

use std::collections::{BTreeMap, HashMap};

use crate::domain::AddressRange;

#[derive(Debug, Default, Clone)]
pub(crate) struct LiveIndex {
    /// page start -> (page end, arena index)
    by_page: BTreeMap<u64, (u64, usize)>,
    /// requested start -> arena index
    by_request: HashMap<u64, usize>,
}

impl LiveIndex {
    pub(crate) fn insert(&mut self, index: usize, requested: AddressRange, pages: AddressRange) {
        self.by_page.insert(pages.start, (pages.end, index));
        self.by_request.insert(requested.start, index);
    }

    /// Drop the live region whose requested start is `address`
    ///
    /// Returns its arena index, or `None` if no live region matches.
    pub(crate) fn remove_by_request(
        &mut self,
        address: u64,
        pages_of: impl Fn(usize) -> AddressRange,
    ) -> Option<usize> {
        let index = self.by_request.remove(&address)?;
        self.by_page.remove(&pages_of(index).start);
        Some(index)
    }

    /// Arena index of the live region containing `address`
    pub(crate) fn containing(&self, address: u64) -> Option<usize> {
        let (&start, &(end, index)) = self.by_page.range(..=address).next_back()?;
        AddressRange::new(start, end).contains(address).then_some(index)
    }

    /// Arena index and page range of a live region intersecting `pages`
    pub(crate) fn overlapping(&self, pages: AddressRange) -> Option<(usize, AddressRange)> {
        let (&start, &(end, index)) = self.by_page.range(..pages.end).next_back()?;
        let existing = AddressRange::new(start, end);
        existing.overlaps(&pages).then_some((index, existing))
    }

    pub(crate) fn len(&self) -> usize {
        self.by_page.len()
    }
}
