//! Ordered, keyed storage for one category of sites.
//!
//! A collection is replaced wholesale on every refresh; the backend's
//! response order is the canonical order.  Recency sorting is a view
//! computed at read time, so toggling it never touches the stored sequence.

use std::sync::{Arc, Mutex};

use crate::site::SiteRecord;

/// A collection shared between the sync coordinator (sole writer) and the
/// render loop (reader).
pub type SharedCollection<T> = Arc<Mutex<SiteCollection<T>>>;

/// The ordered site set for one category.
#[derive(Debug)]
pub struct SiteCollection<T> {
    items: Vec<T>,
    sort_by_recency: bool,
}

impl<T: SiteRecord> SiteCollection<T> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            sort_by_recency: false,
        }
    }

    /// A fresh collection wrapped for cross-thread sharing.
    pub fn shared() -> SharedCollection<T> {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Swap in the full set returned by the backend.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Flip the recency-sort display toggle, returning the new setting.
    pub fn toggle_sort_order(&mut self) -> bool {
        self.sort_by_recency = !self.sort_by_recency;
        self.sort_by_recency
    }

    pub fn sorted_by_recency(&self) -> bool {
        self.sort_by_recency
    }

    /// Items in display order.
    ///
    /// With `sort_by_recency` the most recently updated sites come first and
    /// records without a usable timestamp sink to the end.  The sort is
    /// stable, so equal timestamps keep their backend order.  Without it the
    /// backend order is returned untouched.
    pub fn read(&self, sort_by_recency: bool) -> Vec<T> {
        let mut items = self.items.clone();
        if sort_by_recency {
            items.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        }
        items
    }

    /// Items in the currently toggled display order.
    pub fn view(&self) -> Vec<T> {
        self.read(self.sort_by_recency)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: SiteRecord> Default for SiteCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
