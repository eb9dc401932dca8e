//! Recover a village code from names when a boundary carries none.
//!
//! Matching is approximate: a candidate only needs substring containment and
//! a consistent parent chain. Among several equally good candidates the first
//! in table order wins; there is no further scoring.

use hashbrown::HashSet;
use tracing::debug;

use super::CodeTable;
use crate::models::{AdminCode, AdminLevel};
use crate::names::mutually_contains;

/// Hierarchical name → code search over a [`CodeTable`].
#[derive(Debug, Clone, Copy)]
pub struct CodeResolver<'a> {
    table: &'a CodeTable,
}

impl<'a> CodeResolver<'a> {
    pub fn new(table: &'a CodeTable) -> Self {
        Self { table }
    }

    /// Find the first village code consistent with the normalized names.
    ///
    /// An empty village name never matches; empty province or district names
    /// place no constraint on their level.
    pub fn resolve(&self, province: &str, district: &str, village: &str) -> Option<&'a AdminCode> {
        if village.is_empty() {
            return None;
        }

        let provinces = self.province_candidates(province);
        if provinces.is_empty() {
            debug!("No province matches {:?}", province);
            return None;
        }

        let found = self
            .table
            .at_level(AdminLevel::Village)
            .filter(|e| e.normalized.contains(village))
            .find(|e| {
                e.code
                    .prefix(AdminLevel::Province)
                    .is_some_and(|p| provinces.contains(p))
                    && self.district_matches(&e.code, district)
            })
            .map(|e| &e.code);

        debug!(
            "Resolved ({:?}, {:?}, {:?}) -> {:?}",
            province, district, village, found
        );
        found
    }

    /// Province codes whose normalized name overlaps `province`.
    pub fn province_candidates(&self, province: &str) -> HashSet<&'a str> {
        self.table
            .at_level(AdminLevel::Province)
            .filter(|e| mutually_contains(&e.normalized, province))
            .map(|e| e.code.as_str())
            .collect()
    }

    fn district_matches(&self, code: &AdminCode, district: &str) -> bool {
        let registered = code
            .prefix(AdminLevel::District)
            .and_then(|d| self.table.entry(d));

        match registered {
            Some(entry) => entry.normalized.contains(district),
            // Incomplete tables: an unregistered district only passes when
            // there is nothing to check it against
            None => district.is_empty(),
        }
    }
}
