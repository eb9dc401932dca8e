//! Immutable code → canonical name table.

use std::fs;
use std::path::Path;

use hashbrown::HashMap;
use rayon::prelude::*;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::error::CodeTableError;
use crate::models::{AdminCode, AdminLevel};
use crate::names::normalize;

/// One code table row.
#[derive(Debug, Clone)]
pub struct CodeEntry {
    pub code: AdminCode,
    pub name: String,
    /// `normalize(name)`, computed once at load
    pub normalized: String,
}

/// Code table keyed by administrative code.
///
/// Entries iterate in ascending code order.
#[derive(Debug, Clone, Default)]
pub struct CodeTable {
    entries: Vec<CodeEntry>,
    by_code: HashMap<String, usize>,
}

impl CodeTable {
    /// A table that misses on every lookup.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Load a JSON object mapping code strings to names.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CodeTableError> {
        let path = path.as_ref();
        info!("Loading code table from {}", path.display());

        let content = fs::read_to_string(path).map_err(|source| CodeTableError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, CodeTableError> {
        let map: Map<String, Value> = serde_json::from_str(content)?;

        let mut skipped = 0usize;
        let pairs: Vec<(String, String)> = map
            .into_iter()
            .filter_map(|(code, name)| match name {
                Value::String(name) => Some((code, name)),
                _ => {
                    skipped += 1;
                    None
                }
            })
            .collect();

        if skipped > 0 {
            warn!("Skipped {} code table entries with non-string names", skipped);
        }

        Ok(Self::from_pairs(pairs))
    }

    /// Build a table from (code, name) pairs.
    ///
    /// Codes are canonicalized; unusable codes are dropped and the first
    /// occurrence of a duplicate code wins.
    pub fn from_pairs<I, C, N>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, N)>,
        C: AsRef<str>,
        N: Into<String>,
    {
        let mut rejected = 0usize;
        let mut raw: Vec<(AdminCode, String)> = Vec::new();
        for (code, name) in pairs {
            match AdminCode::parse(code.as_ref()) {
                Some(code) => raw.push((code, name.into())),
                None => rejected += 1,
            }
        }

        // Stable sort keeps the first of any duplicates in front
        raw.sort_by(|a, b| a.0.cmp(&b.0));
        raw.dedup_by(|later, earlier| later.0 == earlier.0);

        let entries: Vec<CodeEntry> = raw
            .into_par_iter()
            .map(|(code, name)| {
                let normalized = normalize(&name);
                CodeEntry {
                    code,
                    name,
                    normalized,
                }
            })
            .collect();

        let by_code = entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.code.as_str().to_string(), i))
            .collect();

        let table = Self { entries, by_code };

        if rejected > 0 {
            warn!("Rejected {} malformed codes", rejected);
        }
        info!("Code table loaded with {} entries", table.len());
        for level in AdminLevel::all() {
            info!("  {:?}: {} codes", level, table.at_level(*level).count());
        }

        table
    }

    /// Canonical name registered for `code`.
    pub fn name(&self, code: &str) -> Option<&str> {
        self.entry(code).map(|e| e.name.as_str())
    }

    pub fn entry(&self, code: &str) -> Option<&CodeEntry> {
        self.by_code.get(code).and_then(|&i| self.entries.get(i))
    }

    /// All entries in ascending code order.
    pub fn entries(&self) -> &[CodeEntry] {
        &self.entries
    }

    /// Entries whose code length denotes `level`, in table order.
    pub fn at_level(&self, level: AdminLevel) -> impl Iterator<Item = &CodeEntry> + '_ {
        self.entries
            .iter()
            .filter(move |e| e.code.level() == Some(level))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
