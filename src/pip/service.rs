//! Decoder: coordinate → administrative hierarchy.

use std::path::Path;

use geo_types::Point;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::boundary::{DatasetFormat, LoadReport, RegionStore};
use super::index::{linear_scan, Predicate, SpatialIndex};
use crate::codes::{CodeResolver, CodeTable};
use crate::error::DecodeError;
use crate::models::{AdminCode, AdminEntry, AdminHierarchy, AdminLevel, Region};
use crate::names::normalize_opt;

/// Loaded regions, their index and the code table. Immutable once built.
struct Dataset {
    regions: Vec<Region>,
    index: SpatialIndex,
    codes: CodeTable,
    report: Option<LoadReport>,
}

enum State {
    Unready { reason: String },
    Ready(Dataset),
}

/// Readiness and dataset sizes, for health reporting.
#[derive(Debug, Clone, Serialize)]
pub struct DecoderStatus {
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub regions: usize,
    pub codes: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<DatasetFormat>,
    pub dropped: usize,
}

/// Resolves coordinates against a boundary dataset and code table.
///
/// A decoder is either ready or unready for its whole lifetime. All state is
/// read-only after construction, so one instance can serve concurrent
/// `decode` calls without locking.
pub struct Decoder {
    state: State,
}

impl Decoder {
    /// Load the boundary dataset and (optionally) the code table.
    ///
    /// A boundary load failure yields an unready decoder. A missing or broken
    /// code table only degrades decoding to raw boundary names.
    pub fn open<P: AsRef<Path>>(boundaries: P, codes: Option<&Path>) -> Self {
        let store = match RegionStore::load(boundaries.as_ref()) {
            Ok(store) => store,
            Err(e) => {
                warn!("Decoder unavailable: {}", e);
                return Self::unready(e.to_string());
            }
        };

        let codes = match codes {
            Some(path) => CodeTable::load(path).unwrap_or_else(|e| {
                warn!("Continuing without code table: {}", e);
                CodeTable::empty()
            }),
            None => {
                warn!("No code table configured; names come from boundary properties only");
                CodeTable::empty()
            }
        };

        Self::new(store, codes)
    }

    /// Build a ready decoder from loaded parts.
    pub fn new(store: RegionStore, codes: CodeTable) -> Self {
        let report = store.report();
        let regions = store.into_regions();
        let index = SpatialIndex::build(&regions);
        Self::with_index(regions, index, codes, report)
    }

    /// Build a ready decoder around an existing index.
    pub fn with_index(
        regions: Vec<Region>,
        index: SpatialIndex,
        codes: CodeTable,
        report: Option<LoadReport>,
    ) -> Self {
        info!(
            "Decoder ready: {} regions, {} codes",
            regions.len(),
            codes.len()
        );
        Self {
            state: State::Ready(Dataset {
                regions,
                index,
                codes,
                report,
            }),
        }
    }

    pub fn unready(reason: impl Into<String>) -> Self {
        Self {
            state: State::Unready {
                reason: reason.into(),
            },
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, State::Ready(_))
    }

    pub fn status(&self) -> DecoderStatus {
        match &self.state {
            State::Unready { reason } => DecoderStatus {
                ready: false,
                reason: Some(reason.clone()),
                regions: 0,
                codes: 0,
                format: None,
                dropped: 0,
            },
            State::Ready(dataset) => DecoderStatus {
                ready: true,
                reason: None,
                regions: dataset.regions.len(),
                codes: dataset.codes.len(),
                format: dataset.report.map(|r| r.format),
                dropped: dataset.report.map_or(0, |r| r.dropped),
            },
        }
    }

    /// Decode a coordinate.
    ///
    /// Returns `Ok(None)` when no region covers the point, and
    /// `Err(DecodeError::Unready)` when no data is loaded.
    pub fn decode(&self, lat: f64, lon: f64) -> Result<Option<AdminHierarchy>, DecodeError> {
        let dataset = self.dataset()?;

        let candidates = dataset.locate(Point::new(lon, lat), Predicate::Intersects);
        debug!(
            "Decode at ({}, {}): {} candidate regions",
            lat,
            lon,
            candidates.len()
        );

        // Overlaps are not ranked; the lowest collection position wins
        let Some(&first) = candidates.first() else {
            return Ok(None);
        };
        let region = dataset
            .regions
            .get(first)
            .ok_or_else(|| DecodeError::Internal {
                reason: format!("candidate region {} does not exist", first),
            })?;

        Ok(Some(dataset.describe(region)))
    }

    /// Region positions matching a coordinate, in ascending order.
    pub fn candidates(
        &self,
        lat: f64,
        lon: f64,
        predicate: Predicate,
    ) -> Result<Vec<usize>, DecodeError> {
        Ok(self.dataset()?.locate(Point::new(lon, lat), predicate))
    }

    fn dataset(&self) -> Result<&Dataset, DecodeError> {
        match &self.state {
            State::Ready(dataset) => Ok(dataset),
            State::Unready { reason } => Err(DecodeError::Unready {
                reason: reason.clone(),
            }),
        }
    }
}

impl Dataset {
    fn locate(&self, point: Point<f64>, predicate: Predicate) -> Vec<usize> {
        let mut candidates = match self.index.query(&self.regions, point, predicate) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!("Spatial index query failed ({}), scanning all regions", e);
                linear_scan(&self.regions, point, predicate)
            }
        };
        candidates.sort_unstable();
        candidates
    }

    fn describe(&self, region: &Region) -> AdminHierarchy {
        let code = region.code().or_else(|| self.resolve_by_name(region));

        let mut hierarchy = AdminHierarchy::default().with_code(code.as_ref());
        for level in AdminLevel::all() {
            let level_code = code
                .as_ref()
                .and_then(|c| c.prefix(*level))
                .map(str::to_string)
                .or_else(|| region.level_code(*level));
            let name = level_code
                .as_deref()
                .filter(|c| AdminLevel::from_code_len(c.len()) == Some(*level))
                .and_then(|c| self.codes.name(c))
                .map(str::to_string)
                .or_else(|| region.raw_name(*level));

            hierarchy.set(*level, AdminEntry::new(name, level_code));
        }

        hierarchy
    }

    fn resolve_by_name(&self, region: &Region) -> Option<AdminCode> {
        let province = normalize_opt(region.raw_name(AdminLevel::Province).as_deref());
        let district = normalize_opt(region.raw_name(AdminLevel::District).as_deref());
        let village = normalize_opt(region.raw_name(AdminLevel::Village).as_deref());

        CodeResolver::new(&self.codes)
            .resolve(&province, &district, &village)
            .cloned()
    }
}
