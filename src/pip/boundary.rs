//! Boundary dataset loading.
//!
//! Two formats are accepted:
//! - a GeoJSON `FeatureCollection` of Polygon/MultiPolygon features, optionally
//!   declaring a `crs`
//! - a JSON array of records, each with a `border` list of `[lon, lat]` points
//!   and arbitrary other fields used as properties
//!
//! Every geometry is normalized to geographic lon/lat degrees. Records whose
//! geometry is missing or degenerate are dropped and counted.

use std::fs;
use std::path::Path;

use geo::Area;
use geo_types::{Coord, LineString, MultiPolygon, Polygon};
use geojson::{Feature, Value as GeoJsonValue};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::crs::Crs;
use crate::error::LoadError;
use crate::models::{PropertyBag, Region};

/// Field holding the point list in border-array records.
const BORDER_FIELD: &str = "border";

/// Outcome of one format attempt.
#[derive(Debug)]
pub enum Stage<T> {
    Parsed(T),
    /// Not this format; the next one may apply.
    FormatMismatch(String),
    /// This format, but the content is unusable.
    Malformed(LoadError),
}

/// Which on-disk format a dataset was read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DatasetFormat {
    FeatureCollection,
    BorderArray,
}

/// Summary of a successful load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoadReport {
    pub format: DatasetFormat,
    pub loaded: usize,
    pub dropped: usize,
}

/// Immutable collection of regions, normalized to lon/lat degrees.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    regions: Vec<Region>,
    report: Option<LoadReport>,
}

impl RegionStore {
    /// Load a boundary dataset from disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        info!("Loading boundaries from {}", path.display());

        let bytes = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_slice(&bytes)
    }

    /// Parse a boundary dataset held in memory.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LoadError> {
        let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
        let leading_array = bytes
            .iter()
            .find(|b| !b.is_ascii_whitespace())
            .is_some_and(|&b| b == b'[');

        let value: Value = serde_json::from_slice(bytes).map_err(|e| LoadError::Format {
            reason: format!("not valid JSON: {}", e),
        })?;

        let standard = if leading_array {
            Stage::FormatMismatch("dataset is a JSON array".to_string())
        } else {
            read_feature_collection(&value)
        };

        let standard_reason = match standard {
            Stage::Parsed(store) => return Ok(store),
            Stage::FormatMismatch(reason) => {
                debug!("Not a feature collection: {}", reason);
                reason
            }
            Stage::Malformed(err) => {
                warn!("Feature collection unusable, trying border records: {}", err);
                match read_border_array(&value) {
                    Stage::Parsed(store) => return Ok(store),
                    _ => return Err(err),
                }
            }
        };

        match read_border_array(&value) {
            Stage::Parsed(store) => Ok(store),
            Stage::Malformed(err) => Err(err),
            Stage::FormatMismatch(reason) => Err(LoadError::Format {
                reason: format!("{}; {}", standard_reason, reason),
            }),
        }
    }

    fn from_parts(format: DatasetFormat, converted: Vec<Option<Region>>) -> Self {
        let total = converted.len();
        let regions: Vec<Region> = converted.into_iter().flatten().collect();
        let report = LoadReport {
            format,
            loaded: regions.len(),
            dropped: total - regions.len(),
        };

        info!(
            "Loaded {} regions as {:?} ({} dropped)",
            report.loaded, report.format, report.dropped
        );
        if report.loaded == 0 {
            warn!("Boundary dataset contains no usable regions");
        }

        Self {
            regions,
            report: Some(report),
        }
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn into_regions(self) -> Vec<Region> {
        self.regions
    }

    pub fn report(&self) -> Option<LoadReport> {
        self.report
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }
}

/// Standard format: GeoJSON feature collection.
pub fn read_feature_collection(value: &Value) -> Stage<RegionStore> {
    let Some(object) = value.as_object() else {
        return Stage::FormatMismatch("dataset is not a JSON object".to_string());
    };
    if object.get("type").and_then(Value::as_str) != Some("FeatureCollection") {
        return Stage::FormatMismatch("object is not a FeatureCollection".to_string());
    }
    let Some(features) = object.get("features").and_then(Value::as_array) else {
        return Stage::Malformed(LoadError::Format {
            reason: "FeatureCollection has no features array".to_string(),
        });
    };

    let crs = match Crs::from_member(object.get("crs")) {
        Ok(crs) => crs,
        Err(err) => return Stage::Malformed(err),
    };
    if !crs.is_geographic() {
        info!("Reprojecting boundaries from {:?} to lon/lat degrees", crs);
    }

    let converted: Vec<Option<Region>> = features
        .par_iter()
        .map(|feature| read_feature(feature, crs))
        .collect();

    Stage::Parsed(RegionStore::from_parts(
        DatasetFormat::FeatureCollection,
        converted,
    ))
}

fn read_feature(value: &Value, crs: Crs) -> Option<Region> {
    let feature = match Feature::deserialize(value) {
        Ok(feature) => feature,
        Err(e) => {
            debug!("Skipping invalid feature: {}", e);
            return None;
        }
    };

    let geometry = feature.geometry.as_ref()?;
    let geometry = to_multipolygon(&geometry.value, crs)?;
    let properties = PropertyBag::new(feature.properties.unwrap_or_default());

    Some(Region::new(geometry, properties))
}

fn to_multipolygon(value: &GeoJsonValue, crs: Crs) -> Option<MultiPolygon<f64>> {
    let polygons: Vec<Polygon<f64>> = match value {
        GeoJsonValue::Polygon(rings) => to_polygon(rings, crs).into_iter().collect(),
        GeoJsonValue::MultiPolygon(polygons) => polygons
            .iter()
            .filter_map(|rings| to_polygon(rings, crs))
            .collect(),
        GeoJsonValue::GeometryCollection(geometries) => geometries
            .iter()
            .filter_map(|g| to_multipolygon(&g.value, crs))
            .flat_map(|mp| mp.0)
            .collect(),
        _ => Vec::new(),
    };

    (!polygons.is_empty()).then(|| MultiPolygon::new(polygons))
}

fn to_polygon(rings: &[Vec<Vec<f64>>], crs: Crs) -> Option<Polygon<f64>> {
    let mut rings = rings.iter().map(|ring| {
        let points = ring
            .iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Some((*x, *y)),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;
        to_ring(points, crs)
    });

    let exterior = rings.next()??;
    let interiors: Vec<LineString<f64>> = rings.flatten().collect();
    let polygon = Polygon::new(exterior, interiors);

    (polygon.unsigned_area() > 0.0).then_some(polygon)
}

/// Build a closed ring, or `None` if it has fewer than 3 distinct positions.
fn to_ring(points: Vec<(f64, f64)>, crs: Crs) -> Option<LineString<f64>> {
    let mut coords: Vec<Coord<f64>> = Vec::with_capacity(points.len() + 1);
    for (x, y) in points {
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        let (lon, lat) = crs.to_geographic(x, y);
        coords.push(Coord { x: lon, y: lat });
    }

    coords.dedup();
    if coords.len() > 1 && coords.first() == coords.last() {
        coords.pop();
    }
    if coords.len() < 3 {
        return None;
    }

    // Close the ring
    coords.push(coords[0]);
    Some(LineString::new(coords))
}

/// Custom format: array of records with a `border` point list.
pub fn read_border_array(value: &Value) -> Stage<RegionStore> {
    let Some(records) = value.as_array() else {
        return Stage::FormatMismatch("dataset is not a JSON array of border records".to_string());
    };
    let has_border = |record: &Value| record.get(BORDER_FIELD).is_some_and(Value::is_array);
    if !records.iter().any(has_border) {
        return Stage::FormatMismatch("array holds no record with a border list".to_string());
    }

    let converted: Vec<Option<Region>> = records.par_iter().map(read_border_record).collect();

    Stage::Parsed(RegionStore::from_parts(DatasetFormat::BorderArray, converted))
}

fn read_border_record(value: &Value) -> Option<Region> {
    let record = value.as_object()?;
    let border = record.get(BORDER_FIELD)?.as_array()?;

    let points = border
        .iter()
        .map(|point| match point.as_array()?.as_slice() {
            [lon, lat, ..] => Some((lon.as_f64()?, lat.as_f64()?)),
            _ => None,
        })
        .collect::<Option<Vec<_>>>()?;

    // Border records are always lon/lat degrees
    let exterior = to_ring(points, Crs::Geographic)?;
    let polygon = Polygon::new(exterior, vec![]);
    if polygon.unsigned_area() <= 0.0 {
        return None;
    }

    let properties = record
        .iter()
        .filter(|(key, _)| key.as_str() != BORDER_FIELD)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Some(Region::new(
        MultiPolygon::new(vec![polygon]),
        PropertyBag::new(properties),
    ))
}
