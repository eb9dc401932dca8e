//! Boundary regions and their raw property bags.

use geo::BoundingRect;
use geo_types::MultiPolygon;
use serde_json::{Map, Value};

use super::{AdminCode, AdminLevel};

/// Property keys carrying an administrative code, in lookup order.
///
/// Covers the differing schemas of the village boundary datasets.
pub const CODE_KEYS: &[&str] = &[
    "code",
    "kode",
    "id_desa",
    "ID",
    "KODE_WILAYAH",
    "kode_desa",
    "ID_DESA",
];

/// Property keys carrying a single level's code, in lookup order.
pub fn level_code_keys(level: AdminLevel) -> &'static [&'static str] {
    match level {
        AdminLevel::Province => &["kode_prov", "ID_PROV", "id_prov"],
        AdminLevel::District => &["kode_kab", "ID_KAB", "id_kab"],
        AdminLevel::SubDistrict => &["kode_kec", "ID_KEC", "id_kec"],
        AdminLevel::Village => &["kode_desa", "ID_DESA", "id_desa"],
    }
}

/// Property keys carrying a level's name, in lookup order.
pub fn name_keys(level: AdminLevel) -> &'static [&'static str] {
    match level {
        AdminLevel::Province => &["provinsi", "PROVINSI", "nm_prov", "province"],
        AdminLevel::District => &["kabupaten", "KABUPATEN", "nm_kab", "district"],
        AdminLevel::SubDistrict => &["kecamatan", "KECAMATAN", "nm_kec", "sub_district"],
        AdminLevel::Village => &["desa", "kelurahan", "DESA", "nm_desa", "village"],
    }
}

/// Raw properties of a boundary record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyBag(Map<String, Value>);

impl PropertyBag {
    pub fn new(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Text value of a property.
    ///
    /// Strings are trimmed and numbers rendered as decimal text; anything
    /// else, and blank strings, count as absent.
    pub fn text(&self, key: &str) -> Option<String> {
        match self.0.get(key)? {
            Value::String(s) => {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// First present, non-empty value among `keys`.
    pub fn first_of(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.text(key))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for PropertyBag {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// A single boundary polygon with its raw properties.
///
/// A region's identity is its position in the loaded collection.
#[derive(Debug, Clone)]
pub struct Region {
    pub geometry: MultiPolygon<f64>,
    pub properties: PropertyBag,
}

impl Region {
    pub fn new(geometry: MultiPolygon<f64>, properties: PropertyBag) -> Self {
        Self {
            geometry,
            properties,
        }
    }

    /// Get the bounding box of this region
    pub fn bbox(&self) -> Option<(f64, f64, f64, f64)> {
        self.geometry
            .bounding_rect()
            .map(|rect| (rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    /// Raw (un-normalized) name for a level.
    pub fn raw_name(&self, level: AdminLevel) -> Option<String> {
        self.properties.first_of(name_keys(level))
    }

    /// Code recorded on the region for a single level.
    ///
    /// Values that parse as a code of exactly that level are returned in
    /// dotted form; anything else is passed through as raw text.
    pub fn level_code(&self, level: AdminLevel) -> Option<String> {
        let raw = self.properties.first_of(level_code_keys(level))?;
        match AdminCode::parse(&raw) {
            Some(code) if code.level() == Some(level) => Some(code.as_str().to_string()),
            _ => Some(raw),
        }
    }

    /// First code property, in alias order, that parses as a usable code.
    pub fn code(&self) -> Option<AdminCode> {
        CODE_KEYS
            .iter()
            .filter_map(|key| self.properties.text(key))
            .find_map(|raw| AdminCode::parse(&raw))
    }
}
