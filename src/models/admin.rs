//! Administrative hierarchy types returned by a decode.

use serde::{Deserialize, Serialize};

use super::code::AdminCode;

/// The four levels of the Indonesian administrative hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum AdminLevel {
    /// Provinsi (code length 2, e.g. `61`)
    Province,
    /// Kabupaten / kota (code length 5, e.g. `61.02`)
    District,
    /// Kecamatan (code length 8, e.g. `61.02.13`)
    SubDistrict,
    /// Desa / kelurahan (code length 10 or more, e.g. `61.02.13.2003`)
    Village,
}

impl AdminLevel {
    /// Map an administrative code length to its level.
    pub fn from_code_len(len: usize) -> Option<Self> {
        match len {
            2 => Some(AdminLevel::Province),
            5 => Some(AdminLevel::District),
            8 => Some(AdminLevel::SubDistrict),
            n if n >= 10 => Some(AdminLevel::Village),
            _ => None,
        }
    }

    /// Length of the code prefix identifying this level.
    ///
    /// Villages have no fixed length; the full code is used.
    pub fn prefix_len(&self) -> Option<usize> {
        match self {
            AdminLevel::Province => Some(2),
            AdminLevel::District => Some(5),
            AdminLevel::SubDistrict => Some(8),
            AdminLevel::Village => None,
        }
    }

    /// Get all admin levels in hierarchical order (province first)
    pub fn all() -> &'static [AdminLevel] {
        &[
            AdminLevel::Province,
            AdminLevel::District,
            AdminLevel::SubDistrict,
            AdminLevel::Village,
        ]
    }
}

/// Single admin level entry in the hierarchy.
///
/// Both fields serialize as `null` when absent so the response shape is fixed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminEntry {
    /// Canonical name from the code table, or the raw boundary name
    pub name: Option<String>,

    /// Code prefix for this level
    pub code: Option<String>,
}

impl AdminEntry {
    pub fn new(name: Option<String>, code: Option<String>) -> Self {
        Self { name, code }
    }
}

/// Decoded hierarchy for a single coordinate.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminHierarchy {
    /// Overall resolved code (absent when neither the boundary properties
    /// nor the code table yield one)
    pub code: Option<String>,

    pub province: AdminEntry,

    pub district: AdminEntry,

    pub sub_district: AdminEntry,

    pub village: AdminEntry,
}

impl AdminHierarchy {
    /// Set an admin entry for a given level
    pub fn set(&mut self, level: AdminLevel, entry: AdminEntry) {
        match level {
            AdminLevel::Province => self.province = entry,
            AdminLevel::District => self.district = entry,
            AdminLevel::SubDistrict => self.sub_district = entry,
            AdminLevel::Village => self.village = entry,
        }
    }

    /// Get an admin entry for a given level
    pub fn get(&self, level: AdminLevel) -> &AdminEntry {
        match level {
            AdminLevel::Province => &self.province,
            AdminLevel::District => &self.district,
            AdminLevel::SubDistrict => &self.sub_district,
            AdminLevel::Village => &self.village,
        }
    }

    /// Set the overall code.
    pub fn with_code(mut self, code: Option<&AdminCode>) -> Self {
        self.code = code.map(|c| c.as_str().to_string());
        self
    }
}
