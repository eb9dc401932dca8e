//! Coordinate reference normalization to geographic lon/lat degrees.
//!
//! Boundary files either carry no reference (assumed geographic) or declare one
//! through the legacy GeoJSON `crs` member. Only references with closed-form
//! inverses are supported: geographic WGS84, Web Mercator and WGS84 UTM zones.

use std::f64::consts::PI;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::LoadError;

/// WGS84 semi-major axis (m)
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 flattening
const WGS84_F: f64 = 1.0 / 298.257_223_563;
/// UTM scale factor at the central meridian
const UTM_K0: f64 = 0.9996;
const UTM_FALSE_EASTING: f64 = 500_000.0;
const UTM_FALSE_NORTHING_SOUTH: f64 = 10_000_000.0;

static EPSG_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)EPSG:(?:[\d.]*:)?(\d+)").expect("valid EPSG pattern"));

/// A supported source coordinate reference.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Crs {
    /// Longitude/latitude degrees (EPSG:4326, CRS84, DGN95)
    Geographic,
    /// Spherical Web Mercator metres (EPSG:3857 and aliases)
    WebMercator,
    /// WGS84 UTM metres (EPSG:326zz north, 327zz south)
    Utm { zone: u8, north: bool },
}

impl Crs {
    pub fn from_epsg(code: u32) -> Option<Self> {
        match code {
            4326 | 4755 => Some(Crs::Geographic),
            3857 | 3785 | 900913 | 102100 | 102113 => Some(Crs::WebMercator),
            32601..=32660 => Some(Crs::Utm {
                zone: (code - 32600) as u8,
                north: true,
            }),
            32701..=32760 => Some(Crs::Utm {
                zone: (code - 32700) as u8,
                north: false,
            }),
            _ => None,
        }
    }

    /// Parse a reference name such as `EPSG:4326`, `urn:ogc:def:crs:EPSG::32749`
    /// or `urn:ogc:def:crs:OGC:1.3:CRS84`.
    pub fn from_name(name: &str) -> Result<Self, LoadError> {
        if name.to_ascii_uppercase().contains("CRS84") {
            return Ok(Crs::Geographic);
        }

        EPSG_CODE
            .captures(name)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse().ok())
            .and_then(Self::from_epsg)
            .ok_or_else(|| LoadError::UnsupportedCrs {
                crs: name.to_string(),
            })
    }

    /// Interpret a GeoJSON `crs` member; an absent member means geographic.
    pub fn from_member(member: Option<&Value>) -> Result<Self, LoadError> {
        let Some(member) = member else {
            return Ok(Crs::Geographic);
        };
        if member.is_null() {
            return Ok(Crs::Geographic);
        }

        let props = member.get("properties");
        if let Some(name) = props.and_then(|p| p.get("name")).and_then(Value::as_str) {
            return Self::from_name(name);
        }

        // Pre-2016 GeoJSON: {"type": "EPSG", "properties": {"code": 4326}}
        if let Some(code) = props.and_then(|p| p.get("code")).and_then(Value::as_u64) {
            return u32::try_from(code)
                .ok()
                .and_then(Self::from_epsg)
                .ok_or_else(|| LoadError::UnsupportedCrs {
                    crs: format!("EPSG:{}", code),
                });
        }

        Err(LoadError::UnsupportedCrs {
            crs: member.to_string(),
        })
    }

    pub fn is_geographic(&self) -> bool {
        matches!(self, Crs::Geographic)
    }

    /// Convert a source position to (lon, lat) degrees.
    pub fn to_geographic(&self, x: f64, y: f64) -> (f64, f64) {
        match *self {
            Crs::Geographic => (x, y),
            Crs::WebMercator => web_mercator_inverse(x, y),
            Crs::Utm { zone, north } => utm_inverse(x, y, zone, north),
        }
    }
}

fn web_mercator_inverse(x: f64, y: f64) -> (f64, f64) {
    let lon = (x / WGS84_A).to_degrees();
    let lat = (2.0 * (y / WGS84_A).exp().atan() - PI / 2.0).to_degrees();
    (lon, lat)
}

/// Inverse transverse Mercator (Snyder, USGS PP 1395, eqs. 8-12 to 8-25).
fn utm_inverse(easting: f64, northing: f64, zone: u8, north: bool) -> (f64, f64) {
    let e2 = WGS84_F * (2.0 - WGS84_F);
    let ep2 = e2 / (1.0 - e2);
    let e1 = (1.0 - (1.0 - e2).sqrt()) / (1.0 + (1.0 - e2).sqrt());

    let x = easting - UTM_FALSE_EASTING;
    let y = if north {
        northing
    } else {
        northing - UTM_FALSE_NORTHING_SOUTH
    };
    let lon0 = (f64::from(zone) - 1.0) * 6.0 - 180.0 + 3.0;

    let m = y / UTM_K0;
    let mu = m / (WGS84_A * (1.0 - e2 / 4.0 - 3.0 * e2.powi(2) / 64.0 - 5.0 * e2.powi(3) / 256.0));

    let phi1 = mu
        + (3.0 * e1 / 2.0 - 27.0 * e1.powi(3) / 32.0) * (2.0 * mu).sin()
        + (21.0 * e1.powi(2) / 16.0 - 55.0 * e1.powi(4) / 32.0) * (4.0 * mu).sin()
        + (151.0 * e1.powi(3) / 96.0) * (6.0 * mu).sin()
        + (1097.0 * e1.powi(4) / 512.0) * (8.0 * mu).sin();

    let (sin1, cos1) = phi1.sin_cos();
    let tan1 = phi1.tan();
    let c1 = ep2 * cos1.powi(2);
    let t1 = tan1.powi(2);
    let n1 = WGS84_A / (1.0 - e2 * sin1.powi(2)).sqrt();
    let r1 = WGS84_A * (1.0 - e2) / (1.0 - e2 * sin1.powi(2)).powf(1.5);
    let d = x / (n1 * UTM_K0);

    let lat = phi1
        - (n1 * tan1 / r1)
            * (d.powi(2) / 2.0
                - (5.0 + 3.0 * t1 + 10.0 * c1 - 4.0 * c1.powi(2) - 9.0 * ep2) * d.powi(4) / 24.0
                + (61.0 + 90.0 * t1 + 298.0 * c1 + 45.0 * t1.powi(2)
                    - 252.0 * ep2
                    - 3.0 * c1.powi(2))
                    * d.powi(6)
                    / 720.0);

    let lon = (d - (1.0 + 2.0 * t1 + c1) * d.powi(3) / 6.0
        + (5.0 - 2.0 * c1 + 28.0 * t1 - 3.0 * c1.powi(2) + 8.0 * ep2 + 24.0 * t1.powi(2))
            * d.powi(5)
            / 120.0)
        / cos1;

    (lon0 + lon.to_degrees(), lat.to_degrees())
}
