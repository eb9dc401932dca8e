//! Point-in-Polygon (PIP) decoding.
//!
//! Loads village boundaries, indexes them in an R-tree and resolves a
//! coordinate to its administrative hierarchy.

mod boundary;
mod crs;
mod index;
mod service;

pub use boundary::{
    read_border_array, read_feature_collection, DatasetFormat, LoadReport, RegionStore, Stage,
};
pub use crs::Crs;
pub use index::{linear_scan, Predicate, SpatialIndex};
pub use service::{Decoder, DecoderStatus};
