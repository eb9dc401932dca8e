//! Core data models for the decoder.

pub mod admin;
pub mod code;
pub mod region;

pub use admin::{AdminEntry, AdminHierarchy, AdminLevel};
pub use code::AdminCode;
pub use region::{PropertyBag, Region};
