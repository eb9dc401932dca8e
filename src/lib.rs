//! Geodecode - resolve coordinates to the Indonesian administrative hierarchy.
//!
//! This library provides the decoding engine and HTTP API used by the server binary.

pub mod api;
pub mod codes;
pub mod config;
pub mod error;
pub mod models;
pub mod names;
pub mod pip;

pub use error::{DecodeError, LoadError};
pub use models::{AdminEntry, AdminHierarchy, AdminLevel};
pub use pip::Decoder;
