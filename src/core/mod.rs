//! Core data model: configuration, manifest, errors and tree layout.

pub mod error;
pub mod layout;
pub mod manifest;
pub mod types;
