// LogScope - core/mod.rs
//
// Core business logic layer: format detection, extraction, aggregation,
// anomaly detection, report rendering and export encoding.
// Must NOT depend on: platform, app. Never touches the filesystem itself.

pub mod analysis;
pub mod anomaly;
pub mod export;
pub mod extract;
pub mod model;
pub mod parser;
pub mod registry;
pub mod report;
pub mod timestamp;
