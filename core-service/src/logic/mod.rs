//! Logic Module - Scoring Pipeline
//!
//! - `artifact/` - Model artifact loading and validation
//! - `features/` - HTML feature extraction
//! - `model/` - Tree ensemble and inference
//! - `explain/` - Attribution engine, shape normalization, ranking
//! - `service/` - Model handle and request orchestration

pub mod artifact;
pub mod explain;
pub mod features;
pub mod model;
pub mod service;
pub mod severity;
