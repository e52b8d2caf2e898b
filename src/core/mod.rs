//! Core processing building blocks: boundary masking, reprojection,
//! resolution selection, resampling, export validation, and the pipeline
//! that strings them together. These are internal primitives consumed by
//! the high-level `api` module.
pub mod mask;
pub mod params;
pub mod pipeline;
pub mod reproject;
pub mod resolution;
pub mod validate;
