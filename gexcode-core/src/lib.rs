//! gexcode core — chart-call extraction, exposure aggregation, level selection, level codec.
//!
//! This crate contains the pure half of the system:
//! - Argument tokenizer for a single chart-initialization call
//! - Document locator that finds that call inside an HTML page
//! - Exposure aggregation into a price-sorted profile
//! - Reference-level extraction from chart annotations
//! - Significance selection (top percentage ∪ threshold)
//! - Verbose rendering and the long ↔ short level codec with round-trip validation
//! - Dated snapshot store for the short-code artifacts
//!
//! Everything except `store` is a synchronous function over in-memory values.

pub mod aggregate;
pub mod annotations;
pub mod codec;
pub mod domain;
pub mod locator;
pub mod pipeline;
pub mod render;
pub mod select;
pub mod store;
pub mod tokenizer;

pub use domain::{Anchor, Decoded, ExposurePoint, Profile, ReferenceLevel, ReferenceLevels};
pub use pipeline::{extract_document, Extraction, ExtractionResult, SelectionPolicy};
