//! Reconstructs the logical reading order of a PDF page from a flat set of
//! word bounding boxes. See `pipeline::run_page` for the single entry point
//! that threads a page through every stage in order.

pub mod adapters;
pub mod cancellation;
pub mod error;
pub mod geometry;
pub mod model;
pub mod naive_merge;
pub mod pipeline;
pub mod reconstruct;
pub mod xycut;

pub use cancellation::CancellationToken;
pub use error::{FoliateError, Result};
pub use model::{FontSpec, Page, Word};
pub use naive_merge::PipelineParams;
