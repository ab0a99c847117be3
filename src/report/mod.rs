//! Report module - summarizing and exporting segmentation results

pub mod export;
pub mod summary;

pub use export::*;
pub use summary::*;
