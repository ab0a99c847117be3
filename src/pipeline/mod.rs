//! Pipeline module - cleaning, enrichment, aggregation, segmentation

pub mod aggregate;
pub mod category;
pub mod cleaner;
pub mod dataset;
pub mod enrich;
pub mod error;
pub mod loader;
pub mod quantile;
pub mod rfm;
pub mod transaction;

pub use aggregate::*;
pub use category::*;
pub use cleaner::*;
pub use dataset::*;
pub use enrich::*;
pub use error::*;
pub use loader::*;
pub use quantile::*;
pub use rfm::*;
pub use transaction::*;
