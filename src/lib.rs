//! rfmseg: RFM customer segmentation library
//!
//! Cleans a retail transaction ledger, aggregates it per customer into
//! Recency, Frequency and Monetary measures, scores each measure into
//! quintiles and assigns every customer a named category.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
