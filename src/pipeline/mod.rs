//! Report pipeline: the analysis service client and the batch ingestion
//! queue that drains selected files through it.

pub mod analysis;
pub mod ingestion;
