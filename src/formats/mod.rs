//! Output formats for parsed sections.

pub mod parquet;
