//! Utility functions and types

pub mod data_loader;

pub use data_loader::{load_feature_table, load_raw_records, write_feature_table, LabeledTable};
