pub mod analytics;
pub mod filter;
pub mod label_matcher;
pub mod normalizer;
pub mod report;
pub mod snapshot;
pub mod time_series;
