//! Application services

pub mod dataset;
pub mod overflow;
pub mod visibility;

pub use dataset::{DataFormat, DatasetService};
pub use visibility::VisibilityService;
