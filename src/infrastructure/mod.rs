//! Infrastructure layer: I/O implementations, layout collaborator and DI container
//!
//! This layer implements the boundary traits and wires up services.

pub mod di;
pub mod error;
pub mod layout;
pub mod traits;

pub use error::{InfraError, InfraResult};
