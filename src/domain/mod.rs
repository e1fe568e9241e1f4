//! Domain layer: entities and hierarchy logic
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod builder;
pub mod entities;
pub mod error;
pub mod geometry;
pub mod snapshot;
pub mod store;

pub use builder::{PathEntry, TreeBuilder};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use geometry::{Layout, LinkGeometry, NodeGeometry};
pub use snapshot::{Snapshot, VisibleLink, VisibleNode};
pub use store::TreeStore;
