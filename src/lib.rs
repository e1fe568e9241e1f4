//! sankey-tree: progressively expandable Sankey hierarchies.
//!
//! A hierarchy is built from dot-path records into a [`domain::TreeStore`].
//! The [`application::services::VisibilityService`] expands and collapses
//! nodes, folding wide fan-outs into a synthetic "Other" node, and every
//! action yields a [`domain::Snapshot`] of the visible subgraph for a
//! layout collaborator.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;
