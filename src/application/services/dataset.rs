//! Dataset service
//!
//! Loads a source record from disk and builds the tree store from it.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::{ApplicationError, ApplicationResult, PathResultExt};
use crate::domain::{SourceRecord, TreeBuilder, TreeStore};
use crate::infrastructure::traits::FileSystem;

/// Serialization of a source record file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    Json,
    Toml,
}

impl DataFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> ApplicationResult<Self> {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => Ok(DataFormat::Json),
            Some("toml") => Ok(DataFormat::Toml),
            _ => Err(ApplicationError::UnsupportedFormat(path.to_path_buf())),
        }
    }
}

/// Service reading hierarchies from data files.
pub struct DatasetService {
    fs: Arc<dyn FileSystem>,
}

impl DatasetService {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self { fs }
    }

    /// Parse a source record, keeping key order as written.
    pub fn parse(content: &str, format: DataFormat) -> ApplicationResult<SourceRecord> {
        let parsed = match format {
            DataFormat::Json => serde_json::from_str(content).map_err(|e| {
                ApplicationError::Parse {
                    context: "JSON source record".to_string(),
                    source: Box::new(e),
                }
            }),
            DataFormat::Toml => toml::from_str(content).map_err(|e| ApplicationError::Parse {
                context: "TOML source record".to_string(),
                source: Box::new(e),
            }),
        }?;
        Ok(parsed)
    }

    /// Read a source record from `path`.
    pub fn load(&self, path: &Path) -> ApplicationResult<SourceRecord> {
        debug!("load: path={}", path.display());
        if !self.fs.is_file(path) {
            return Err(ApplicationError::DataNotFound(path.to_path_buf()));
        }
        let format = DataFormat::from_path(path)?;
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read data file", path)?;
        let record = Self::parse(&content, format)?;
        debug!("load: {} top-level keys", record.len());
        Ok(record)
    }

    /// Read `path` and build a store with everything hidden.
    pub fn build_store(&self, path: &Path) -> ApplicationResult<TreeStore> {
        let record = self.load(path)?;
        Ok(TreeBuilder::new().build(&record)?)
    }
}
