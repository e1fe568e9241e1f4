//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use crate::application::services::{DatasetService, VisibilityService};
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::layout::ColumnLayout;
use crate::infrastructure::traits::{FileSystem, InMemoryLinkCache, LinkCache, RealFileSystem};

/// Container holding the collaborators shared by all services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Rendered-link cache shared by presentation and visibility engine
    pub link_cache: Arc<dyn LinkCache>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(
            settings,
            Arc::new(RealFileSystem),
            Arc::new(InMemoryLinkCache::new()),
        )
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        fs: Arc<dyn FileSystem>,
        link_cache: Arc<dyn LinkCache>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            fs,
            link_cache,
        }
    }

    pub fn dataset_service(&self) -> DatasetService {
        DatasetService::new(Arc::clone(&self.fs))
    }

    /// Build the store from `data` and hand it to a configured visibility service.
    pub fn visibility_service(&self, data: &Path) -> ApplicationResult<VisibilityService> {
        let store = self.dataset_service().build_store(data)?;
        Ok(
            VisibilityService::new(store, Arc::clone(&self.link_cache))
                .with_fan_out_limit(self.settings.fan_out_limit),
        )
    }

    pub fn layout_engine(&self) -> ColumnLayout {
        ColumnLayout::from(&self.settings.layout)
    }
}
