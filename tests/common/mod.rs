//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestCatalog, AUDI_R8};
//!
//! #[test]
//! fn test_load_car() {
//!     let catalog = TestCatalog::open();
//!     let car = catalog.manager().load_car(AUDI_R8, None).unwrap();
//!     assert_eq!(car.skins.len(), 2);
//! }
//! ```

mod constants;
mod fixtures;

pub use constants::*;

#[allow(unused_imports)]
pub use fixtures::add_plain_car;

use car_catalog::car_manager::CarManager;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A fixture install tree plus a manager opened on it.
pub struct TestCatalog {
    // Declared first so it is dropped before the temp dir
    manager: Option<CarManager>,
    dir: TempDir,
}

#[allow(dead_code)]
impl TestCatalog {
    pub fn open() -> Self {
        let dir = fixtures::create_test_install().expect("Failed to create test install");
        let manager = CarManager::open(dir.path(), &Self::index_path_in(dir.path()))
            .expect("Failed to open car manager");
        TestCatalog {
            manager: Some(manager),
            dir,
        }
    }

    fn index_path_in(install: &Path) -> PathBuf {
        install.join("search-index/cars.db")
    }

    pub fn install_path(&self) -> &Path {
        self.dir.path()
    }

    pub fn index_path(&self) -> PathBuf {
        Self::index_path_in(self.dir.path())
    }

    pub fn manager(&self) -> &CarManager {
        self.manager.as_ref().expect("manager already closed")
    }

    /// Closes the manager and opens a fresh one on the same files.
    pub fn reopen(&mut self) {
        self.reopen_after(|| {});
    }

    /// Like [`TestCatalog::reopen`], running `while_closed` in between.
    pub fn reopen_after(&mut self, while_closed: impl FnOnce()) {
        if let Some(manager) = self.manager.take() {
            manager.close().expect("Failed to close car manager");
        }
        while_closed();
        let manager = CarManager::open(self.install_path(), &self.index_path())
            .expect("Failed to reopen car manager");
        self.manager = Some(manager);
    }
}
