//! Car catalog library
//!
//! A filesystem-backed catalog of cars (`content/cars/<car>/...`) with a
//! persistent full-text search index kept in sync with it.

pub mod car_details;
pub mod car_manager;
pub mod car_store;
pub mod config;
pub mod results;
pub mod search;

// Re-export commonly used types for convenience
pub use car_details::CarDetails;
pub use car_manager::{CarManager, CarManagerError, CarSearchResults, SEARCH_PAGE_SIZE};
pub use car_store::{Car, CarStore, FsCarStore};
pub use search::{Fts5SearchIndex, SearchContext, SearchIndex};
