//! Keeps the search index in step with the car store and answers paginated
//! searches against both.
//!
//! The store is the system of record. Every mutation writes the store first
//! and then updates the index; a failing index write is reported but the
//! store write is not undone. [`CarManager::rebuild_index`] is the repair path.

use crate::car_details::CarDetails;
use crate::car_store::{Car, CarStore, CarStoreError, Cars, FsCarStore, Tyres};
use crate::results::{self, ResultsSource, SessionResults};
use crate::search::{
    Fts5SearchIndex, IndexStatus, SearchContext, SearchIndex, SearchIndexError,
};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{info, warn};

/// Number of hits per search results page.
pub const SEARCH_PAGE_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum CarManagerError {
    #[error(transparent)]
    Store(#[from] CarStoreError),

    #[error(transparent)]
    Index(#[from] SearchIndexError),

    #[error("Failed to read results: {0}")]
    Results(#[source] std::io::Error),
}

impl CarManagerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CarManagerError::Store(err) if err.is_not_found())
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, CarManagerError::Index(SearchIndexError::Cancelled))
    }
}

pub type CarManagerResult<T> = Result<T, CarManagerError>;

/// One page of search results.
#[derive(Debug, Clone, Serialize)]
pub struct CarSearchResults {
    pub query: String,
    pub page: usize,
    pub page_size: usize,
    /// Matches before pagination, as reported by the index.
    pub total_hits: usize,
    pub num_pages: usize,
    /// Hits on this page in rank order. Hits whose car is gone from disk are left out.
    pub hit_ids: Vec<String>,
    pub cars: HashMap<String, Car>,
}

impl CarSearchResults {
    /// Cars on this page in rank order.
    pub fn ordered_cars(&self) -> impl Iterator<Item = &Car> {
        self.hit_ids.iter().filter_map(|id| self.cars.get(id))
    }
}

/// A car together with the sessions it took part in.
#[derive(Debug, Clone, Serialize)]
pub struct CarWithResults {
    pub car: Car,
    pub results: Vec<SessionResults>,
}

/// `ceil(total_hits / page_size)`; zero for an empty page size.
pub fn num_pages(total_hits: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_hits.div_ceil(page_size)
}

pub struct CarManager {
    store: Arc<dyn CarStore>,
    index: Box<dyn SearchIndex>,
}

impl CarManager {
    pub fn new(store: Arc<dyn CarStore>, index: Box<dyn SearchIndex>) -> Self {
        CarManager { store, index }
    }

    /// Opens the filesystem store at `install_path` and the index at
    /// `index_path`. A newly created index is filled before this returns.
    pub fn open(install_path: &Path, index_path: &Path) -> CarManagerResult<Self> {
        let store = Arc::new(FsCarStore::new(install_path));
        let (index, status) = Fts5SearchIndex::open_or_create(index_path)?;

        let manager = CarManager::new(store, Box::new(index));
        if status == IndexStatus::Created {
            manager.rebuild_index()?;
        }
        Ok(manager)
    }

    pub fn store(&self) -> &dyn CarStore {
        self.store.as_ref()
    }

    pub fn index(&self) -> &dyn SearchIndex {
        self.index.as_ref()
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn list_cars(&self, tyres: Option<&Tyres>) -> CarManagerResult<Cars> {
        Ok(self.store.list_cars(tyres)?)
    }

    pub fn load_car(&self, name: &str, tyres: Option<&Tyres>) -> CarManagerResult<Car> {
        Ok(self.store.load_car(name, tyres)?)
    }

    pub fn skin_preview_url(&self, car: &str, skin: &str) -> String {
        self.store.skin_preview_url(car, skin)
    }

    pub fn results_for_car(
        &self,
        car: &str,
        source: &dyn ResultsSource,
    ) -> CarManagerResult<Vec<SessionResults>> {
        let all = source.all_results().map_err(CarManagerError::Results)?;
        Ok(results::results_for_car(&all, car))
    }

    pub fn load_car_with_results(
        &self,
        name: &str,
        tyres: Option<&Tyres>,
        source: &dyn ResultsSource,
    ) -> CarManagerResult<CarWithResults> {
        let car = self.load_car(name, tyres)?;
        let results = self.results_for_car(name, source)?;
        Ok(CarWithResults { car, results })
    }

    // =========================================================================
    // Mutations (store first, then index)
    // =========================================================================

    pub fn save_car_details(&self, name: &str, details: &CarDetails) -> CarManagerResult<()> {
        self.store.save_details(name, details)?;
        self.index.put(name, details)?;
        Ok(())
    }

    pub fn add_tag(&self, name: &str, tag: &str) -> CarManagerResult<Car> {
        let car = self.store.add_tag(name, tag)?;
        self.index.put(name, &car.details)?;
        Ok(car)
    }

    pub fn remove_tag(&self, name: &str, tag: &str) -> CarManagerResult<Car> {
        let car = self.store.remove_tag(name, tag)?;
        self.index.put(name, &car.details)?;
        Ok(car)
    }

    pub fn update_car_metadata(
        &self,
        name: &str,
        download_url: &str,
        notes: &str,
    ) -> CarManagerResult<Car> {
        let car = self.store.update_operator_fields(name, download_url, notes)?;
        self.index.put(name, &car.details)?;
        Ok(car)
    }

    /// Deletes the car from disk if it is listed, and always drops it from the
    /// index. Returns whether anything was removed from disk.
    pub fn delete_car(&self, name: &str) -> CarManagerResult<bool> {
        let removed = self.store.delete_car(name)?;
        self.index.remove(name)?;
        Ok(removed)
    }

    /// Replaces the whole index with the current catalog. Returns the number of cars indexed.
    pub fn rebuild_index(&self) -> CarManagerResult<usize> {
        info!("Rebuilding car search index...");
        let start = Instant::now();

        let cars = self.store.list_cars(None)?;
        let documents: Vec<(&str, &CarDetails)> = cars
            .iter()
            .map(|car| (car.name.as_str(), &car.details))
            .collect();
        self.index.replace_all(&documents)?;

        info!(
            "Car search index rebuilt with {} cars in {:?}",
            cars.len(),
            start.elapsed()
        );
        Ok(cars.len())
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Zero-based `page` of results for `term`; an empty term lists every car.
    pub fn search(
        &self,
        term: &str,
        page: usize,
        ctx: &SearchContext,
    ) -> CarManagerResult<CarSearchResults> {
        let offset = page.saturating_mul(SEARCH_PAGE_SIZE);
        let hits = self.index.query(term, SEARCH_PAGE_SIZE, offset, ctx)?;

        let mut hit_ids = Vec::with_capacity(hits.ids.len());
        let mut cars = HashMap::with_capacity(hits.ids.len());
        for id in hits.ids {
            match self.store.load_car(&id, None) {
                Ok(car) => {
                    cars.insert(id.clone(), car);
                    hit_ids.push(id);
                }
                Err(err) if err.is_not_found() || matches!(err, CarStoreError::InvalidName(_)) => {
                    warn!("Search hit {} is no longer in the catalog: {}", id, err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Ok(CarSearchResults {
            query: term.to_string(),
            page,
            page_size: SEARCH_PAGE_SIZE,
            total_hits: hits.total_hits,
            num_pages: num_pages(hits.total_hits, SEARCH_PAGE_SIZE),
            hit_ids,
            cars,
        })
    }

    pub fn close(self) -> CarManagerResult<()> {
        self.index.close()?;
        Ok(())
    }
}
