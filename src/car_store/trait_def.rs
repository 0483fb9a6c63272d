//! CarStore trait definition.
//!
//! The store is the system of record for cars. Listing and loading are pure
//! derivations over the current filesystem state and are never cached.

use super::error::CarStoreResult;
use super::models::{Car, Cars, Tyres};
use crate::car_details::CarDetails;

pub trait CarStore: Send + Sync {
    // =========================================================================
    // Reads
    // =========================================================================

    /// All cars, sorted by prettified name. Cars without a `skins` directory
    /// are skipped.
    fn list_cars(&self, tyres: Option<&Tyres>) -> CarStoreResult<Cars>;

    /// Load one car. Fails with `NotFound` when the car (or its `skins`
    /// directory) does not exist; a missing details document is not an error.
    fn load_car(&self, name: &str, tyres: Option<&Tyres>) -> CarStoreResult<Car>;

    /// URL of a skin's preview image, or the default placeholder.
    fn skin_preview_url(&self, car: &str, skin: &str) -> String;

    // =========================================================================
    // Writes
    // =========================================================================

    /// Write the details document, creating directories as needed.
    fn save_details(&self, name: &str, details: &CarDetails) -> CarStoreResult<()>;

    /// Remove the car's whole directory. Returns `false` when there was no
    /// listable car by that name.
    fn delete_car(&self, name: &str) -> CarStoreResult<bool>;

    // =========================================================================
    // Load -> mutate -> save helpers
    // =========================================================================

    fn update_details(
        &self,
        name: &str,
        mutate: &mut dyn FnMut(&mut CarDetails),
    ) -> CarStoreResult<Car> {
        let mut car = self.load_car(name, None)?;
        mutate(&mut car.details);
        self.save_details(name, &car.details)?;
        Ok(car)
    }

    fn add_tag(&self, name: &str, tag: &str) -> CarStoreResult<Car> {
        self.update_details(name, &mut |details| {
            details.add_tag(tag);
        })
    }

    fn remove_tag(&self, name: &str, tag: &str) -> CarStoreResult<Car> {
        self.update_details(name, &mut |details| {
            details.remove_tag(tag);
        })
    }

    fn update_operator_fields(
        &self,
        name: &str,
        download_url: &str,
        notes: &str,
    ) -> CarStoreResult<Car> {
        self.update_details(name, &mut |details| {
            details.set_operator_fields(download_url, notes)
        })
    }
}
