mod error;
mod fs_store;
mod models;
mod prettify;
mod trait_def;

pub use error::{CarStoreError, CarStoreResult};
pub use fs_store::{FsCarStore, DEFAULT_SKIN_URL};
pub use models::{skin_map, Car, Cars, Tyres};
pub use prettify::prettify_name;
pub use trait_def::CarStore;
