//! Filesystem-backed car store.
//!
//! Layout under the install path:
//!
//! ```text
//! content/cars/<car>/skins/<skin>/        one directory per skin
//! content/cars/<car>/skins/<skin>/preview.jpg
//! content/cars/<car>/ui/ui_car.json       details document
//! ```

use super::error::{CarStoreError, CarStoreResult};
use super::models::{Car, Cars, Tyres};
use super::prettify::prettify_name;
use super::trait_def::CarStore;
use crate::car_details::{self, CarDetails};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

pub const DEFAULT_SKIN_URL: &str = "/static/img/no-preview-car.png";

const SKINS_DIR: &str = "skins";
const UI_DIR: &str = "ui";
const DETAILS_FILE: &str = "ui_car.json";
const PREVIEW_FILE: &str = "preview.jpg";

#[derive(Clone, Debug)]
pub struct FsCarStore {
    install_path: PathBuf,
}

/// Rejects names that would escape `content/cars` or do not name a single directory.
fn validate_name(name: &str) -> CarStoreResult<()> {
    let bad_char = name.contains(|c: char| c == '/' || c == '\\' || c == '\0');
    if name.is_empty() || name == "." || name == ".." || bad_char {
        return Err(CarStoreError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn read_skins(skins_dir: &Path) -> CarStoreResult<Vec<String>> {
    let entries = fs::read_dir(skins_dir).map_err(|e| CarStoreError::from_io(e, skins_dir))?;

    let mut skins = Vec::new();
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        skins.push(entry.file_name().to_string_lossy().into_owned());
    }
    skins.sort();
    Ok(skins)
}

/// Permissions for a rewritten details file: those of the file being
/// replaced, or 0644 for a new one. Temp files start out owner-only.
fn details_permissions(target: &Path) -> std::io::Result<Option<fs::Permissions>> {
    match fs::metadata(target) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(err) => Err(err),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Some(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<fs::Permissions> {
    None
}

impl FsCarStore {
    pub fn new<P: AsRef<Path>>(install_path: P) -> Self {
        FsCarStore {
            install_path: install_path.as_ref().to_path_buf(),
        }
    }

    pub fn install_path(&self) -> &Path {
        &self.install_path
    }

    pub fn cars_dir(&self) -> PathBuf {
        self.install_path.join("content").join("cars")
    }

    fn car_dir(&self, name: &str) -> CarStoreResult<PathBuf> {
        validate_name(name)?;
        Ok(self.cars_dir().join(name))
    }

    fn read_details(&self, name: &str, car_dir: &Path) -> CarStoreResult<CarDetails> {
        let path = car_dir.join(UI_DIR).join(DETAILS_FILE);
        match fs::read(&path) {
            Ok(bytes) => Ok(car_details::parse(&bytes)?),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(CarDetails::with_name(prettify_name(name, true)))
            }
            Err(err) => Err(err.into()),
        }
    }
}

impl CarStore for FsCarStore {
    fn list_cars(&self, tyres: Option<&Tyres>) -> CarStoreResult<Cars> {
        let cars_dir = self.cars_dir();
        let entries = match fs::read_dir(&cars_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                info!("No cars directory at {:?}, catalog is empty", cars_dir);
                return Ok(Cars::new());
            }
            Err(err) => return Err(err.into()),
        };

        let mut cars = Cars::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => {
                    warn!("Skipping car directory with non UTF-8 name {:?}", raw);
                    continue;
                }
            };

            match self.load_car(&name, tyres) {
                Ok(car) => cars.push(car),
                Err(err) if err.is_not_found() => {
                    debug!("Skipping car {}: {}", name, err);
                }
                Err(err) => return Err(err),
            }
        }

        cars.sort_by_cached_key(|car| (car.pretty_name(), car.name.clone()));
        Ok(cars)
    }

    fn load_car(&self, name: &str, tyres: Option<&Tyres>) -> CarStoreResult<Car> {
        let car_dir = self.car_dir(name)?;
        let skins = read_skins(&car_dir.join(SKINS_DIR))?;
        let details = self.read_details(name, &car_dir)?;

        Ok(Car {
            name: name.to_string(),
            skins,
            tyres: tyres
                .and_then(|tyres| tyres.get(name))
                .cloned()
                .unwrap_or_default(),
            details,
        })
    }

    fn skin_preview_url(&self, car: &str, skin: &str) -> String {
        if validate_name(car).is_err() || validate_name(skin).is_err() {
            return DEFAULT_SKIN_URL.to_string();
        }

        let preview = self
            .cars_dir()
            .join(car)
            .join(SKINS_DIR)
            .join(skin)
            .join(PREVIEW_FILE);
        if !preview.exists() {
            return DEFAULT_SKIN_URL.to_string();
        }

        format!("/content/cars/{car}/{SKINS_DIR}/{skin}/{PREVIEW_FILE}")
    }

    fn save_details(&self, name: &str, details: &CarDetails) -> CarStoreResult<()> {
        let ui_dir = self.car_dir(name)?.join(UI_DIR);
        fs::create_dir_all(&ui_dir)?;

        let bytes = car_details::serialize(details)?;
        let target = ui_dir.join(DETAILS_FILE);

        // Write next to the target and rename over it so readers never see a partial file.
        let mut file = NamedTempFile::new_in(&ui_dir)?;
        file.write_all(&bytes)?;
        if let Some(permissions) = details_permissions(&target)? {
            file.as_file().set_permissions(permissions)?;
        }
        file.as_file().sync_all()?;
        file.persist(&target)
            .map_err(|err| CarStoreError::Io(err.error))?;

        debug!("Saved details for car {}", name);
        Ok(())
    }

    fn delete_car(&self, name: &str) -> CarStoreResult<bool> {
        let car_dir = self.car_dir(name)?;
        if !car_dir.join(SKINS_DIR).is_dir() {
            return Ok(false);
        }

        match fs::remove_dir_all(&car_dir) {
            Ok(()) => {
                info!("Deleted car {} at {:?}", name, car_dir);
                Ok(true)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}
