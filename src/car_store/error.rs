use crate::car_details::CarDetailsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CarStoreError {
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Invalid car name: {0:?}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Car details error: {0}")]
    Details(#[from] CarDetailsError),
}

impl CarStoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, CarStoreError::NotFound { .. })
    }

    /// Maps `NotFound` io errors to [`CarStoreError::NotFound`], keeps everything else.
    pub(super) fn from_io(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        if err.kind() == std::io::ErrorKind::NotFound {
            CarStoreError::NotFound { path: path.into() }
        } else {
            CarStoreError::Io(err)
        }
    }
}

pub type CarStoreResult<T> = Result<T, CarStoreError>;
