//! Metadata codec for the per-car `ui_car.json` document.

mod codec;
mod details;
mod lenient;

pub use codec::{extract_leading_integer, parse, serialize, CarDetailsError};
pub use details::{CarDetails, CarSpecs, CarSpecsNumeric, Curve};
