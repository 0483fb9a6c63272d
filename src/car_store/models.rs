use super::prettify::prettify_name;
use crate::car_details::CarDetails;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Tyre compatibility owned by the tyre registry: car name -> (tyre short name -> compound name).
pub type Tyres = HashMap<String, HashMap<String, String>>;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Car {
    /// Directory name under `content/cars`, the car's identity.
    pub name: String,
    /// Sorted names of the directories under `skins`.
    pub skins: Vec<String>,
    pub tyres: HashMap<String, String>,
    pub details: CarDetails,
}

impl Car {
    pub fn pretty_name(&self) -> String {
        prettify_name(&self.name, true)
    }

    /// The authored name if there is one, otherwise the prettified identity.
    pub fn display_name(&self) -> String {
        if self.details.name.trim().is_empty() {
            self.pretty_name()
        } else {
            self.details.name.clone()
        }
    }
}

pub type Cars = Vec<Car>;

/// Car name -> skins, for consumers that only need the variant lists.
pub fn skin_map(cars: &[Car]) -> BTreeMap<String, Vec<String>> {
    cars.iter()
        .map(|car| (car.name.clone(), car.skins.clone()))
        .collect()
}
