//! The per-car metadata document (`ui/ui_car.json`).

use super::codec::extract_leading_integer;
use super::lenient;
use serde::{Deserialize, Serialize};

/// A piecewise curve, as (x, y) pairs in authoring order.
pub type Curve = Vec<(f64, f64)>;

/// Specs as authored, e.g. `"450 bhp"`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarSpecs {
    #[serde(deserialize_with = "lenient::string")]
    pub acceleration: String,
    #[serde(deserialize_with = "lenient::string")]
    pub bhp: String,
    #[serde(deserialize_with = "lenient::string")]
    pub pwratio: String,
    #[serde(deserialize_with = "lenient::string")]
    pub topspeed: String,
    #[serde(deserialize_with = "lenient::string")]
    pub torque: String,
    #[serde(deserialize_with = "lenient::string")]
    pub weight: String,
}

impl CarSpecs {
    pub fn numeric(&self) -> CarSpecsNumeric {
        CarSpecsNumeric {
            acceleration: extract_leading_integer(&self.acceleration),
            bhp: extract_leading_integer(&self.bhp),
            pwratio: extract_leading_integer(&self.pwratio),
            topspeed: extract_leading_integer(&self.topspeed),
            torque: extract_leading_integer(&self.torque),
            weight: extract_leading_integer(&self.weight),
        }
    }

    /// All non-empty spec strings, space separated. Used as indexable text.
    pub fn joined(&self) -> String {
        [
            &self.acceleration,
            &self.bhp,
            &self.pwratio,
            &self.topspeed,
            &self.torque,
            &self.weight,
        ]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(" ")
    }
}

/// Integer form of [`CarSpecs`]. Always derived, never authored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CarSpecsNumeric {
    pub acceleration: i64,
    pub bhp: i64,
    pub pwratio: i64,
    pub topspeed: i64,
    pub torque: i64,
    pub weight: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CarDetails {
    #[serde(deserialize_with = "lenient::string")]
    pub author: String,
    #[serde(deserialize_with = "lenient::string")]
    pub brand: String,
    #[serde(deserialize_with = "lenient::string")]
    pub class: String,
    #[serde(deserialize_with = "lenient::string")]
    pub country: String,
    #[serde(deserialize_with = "lenient::string")]
    pub description: String,
    #[serde(deserialize_with = "lenient::string")]
    pub name: String,
    #[serde(rename = "powerCurve", deserialize_with = "lenient::curve")]
    pub power_curve: Curve,
    #[serde(deserialize_with = "lenient::specs")]
    specs: CarSpecs,
    // Written out for readers of the raw file, recomputed on every load.
    #[serde(skip_deserializing)]
    spec: CarSpecsNumeric,
    #[serde(deserialize_with = "lenient::tags")]
    tags: Vec<String>,
    #[serde(rename = "torqueCurve", deserialize_with = "lenient::curve")]
    pub torque_curve: Curve,
    #[serde(deserialize_with = "lenient::string")]
    pub url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub version: String,
    #[serde(deserialize_with = "lenient::integer")]
    pub year: i64,

    #[serde(rename = "downloadURL", deserialize_with = "lenient::string")]
    pub download_url: String,
    #[serde(deserialize_with = "lenient::string")]
    pub notes: String,
}

impl CarDetails {
    /// Details for a car that has no metadata document on disk.
    pub fn with_name(name: impl Into<String>) -> Self {
        CarDetails {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn specs(&self) -> &CarSpecs {
        &self.specs
    }

    pub fn numeric_specs(&self) -> &CarSpecsNumeric {
        &self.spec
    }

    /// Replaces the authored specs and re-derives the numeric form.
    pub fn set_specs(&mut self, specs: CarSpecs) {
        self.specs = specs;
        self.refresh_numeric_specs();
    }

    pub(super) fn refresh_numeric_specs(&mut self) {
        self.spec = self.specs.numeric();
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Adds `tag` unless already present. Returns whether the set changed.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    /// Removes `tag` if present. Returns whether the set changed.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    pub fn set_operator_fields(&mut self, download_url: impl Into<String>, notes: impl Into<String>) {
        self.download_url = download_url.into();
        self.notes = notes.into();
    }
}
