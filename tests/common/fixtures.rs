//! Test fixture creation for the install tree

use super::constants::*;
use anyhow::Result;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const AUDI_R8_DETAILS: &str = "\u{feff}{\r\n\t\"name\": \"Audi R8 LMS\",\r\n\t\"brand\": \"Audi\",\r\n\t\"class\": \"race\",\r\n\t\"tags\": [\"gt3\", \"endurance\", \"gt3\", 42],\r\n\t\"year\": \"2016\",\r\n\t\"specs\": {\"bhp\": \"585bhp\", \"weight\": \"1225kg\", \"topspeed\": 290},\r\n\t\"spec\": {\"bhp\": 1},\r\n\t\"powerCurve\": [[\"1000\", \"120\"], [2000, 240], [\"broken\"]]\r\n}\r\n";

const FERRARI_488_DETAILS: &str = r#"{
   "author": "Kunos Simulazioni",
   "brand": "Ferrari",
   "class": "race",
   "country": "Italy",
   "description": "The twin-turbocharged GT3 racer from Maranello.",
   "name": "Ferrari 488 GT3",
   "specs": {
      "acceleration": "--",
      "bhp": "600bhp",
      "pwratio": "2.08kg/hp",
      "topspeed": "290+km/h",
      "torque": "700Nm",
      "weight": "1250kg"
   },
   "tags": ["gt3", "rwd", "turbo"],
   "year": 2016
}"#;

const RESULTS_RACE: &str = r#"{
   "TrackName": "monza",
   "TrackConfig": "",
   "Type": "RACE",
   "Date": "2020-01-01T10:00:00Z",
   "Result": [
      {"DriverName": "Alice", "DriverGuid": "1", "CarModel": "ks_audi_r8_lms", "BestLap": 108000},
      {"DriverName": "Bob", "DriverGuid": "2", "CarModel": "bmw_m3_e30", "BestLap": 121000}
   ]
}"#;

const RESULTS_PRACTICE: &str = r#"{
   "TrackName": "spa",
   "Type": "PRACTICE",
   "Result": [
      {"DriverName": "Bob", "CarModel": "ks_ferrari_488_gt3"}
   ]
}"#;

fn write_car(cars_dir: &Path, name: &str, skins: &[&str], details: Option<&str>) -> Result<()> {
    let car_dir = cars_dir.join(name);
    fs::create_dir_all(&car_dir)?;
    for skin in skins {
        fs::create_dir_all(car_dir.join("skins").join(skin))?;
    }
    if let Some(details) = details {
        fs::create_dir_all(car_dir.join("ui"))?;
        fs::write(car_dir.join("ui/ui_car.json"), details)?;
    }
    Ok(())
}

/// Creates a temporary install tree with three listable cars, one unfinished
/// car directory and two results files.
pub fn create_test_install() -> Result<TempDir> {
    let dir = TempDir::new()?;
    let cars_dir = dir.path().join("content/cars");

    write_car(&cars_dir, AUDI_R8, &["red", "00_official"], Some(AUDI_R8_DETAILS))?;
    write_car(&cars_dir, FERRARI_488, &["yellow"], Some(FERRARI_488_DETAILS))?;
    write_car(&cars_dir, BMW_M3, &["white"], None)?;
    write_car(&cars_dir, UNFINISHED_CAR, &[], None)?;

    fs::write(
        cars_dir.join(AUDI_R8).join("skins/red/preview.jpg"),
        b"not really a jpeg",
    )?;

    let results_dir = dir.path().join("results");
    fs::create_dir_all(&results_dir)?;
    fs::write(results_dir.join("2020_1_1_10_0_RACE.json"), RESULTS_RACE)?;
    fs::write(results_dir.join("2020_1_2_9_0_PRACTICE.json"), RESULTS_PRACTICE)?;

    Ok(dir)
}

/// Adds a minimal listable car, for tests that need a larger catalog.
pub fn add_plain_car(install: &Path, name: &str) -> Result<()> {
    write_car(&install.join("content/cars"), name, &["default"], None)
}
