//! End-to-end tests for the catalog: loading, mutations and results

mod common;

use car_catalog::car_details::CarSpecsNumeric;
use car_catalog::car_store::DEFAULT_SKIN_URL;
use car_catalog::results::FsResultsSource;
use car_catalog::search::SearchContext;
use common::*;

// =============================================================================
// Listing and loading
// =============================================================================

#[test]
fn test_list_cars_skips_unfinished_and_sorts_by_pretty_name() {
    let catalog = TestCatalog::open();

    let cars = catalog.manager().list_cars(None).unwrap();
    let names: Vec<&str> = cars.iter().map(|car| car.name.as_str()).collect();

    assert_eq!(names, vec![BMW_M3, AUDI_R8, FERRARI_488]);
    assert!(!names.contains(&UNFINISHED_CAR));
}

#[test]
fn test_hand_edited_details_are_loaded_leniently() {
    let catalog = TestCatalog::open();

    let car = catalog.manager().load_car(AUDI_R8, None).unwrap();

    assert_eq!(car.skins, vec!["00_official", "red"]);
    assert_eq!(car.details.name, AUDI_R8_NAME);
    assert_eq!(car.details.tags(), ["gt3", "endurance"]);
    assert_eq!(car.details.year, 2016);
    assert_eq!(car.details.specs().topspeed, "290");
    assert_eq!(car.details.power_curve, vec![(1000.0, 120.0), (2000.0, 240.0)]);
    assert_eq!(
        *car.details.numeric_specs(),
        CarSpecsNumeric {
            bhp: 585,
            weight: 1225,
            topspeed: 290,
            ..Default::default()
        }
    );
}

#[test]
fn test_missing_details_use_pretty_name() {
    let catalog = TestCatalog::open();

    let car = catalog.manager().load_car(BMW_M3, None).unwrap();

    assert_eq!(car.details.name, "BMW M3 E30");
    assert!(car.details.tags().is_empty());
}

#[test]
fn test_unknown_and_unfinished_cars_are_not_found() {
    let catalog = TestCatalog::open();

    assert!(catalog
        .manager()
        .load_car("no_such_car", None)
        .unwrap_err()
        .is_not_found());
    assert!(catalog
        .manager()
        .load_car(UNFINISHED_CAR, None)
        .unwrap_err()
        .is_not_found());
}

#[test]
fn test_skin_preview_urls() {
    let catalog = TestCatalog::open();
    let manager = catalog.manager();

    assert_eq!(
        manager.skin_preview_url(AUDI_R8, "red"),
        format!("/content/cars/{}/skins/red/preview.jpg", AUDI_R8)
    );
    assert_eq!(manager.skin_preview_url(AUDI_R8, "00_official"), DEFAULT_SKIN_URL);
}

// =============================================================================
// Mutations
// =============================================================================

#[test]
fn test_add_tag_twice_keeps_one_tag() {
    let catalog = TestCatalog::open();

    catalog.manager().add_tag(BMW_M3, "classic").unwrap();
    catalog.manager().add_tag(BMW_M3, "classic").unwrap();

    let car = catalog.manager().load_car(BMW_M3, None).unwrap();
    assert_eq!(car.details.tags(), ["classic"]);
}

#[test]
fn test_remove_missing_tag_leaves_details_unchanged() {
    let catalog = TestCatalog::open();
    let before = catalog.manager().load_car(FERRARI_488, None).unwrap();

    catalog.manager().remove_tag(FERRARI_488, "missing").unwrap();

    let after = catalog.manager().load_car(FERRARI_488, None).unwrap();
    assert_eq!(before.details, after.details);
}

#[test]
fn test_saved_details_survive_reload() {
    let mut catalog = TestCatalog::open();
    let mut details = catalog.manager().load_car(AUDI_R8, None).unwrap().details;
    details.description = "Evo version".to_string();

    catalog.manager().save_car_details(AUDI_R8, &details).unwrap();
    catalog.reopen();

    let car = catalog.manager().load_car(AUDI_R8, None).unwrap();
    assert_eq!(car.details, details);
    assert_eq!(car.details.numeric_specs().bhp, 585);
}

#[test]
fn test_delete_removes_car_from_disk_and_index() {
    let catalog = TestCatalog::open();
    let manager = catalog.manager();

    assert!(manager.delete_car(FERRARI_488).unwrap());

    assert!(manager.load_car(FERRARI_488, None).unwrap_err().is_not_found());
    assert!(!catalog.install_path().join("content/cars").join(FERRARI_488).exists());
    let results = manager.search("", 0, &SearchContext::new()).unwrap();
    assert!(!results.hit_ids.iter().any(|id| id == FERRARI_488));
    assert_eq!(results.total_hits, FIXTURE_CAR_COUNT - 1);

    // Second delete is a no-op
    assert!(!manager.delete_car(FERRARI_488).unwrap());
}

#[test]
fn test_delete_leaves_unlisted_directories_alone() {
    let catalog = TestCatalog::open();

    assert!(!catalog.manager().delete_car(UNFINISHED_CAR).unwrap());
    assert!(catalog
        .install_path()
        .join("content/cars")
        .join(UNFINISHED_CAR)
        .exists());
}

#[test]
fn test_invalid_names_are_rejected() {
    let catalog = TestCatalog::open();

    assert!(catalog.manager().add_tag("../escape", "t").is_err());
    assert!(catalog.manager().delete_car("..").is_err());
}

// =============================================================================
// Results
// =============================================================================

#[test]
fn test_results_for_car() {
    let catalog = TestCatalog::open();
    let source = FsResultsSource::new(catalog.install_path().join("results"));

    let audi = catalog.manager().results_for_car(AUDI_R8, &source).unwrap();
    assert_eq!(audi.len(), 1);
    assert_eq!(audi[0].track_name, "monza");

    let ferrari = catalog.manager().results_for_car(FERRARI_488, &source).unwrap();
    assert_eq!(ferrari.len(), 1);
    assert_eq!(ferrari[0].session_type, "PRACTICE");

    let loaded = catalog
        .manager()
        .load_car_with_results(BMW_M3, None, &source)
        .unwrap();
    assert_eq!(loaded.car.name, BMW_M3);
    assert_eq!(loaded.results.len(), 1);
    assert_eq!(loaded.results[0].result[1].driver_name, "Bob");
}
