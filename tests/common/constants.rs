//! Shared constants for end-to-end tests
//!
//! Car names and field values of the fixture catalog. When the fixtures
//! change, update only this file.

// ============================================================================
// Fixture cars
// ============================================================================

/// Hand-edited details: BOM, CRLF line endings, tabs, duplicate tags.
pub const AUDI_R8: &str = "ks_audi_r8_lms";

/// Well-formed details document.
pub const FERRARI_488: &str = "ks_ferrari_488_gt3";

/// No details document at all.
pub const BMW_M3: &str = "bmw_m3_e30";

/// Directory without a `skins` directory, never listed.
pub const UNFINISHED_CAR: &str = "wip_prototype";

/// Number of listable cars in the fixture catalog.
pub const FIXTURE_CAR_COUNT: usize = 3;

// ============================================================================
// Fixture field values
// ============================================================================

pub const AUDI_R8_NAME: &str = "Audi R8 LMS";
pub const FERRARI_488_DESCRIPTION_WORD: &str = "twin-turbocharged";
pub const SHARED_TAG: &str = "gt3";
