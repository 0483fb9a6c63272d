//! Historical session results, as written by the game server into
//! `<install>/results/*.json`.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionResult {
    #[serde(rename = "DriverName")]
    pub driver_name: String,
    #[serde(rename = "DriverGuid")]
    pub driver_guid: String,
    #[serde(rename = "CarId")]
    pub car_id: i64,
    #[serde(rename = "CarModel")]
    pub car_model: String,
    #[serde(rename = "BestLap")]
    pub best_lap: i64,
    #[serde(rename = "TotalTime")]
    pub total_time: i64,
}

/// One session's results file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionResults {
    #[serde(rename = "TrackName")]
    pub track_name: String,
    #[serde(rename = "TrackConfig")]
    pub track_config: String,
    #[serde(rename = "Type")]
    pub session_type: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Result")]
    pub result: Vec<SessionResult>,

    /// Name of the file this session was read from.
    #[serde(skip)]
    pub file_name: String,
}

impl SessionResults {
    pub fn has_car(&self, car: &str) -> bool {
        self.result.iter().any(|driver| driver.car_model == car)
    }
}

/// Provider of the full result set.
pub trait ResultsSource: Send + Sync {
    fn all_results(&self) -> std::io::Result<Vec<SessionResults>>;
}

/// Sessions in which at least one driver used `car`, in source order.
pub fn results_for_car(results: &[SessionResults], car: &str) -> Vec<SessionResults> {
    results
        .iter()
        .filter(|session| session.has_car(car))
        .cloned()
        .collect()
}

/// Leading `_`-separated numbers of a results file name, e.g.
/// `2021_10_1_18_30_RACE.json` gives `[2021, 10, 1, 18, 30]`.
fn date_parts(file_name: &str) -> Vec<u64> {
    file_name
        .split('_')
        .map_while(|part| part.parse().ok())
        .collect()
}

/// Reads every `*.json` file in a results directory. Files that fail to
/// parse are skipped.
pub struct FsResultsSource {
    results_dir: PathBuf,
}

impl FsResultsSource {
    pub fn new<P: AsRef<Path>>(results_dir: P) -> Self {
        FsResultsSource {
            results_dir: results_dir.as_ref().to_path_buf(),
        }
    }
}

impl ResultsSource for FsResultsSource {
    /// Newest first, by the date parts the server puts at the start of each file name.
    fn all_results(&self) -> std::io::Result<Vec<SessionResults>> {
        let entries = match std::fs::read_dir(&self.results_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!("No results directory at {:?}", self.results_dir);
                return Ok(Vec::new());
            }
            Err(err) => return Err(err),
        };

        let mut results = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }

            let content = std::fs::read(&path)?;
            match serde_json::from_slice::<SessionResults>(&content) {
                Ok(mut session) => {
                    session.file_name = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    results.push(session);
                }
                Err(err) => warn!("Skipping unreadable results file {:?}: {}", path, err),
            }
        }

        results.sort_by_cached_key(|session| {
            Reverse((date_parts(&session.file_name), session.file_name.clone()))
        });
        Ok(results)
    }
}
