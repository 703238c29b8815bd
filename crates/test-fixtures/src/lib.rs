//! Test fixture loader for propsync snapshots, event logs, and replay scenarios.
//!
//! Provides typed deserialization of fixture JSON / JSON-lines files and
//! helpers for loading them in tests across crates.

use serde::de::DeserializeOwned;
use std::path::PathBuf;

/// Root directory of the fixture files, next to this crate's manifest.
fn fixtures_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("propsync")
}

/// Load and deserialize a JSON fixture file.
///
/// # Panics
/// Panics if the file doesn't exist or can't be deserialized.
pub fn load_fixture<T: DeserializeOwned>(relative_path: &str) -> T {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    serde_json::from_str(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", path.display(), e))
}

/// Load a fixture file as raw JSON Value.
pub fn load_fixture_value(relative_path: &str) -> serde_json::Value {
    load_fixture(relative_path)
}

/// Load a JSON-lines fixture, one value per non-blank line.
///
/// # Panics
/// Panics if the file doesn't exist or any line can't be deserialized.
pub fn load_jsonl<T: DeserializeOwned>(relative_path: &str) -> Vec<T> {
    let path = fixtures_root().join(relative_path);
    let content = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", path.display(), e));
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str(line).unwrap_or_else(|e| {
                panic!("Failed to parse {} line {}: {}", path.display(), n + 1, e)
            })
        })
        .collect()
}

/// Check that a fixture file exists.
pub fn fixture_exists(relative_path: &str) -> bool {
    fixtures_root().join(relative_path).exists()
}

/// Get the absolute path to a fixture file.
pub fn fixture_path(relative_path: &str) -> PathBuf {
    fixtures_root().join(relative_path)
}

/// A replay scenario: bootstrap snapshot, event stream, and the tree
/// expected once every event has been applied.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ReplayScenario {
    pub name: String,
    pub snapshot: serde_json::Map<String, serde_json::Value>,
    /// Raw wire events, left untyped so each crate decodes them itself.
    pub events: Vec<serde_json::Value>,
    pub expected: serde_json::Value,
    /// Indices (into `events`) expected to fail.
    #[serde(default)]
    pub expected_failures: Vec<usize>,
}

/// Load every scenario in `scenarios/replay.json`.
pub fn replay_scenarios() -> Vec<ReplayScenario> {
    load_fixture("scenarios/replay.json")
}
