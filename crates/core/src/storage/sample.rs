use std::path::PathBuf;

use tracing::warn;

use crate::models::snapshot::CacheSnapshot;

/// Sample feed compiled into the binary.
const BUNDLED_SAMPLE: &str = include_str!("../../data/sample_snapshot.json");

/// The last tier of the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SampleSource {
    Bundled,
    File(PathBuf),
    Disabled,
}

impl SampleSource {
    /// `bundled` (default), `off`/`none`/`disabled`, or a path to a JSON file.
    pub fn parse(s: &str) -> Self {
        match s.trim() {
            "" | "bundled" => SampleSource::Bundled,
            "off" | "none" | "disabled" => SampleSource::Disabled,
            path => SampleSource::File(PathBuf::from(path)),
        }
    }

    pub fn load(&self) -> Option<CacheSnapshot> {
        let result = match self {
            SampleSource::Disabled => return None,
            SampleSource::Bundled => serde_json::from_str(BUNDLED_SAMPLE).map_err(|e| e.to_string()),
            SampleSource::File(path) => std::fs::read(path)
                .map_err(|e| format!("{}: {e}", path.display()))
                .and_then(|bytes| serde_json::from_slice(&bytes).map_err(|e| e.to_string())),
        };

        match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(error = %e, "sample data unavailable");
                None
            }
        }
    }
}
