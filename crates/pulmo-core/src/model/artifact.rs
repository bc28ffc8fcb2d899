//! Versioned model artifact discovery.
//!
//! A model version is a directory under the model root produced by the
//! external training pipeline. It must contain the trained weights plus the
//! two JSON files describing them; a directory missing any of the three is
//! never eligible for loading.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, warn};

use crate::error::RegistryError;

/// Trained network weights (safetensors).
pub const WEIGHTS_FILE: &str = "model.safetensors";
/// Training-produced configuration: class list and input dimensions.
pub const CONFIG_FILE: &str = "config.json";
/// Descriptive metadata: name, version, architecture.
pub const METADATA_FILE: &str = "info_modelo.json";

pub const REQUIRED_FILES: [&str; 3] = [WEIGHTS_FILE, CONFIG_FILE, METADATA_FILE];

/// A candidate model version directory.
#[derive(Debug, Clone)]
pub struct ArtifactDir {
    pub path: PathBuf,
    pub name: String,
}

impl ArtifactDir {
    pub fn new(path: PathBuf) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { path, name }
    }

    pub fn weights_path(&self) -> PathBuf {
        self.path.join(WEIGHTS_FILE)
    }

    pub fn config_path(&self) -> PathBuf {
        self.path.join(CONFIG_FILE)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.path.join(METADATA_FILE)
    }

    /// Required files that are absent from this directory.
    pub fn missing_files(&self) -> Vec<&'static str> {
        REQUIRED_FILES
            .iter()
            .filter(|name| !self.path.join(name).is_file())
            .copied()
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_files().is_empty()
    }
}

/// Find the most recent complete model version under `root`.
///
/// Candidates are the immediate subdirectories of the root, newest
/// modification time first. The first one holding all required files wins;
/// newer but incomplete directories are skipped, so a training run that is
/// still writing its output never shadows the last good version.
pub fn discover_latest(root: &Path) -> Result<ArtifactDir, RegistryError> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("Cannot read model root {:?}: {}", root, err);
            return Err(RegistryError::NotFound(root.to_path_buf()));
        }
    };

    let mut candidates: Vec<(SystemTime, ArtifactDir)> = Vec::new();
    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let modified = entry
            .metadata()
            .and_then(|m| m.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push((modified, ArtifactDir::new(path)));
    }

    candidates.sort_by(|a, b| b.0.cmp(&a.0));

    for (_, candidate) in candidates {
        let missing = candidate.missing_files();
        if missing.is_empty() {
            debug!("Selected model artifact '{}'", candidate.name);
            return Ok(candidate);
        }
        debug!(
            "Skipping incomplete model artifact '{}' (missing {:?})",
            candidate.name, missing
        );
    }

    Err(RegistryError::NotFound(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;

    fn make_artifact(root: &Path, name: &str, files: &[&str]) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir(&dir).unwrap();
        for file in files {
            fs::write(dir.join(file), b"x").unwrap();
        }
        dir
    }

    #[test]
    fn test_most_recent_complete_candidate_wins() {
        let root = tempfile::tempdir().unwrap();

        make_artifact(root.path(), "v1", &REQUIRED_FILES);
        std::thread::sleep(Duration::from_millis(100));
        make_artifact(root.path(), "v2", &REQUIRED_FILES);
        std::thread::sleep(Duration::from_millis(100));
        // Newest directory is incomplete and must be skipped.
        make_artifact(root.path(), "v3", &[WEIGHTS_FILE, CONFIG_FILE]);

        let selected = discover_latest(root.path()).unwrap();
        assert_eq!(selected.name, "v2");
    }

    #[test]
    fn test_only_complete_middle_candidate_is_selected() {
        let root = tempfile::tempdir().unwrap();

        make_artifact(root.path(), "t1", &[CONFIG_FILE]);
        std::thread::sleep(Duration::from_millis(100));
        make_artifact(root.path(), "t2", &REQUIRED_FILES);
        std::thread::sleep(Duration::from_millis(100));
        make_artifact(root.path(), "t3", &[WEIGHTS_FILE, METADATA_FILE]);

        let selected = discover_latest(root.path()).unwrap();
        assert_eq!(selected.name, "t2");
    }

    #[test]
    fn test_no_complete_candidate_reports_not_found() {
        let root = tempfile::tempdir().unwrap();
        make_artifact(root.path(), "partial", &[WEIGHTS_FILE]);

        let err = discover_latest(root.path()).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_missing_root_reports_not_found() {
        let root = tempfile::tempdir().unwrap();
        let missing = root.path().join("nope");

        let err = discover_latest(&missing).unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(_)));
    }

    #[test]
    fn test_missing_files_lists_absent_names() {
        let root = tempfile::tempdir().unwrap();
        let dir = make_artifact(root.path(), "v1", &[WEIGHTS_FILE]);

        let artifact = ArtifactDir::new(dir);
        let missing = artifact.missing_files();
        assert_eq!(missing, vec![CONFIG_FILE, METADATA_FILE]);
        assert!(!artifact.is_complete());
    }
}
