use crate::domain::IsolationState;
use std::path::PathBuf;

/// Decides whether a container is Standard or Isolated by testing for its
/// dedicated home directory under the distrobox data directory.
///
/// The result is a pure function of the current filesystem state. Nothing is
/// cached: a conversion deletes or creates the home mid-workflow, so callers
/// re-classify whenever they need a fresh answer.
#[derive(Debug, Clone)]
pub struct HomeClassifier {
    homes_root: PathBuf,
}

impl HomeClassifier {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            homes_root: data_dir.into().join("homes"),
        }
    }

    /// The deterministic isolated-home path for a container name, whether or
    /// not it exists.
    pub fn home_path(&self, name: &str) -> PathBuf {
        self.homes_root.join(name)
    }

    pub fn classify(&self, name: &str) -> IsolationState {
        let home = self.home_path(name);
        if home.exists() {
            IsolationState::Isolated { home }
        } else {
            IsolationState::Standard
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn standard_when_no_home_directory() {
        let data_dir = tempfile::tempdir().unwrap();
        let classifier = HomeClassifier::new(data_dir.path());

        assert_eq!(classifier.classify("dev"), IsolationState::Standard);
    }

    #[test]
    fn isolated_when_home_directory_exists() {
        let data_dir = tempfile::tempdir().unwrap();
        let home = data_dir.path().join("homes").join("dev");
        fs::create_dir_all(&home).unwrap();

        let classifier = HomeClassifier::new(data_dir.path());
        assert_eq!(
            classifier.classify("dev"),
            IsolationState::Isolated { home }
        );
    }

    #[test]
    fn classification_is_idempotent() {
        let data_dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(data_dir.path().join("homes").join("dev")).unwrap();

        let classifier = HomeClassifier::new(data_dir.path());
        assert_eq!(classifier.classify("dev"), classifier.classify("dev"));
        assert_eq!(classifier.classify("other"), classifier.classify("other"));
    }

    #[test]
    fn home_path_is_keyed_by_name() {
        let classifier = HomeClassifier::new("/data");
        assert_eq!(
            classifier.home_path("dev"),
            PathBuf::from("/data/homes/dev")
        );
    }
}
