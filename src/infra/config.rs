use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Optional overrides read once at startup from `boxkeeper.toml` and passed
/// into the components explicitly; nothing reads ambient global state later.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct Settings {
    /// Container runtime to use instead of auto-detection ("podman"/"docker")
    pub runtime: Option<String>,
    /// Distrobox data directory, `~` allowed (default: ~/.local/share/distrobox)
    pub data_dir: Option<String>,
}

impl Settings {
    pub fn data_dir(&self) -> PathBuf {
        match &self.data_dir {
            Some(dir) => PathBuf::from(shellexpand::tilde(dir).into_owned()),
            None => default_data_dir(),
        }
    }
}

pub fn default_config_dir() -> PathBuf {
    home_dir().join(".config/boxkeeper")
}

pub fn default_data_dir() -> PathBuf {
    home_dir().join(".local/share/distrobox")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/root"))
}

pub fn load_settings(config_dir: &Path) -> Result<Settings> {
    let path = config_dir.join("boxkeeper.toml");

    if !path.exists() {
        return Ok(Settings::default());
    }

    let content = fs::read_to_string(&path).with_context(|| format!("reading {:?}", path))?;
    parse_settings(&content, &path)
}

fn parse_settings(content: &str, path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }

    toml::from_str(content).with_context(|| format!("parsing {:?}", path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_both_fields() {
        let toml = r#"
runtime = "docker"
data_dir = "/srv/distrobox"
"#;

        let settings = parse_settings(toml, Path::new("boxkeeper.toml")).unwrap();
        assert_eq!(settings.runtime.as_deref(), Some("docker"));
        assert_eq!(settings.data_dir(), PathBuf::from("/srv/distrobox"));
    }

    #[test]
    fn empty_file_is_allowed() {
        let settings = parse_settings("   \n", Path::new("boxkeeper.toml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn rejects_malformed_toml() {
        let err = parse_settings("runtime = [", Path::new("boxkeeper.toml")).unwrap_err();
        assert!(err.to_string().contains("boxkeeper.toml"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = load_settings(dir.path()).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn tilde_in_data_dir_is_expanded() {
        let settings = Settings {
            runtime: None,
            data_dir: Some("~/boxes".to_string()),
        };

        assert!(!settings.data_dir().to_string_lossy().starts_with('~'));
    }
}
