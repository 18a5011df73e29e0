use crate::domain::Toolchain;
use anyhow::Result;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

pub const BACKUP_PREFIX: &str = "boxkeeper-backup";
pub const CONVERT_PREFIX: &str = "boxkeeper-convert";

/// Names and removes the short-lived images that carry container state
/// between workflow steps. A temp image lives inside exactly one workflow
/// invocation: a commit step creates it, a save/create step consumes it, a
/// best-effort step removes it.
#[derive(Clone)]
pub struct TempImages {
    toolchain: Arc<dyn Toolchain>,
}

impl TempImages {
    pub fn new(toolchain: Arc<dyn Toolchain>) -> Self {
        Self { toolchain }
    }

    /// Collision-safe name: prefix, container id and unix timestamp.
    pub fn mint(prefix: &str, container_id: &str) -> String {
        let stamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        format!("{prefix}-{container_id}-{stamp}")
    }

    pub fn remove(&self, image: &str) -> Result<()> {
        debug!("removing temporary image {image}");
        self.toolchain.remove_image(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minted_names_embed_prefix_and_container_id() {
        let name = TempImages::mint(BACKUP_PREFIX, "abc123");
        assert!(name.starts_with("boxkeeper-backup-abc123-"));

        let stamp = name.rsplit('-').next().unwrap();
        assert!(stamp.parse::<u64>().is_ok());
    }

    #[test]
    fn different_containers_get_different_names() {
        let a = TempImages::mint(CONVERT_PREFIX, "a");
        let b = TempImages::mint(CONVERT_PREFIX, "b");
        assert_ne!(a, b);
    }
}
