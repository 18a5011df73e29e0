use crate::domain::{Container, CreateSpec, IsolationState, Prompter, Toolchain};
use crate::infra::distrobox::extract_loaded_image;
use crate::infra::homes::HomeClassifier;
use crate::infra::progress::Spinner;
use crate::services::steps::{Compensation, abort_on_failure, warn_on_failure};
use crate::services::temp_images::{BACKUP_PREFIX, CONVERT_PREFIX, TempImages};
use anyhow::{Context, Result, anyhow, bail};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// How a workflow ended. A declined confirmation is a graceful cancellation,
/// not an error: no step beyond the gate was attempted.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Cancelled,
}

impl<T> Outcome<T> {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Outcome::Cancelled)
    }

    pub fn into_completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Cancelled => None,
        }
    }
}

#[derive(Debug)]
pub struct BackupReport {
    pub container: String,
    pub archive: PathBuf,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct RestoreReport {
    pub container: String,
    pub state: IsolationState,
    pub warnings: Vec<String>,
}

#[derive(Debug)]
pub struct ConvertReport {
    pub container: String,
    pub state: IsolationState,
    pub warnings: Vec<String>,
}

/// Drives the four lifecycle workflows as ordered step sequences over the
/// external toolchain. Steps run strictly one after another; each abort-class
/// step declares its own compensations, and best-effort cleanup never changes
/// the overall outcome.
pub struct Workflows {
    toolchain: Arc<dyn Toolchain>,
    prompter: Arc<dyn Prompter>,
    homes: HomeClassifier,
    temp_images: TempImages,
}

impl Workflows {
    pub fn new(
        toolchain: Arc<dyn Toolchain>,
        prompter: Arc<dyn Prompter>,
        homes: HomeClassifier,
    ) -> Self {
        let temp_images = TempImages::new(toolchain.clone());
        Self {
            toolchain,
            prompter,
            homes,
            temp_images,
        }
    }

    pub fn list(&self) -> Result<Vec<Container>> {
        self.toolchain.list_containers()
    }

    pub fn classify(&self, name: &str) -> IsolationState {
        self.homes.classify(name)
    }

    pub fn find(&self, name: &str) -> Result<Container> {
        self.list()?
            .into_iter()
            .find(|container| container.name == name)
            .ok_or_else(|| anyhow!("no container named '{name}'"))
    }

    /// Backs a container up to `<dest_dir>/<name>.tar` via a temporary image.
    pub fn backup(
        &self,
        container: &Container,
        dest_dir: &Path,
        name: &str,
    ) -> Result<Outcome<BackupReport>> {
        let archive = dest_dir.join(format!("{name}.tar"));
        if archive.exists() {
            let prompt = format!("File '{}' already exists. Overwrite?", archive.display());
            if !self.prompter.confirm(&prompt) {
                info!("backup cancelled, {} kept as is", archive.display());
                return Ok(Outcome::Cancelled);
            }
        }

        info!("backing up '{}' to {}", container.name, archive.display());
        let temp_image = TempImages::mint(BACKUP_PREFIX, &container.id);
        let spinner = Spinner::start("Backing up");

        // Nothing exists yet, so there is nothing to compensate.
        abort_on_failure("committing the container to a temporary image", Vec::new(), || {
            self.toolchain.commit(&container.name, &temp_image)
        })?;

        abort_on_failure(
            "saving the image to the archive",
            vec![self.remove_image_compensation(&temp_image)],
            || self.toolchain.save_image(&temp_image, &archive),
        )?;

        let mut warnings = Vec::new();
        warn_on_failure(
            "removing the temporary backup image",
            &temp_image,
            &mut warnings,
            || self.temp_images.remove(&temp_image),
        );

        spinner.finish();
        info!("backup of '{}' completed", container.name);

        Ok(Outcome::Completed(BackupReport {
            container: container.name.clone(),
            archive,
            warnings,
        }))
    }

    /// Restores a container from a tar archive, as Standard or Isolated.
    pub fn restore(&self, archive: &Path) -> Result<Outcome<RestoreReport>> {
        info!("loading image from {}", archive.display());
        let spinner = Spinner::start("Loading");
        let output = abort_on_failure("loading the archive", Vec::new(), || {
            self.toolchain.load_image(archive)
        })?;
        spinner.finish();

        let image = match extract_loaded_image(&output) {
            Some(image) => image,
            None => bail!(
                "could not determine the name of the loaded image from the toolchain output"
            ),
        };
        info!("image '{image}' loaded");

        let name = self.prompter.input("Name for the new container");
        let name = name.trim().to_string();
        if name.is_empty() {
            return Ok(self.cancel_restore(&image));
        }

        let state = match self.prompter.select(
            "How should this container be restored?",
            &[
                "Standard (shares the host home directory)",
                "Isolated (dedicated home directory)",
            ],
        ) {
            Some(1) => IsolationState::Isolated {
                home: self.homes.home_path(&name),
            },
            Some(_) => IsolationState::Standard,
            None => return Ok(self.cancel_restore(&image)),
        };

        let spec = CreateSpec {
            name: name.clone(),
            image: image.clone(),
            home: match &state {
                IsolationState::Isolated { home } => {
                    info!("container home will be at {}", home.display());
                    Some(home.clone())
                }
                IsolationState::Standard => None,
            },
        };

        // On failure the loaded image is deliberately kept: re-loading the
        // archive is costly, so the operator gets its name for a manual retry.
        let spinner = Spinner::start("Creating container");
        abort_on_failure("creating the restored container", Vec::new(), || {
            self.toolchain.create_container(&spec).with_context(|| {
                format!("the loaded image '{image}' was kept for manual recovery")
            })
        })?;
        spinner.finish();

        let mut warnings = Vec::new();
        warn_on_failure("removing the loaded image", &image, &mut warnings, || {
            self.toolchain.remove_image(&image)
        });

        info!("container '{name}' restored as {}", state.label());
        Ok(Outcome::Completed(RestoreReport {
            container: name,
            state,
            warnings,
        }))
    }

    /// Converts a container between Standard and Isolated by recreating it
    /// from a temporary image.
    pub fn convert(&self, container: &Container) -> Result<Outcome<ConvertReport>> {
        let current = self.homes.classify(&container.name);
        let target_label = match current {
            IsolationState::Standard => "Isolated",
            IsolationState::Isolated { .. } => "Standard",
        };

        let prompt = format!(
            "Container '{}' is currently {}. Convert to {}? This recreates the container",
            container.name,
            current.label(),
            target_label
        );
        if !self.prompter.confirm(&prompt) {
            info!("conversion cancelled");
            return Ok(Outcome::Cancelled);
        }

        // Leaving isolation destroys data, so it gets its own stronger gate.
        if let IsolationState::Isolated { home } = &current {
            let prompt = format!(
                "Converting to Standard PERMANENTLY DELETES the isolated home directory \
                 '{}' and everything in it. Are you absolutely sure?",
                home.display()
            );
            if !self.prompter.confirm(&prompt) {
                info!("conversion cancelled");
                return Ok(Outcome::Cancelled);
            }
        }

        let spinner = Spinner::start("Converting container");

        abort_on_failure("stopping the container", Vec::new(), || {
            self.toolchain.stop_container(&container.name)
        })?;

        // The container is stopped but otherwise intact if the commit fails.
        let temp_image = TempImages::mint(CONVERT_PREFIX, &container.id);
        abort_on_failure(
            "committing the container to a temporary image",
            Vec::new(),
            || self.toolchain.commit(&container.name, &temp_image),
        )?;

        // If removal itself fails the original container still exists, so the
        // temporary image is the only thing to clean up.
        abort_on_failure(
            "removing the original container",
            vec![self.remove_image_compensation(&temp_image)],
            || self.toolchain.remove_container(&container.name),
        )?;

        let target = match &current {
            IsolationState::Isolated { .. } => IsolationState::Standard,
            IsolationState::Standard => IsolationState::Isolated {
                home: self.homes.home_path(&container.name),
            },
        };
        let spec = CreateSpec {
            name: container.name.clone(),
            image: temp_image.clone(),
            home: match &target {
                IsolationState::Isolated { home } => Some(home.clone()),
                IsolationState::Standard => None,
            },
        };

        // Non-atomicity window: the original container is gone and nothing
        // replaces it until this step succeeds. The temporary image is kept on
        // failure so the operator can recreate the container by hand.
        abort_on_failure("creating the replacement container", Vec::new(), || {
            self.toolchain.create_container(&spec).with_context(|| {
                format!(
                    "the original container was already removed; the temporary image \
                     '{temp_image}' was kept for manual recovery"
                )
            })
        })?;

        let mut warnings = Vec::new();
        if let IsolationState::Isolated { home } = &current {
            warn_on_failure(
                "deleting the old isolated home directory",
                &home.display().to_string(),
                &mut warnings,
                || fs::remove_dir_all(home).with_context(|| format!("deleting {:?}", home)),
            );
        }
        warn_on_failure(
            "removing the temporary conversion image",
            &temp_image,
            &mut warnings,
            || self.temp_images.remove(&temp_image),
        );

        spinner.finish();
        info!("container '{}' converted to {}", container.name, target.label());

        Ok(Outcome::Completed(ConvertReport {
            container: container.name.clone(),
            state: target,
            warnings,
        }))
    }

    /// Force-removes a container after a single confirmation.
    pub fn delete(&self, container: &Container) -> Result<Outcome<()>> {
        let prompt = format!(
            "Permanently delete container '{}'? This cannot be undone",
            container.name
        );
        if !self.prompter.confirm(&prompt) {
            info!("deletion cancelled");
            return Ok(Outcome::Cancelled);
        }

        let spinner = Spinner::start("Deleting");
        abort_on_failure("removing the container", Vec::new(), || {
            self.toolchain.remove_container(&container.name)
        })?;
        spinner.finish();

        info!("container '{}' deleted", container.name);
        Ok(Outcome::Completed(()))
    }

    fn cancel_restore(&self, image: &str) -> Outcome<RestoreReport> {
        info!("restore cancelled, removing loaded image '{image}'");
        let mut warnings = Vec::new();
        warn_on_failure("removing the loaded image", image, &mut warnings, || {
            self.toolchain.remove_image(image)
        });
        Outcome::Cancelled
    }

    fn remove_image_compensation(&self, image: &str) -> Compensation {
        let toolchain = self.toolchain.clone();
        let image = image.to_string();
        Compensation::new(format!("remove temporary image '{image}'"), move || {
            toolchain.remove_image(&image)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MockToolchain, ScriptedPrompter};
    use std::fs;

    fn workflows(
        mock: &Arc<MockToolchain>,
        prompter: &Arc<ScriptedPrompter>,
        data_dir: &Path,
    ) -> Workflows {
        Workflows::new(
            mock.clone(),
            prompter.clone(),
            HomeClassifier::new(data_dir),
        )
    }

    #[test]
    fn backup_declined_overwrite_has_no_side_effects() {
        let mock = Arc::new(MockToolchain::new());
        let prompter = Arc::new(ScriptedPrompter::new());
        let dest = tempfile::tempdir().unwrap();
        let data_dir = tempfile::tempdir().unwrap();

        fs::write(dest.path().join("dev1.tar"), b"old archive").unwrap();
        prompter.push_confirm(false);

        let container = Container {
            id: "1".into(),
            name: "dev".into(),
            image: "img:latest".into(),
        };
        let outcome = workflows(&mock, &prompter, data_dir.path())
            .backup(&container, dest.path(), "dev1")
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(mock.get_commands().is_empty());
        assert_eq!(fs::read(dest.path().join("dev1.tar")).unwrap(), b"old archive");
    }

    #[test]
    fn restore_aborts_when_no_loaded_image_marker() {
        let mock = Arc::new(MockToolchain::new());
        mock.set_load_output("some unrelated output\nwithout any marker\n");
        let prompter = Arc::new(ScriptedPrompter::new());
        let data_dir = tempfile::tempdir().unwrap();

        let err = workflows(&mock, &prompter, data_dir.path())
            .restore(Path::new("/tmp/b/dev1.tar"))
            .unwrap_err();

        assert!(err.to_string().contains("could not determine"));
        // Name and type were never requested.
        assert!(prompter.prompts().is_empty());
    }

    #[test]
    fn restore_cancelled_on_empty_name_cleans_loaded_image() {
        let mock = Arc::new(MockToolchain::new());
        mock.set_load_output("Loaded image: restored:1\n");
        let prompter = Arc::new(ScriptedPrompter::new());
        prompter.push_input("   ");
        let data_dir = tempfile::tempdir().unwrap();

        let outcome = workflows(&mock, &prompter, data_dir.path())
            .restore(Path::new("/tmp/b/dev1.tar"))
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(mock.get_commands().contains(&"rmi:restored:1".to_string()));
        assert!(mock.images().is_empty());
    }

    #[test]
    fn delete_requires_confirmation() {
        let mock = Arc::new(MockToolchain::new());
        mock.add_container("1", "dev", "img:latest");
        let prompter = Arc::new(ScriptedPrompter::new());
        let data_dir = tempfile::tempdir().unwrap();

        let outcome = workflows(&mock, &prompter, data_dir.path())
            .delete(&Container {
                id: "1".into(),
                name: "dev".into(),
                image: "img:latest".into(),
            })
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(mock.container_exists("dev"));
        assert!(mock.get_commands().is_empty());
    }

    #[test]
    fn find_reports_unknown_names() {
        let mock = Arc::new(MockToolchain::new());
        mock.add_container("1", "dev", "img:latest");
        let prompter = Arc::new(ScriptedPrompter::new());
        let data_dir = tempfile::tempdir().unwrap();

        let engine = workflows(&mock, &prompter, data_dir.path());
        assert_eq!(engine.find("dev").unwrap().id, "1");
        assert!(engine.find("missing").is_err());
    }
}
