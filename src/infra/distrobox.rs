use crate::domain::{Container, CreateSpec, Toolchain};
use crate::infra::command::{CommandError, CommandRunner};
use anyhow::Result;
use std::ffi::{OsStr, OsString};
use std::path::Path;

/// Marker line printed by `podman load` / `docker load`.
pub const LOADED_IMAGE_MARKER: &str = "Loaded image:";

/// `distrobox-list` reports an empty catalog as a failure with this phrase.
const NO_BOXES_SENTINEL: &str = "No distroboxes found";

/// Drives the real toolchain: `distrobox-list`/`distrobox-create`/
/// `distrobox-rm` plus the configured container runtime for image plumbing.
#[derive(Debug, Clone)]
pub struct DistroboxAdapter {
    runtime: String,
    runner: CommandRunner,
}

impl DistroboxAdapter {
    pub fn new(runtime: impl Into<String>) -> Self {
        Self {
            runtime: runtime.into(),
            runner: CommandRunner::new(),
        }
    }
}

impl Toolchain for DistroboxAdapter {
    fn list_containers(&self) -> Result<Vec<Container>> {
        containers_from_listing(self.runner.run("distrobox-list", ["--no-color"]))
    }

    fn commit(&self, container: &str, image: &str) -> Result<()> {
        self.runner.run(&self.runtime, ["commit", container, image])?;
        Ok(())
    }

    fn save_image(&self, image: &str, dest: &Path) -> Result<()> {
        self.runner.run(
            &self.runtime,
            [
                OsStr::new("save"),
                OsStr::new("-o"),
                dest.as_os_str(),
                OsStr::new(image),
            ],
        )?;
        Ok(())
    }

    fn load_image(&self, archive: &Path) -> Result<String> {
        let output = self.runner.run(
            &self.runtime,
            [OsStr::new("load"), OsStr::new("-i"), archive.as_os_str()],
        )?;
        Ok(output)
    }

    fn remove_image(&self, image: &str) -> Result<()> {
        self.runner.run(&self.runtime, ["rmi", image])?;
        Ok(())
    }

    fn stop_container(&self, name: &str) -> Result<()> {
        self.runner.run(&self.runtime, ["stop", name])?;
        Ok(())
    }

    fn create_container(&self, spec: &CreateSpec) -> Result<()> {
        let mut args: Vec<OsString> = vec![
            "--name".into(),
            spec.name.clone().into(),
            "--image".into(),
            spec.image.clone().into(),
        ];

        if let Some(home) = &spec.home {
            args.push("--home".into());
            args.push(home.clone().into_os_string());
        }

        self.runner.run("distrobox-create", args)?;
        Ok(())
    }

    fn remove_container(&self, name: &str) -> Result<()> {
        self.runner.run("distrobox-rm", [name, "--force"])?;
        Ok(())
    }
}

fn containers_from_listing(listing: Result<String, CommandError>) -> Result<Vec<Container>> {
    match listing {
        Ok(output) => Ok(parse_container_list(&output)),
        // An empty catalog is not a failure.
        Err(err) if err.output().contains(NO_BOXES_SENTINEL) => Ok(Vec::new()),
        Err(err) => Err(err.into()),
    }
}

/// Parses the pipe-delimited table printed by `distrobox-list`. Header and
/// ruler rows are skipped; rows with fewer than four fields are tolerated
/// silently rather than treated as errors.
pub fn parse_container_list(output: &str) -> Vec<Container> {
    let mut containers = Vec::new();

    for line in output.lines() {
        if !line.contains('|') || line.contains("ID") || line.contains("NAME") {
            continue;
        }

        let fields: Vec<&str> = line.split('|').collect();
        if fields.len() < 4 {
            continue;
        }
        if fields.iter().all(|field| {
            let trimmed = field.trim();
            trimmed.is_empty() || trimmed.chars().all(|c| c == '-')
        }) {
            continue;
        }

        containers.push(Container {
            id: fields[0].trim().to_string(),
            name: fields[1].trim().to_string(),
            image: fields[3].trim().to_string(),
        });
    }

    containers
}

/// Finds the loaded image identifier in `load` output. Matches the marker as
/// a substring of any line, so surrounding log noise is ignored.
pub fn extract_loaded_image(output: &str) -> Option<String> {
    for line in output.lines() {
        if let Some((_, rest)) = line.split_once(LOADED_IMAGE_MARKER) {
            let image = rest.trim();
            if !image.is_empty() {
                return Some(image.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_data_rows_and_skips_decoration() {
        let output = "ID|NAME|STATUS|IMAGE\n--|--|--|--\n1|dev|Up|img:latest\n";
        let containers = parse_container_list(output);

        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].id, "1");
        assert_eq!(containers[0].name, "dev");
        assert_eq!(containers[0].image, "img:latest");
    }

    #[test]
    fn skips_rows_with_too_few_fields() {
        let output = "1|dev\n2|work|Up|fedora:40\n";
        let containers = parse_container_list(output);

        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].name, "work");
    }

    #[test]
    fn skips_lines_without_delimiter() {
        let output = "some log noise\n3|dev|Up|img:1\n";
        let containers = parse_container_list(output);

        assert_eq!(containers.len(), 1);
        assert_eq!(containers[0].id, "3");
    }

    #[test]
    fn empty_catalog_sentinel_is_not_an_error() {
        let err = CommandError::new(
            "distrobox-list --no-color",
            "exited with exit status: 1",
            "Error: No distroboxes found in the system",
        );

        let containers = containers_from_listing(Err(err)).unwrap();
        assert!(containers.is_empty());
    }

    #[test]
    fn genuine_listing_failure_propagates() {
        let err = CommandError::new(
            "distrobox-list --no-color",
            "exited with exit status: 125",
            "cannot connect to the container runtime",
        );

        let result = containers_from_listing(Err(err));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("cannot connect to the container runtime")
        );
    }

    #[test]
    fn extracts_loaded_image_among_noise() {
        let output = "\
Getting image source signatures
Copying blob abc done
Loaded image: myimg:123
Writing manifest to image destination
";
        assert_eq!(extract_loaded_image(output).as_deref(), Some("myimg:123"));
    }

    #[test]
    fn extracts_loaded_image_with_surrounding_text_in_line() {
        let output = "2024-01-01T00:00:00Z Loaded image: docker.io/library/ubuntu:22.04  \n";
        assert_eq!(
            extract_loaded_image(output).as_deref(),
            Some("docker.io/library/ubuntu:22.04")
        );
    }

    #[test]
    fn missing_marker_yields_none() {
        assert_eq!(extract_loaded_image("nothing useful here\n"), None);
        assert_eq!(extract_loaded_image(""), None);
    }
}
