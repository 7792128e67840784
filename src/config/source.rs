//! Log source configuration: the Docker container and the demo generator

use serde::Deserialize;
use std::time::Duration;

use crate::source::docker::DockerOptions;

/// Where log lines come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    /// Docker CLI binary (name on PATH or absolute path)
    pub docker_binary: String,
    pub container_name: String,
    pub image: String,
    /// Host ports published 1:1 when the container is created
    pub ports: Vec<u16>,
    /// Volume mount passed to `docker run -v`, empty to skip
    pub volume: String,
    /// Wait after creating the container before following its logs
    pub startup_grace_ms: u64,
    pub reattach_timeout_secs: u64,
    /// Demo mode only
    pub demo_interval_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        let docker = DockerOptions::default();
        Self {
            docker_binary: docker.binary,
            container_name: docker.container_name,
            image: docker.image,
            ports: docker.ports,
            volume: docker.volume,
            startup_grace_ms: docker.startup_grace.as_millis() as u64,
            reattach_timeout_secs: 5,
            demo_interval_ms: 400,
        }
    }
}

/// Source settings as loaded from config file
#[derive(Debug, Deserialize, Default)]
pub struct FileSource {
    pub docker_binary: Option<String>,
    pub container_name: Option<String>,
    pub image: Option<String>,
    pub ports: Option<Vec<u16>>,
    pub volume: Option<String>,
    pub startup_grace_ms: Option<u64>,
    pub reattach_timeout_secs: Option<u64>,
    pub demo_interval_ms: Option<u64>,
}

impl SourceConfig {
    /// Create from file config with defaults
    pub fn from_file(file: Option<FileSource>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        Self {
            docker_binary: file.docker_binary.unwrap_or(defaults.docker_binary),
            container_name: file.container_name.unwrap_or(defaults.container_name),
            image: file.image.unwrap_or(defaults.image),
            ports: file.ports.unwrap_or(defaults.ports),
            volume: file.volume.unwrap_or(defaults.volume),
            startup_grace_ms: file.startup_grace_ms.unwrap_or(defaults.startup_grace_ms),
            // Zero would make every reattach time out immediately
            reattach_timeout_secs: file
                .reattach_timeout_secs
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.reattach_timeout_secs),
            demo_interval_ms: file
                .demo_interval_ms
                .filter(|ms| *ms > 0)
                .unwrap_or(defaults.demo_interval_ms),
        }
    }

    pub fn to_docker_options(&self) -> DockerOptions {
        DockerOptions {
            binary: self.docker_binary.clone(),
            container_name: self.container_name.clone(),
            image: self.image.clone(),
            ports: self.ports.clone(),
            volume: self.volume.clone(),
            startup_grace: Duration::from_millis(self.startup_grace_ms),
        }
    }

    pub fn reattach_timeout(&self) -> Duration {
        Duration::from_secs(self.reattach_timeout_secs)
    }

    pub fn demo_interval(&self) -> Duration {
        Duration::from_millis(self.demo_interval_ms)
    }
}
