//! Docker container status for the services listed in `[monitoring].services`.

use super::run_command;
use crate::errors::Result;

/// One container as reported by `docker ps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    /// Container name
    pub name: String,
    /// Docker's status column (e.g. `Up 3 hours (healthy)`)
    pub status: String,
}

impl ContainerStatus {
    /// Docker reports running containers with an `Up ...` status.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.status.starts_with("Up")
    }
}

/// Resolved state of a configured service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceState {
    /// Container exists and is running
    Running,
    /// Container exists but is not running
    Stopped,
    /// No container with this name
    Missing,
}

impl ServiceState {
    /// Whether the service counts as up.
    #[must_use]
    pub const fn is_up(self) -> bool {
        matches!(self, Self::Running)
    }

    /// Short label for dashboards.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Stopped => "stopped",
            Self::Missing => "missing",
        }
    }
}

/// A configured service and what docker says about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceStatus {
    /// Configured container name
    pub name: String,
    /// Resolved state
    pub state: ServiceState,
    /// Docker's status text, empty when missing
    pub detail: String,
}

/// Parses `docker ps -a --format '{{.Names}}\t{{.Status}}'`.
#[must_use]
pub fn parse_docker_ps(output: &str) -> Vec<ContainerStatus> {
    output
        .lines()
        .filter_map(|line| {
            let (name, status) = line.split_once('\t')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some(ContainerStatus {
                name: name.to_string(),
                status: status.trim().to_string(),
            })
        })
        .collect()
}

/// Maps configured service names onto the containers docker knows about.
///
/// Output order follows `configured`.
#[must_use]
pub fn resolve_statuses(configured: &[String], containers: &[ContainerStatus]) -> Vec<ServiceStatus> {
    configured
        .iter()
        .map(|name| {
            containers.iter().find(|c| c.name == *name).map_or_else(
                || ServiceStatus {
                    name: name.clone(),
                    state: ServiceState::Missing,
                    detail: String::new(),
                },
                |container| ServiceStatus {
                    name: name.clone(),
                    state: if container.is_running() {
                        ServiceState::Running
                    } else {
                        ServiceState::Stopped
                    },
                    detail: container.status.clone(),
                },
            )
        })
        .collect()
}

/// Looks up the configured services in `docker ps -a`.
pub async fn service_statuses(configured: &[String]) -> Result<Vec<ServiceStatus>> {
    if configured.is_empty() {
        return Ok(Vec::new());
    }
    let output = run_command(
        "docker",
        &["ps", "-a", "--format", "{{.Names}}\t{{.Status}}"],
    )
    .await?;
    Ok(resolve_statuses(configured, &parse_docker_ps(&output)))
}
